//! Product reference counting for generations.
//!
//! Any failure to get a count from the product registry is treated as
//! "referenced": destructive operations are blocked instead of proceeding.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{Collaborator, Error, ReferencedError, Result};
use crate::products::{BoundProduct, ProductRegistryTrait};
use crate::templates::Generation;

/// Bound-product count of one generation. `count` is `None` when the registry
/// could not answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUsage {
    pub generation_id: String,
    pub count: Option<i64>,
}

/// Bound-product counts across a template's generations, in version order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUsage {
    pub template_id: String,
    pub generations: Vec<GenerationUsage>,
}

impl TemplateUsage {
    /// Sum of all counts, or `None` if any count is unknown.
    pub fn total_bound(&self) -> Option<i64> {
        self.generations.iter().map(|g| g.count).sum()
    }
}

pub struct ReferenceGuard {
    registry: Arc<dyn ProductRegistryTrait>,
    timeout: Duration,
}

impl ReferenceGuard {
    pub fn new(registry: Arc<dyn ProductRegistryTrait>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Number of products bound to the generation.
    ///
    /// Registry failures and timeouts come back as `CollaboratorUnavailable`.
    pub async fn count_bound_products(&self, generation_id: &str) -> Result<i64> {
        match tokio::time::timeout(self.timeout, self.registry.count_by_generation(generation_id))
            .await
        {
            Ok(Ok(count)) => Ok(count),
            Ok(Err(Error::CollaboratorUnavailable { reason, .. })) => {
                Err(Error::unavailable(Collaborator::ProductRegistry, reason))
            }
            Ok(Err(e)) => Err(Error::unavailable(
                Collaborator::ProductRegistry,
                e.to_string(),
            )),
            Err(_) => Err(Error::unavailable(
                Collaborator::ProductRegistry,
                format!(
                    "count for generation '{}' timed out after {:?}",
                    generation_id, self.timeout
                ),
            )),
        }
    }

    /// Products bound to the generation, with the same timeout as counting.
    pub async fn list_bound_products(&self, generation_id: &str) -> Result<Vec<BoundProduct>> {
        match tokio::time::timeout(self.timeout, self.registry.list_by_generation(generation_id))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::unavailable(
                Collaborator::ProductRegistry,
                format!(
                    "listing for generation '{}' timed out after {:?}",
                    generation_id, self.timeout
                ),
            )),
        }
    }

    /// True only when the registry positively reports zero bound products.
    pub async fn is_deletable(&self, generation_id: &str) -> bool {
        matches!(self.count_bound_products(generation_id).await, Ok(0))
    }

    /// Fails with `ReferencedError` unless the generation is provably unreferenced.
    pub async fn ensure_unreferenced(&self, generation_id: &str) -> Result<()> {
        match self.count_bound_products(generation_id).await {
            Ok(0) => Ok(()),
            Ok(count) => Err(ReferencedError::BoundProducts {
                generation_id: generation_id.to_string(),
                count,
            }
            .into()),
            Err(e) => {
                warn!(
                    "Blocking operation on generation {}: reference check failed: {}",
                    generation_id, e
                );
                Err(ReferencedError::RegistryUnavailable {
                    generation_id: generation_id.to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    /// Counts for every generation of a template, looked up concurrently.
    pub async fn template_usage(
        &self,
        template_id: &str,
        generations: &[Generation],
    ) -> TemplateUsage {
        let counts = join_all(
            generations
                .iter()
                .map(|g| self.count_bound_products(&g.id)),
        )
        .await;

        let generations = generations
            .iter()
            .zip(counts)
            .map(|(generation, count)| GenerationUsage {
                generation_id: generation.id.clone(),
                count: count.ok(),
            })
            .collect();

        TemplateUsage {
            template_id: template_id.to_string(),
            generations,
        }
    }
}
