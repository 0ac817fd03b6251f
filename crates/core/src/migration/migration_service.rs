use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::config::VersioningConfig;
use crate::errors::{Collaborator, Error, NotFoundError, Result, ValidationError};
use crate::lifecycle::GenerationStatus;
use crate::products::{BoundProduct, ProductRegistryTrait};
use crate::references::ReferenceGuard;
use crate::templates::{Generation, TemplateLocks, TemplateRepositoryTrait};

use super::migration_model::{
    classify_priority, ChecklistEntry, ChecklistSummary, MigrationChecklist, MigrationNote,
    PriorityThresholds, ProductMigrationItem,
};
use super::migration_notes::MigrationNoteStoreTrait;
use super::migration_traits::MigrationServiceTrait;

pub struct MigrationService {
    repository: Arc<dyn TemplateRepositoryTrait>,
    registry: Arc<dyn ProductRegistryTrait>,
    reference_guard: Arc<ReferenceGuard>,
    note_store: Arc<dyn MigrationNoteStoreTrait>,
    locks: Arc<TemplateLocks>,
    config: VersioningConfig,
}

impl MigrationService {
    pub fn new(
        repository: Arc<dyn TemplateRepositoryTrait>,
        registry: Arc<dyn ProductRegistryTrait>,
        reference_guard: Arc<ReferenceGuard>,
        note_store: Arc<dyn MigrationNoteStoreTrait>,
        locks: Arc<TemplateLocks>,
        config: VersioningConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            reference_guard,
            note_store,
            locks,
            config,
        }
    }

    fn require_template(&self, template_id: &str) -> Result<()> {
        match self.repository.get_template(template_id)? {
            Some(_) => Ok(()),
            None => Err(NotFoundError::Template(template_id.to_string()).into()),
        }
    }

    fn require_template_generations(&self, template_id: &str) -> Result<Vec<Generation>> {
        self.require_template(template_id)?;
        self.repository.get_generations(template_id)
    }

    fn build_entry(
        &self,
        generation: Generation,
        lookup: Result<Vec<BoundProduct>>,
        today: NaiveDate,
    ) -> ChecklistEntry {
        let display_name = generation.display_name(&self.config.generation_label_prefix);
        let thresholds = PriorityThresholds::from(&self.config);

        match lookup {
            Ok(products) => {
                let mut items: Vec<ProductMigrationItem> = products
                    .into_iter()
                    .map(|product| ProductMigrationItem {
                        priority: classify_priority(
                            product.status,
                            product.start_date,
                            product.end_date,
                            today,
                            thresholds,
                        ),
                        days_since_start: (today - product.start_date).num_days(),
                        product,
                    })
                    .collect();
                items.sort_by(|a, b| {
                    b.priority
                        .cmp(&a.priority)
                        .then_with(|| a.product.start_date.cmp(&b.product.start_date))
                        .then_with(|| a.product.id.cmp(&b.product.id))
                });
                ChecklistEntry {
                    generation,
                    display_name,
                    bound_products: items,
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    "Checklist lookup failed for generation {}: {}",
                    generation.id, e
                );
                ChecklistEntry {
                    generation,
                    display_name,
                    bound_products: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl MigrationServiceTrait for MigrationService {
    async fn build_checklist(&self, template_id: &str) -> Result<MigrationChecklist> {
        self.build_checklist_as_of(template_id, Utc::now().date_naive())
            .await
    }

    async fn build_checklist_as_of(
        &self,
        template_id: &str,
        today: NaiveDate,
    ) -> Result<MigrationChecklist> {
        let candidates: Vec<Generation> = self
            .require_template_generations(template_id)?
            .into_iter()
            .filter(|g| !g.status.is_current())
            .collect();
        debug!(
            "Building migration checklist for template {} over {} generation(s)",
            template_id,
            candidates.len()
        );

        // `buffered` yields in input order, so entries stay in version order
        // however the lookups complete.
        let lookups: Vec<(Generation, Result<Vec<BoundProduct>>)> = stream::iter(candidates)
            .map(|generation| async move {
                let lookup = self
                    .reference_guard
                    .list_bound_products(&generation.id)
                    .await;
                (generation, lookup)
            })
            .buffered(self.config.checklist_concurrency.max(1))
            .collect()
            .await;

        let entries: Vec<ChecklistEntry> = lookups
            .into_iter()
            .map(|(generation, lookup)| self.build_entry(generation, lookup, today))
            .collect();
        let summary = ChecklistSummary::from_entries(&entries);

        Ok(MigrationChecklist {
            template_id: template_id.to_string(),
            as_of: today,
            entries,
            summary,
        })
    }

    async fn migrate_product(
        &self,
        template_id: &str,
        product_id: &str,
        from_generation_id: &str,
    ) -> Result<BoundProduct> {
        let _guard = self.locks.acquire(template_id).await;
        let generations = self.require_template_generations(template_id)?;

        let source = generations
            .iter()
            .find(|g| g.id == from_generation_id)
            .ok_or_else(|| NotFoundError::Generation(from_generation_id.to_string()))?;
        if source.status == GenerationStatus::Active {
            return Err(ValidationError::InvalidInput(format!(
                "Generation {} is already the active generation",
                from_generation_id
            ))
            .into());
        }
        let target = generations
            .iter()
            .find(|g| g.status == GenerationStatus::Active)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "Template {} has no active generation to migrate to",
                    template_id
                ))
            })?;

        let bound = self
            .reference_guard
            .list_bound_products(from_generation_id)
            .await?;
        if !bound.iter().any(|p| p.id == product_id) {
            return Err(NotFoundError::Product(product_id.to_string()).into());
        }

        let timeout = self.config.collaborator_timeout();
        let migrated = tokio::time::timeout(timeout, self.registry.rebind(product_id, &target.id))
            .await
            .map_err(|_| {
                Error::unavailable(
                    Collaborator::ProductRegistry,
                    format!("rebinding product '{}' timed out", product_id),
                )
            })??;

        info!(
            "Migrated product {} of template {} from generation {} to {}",
            product_id, template_id, from_generation_id, target.id
        );
        Ok(migrated)
    }

    fn get_note(&self, template_id: &str, product_id: &str) -> Result<Option<MigrationNote>> {
        self.note_store.get_note(template_id, product_id)
    }

    fn get_notes(&self, template_id: &str) -> Result<Vec<MigrationNote>> {
        self.note_store.list_notes(template_id)
    }

    async fn set_note(
        &self,
        template_id: &str,
        product_id: &str,
        note: &str,
    ) -> Result<Option<MigrationNote>> {
        if product_id.trim().is_empty() {
            return Err(ValidationError::MissingField("productId".to_string()).into());
        }
        self.require_template(template_id)?;
        let note = note.trim();
        if note.is_empty() {
            self.note_store.delete_note(template_id, product_id).await?;
            return Ok(None);
        }
        let saved = self
            .note_store
            .upsert_note(template_id, product_id, note.to_string())
            .await?;
        Ok(Some(saved))
    }
}
