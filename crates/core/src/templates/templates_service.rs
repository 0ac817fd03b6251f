//! Template and generation service implementation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info};

use crate::config::VersioningConfig;
use crate::errors::{NotFoundError, Result, ValidationError};
use crate::lifecycle::GenerationStatus;
use crate::references::ReferenceGuard;
use crate::risk::{RiskAggregator, RiskAssessment};

use super::{
    validate_allocations, Allocation, Generation, GenerationDetailsUpdate, GenerationOverview,
    NewGeneration, NewGenerationRecord, NewTemplate, Template, TemplateLocks, TemplateOverview,
    TemplateRepositoryTrait, TemplateServiceTrait,
};

pub struct TemplateService {
    repository: Arc<dyn TemplateRepositoryTrait>,
    risk_aggregator: Arc<RiskAggregator>,
    reference_guard: Arc<ReferenceGuard>,
    locks: Arc<TemplateLocks>,
    config: VersioningConfig,
}

impl TemplateService {
    pub fn new(
        repository: Arc<dyn TemplateRepositoryTrait>,
        risk_aggregator: Arc<RiskAggregator>,
        reference_guard: Arc<ReferenceGuard>,
        locks: Arc<TemplateLocks>,
        config: VersioningConfig,
    ) -> Self {
        Self {
            repository,
            risk_aggregator,
            reference_guard,
            locks,
            config,
        }
    }

    fn normalize_template_name(&self, name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.config.default_template_name.clone()
        } else {
            trimmed.to_string()
        }
    }

    fn require_template(&self, id: &str) -> Result<Template> {
        self.repository
            .get_template(id)?
            .ok_or_else(|| NotFoundError::Template(id.to_string()).into())
    }

    fn require_generation(&self, id: &str) -> Result<Generation> {
        self.repository
            .get_generation(id)?
            .ok_or_else(|| NotFoundError::Generation(id.to_string()).into())
    }

    async fn overview_for(&self, generation: Generation) -> GenerationOverview {
        let (risk, count) = futures::join!(
            self.risk_aggregator.assess(&generation.allocations),
            self.reference_guard.count_bound_products(&generation.id)
        );
        GenerationOverview {
            display_name: generation.display_name(&self.config.generation_label_prefix),
            allocation_summary: generation.allocation_summary(),
            risk,
            bound_products: count.ok(),
            generation,
        }
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl TemplateServiceTrait for TemplateService {
    fn get_templates(&self) -> Result<Vec<Template>> {
        self.repository.get_templates()
    }

    fn get_template(&self, id: &str) -> Result<Template> {
        self.require_template(id)
    }

    async fn create_template(&self, template: NewTemplate) -> Result<Template> {
        let template = NewTemplate {
            name: self.normalize_template_name(&template.name),
            ..template
        };
        let created = self.repository.create_template(template).await?;
        info!("Created template {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn rename_template(&self, id: &str, name: String) -> Result<Template> {
        let _guard = self.locks.acquire(id).await;
        self.require_template(id)?;
        self.repository
            .rename_template(id, self.normalize_template_name(&name))
            .await
    }

    async fn delete_template(&self, id: &str) -> Result<usize> {
        let _guard = self.locks.acquire(id).await;
        self.require_template(id)?;

        // Every generation, whatever its status, must be provably unreferenced.
        let generations = self.repository.get_generations(id)?;
        for generation in &generations {
            self.reference_guard.ensure_unreferenced(&generation.id).await?;
        }

        let deleted = self.repository.delete_template(id).await?;
        info!(
            "Deleted template {} with {} generation(s)",
            id,
            generations.len()
        );
        Ok(deleted)
    }

    async fn get_template_overview(&self, id: &str) -> Result<TemplateOverview> {
        let template = self.require_template(id)?;
        let generations = self.repository.get_generations(id)?;
        let active_generation_id = generations
            .iter()
            .find(|g| g.status == GenerationStatus::Active)
            .map(|g| g.id.clone());

        let generations = join_all(generations.into_iter().map(|g| self.overview_for(g))).await;

        Ok(TemplateOverview {
            template,
            active_generation_id,
            generations,
        })
    }

    fn get_generations(&self, template_id: &str) -> Result<Vec<Generation>> {
        self.require_template(template_id)?;
        self.repository.get_generations(template_id)
    }

    fn get_generation(&self, id: &str) -> Result<Generation> {
        self.require_generation(id)
    }

    async fn add_generation(&self, generation: NewGeneration) -> Result<Generation> {
        let _guard = self.locks.acquire(&generation.template_id).await;
        self.require_template(&generation.template_id)?;

        let allocations = match generation.copy_from_generation_id.as_deref() {
            Some(source_id) => {
                let source = self.require_generation(source_id)?;
                if source.template_id != generation.template_id {
                    return Err(ValidationError::InvalidInput(format!(
                        "Generation {} belongs to another template",
                        source_id
                    ))
                    .into());
                }
                debug!(
                    "Copying {} allocation(s) from generation {}",
                    source.allocations.len(),
                    source_id
                );
                source.allocations
            }
            None => Vec::new(),
        };

        let created = self
            .repository
            .create_generation(NewGenerationRecord {
                template_id: generation.template_id,
                name: clean_optional(generation.name),
                description: clean_optional(generation.description),
                allocations,
            })
            .await?;
        info!(
            "Added generation {} (#{}) to template {}",
            created.id, created.sequence, created.template_id
        );
        Ok(created)
    }

    async fn update_generation_details(
        &self,
        id: &str,
        update: GenerationDetailsUpdate,
    ) -> Result<Generation> {
        let template_id = self.require_generation(id)?.template_id;
        let _guard = self.locks.acquire(&template_id).await;
        self.require_generation(id)?;

        self.repository
            .update_generation_details(
                id,
                GenerationDetailsUpdate {
                    name: clean_optional(update.name),
                    description: clean_optional(update.description),
                },
            )
            .await
    }

    async fn update_allocations(
        &self,
        generation_id: &str,
        allocations: Vec<Allocation>,
    ) -> Result<Generation> {
        validate_allocations(&allocations)?;
        let allocations: Vec<Allocation> = allocations
            .into_iter()
            .map(|a| Allocation::new(a.fund_id.trim(), a.target_weighting.normalize()))
            .collect();

        let template_id = self.require_generation(generation_id)?.template_id;
        let _guard = self.locks.acquire(&template_id).await;

        // Content of a generation is frozen once it leaves draft.
        let generation = self.require_generation(generation_id)?;
        if generation.status != GenerationStatus::Draft {
            return Err(ValidationError::AllocationsLocked {
                generation_id: generation_id.to_string(),
                status: generation.status,
            }
            .into());
        }

        self.repository
            .replace_allocations(generation_id, allocations)
            .await
    }

    async fn delete_generation(&self, id: &str) -> Result<usize> {
        let template_id = self.require_generation(id)?.template_id;
        let _guard = self.locks.acquire(&template_id).await;
        self.require_generation(id)?;

        self.reference_guard.ensure_unreferenced(id).await?;

        let deleted = self.repository.delete_generation(id).await?;
        info!("Deleted generation {} of template {}", id, template_id);
        Ok(deleted)
    }

    async fn assess_generation_risk(&self, generation_id: &str) -> Result<RiskAssessment> {
        let generation = self.require_generation(generation_id)?;
        Ok(self.risk_aggregator.assess(&generation.allocations).await)
    }
}
