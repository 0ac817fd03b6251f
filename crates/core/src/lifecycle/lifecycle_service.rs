use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::errors::{NotFoundError, Result};
use crate::references::ReferenceGuard;
use crate::templates::{Generation, TemplateLocks, TemplateRepositoryTrait};

use super::lifecycle_model::{ActivationResult, GenerationStatus};
use super::lifecycle_traits::LifecycleServiceTrait;

/// Service enforcing the generation state machine.
pub struct LifecycleService {
    repository: Arc<dyn TemplateRepositoryTrait>,
    reference_guard: Arc<ReferenceGuard>,
    locks: Arc<TemplateLocks>,
}

impl LifecycleService {
    pub fn new(
        repository: Arc<dyn TemplateRepositoryTrait>,
        reference_guard: Arc<ReferenceGuard>,
        locks: Arc<TemplateLocks>,
    ) -> Self {
        Self {
            repository,
            reference_guard,
            locks,
        }
    }

    fn load_generation(&self, generation_id: &str) -> Result<Generation> {
        self.repository
            .get_generation(generation_id)?
            .ok_or_else(|| NotFoundError::Generation(generation_id.to_string()).into())
    }
}

#[async_trait]
impl LifecycleServiceTrait for LifecycleService {
    async fn activate(&self, generation_id: &str) -> Result<ActivationResult> {
        let template_id = self.load_generation(generation_id)?.template_id;
        let _guard = self.locks.acquire(&template_id).await;

        // Re-read under the lock; a concurrent activation may have won.
        let generation = self.load_generation(generation_id)?;
        generation.status.ensure_transition(GenerationStatus::Active)?;

        let result = self.repository.activate_generation(generation_id).await?;
        match &result.archived {
            Some(previous) => info!(
                "Activated generation {} of template {}, archived {}",
                result.activated.id, template_id, previous.id
            ),
            None => info!(
                "Activated generation {} of template {}",
                result.activated.id, template_id
            ),
        }
        Ok(result)
    }

    async fn archive(&self, generation_id: &str) -> Result<Generation> {
        let template_id = self.load_generation(generation_id)?.template_id;
        let _guard = self.locks.acquire(&template_id).await;

        let generation = self.load_generation(generation_id)?;
        generation
            .status
            .ensure_transition(GenerationStatus::Archived)?;
        // Products bound to the active generation need it as a migration source;
        // superseding through `activate` does not come through here.
        if generation.status == GenerationStatus::Active {
            self.reference_guard
                .ensure_unreferenced(generation_id)
                .await?;
            debug!(
                "Archiving active generation {}; template {} will have no active generation",
                generation_id, template_id
            );
        }

        let archived = self.repository.archive_generation(generation_id).await?;
        info!("Archived generation {} of template {}", archived.id, template_id);
        Ok(archived)
    }

    fn get_active_generation(&self, template_id: &str) -> Result<Option<Generation>> {
        if self.repository.get_template(template_id)?.is_none() {
            return Err(NotFoundError::Template(template_id.to_string()).into());
        }
        Ok(self
            .repository
            .get_generations(template_id)?
            .into_iter()
            .find(|g| g.status == GenerationStatus::Active))
    }
}
