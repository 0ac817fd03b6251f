use crate::errors::Result;
use crate::lifecycle::ActivationResult;
use crate::templates::Generation;
use async_trait::async_trait;

/// Trait for generation lifecycle operations
#[async_trait]
pub trait LifecycleServiceTrait: Send + Sync {
    /// Makes a draft generation the template's active one, archiving the
    /// previous active generation in the same transaction.
    async fn activate(&self, generation_id: &str) -> Result<ActivationResult>;

    /// Administrative archive of a draft or active generation.
    async fn archive(&self, generation_id: &str) -> Result<Generation>;

    /// The template's active generation, if any.
    fn get_active_generation(&self, template_id: &str) -> Result<Option<Generation>>;
}
