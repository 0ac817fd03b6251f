//! Traits for template repository and service.

use async_trait::async_trait;

use crate::errors::Result;
use crate::lifecycle::ActivationResult;
use crate::risk::RiskAssessment;

use super::{
    Allocation, Generation, GenerationDetailsUpdate, NewGeneration, NewGenerationRecord,
    NewTemplate, Template, TemplateOverview,
};

/// Repository trait for template and generation persistence.
///
/// Each async method is a single atomic unit of work: it either applies
/// completely or not at all.
#[async_trait]
pub trait TemplateRepositoryTrait: Send + Sync {
    // Template operations
    fn get_templates(&self) -> Result<Vec<Template>>;
    fn get_template(&self, id: &str) -> Result<Option<Template>>;
    async fn create_template(&self, template: NewTemplate) -> Result<Template>;
    async fn rename_template(&self, id: &str, name: String) -> Result<Template>;
    /// Removes the template together with its generations and allocations.
    async fn delete_template(&self, id: &str) -> Result<usize>;

    // Generation operations
    /// Generations of a template ordered by sequence.
    fn get_generations(&self, template_id: &str) -> Result<Vec<Generation>>;
    fn get_generation(&self, id: &str) -> Result<Option<Generation>>;
    /// Inserts a draft generation with the next sequence number of its template.
    async fn create_generation(&self, record: NewGenerationRecord) -> Result<Generation>;
    async fn update_generation_details(
        &self,
        id: &str,
        update: GenerationDetailsUpdate,
    ) -> Result<Generation>;
    /// Replaces the whole allocation set of a draft generation.
    async fn replace_allocations(
        &self,
        generation_id: &str,
        allocations: Vec<Allocation>,
    ) -> Result<Generation>;
    async fn delete_generation(&self, id: &str) -> Result<usize>;

    // Lifecycle operations
    /// Archives any active sibling and activates the draft target in one transaction.
    async fn activate_generation(&self, generation_id: &str) -> Result<ActivationResult>;
    async fn archive_generation(&self, generation_id: &str) -> Result<Generation>;
}

/// Service trait for template and generation business logic.
#[async_trait]
pub trait TemplateServiceTrait: Send + Sync {
    // Template operations
    fn get_templates(&self) -> Result<Vec<Template>>;
    fn get_template(&self, id: &str) -> Result<Template>;
    async fn create_template(&self, template: NewTemplate) -> Result<Template>;
    async fn rename_template(&self, id: &str, name: String) -> Result<Template>;
    async fn delete_template(&self, id: &str) -> Result<usize>;
    async fn get_template_overview(&self, id: &str) -> Result<TemplateOverview>;

    // Generation operations
    fn get_generations(&self, template_id: &str) -> Result<Vec<Generation>>;
    fn get_generation(&self, id: &str) -> Result<Generation>;
    async fn add_generation(&self, generation: NewGeneration) -> Result<Generation>;
    async fn update_generation_details(
        &self,
        id: &str,
        update: GenerationDetailsUpdate,
    ) -> Result<Generation>;
    async fn update_allocations(
        &self,
        generation_id: &str,
        allocations: Vec<Allocation>,
    ) -> Result<Generation>;
    async fn delete_generation(&self, id: &str) -> Result<usize>;
    async fn assess_generation_risk(&self, generation_id: &str) -> Result<RiskAssessment>;
}
