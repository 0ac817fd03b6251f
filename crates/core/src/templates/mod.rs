//! Templates module - templates, their generations and allocation sets.

mod template_locks;
mod templates_model;
mod templates_service;
mod templates_traits;


pub use template_locks::TemplateLocks;
pub use templates_model::{
    validate_allocations, Allocation, AllocationSummary, Generation, GenerationDetailsUpdate,
    GenerationOverview, NewGeneration, NewGenerationRecord, NewTemplate, Template,
    TemplateOverview,
};
pub use templates_service::TemplateService;
pub use templates_traits::{TemplateRepositoryTrait, TemplateServiceTrait};
