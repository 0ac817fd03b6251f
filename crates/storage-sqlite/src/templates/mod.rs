//! SQLite storage implementation for templates, generations and allocations.

mod model;
mod repository;

pub use model::{AllocationDB, GenerationDB, TemplateDB};
pub use repository::TemplateRepository;
