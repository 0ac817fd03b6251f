//! Lifecycle module - generation status transitions and the single-active rule.

mod lifecycle_model;
mod lifecycle_service;
mod lifecycle_traits;


pub use lifecycle_model::{ActivationResult, GenerationStatus};
pub use lifecycle_service::LifecycleService;
pub use lifecycle_traits::LifecycleServiceTrait;
