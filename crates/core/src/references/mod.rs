//! References module - bound-product counts that gate destructive operations.

mod reference_guard;

pub use reference_guard::{GenerationUsage, ReferenceGuard, TemplateUsage};
