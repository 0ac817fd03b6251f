//! Migration module - which products are still pinned to non-current
//! generations, how urgent each one is, and operator notes about them.

mod migration_model;
mod migration_notes;
mod migration_service;
mod migration_traits;


pub use migration_model::{
    classify_priority, ChecklistEntry, ChecklistSummary, MigrationChecklist, MigrationNote,
    MigrationPriority, PriorityThresholds, ProductMigrationItem,
};
pub use migration_notes::{InMemoryNoteStore, MigrationNoteStoreTrait};
pub use migration_service::MigrationService;
pub use migration_traits::MigrationServiceTrait;
