//! Durable store for migration notes.

mod model;
mod repository;

pub use model::MigrationNoteDB;
pub use repository::MigrationNoteRepository;
