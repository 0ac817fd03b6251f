//! Migration note storage.
//!
//! Notes are advisory. Nothing in the versioning rules reads them, so the
//! store is an injected dependency rather than part of the authoritative data.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::errors::Result;

use super::MigrationNote;

/// Key-value store for migration notes keyed by `(template_id, product_id)`.
#[async_trait]
pub trait MigrationNoteStoreTrait: Send + Sync {
    fn get_note(&self, template_id: &str, product_id: &str) -> Result<Option<MigrationNote>>;
    fn list_notes(&self, template_id: &str) -> Result<Vec<MigrationNote>>;
    async fn upsert_note(
        &self,
        template_id: &str,
        product_id: &str,
        note: String,
    ) -> Result<MigrationNote>;
    async fn delete_note(&self, template_id: &str, product_id: &str) -> Result<usize>;
}

/// Process-local note store.
///
/// Not durable and not shared between processes: notes are lost on restart.
/// Use the SQLite-backed store when notes must survive.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: DashMap<(String, String), MigrationNote>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MigrationNoteStoreTrait for InMemoryNoteStore {
    fn get_note(&self, template_id: &str, product_id: &str) -> Result<Option<MigrationNote>> {
        Ok(self
            .notes
            .get(&(template_id.to_string(), product_id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn list_notes(&self, template_id: &str) -> Result<Vec<MigrationNote>> {
        let mut notes: Vec<MigrationNote> = self
            .notes
            .iter()
            .filter(|entry| entry.key().0 == template_id)
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(notes)
    }

    async fn upsert_note(
        &self,
        template_id: &str,
        product_id: &str,
        note: String,
    ) -> Result<MigrationNote> {
        let record = MigrationNote {
            template_id: template_id.to_string(),
            product_id: product_id.to_string(),
            note,
            updated_at: Utc::now().naive_utc(),
        };
        self.notes.insert(
            (template_id.to_string(), product_id.to_string()),
            record.clone(),
        );
        Ok(record)
    }

    async fn delete_note(&self, template_id: &str, product_id: &str) -> Result<usize> {
        Ok(self
            .notes
            .remove(&(template_id.to_string(), product_id.to_string()))
            .map_or(0, |_| 1))
    }
}
