//! Database models for migration notes.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use modelfolio_core::migration::MigrationNote;

#[derive(
    Queryable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::migration_notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct MigrationNoteDB {
    pub template_id: String,
    pub product_id: String,
    pub note: String,
    pub updated_at: NaiveDateTime,
}

impl From<MigrationNoteDB> for MigrationNote {
    fn from(db: MigrationNoteDB) -> Self {
        Self {
            template_id: db.template_id,
            product_id: db.product_id,
            note: db.note,
            updated_at: db.updated_at,
        }
    }
}
