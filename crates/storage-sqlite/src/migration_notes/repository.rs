use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use modelfolio_core::migration::{MigrationNote, MigrationNoteStoreTrait};
use modelfolio_core::Result;

use super::model::MigrationNoteDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::migration_notes;

pub struct MigrationNoteRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl MigrationNoteRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        MigrationNoteRepository { pool, writer }
    }
}

#[async_trait]
impl MigrationNoteStoreTrait for MigrationNoteRepository {
    fn get_note(&self, template_id: &str, product_id: &str) -> Result<Option<MigrationNote>> {
        let mut conn = get_connection(&self.pool)?;
        let row = migration_notes::table
            .find((template_id, product_id))
            .select(MigrationNoteDB::as_select())
            .first::<MigrationNoteDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(MigrationNote::from))
    }

    fn list_notes(&self, template_id: &str) -> Result<Vec<MigrationNote>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = migration_notes::table
            .filter(migration_notes::template_id.eq(template_id))
            .order(migration_notes::product_id.asc())
            .select(MigrationNoteDB::as_select())
            .load::<MigrationNoteDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(MigrationNote::from).collect())
    }

    async fn upsert_note(
        &self,
        template_id: &str,
        product_id: &str,
        note: String,
    ) -> Result<MigrationNote> {
        let row = MigrationNoteDB {
            template_id: template_id.to_string(),
            product_id: product_id.to_string(),
            note,
            updated_at: Utc::now().naive_utc(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MigrationNote> {
                let saved = diesel::insert_into(migration_notes::table)
                    .values(&row)
                    .on_conflict((migration_notes::template_id, migration_notes::product_id))
                    .do_update()
                    .set((
                        migration_notes::note.eq(&row.note),
                        migration_notes::updated_at.eq(row.updated_at),
                    ))
                    .returning(MigrationNoteDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(MigrationNote::from(saved))
            })
            .await
    }

    async fn delete_note(&self, template_id: &str, product_id: &str) -> Result<usize> {
        let template_id = template_id.to_string();
        let product_id = product_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(migration_notes::table.find((template_id, product_id)))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await
    }
}
