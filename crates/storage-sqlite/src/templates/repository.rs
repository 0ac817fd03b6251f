use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use uuid::Uuid;

use modelfolio_core::errors::{NotFoundError, Result, ValidationError};
use modelfolio_core::lifecycle::{ActivationResult, GenerationStatus};
use modelfolio_core::templates::{
    Allocation, Generation, GenerationDetailsUpdate, NewGenerationRecord, NewTemplate, Template,
    TemplateRepositoryTrait,
};

use super::model::{AllocationDB, GenerationDB, TemplateDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{generation_allocations, template_generations, templates};

pub struct TemplateRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TemplateRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        TemplateRepository { pool, writer }
    }
}

/// Attaches allocation rows to generation rows, keeping the generation order.
fn with_allocations(
    conn: &mut SqliteConnection,
    rows: Vec<GenerationDB>,
) -> Result<Vec<Generation>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<&str> = rows.iter().map(|g| g.id.as_str()).collect();
    let allocation_rows = generation_allocations::table
        .filter(generation_allocations::generation_id.eq_any(ids))
        .order((
            generation_allocations::generation_id.asc(),
            generation_allocations::position.asc(),
        ))
        .select(AllocationDB::as_select())
        .load::<AllocationDB>(conn)
        .map_err(StorageError::from)?;

    let mut by_generation: HashMap<String, Vec<AllocationDB>> = HashMap::new();
    for row in allocation_rows {
        by_generation
            .entry(row.generation_id.clone())
            .or_default()
            .push(row);
    }

    rows.into_iter()
        .map(|row| {
            let allocations = by_generation.remove(&row.id).unwrap_or_default();
            row.into_domain(allocations)
        })
        .collect()
}

fn find_generation(conn: &mut SqliteConnection, generation_id: &str) -> Result<Option<Generation>> {
    let row = template_generations::table
        .find(generation_id)
        .select(GenerationDB::as_select())
        .first::<GenerationDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    match row {
        Some(row) => Ok(with_allocations(conn, vec![row])?.into_iter().next()),
        None => Ok(None),
    }
}

fn require_generation(conn: &mut SqliteConnection, generation_id: &str) -> Result<Generation> {
    find_generation(conn, generation_id)?
        .ok_or_else(|| NotFoundError::Generation(generation_id.to_string()).into())
}

fn insert_allocations(
    conn: &mut SqliteConnection,
    generation_id: &str,
    allocations: &[Allocation],
) -> Result<()> {
    let rows = allocations
        .iter()
        .enumerate()
        .map(|(position, allocation)| AllocationDB::from_domain(generation_id, position, allocation))
        .collect::<Result<Vec<_>>>()?;
    if !rows.is_empty() {
        diesel::insert_into(generation_allocations::table)
            .values(&rows)
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    Ok(())
}

fn set_status(
    conn: &mut SqliteConnection,
    generation_id: &str,
    status: GenerationStatus,
) -> Result<()> {
    diesel::update(template_generations::table.find(generation_id))
        .set((
            template_generations::status.eq(status.as_db_str()),
            template_generations::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl TemplateRepositoryTrait for TemplateRepository {
    fn get_templates(&self) -> Result<Vec<Template>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = templates::table
            .order((templates::created_at.asc(), templates::name.asc()))
            .select(TemplateDB::as_select())
            .load::<TemplateDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Template::from).collect())
    }

    fn get_template(&self, template_id: &str) -> Result<Option<Template>> {
        let mut conn = get_connection(&self.pool)?;
        let row = templates::table
            .find(template_id)
            .select(TemplateDB::as_select())
            .first::<TemplateDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Template::from))
    }

    async fn create_template(&self, template: NewTemplate) -> Result<Template> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Template> {
                let row = TemplateDB {
                    id: template.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    name: template.name,
                    next_generation_sequence: 1,
                    created_at: Utc::now().naive_utc(),
                };
                let created = diesel::insert_into(templates::table)
                    .values(&row)
                    .returning(TemplateDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Template::from(created))
            })
            .await
    }

    async fn rename_template(&self, template_id: &str, name: String) -> Result<Template> {
        let template_id = template_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Template> {
                let renamed = diesel::update(templates::table.find(&template_id))
                    .set(templates::name.eq(name))
                    .returning(TemplateDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                renamed
                    .map(Template::from)
                    .ok_or_else(|| NotFoundError::Template(template_id).into())
            })
            .await
    }

    async fn delete_template(&self, template_id: &str) -> Result<usize> {
        let template_id = template_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Generations and allocations go with the template via ON DELETE CASCADE.
                Ok(diesel::delete(templates::table.find(template_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_generations(&self, template_id: &str) -> Result<Vec<Generation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = template_generations::table
            .filter(template_generations::template_id.eq(template_id))
            .order(template_generations::sequence.asc())
            .select(GenerationDB::as_select())
            .load::<GenerationDB>(&mut conn)
            .map_err(StorageError::from)?;
        with_allocations(&mut conn, rows)
    }

    fn get_generation(&self, generation_id: &str) -> Result<Option<Generation>> {
        let mut conn = get_connection(&self.pool)?;
        find_generation(&mut conn, generation_id)
    }

    async fn create_generation(&self, record: NewGenerationRecord) -> Result<Generation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Generation> {
                let template = templates::table
                    .find(&record.template_id)
                    .select(TemplateDB::as_select())
                    .first::<TemplateDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| NotFoundError::Template(record.template_id.clone()))?;

                let sequence = template.next_generation_sequence;
                diesel::update(templates::table.find(&template.id))
                    .set(templates::next_generation_sequence.eq(sequence + 1))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let now = Utc::now().naive_utc();
                let row = GenerationDB {
                    id: Uuid::new_v4().to_string(),
                    template_id: template.id,
                    sequence,
                    name: record.name,
                    description: record.description,
                    status: GenerationStatus::Draft.as_db_str().to_string(),
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(template_generations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                insert_allocations(conn, &row.id, &record.allocations)?;
                debug!(
                    "Inserted generation {} with {} allocation(s)",
                    row.id,
                    record.allocations.len()
                );

                require_generation(conn, &row.id)
            })
            .await
    }

    async fn update_generation_details(
        &self,
        generation_id: &str,
        update: GenerationDetailsUpdate,
    ) -> Result<Generation> {
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Generation> {
                let affected = diesel::update(template_generations::table.find(&generation_id))
                    .set((
                        template_generations::name.eq(update.name),
                        template_generations::description.eq(update.description),
                        template_generations::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(NotFoundError::Generation(generation_id).into());
                }
                require_generation(conn, &generation_id)
            })
            .await
    }

    async fn replace_allocations(
        &self,
        generation_id: &str,
        allocations: Vec<Allocation>,
    ) -> Result<Generation> {
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Generation> {
                let current = require_generation(conn, &generation_id)?;
                if current.status != GenerationStatus::Draft {
                    return Err(ValidationError::AllocationsLocked {
                        generation_id,
                        status: current.status,
                    }
                    .into());
                }

                diesel::delete(
                    generation_allocations::table
                        .filter(generation_allocations::generation_id.eq(&generation_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                insert_allocations(conn, &generation_id, &allocations)?;
                diesel::update(template_generations::table.find(&generation_id))
                    .set(template_generations::updated_at.eq(Utc::now().naive_utc()))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                require_generation(conn, &generation_id)
            })
            .await
    }

    async fn delete_generation(&self, generation_id: &str) -> Result<usize> {
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(template_generations::table.find(generation_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn activate_generation(&self, generation_id: &str) -> Result<ActivationResult> {
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ActivationResult> {
                let target = require_generation(conn, &generation_id)?;
                target.status.ensure_transition(GenerationStatus::Active)?;

                let previous_id = template_generations::table
                    .filter(template_generations::template_id.eq(&target.template_id))
                    .filter(template_generations::status.eq(GenerationStatus::Active.as_db_str()))
                    .select(template_generations::id)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                // Archive first so the single-active index never sees two rows.
                if let Some(previous_id) = &previous_id {
                    set_status(conn, previous_id, GenerationStatus::Archived)?;
                }
                set_status(conn, &generation_id, GenerationStatus::Active)?;

                let archived = match previous_id {
                    Some(previous_id) => Some(require_generation(conn, &previous_id)?),
                    None => None,
                };
                Ok(ActivationResult {
                    activated: require_generation(conn, &generation_id)?,
                    archived,
                })
            })
            .await
    }

    async fn archive_generation(&self, generation_id: &str) -> Result<Generation> {
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Generation> {
                let current = require_generation(conn, &generation_id)?;
                current.status.ensure_transition(GenerationStatus::Archived)?;
                set_status(conn, &generation_id, GenerationStatus::Archived)?;
                require_generation(conn, &generation_id)
            })
            .await
    }
}
