//! Database models for templates.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use modelfolio_core::constants::WEIGHTING_SCALE;
use modelfolio_core::errors::{Result, ValidationError};
use modelfolio_core::lifecycle::GenerationStatus;
use modelfolio_core::templates::{Allocation, Generation, Template};

/// Database model for templates
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct TemplateDB {
    pub id: String,
    pub name: String,
    /// Next sequence handed to a new generation. Only ever grows.
    pub next_generation_sequence: i32,
    pub created_at: NaiveDateTime,
}

/// Database model for template generations
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(TemplateDB, foreign_key = template_id))]
#[diesel(table_name = crate::schema::template_generations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct GenerationDB {
    pub id: String,
    pub template_id: String,
    pub sequence: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for one allocation row. Weightings are stored as integer
/// basis points of a percent (hundredths), so 33.25% is 3325.
#[derive(
    Queryable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(GenerationDB, foreign_key = generation_id))]
#[diesel(table_name = crate::schema::generation_allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AllocationDB {
    pub generation_id: String,
    pub fund_id: String,
    pub target_weighting_bp: i64,
    pub position: i32,
}

impl From<TemplateDB> for Template {
    fn from(db: TemplateDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
        }
    }
}

impl AllocationDB {
    pub fn from_domain(generation_id: &str, position: usize, allocation: &Allocation) -> Result<Self> {
        let target_weighting_bp = allocation
            .target_weighting
            .checked_mul(Decimal::from(10_i64.pow(WEIGHTING_SCALE)))
            .filter(|scaled| scaled.fract().is_zero())
            .and_then(|scaled| scaled.to_i64())
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "Weighting {} of fund '{}' cannot be stored",
                    allocation.target_weighting, allocation.fund_id
                ))
            })?;
        Ok(Self {
            generation_id: generation_id.to_string(),
            fund_id: allocation.fund_id.clone(),
            target_weighting_bp,
            position: position as i32,
        })
    }
}

impl From<AllocationDB> for Allocation {
    fn from(db: AllocationDB) -> Self {
        Allocation::new(
            db.fund_id,
            Decimal::new(db.target_weighting_bp, WEIGHTING_SCALE).normalize(),
        )
    }
}

impl GenerationDB {
    /// Builds the domain generation from its row and its allocation rows,
    /// which must already be in position order.
    pub fn into_domain(self, allocations: Vec<AllocationDB>) -> Result<Generation> {
        Ok(Generation {
            status: GenerationStatus::from_db_str(&self.status)?,
            id: self.id,
            template_id: self.template_id,
            sequence: self.sequence,
            name: self.name,
            description: self.description,
            allocations: allocations.into_iter().map(Allocation::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_weighting_stored_as_basis_points() {
        let row = AllocationDB::from_domain("gen-1", 0, &Allocation::new("F", dec!(33.25))).unwrap();
        assert_eq!(row.target_weighting_bp, 3325);

        let back = Allocation::from(row);
        assert_eq!(back.target_weighting, dec!(33.25));
    }

    #[test]
    fn test_finer_weighting_is_rejected() {
        let result = AllocationDB::from_domain("gen-1", 0, &Allocation::new("F", dec!(0.125)));
        assert!(result.is_err());
    }

    #[test]
    fn test_weighting_beyond_storage_range_is_rejected() {
        for weighting in [Decimal::MAX, Decimal::MIN, dec!(100000000000000000)] {
            let result = AllocationDB::from_domain("gen-1", 0, &Allocation::new("F", weighting));
            assert!(result.is_err(), "{} should not be storable", weighting);
        }
    }
}
