//! Database models for funds.

use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use modelfolio_core::funds::{Fund, FundStatus};

use crate::errors::StorageError;

/// Database model for catalog funds
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
#[diesel(table_name = crate::schema::funds)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct FundDB {
    pub id: String,
    pub name: String,
    pub isin: Option<String>,
    pub risk_factor: Option<i32>,
    /// Decimal as text
    pub cost: Option<String>,
    pub status: String,
}

impl TryFrom<FundDB> for Fund {
    type Error = StorageError;

    fn try_from(db: FundDB) -> Result<Self, Self::Error> {
        let cost = db
            .cost
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|e| {
                StorageError::SerializationError(format!("cost of fund '{}': {}", db.id, e))
            })?;
        Ok(Self {
            status: FundStatus::from_db_str(&db.status),
            id: db.id,
            name: db.name,
            isin: db.isin,
            risk_factor: db.risk_factor,
            cost,
        })
    }
}
