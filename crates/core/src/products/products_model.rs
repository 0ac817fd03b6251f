//! Product registry domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
        }
    }

    /// Parses the database representation. Unknown values are treated as inactive.
    pub fn from_db_str(value: &str) -> Self {
        match value {
            "ACTIVE" => ProductStatus::Active,
            _ => ProductStatus::Inactive,
        }
    }
}

/// A client product bound to a specific generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundProduct {
    pub id: String,
    pub name: String,
    pub client_name: Option<String>,
    pub generation_id: String,
    pub status: ProductStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}
