//! Fund catalog domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a fund in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundStatus {
    #[default]
    Active,
    Inactive,
}

impl FundStatus {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            FundStatus::Active => "ACTIVE",
            FundStatus::Inactive => "INACTIVE",
        }
    }

    /// Parses the database representation. Unknown values are treated as inactive.
    pub fn from_db_str(value: &str) -> Self {
        match value {
            "ACTIVE" => FundStatus::Active,
            _ => FundStatus::Inactive,
        }
    }
}

/// A fund as resolved by the Fund Catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub isin: Option<String>,
    /// Risk on the 1-7 scale. `None` when the catalog has no rating.
    pub risk_factor: Option<i32>,
    /// Ongoing charge, in percent
    pub cost: Option<Decimal>,
    pub status: FundStatus,
}
