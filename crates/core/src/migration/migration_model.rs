//! Migration tracking domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::VersioningConfig;
use crate::products::{BoundProduct, ProductStatus};
use crate::templates::Generation;

/// How urgently a product pinned to an old generation should be migrated.
///
/// Ordered from lowest to highest: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationPriority {
    Low,
    Medium,
    High,
}

impl MigrationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationPriority::Low => "LOW",
            MigrationPriority::Medium => "MEDIUM",
            MigrationPriority::High => "HIGH",
        }
    }
}

/// Age thresholds, in days since the product started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityThresholds {
    /// Strictly older than this is high priority
    pub high_after_days: i64,
    /// At least this old (and not high) is medium priority
    pub medium_after_days: i64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high_after_days: 365,
            medium_after_days: 180,
        }
    }
}

impl From<&VersioningConfig> for PriorityThresholds {
    fn from(config: &VersioningConfig) -> Self {
        Self {
            high_after_days: config.high_priority_after_days,
            medium_after_days: config.medium_priority_after_days,
        }
    }
}

/// Classifies a bound product. Pure function of its attributes and `today`.
///
/// Inactive or already ended products are low priority. Otherwise the
/// priority grows with the time since the product started.
pub fn classify_priority(
    status: ProductStatus,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
    thresholds: PriorityThresholds,
) -> MigrationPriority {
    if status == ProductStatus::Inactive {
        return MigrationPriority::Low;
    }
    if matches!(end_date, Some(end) if end < today) {
        return MigrationPriority::Low;
    }

    let age_days = (today - start_date).num_days();
    if age_days > thresholds.high_after_days {
        MigrationPriority::High
    } else if age_days >= thresholds.medium_after_days {
        MigrationPriority::Medium
    } else {
        MigrationPriority::Low
    }
}

/// A product still bound to a non-current generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductMigrationItem {
    pub product: BoundProduct,
    pub priority: MigrationPriority,
    pub days_since_start: i64,
}

/// One non-current generation and the products still bound to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub generation: Generation,
    pub display_name: String,
    pub bound_products: Vec<ProductMigrationItem>,
    /// Set when the product lookup for this generation failed. The product
    /// list is then empty but not known to be empty.
    pub error: Option<String>,
}

impl ChecklistEntry {
    pub fn has_outstanding_products(&self) -> bool {
        !self.bound_products.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    pub total_products: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub failed_generations: usize,
}

impl ChecklistSummary {
    pub fn from_entries(entries: &[ChecklistEntry]) -> Self {
        let mut summary = ChecklistSummary::default();
        for entry in entries {
            if entry.error.is_some() {
                summary.failed_generations += 1;
            }
            for item in &entry.bound_products {
                summary.total_products += 1;
                match item.priority {
                    MigrationPriority::High => summary.high += 1,
                    MigrationPriority::Medium => summary.medium += 1,
                    MigrationPriority::Low => summary.low += 1,
                }
            }
        }
        summary
    }

    /// True when every generation lookup succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed_generations == 0
    }
}

/// Products of a template that are still pinned to non-current generations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationChecklist {
    pub template_id: String,
    pub as_of: NaiveDate,
    /// In generation version order.
    pub entries: Vec<ChecklistEntry>,
    pub summary: ChecklistSummary,
}

/// Advisory operator note about one product's migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationNote {
    pub template_id: String,
    pub product_id: String,
    pub note: String,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;

    fn today() -> NaiveDate {
        date(2025, 6, 30)
    }

    fn classify(
        status: ProductStatus,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> MigrationPriority {
        classify_priority(status, start, end, today(), PriorityThresholds::default())
    }

    #[test]
    fn test_inactive_is_low_regardless_of_age() {
        assert_eq!(
            classify(ProductStatus::Inactive, date(2019, 1, 1), None),
            MigrationPriority::Low
        );
    }

    #[test]
    fn test_ended_product_is_low() {
        assert_eq!(
            classify(
                ProductStatus::Active,
                date(2020, 1, 1),
                Some(date(2025, 6, 29))
            ),
            MigrationPriority::Low
        );
        // Ending today is not in the past
        assert_eq!(
            classify(ProductStatus::Active, date(2020, 1, 1), Some(today())),
            MigrationPriority::High
        );
    }

    #[test]
    fn test_age_boundaries() {
        let days_ago = |n: i64| today() - chrono::Duration::days(n);

        assert_eq!(classify(ProductStatus::Active, days_ago(366), None), MigrationPriority::High);
        assert_eq!(classify(ProductStatus::Active, days_ago(365), None), MigrationPriority::Medium);
        assert_eq!(classify(ProductStatus::Active, days_ago(180), None), MigrationPriority::Medium);
        assert_eq!(classify(ProductStatus::Active, days_ago(179), None), MigrationPriority::Low);
        assert_eq!(classify(ProductStatus::Active, days_ago(0), None), MigrationPriority::Low);
    }

    #[test]
    fn test_future_start_is_low() {
        assert_eq!(
            classify(ProductStatus::Active, date(2025, 9, 1), None),
            MigrationPriority::Low
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = PriorityThresholds {
            high_after_days: 30,
            medium_after_days: 10,
        };
        let priority = classify_priority(
            ProductStatus::Active,
            date(2025, 6, 10),
            None,
            today(),
            thresholds,
        );
        assert_eq!(priority, MigrationPriority::Medium);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(MigrationPriority::High > MigrationPriority::Medium);
        assert!(MigrationPriority::Medium > MigrationPriority::Low);
    }
}
