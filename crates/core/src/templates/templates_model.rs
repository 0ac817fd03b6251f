//! Template and generation domain models.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{FULL_WEIGHTING, WEIGHTING_SCALE};
use crate::errors::{Result, ValidationError};
use crate::lifecycle::GenerationStatus;
use crate::risk::RiskAssessment;

/// Domain model representing a portfolio template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a new template
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub id: Option<String>,
    pub name: String,
}

/// A fund and its target share of the portfolio, in percent (0-100).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub fund_id: String,
    pub target_weighting: Decimal,
}

impl Allocation {
    pub fn new(fund_id: impl Into<String>, target_weighting: Decimal) -> Self {
        Self {
            fund_id: fund_id.into(),
            target_weighting,
        }
    }
}

/// Domain model representing one version of a template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub template_id: String,
    /// 1-based position within the template. Never reused.
    pub sequence: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: GenerationStatus,
    pub allocations: Vec<Allocation>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Generation {
    /// The explicit name, or a positional label such as "Generation 3".
    pub fn display_name(&self, label_prefix: &str) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", label_prefix, self.sequence),
        }
    }

    pub fn allocation_summary(&self) -> AllocationSummary {
        AllocationSummary::from_allocations(&self.allocations)
    }
}

/// Input model for adding a generation to a template
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewGeneration {
    pub template_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub copy_from_generation_id: Option<String>,
}

/// Fully resolved generation record handed to the repository.
#[derive(Debug, Clone)]
pub struct NewGenerationRecord {
    pub template_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub allocations: Vec<Allocation>,
}

/// Editable descriptive fields of a generation
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDetailsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Weight totals of an allocation set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub fund_count: usize,
    pub total_weighting: Decimal,
    /// True when the weightings add up to exactly 100.
    pub is_normalized: bool,
}

impl AllocationSummary {
    pub fn from_allocations(allocations: &[Allocation]) -> Self {
        // Saturates on unvalidated input instead of overflowing.
        let total_weighting = allocations.iter().fold(Decimal::ZERO, |total, a| {
            total
                .checked_add(a.target_weighting)
                .unwrap_or(Decimal::MAX)
        });
        Self {
            fund_count: allocations.len(),
            total_weighting,
            is_normalized: total_weighting == FULL_WEIGHTING,
        }
    }
}

/// Checks an allocation set before it replaces a generation's allocations.
///
/// Sums other than 100 are accepted; the set may be provisional.
pub fn validate_allocations(allocations: &[Allocation]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(allocations.len());
    for allocation in allocations {
        let fund_id = allocation.fund_id.trim();
        if fund_id.is_empty() {
            return Err(ValidationError::MissingField("fundId".to_string()).into());
        }
        if !seen.insert(fund_id) {
            return Err(ValidationError::DuplicateFund {
                fund_id: fund_id.to_string(),
            }
            .into());
        }
        if allocation.target_weighting.is_sign_negative()
            && !allocation.target_weighting.is_zero()
        {
            return Err(ValidationError::NegativeWeighting {
                fund_id: fund_id.to_string(),
            }
            .into());
        }
        if allocation.target_weighting > FULL_WEIGHTING {
            return Err(ValidationError::WeightingTooLarge {
                fund_id: fund_id.to_string(),
                weighting: allocation.target_weighting,
            }
            .into());
        }
        if allocation.target_weighting.normalize().scale() > WEIGHTING_SCALE {
            return Err(ValidationError::InvalidInput(format!(
                "Weighting {} for fund '{}' has more than {} decimal places",
                allocation.target_weighting, fund_id, WEIGHTING_SCALE
            ))
            .into());
        }
    }
    Ok(())
}

/// A generation with its derived figures, for overview screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOverview {
    pub generation: Generation,
    pub display_name: String,
    pub allocation_summary: AllocationSummary,
    pub risk: RiskAssessment,
    /// `None` when the product registry could not be queried.
    pub bound_products: Option<i64>,
}

/// A template with all its generations in version order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOverview {
    pub template: Template,
    pub active_generation_id: Option<String>,
    pub generations: Vec<GenerationOverview>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn generation(name: Option<&str>, sequence: i32) -> Generation {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Generation {
            id: "g".to_string(),
            template_id: "t".to_string(),
            sequence,
            name: name.map(str::to_string),
            description: None,
            status: GenerationStatus::Draft,
            allocations: vec![],
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_position() {
        assert_eq!(generation(None, 3).display_name("Generation"), "Generation 3");
        assert_eq!(generation(Some("  "), 2).display_name("Gen"), "Gen 2");
        assert_eq!(generation(Some("2025 refresh"), 1).display_name("Gen"), "2025 refresh");
    }

    #[test]
    fn test_validate_rejects_duplicate_fund() {
        let allocations = vec![
            Allocation::new("FUND-X", dec!(50)),
            Allocation::new("FUND-Y", dec!(25)),
            Allocation::new("FUND-X", dec!(25)),
        ];
        match validate_allocations(&allocations) {
            Err(Error::Validation(ValidationError::DuplicateFund { fund_id })) => {
                assert_eq!(fund_id, "FUND-X")
            }
            other => panic!("expected duplicate fund error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_negative_weighting() {
        let allocations = vec![Allocation::new("FUND-X", dec!(-0.01))];
        assert!(matches!(
            validate_allocations(&allocations),
            Err(Error::Validation(ValidationError::NegativeWeighting { .. }))
        ));
    }

    #[test]
    fn test_validate_bounds_weighting_at_full() {
        assert!(validate_allocations(&[Allocation::new("FUND-X", dec!(100.00))]).is_ok());
        match validate_allocations(&[Allocation::new("FUND-X", Decimal::MAX)]) {
            Err(Error::Validation(ValidationError::WeightingTooLarge { fund_id, weighting })) => {
                assert_eq!(fund_id, "FUND-X");
                assert_eq!(weighting, Decimal::MAX);
            }
            other => panic!("expected oversized weighting error, got {:?}", other),
        }
        assert!(matches!(
            validate_allocations(&[Allocation::new("FUND-X", dec!(100.01))]),
            Err(Error::Validation(ValidationError::WeightingTooLarge { .. }))
        ));
    }

    #[test]
    fn test_allocation_summary_saturates_instead_of_overflowing() {
        let summary = AllocationSummary::from_allocations(&[
            Allocation::new("FUND-X", Decimal::MAX),
            Allocation::new("FUND-Y", Decimal::MAX),
        ]);
        assert_eq!(summary.total_weighting, Decimal::MAX);
        assert!(!summary.is_normalized);
    }

    #[test]
    fn test_validate_accepts_non_normalized_and_trailing_zeros() {
        let allocations = vec![
            Allocation::new("FUND-X", dec!(12.5000)),
            Allocation::new("FUND-Y", dec!(0)),
        ];
        assert!(validate_allocations(&allocations).is_ok());
        assert!(validate_allocations(&[]).is_ok());
    }

    #[test]
    fn test_validate_rejects_sub_basis_point_precision() {
        let allocations = vec![Allocation::new("FUND-X", dec!(33.333))];
        assert!(matches!(
            validate_allocations(&allocations),
            Err(Error::Validation(ValidationError::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_allocation_summary() {
        let summary = AllocationSummary::from_allocations(&[
            Allocation::new("FUND-X", dec!(60)),
            Allocation::new("FUND-Y", dec!(40.00)),
        ]);
        assert_eq!(summary.fund_count, 2);
        assert_eq!(summary.total_weighting, dec!(100));
        assert!(summary.is_normalized);
    }
}
