//! Weighted risk models.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_RISK_FACTOR, MIN_RISK_FACTOR};

/// Why a weighted risk figure is or is not available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    Available,
    NoAllocations,
    ZeroWeight,
    #[serde(rename_all = "camelCase")]
    UnresolvedFunds { fund_ids: Vec<String> },
    #[serde(rename_all = "camelCase")]
    MissingRiskFactor { fund_ids: Vec<String> },
    CatalogUnavailable { reason: String },
}

/// Weighted risk of an allocation set.
///
/// `weighted_risk` is the unrounded, unclamped figure. Use [`display_risk`]
/// or [`RiskAssessment::band`] for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub weighted_risk: Option<Decimal>,
    pub status: RiskStatus,
}

impl RiskAssessment {
    pub fn available(value: Decimal) -> Self {
        Self {
            weighted_risk: Some(value),
            status: RiskStatus::Available,
        }
    }

    pub fn unavailable(status: RiskStatus) -> Self {
        Self {
            weighted_risk: None,
            status,
        }
    }

    pub fn is_available(&self) -> bool {
        self.weighted_risk.is_some()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.weighted_risk.and_then(|v| v.to_f64())
    }

    pub fn band(&self) -> Option<RiskBand> {
        self.weighted_risk.map(RiskBand::from_risk)
    }
}

/// Clamps a weighted risk to the catalog's 1-7 scale for display.
pub fn display_risk(value: Decimal) -> Decimal {
    value.clamp(MIN_RISK_FACTOR, MAX_RISK_FACTOR)
}

/// Coarse risk class used for colour scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Low is 1-2, Medium 3-4, High 5-7, after clamping and rounding half away from zero.
    pub fn from_risk(value: Decimal) -> Self {
        let level = display_risk(value)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
            .unwrap_or(1);
        match level {
            i32::MIN..=2 => RiskBand::Low,
            3..=4 => RiskBand::Medium,
            _ => RiskBand::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_risk_clamps_only_for_presentation() {
        assert_eq!(display_risk(dec!(0)), dec!(1));
        assert_eq!(display_risk(dec!(9.5)), dec!(7));
        assert_eq!(display_risk(dec!(4.2)), dec!(4.2));

        let assessment = RiskAssessment::available(dec!(0.5));
        assert_eq!(assessment.weighted_risk, Some(dec!(0.5)));
    }

    #[test]
    fn test_bands() {
        assert_eq!(RiskBand::from_risk(dec!(0)), RiskBand::Low);
        assert_eq!(RiskBand::from_risk(dec!(2.49)), RiskBand::Low);
        assert_eq!(RiskBand::from_risk(dec!(2.5)), RiskBand::Medium);
        assert_eq!(RiskBand::from_risk(dec!(4.2)), RiskBand::Medium);
        assert_eq!(RiskBand::from_risk(dec!(4.5)), RiskBand::High);
        assert_eq!(RiskBand::from_risk(dec!(12)), RiskBand::High);
    }

    #[test]
    fn test_status_serialization() {
        let status = RiskStatus::UnresolvedFunds {
            fund_ids: vec!["FUND-Z".to_string()],
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"kind":"UNRESOLVED_FUNDS","fundIds":["FUND-Z"]}"#);
    }
}
