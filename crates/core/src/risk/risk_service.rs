//! Weighted risk aggregation over a generation's allocations.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::{Collaborator, Error, Result};
use crate::funds::{Fund, FundCatalogTrait};
use crate::templates::Allocation;

use super::risk_model::{RiskAssessment, RiskStatus};

/// Computes `Σ(weight_i * risk_i) / Σ weight_i`.
///
/// Returns `None` for an empty set or a zero total weight. The result is
/// neither rounded nor clamped.
pub fn compute_weighted_risk(weighted_factors: &[(Decimal, Decimal)]) -> Option<Decimal> {
    let mut total_weight = Decimal::ZERO;
    let mut weighted_sum = Decimal::ZERO;
    for (weight, risk) in weighted_factors {
        total_weight = total_weight.checked_add(*weight)?;
        weighted_sum = weighted_sum.checked_add(weight.checked_mul(*risk)?)?;
    }
    if total_weight.is_zero() {
        return None;
    }
    weighted_sum.checked_div(total_weight)
}

pub struct RiskAggregator {
    catalog: Arc<dyn FundCatalogTrait>,
    timeout: Duration,
}

impl RiskAggregator {
    pub fn new(catalog: Arc<dyn FundCatalogTrait>, timeout: Duration) -> Self {
        Self { catalog, timeout }
    }

    async fn resolve_fund(&self, fund_id: &str) -> Result<Option<Fund>> {
        match tokio::time::timeout(self.timeout, self.catalog.resolve(fund_id)).await {
            Ok(result) => result,
            Err(_) => Err(Error::unavailable(
                Collaborator::FundCatalog,
                format!("lookup of fund '{}' timed out after {:?}", fund_id, self.timeout),
            )),
        }
    }

    /// Assesses the weighted risk of an allocation set.
    ///
    /// Never fails: catalog problems degrade the figure to unavailable.
    /// Has no side effects, so repeated calls over unchanged inputs agree.
    pub async fn assess(&self, allocations: &[Allocation]) -> RiskAssessment {
        if allocations.is_empty() {
            return RiskAssessment::unavailable(RiskStatus::NoAllocations);
        }

        let lookups = allocations
            .iter()
            .map(|allocation| self.resolve_fund(&allocation.fund_id));
        let resolved = join_all(lookups).await;

        let mut unresolved = Vec::new();
        let mut unrated = Vec::new();
        let mut weighted_factors = Vec::with_capacity(allocations.len());

        for (allocation, result) in allocations.iter().zip(resolved) {
            match result {
                Err(e) => {
                    warn!(
                        "Risk unavailable, fund catalog failed for '{}': {}",
                        allocation.fund_id, e
                    );
                    return RiskAssessment::unavailable(RiskStatus::CatalogUnavailable {
                        reason: e.to_string(),
                    });
                }
                Ok(None) => unresolved.push(allocation.fund_id.clone()),
                Ok(Some(fund)) => match fund.risk_factor {
                    Some(risk) => {
                        weighted_factors.push((allocation.target_weighting, Decimal::from(risk)))
                    }
                    None => unrated.push(allocation.fund_id.clone()),
                },
            }
        }

        if !unresolved.is_empty() {
            debug!("Risk unavailable, unresolved funds: {:?}", unresolved);
            return RiskAssessment::unavailable(RiskStatus::UnresolvedFunds {
                fund_ids: unresolved,
            });
        }
        if !unrated.is_empty() {
            return RiskAssessment::unavailable(RiskStatus::MissingRiskFactor { fund_ids: unrated });
        }

        match compute_weighted_risk(&weighted_factors) {
            Some(value) => RiskAssessment::available(value),
            None => RiskAssessment::unavailable(RiskStatus::ZeroWeight),
        }
    }
}
