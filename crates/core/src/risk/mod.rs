//! Risk module - weighted portfolio risk from fund allocations.

mod risk_model;
mod risk_service;


pub use risk_model::{display_risk, RiskAssessment, RiskBand, RiskStatus};
pub use risk_service::{compute_weighted_risk, RiskAggregator};
