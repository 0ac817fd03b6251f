//! Funds module - read-only view of the external Fund Catalog.

mod funds_model;
mod funds_traits;

pub use funds_model::{Fund, FundStatus};
pub use funds_traits::FundCatalogTrait;
