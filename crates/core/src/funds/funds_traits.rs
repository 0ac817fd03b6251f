use crate::errors::Result;
use crate::funds::Fund;
use async_trait::async_trait;

/// Read access to the Fund Catalog collaborator.
///
/// `Ok(None)` means the catalog answered and does not know the fund.
/// `Err(_)` means the catalog could not be reached.
#[async_trait]
pub trait FundCatalogTrait: Send + Sync {
    async fn resolve(&self, fund_id: &str) -> Result<Option<Fund>>;
}
