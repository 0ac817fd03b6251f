use crate::errors::Result;
use crate::products::BoundProduct;
use async_trait::async_trait;

/// Access to the Product Registry collaborator.
#[async_trait]
pub trait ProductRegistryTrait: Send + Sync {
    /// Number of products currently bound to the generation.
    async fn count_by_generation(&self, generation_id: &str) -> Result<i64>;

    /// Products currently bound to the generation.
    async fn list_by_generation(&self, generation_id: &str) -> Result<Vec<BoundProduct>>;

    /// Moves a product's binding to another generation.
    async fn rebind(&self, product_id: &str, generation_id: &str) -> Result<BoundProduct>;
}
