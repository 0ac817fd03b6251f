use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::products::BoundProduct;

use super::{MigrationChecklist, MigrationNote};

/// Trait for migration tracking operations
#[async_trait]
pub trait MigrationServiceTrait: Send + Sync {
    /// Checklist of the template's non-active generations as of today.
    async fn build_checklist(&self, template_id: &str) -> Result<MigrationChecklist>;

    /// Same as `build_checklist`, classifying priorities against `today`.
    async fn build_checklist_as_of(
        &self,
        template_id: &str,
        today: NaiveDate,
    ) -> Result<MigrationChecklist>;

    /// Rebinds a product from a non-current generation to the template's
    /// active generation.
    async fn migrate_product(
        &self,
        template_id: &str,
        product_id: &str,
        from_generation_id: &str,
    ) -> Result<BoundProduct>;

    fn get_note(&self, template_id: &str, product_id: &str) -> Result<Option<MigrationNote>>;
    fn get_notes(&self, template_id: &str) -> Result<Vec<MigrationNote>>;

    /// Stores a note. A blank note removes the existing one and returns `None`.
    async fn set_note(
        &self,
        template_id: &str,
        product_id: &str,
        note: &str,
    ) -> Result<Option<MigrationNote>>;
}
