//! Database models for products.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use modelfolio_core::products::{BoundProduct, ProductStatus};

/// Database model for products bound to a generation
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ProductDB {
    pub id: String,
    pub name: String,
    pub client_name: Option<String>,
    pub generation_id: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<ProductDB> for BoundProduct {
    fn from(db: ProductDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            client_name: db.client_name,
            generation_id: db.generation_id,
            status: ProductStatus::from_db_str(&db.status),
            start_date: db.start_date,
            end_date: db.end_date,
        }
    }
}

impl From<BoundProduct> for ProductDB {
    fn from(domain: BoundProduct) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            client_name: domain.client_name,
            generation_id: domain.generation_id,
            status: domain.status.as_db_str().to_string(),
            start_date: domain.start_date,
            end_date: domain.end_date,
        }
    }
}
