use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use modelfolio_core::errors::NotFoundError;
use modelfolio_core::products::{BoundProduct, ProductRegistryTrait};
use modelfolio_core::Result;

use super::model::ProductDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::products;

/// Product Registry over the local `products` table.
///
/// The generation reference is a foreign key with `ON DELETE RESTRICT`, so a
/// generation that still has products can never be deleted at the storage level.
pub struct ProductRegistryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ProductRegistryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ProductRegistryRepository { pool, writer }
    }

    /// Registers a product bound to its generation.
    pub async fn insert_product(&self, product: BoundProduct) -> Result<BoundProduct> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BoundProduct> {
                let row: ProductDB = product.into();
                let inserted = diesel::insert_into(products::table)
                    .values(&row)
                    .returning(ProductDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(BoundProduct::from(inserted))
            })
            .await
    }
}

#[async_trait]
impl ProductRegistryTrait for ProductRegistryRepository {
    async fn count_by_generation(&self, generation_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = products::table
            .filter(products::generation_id.eq(generation_id))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;
        Ok(count)
    }

    async fn list_by_generation(&self, generation_id: &str) -> Result<Vec<BoundProduct>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = products::table
            .filter(products::generation_id.eq(generation_id))
            .order((products::start_date.asc(), products::id.asc()))
            .select(ProductDB::as_select())
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(BoundProduct::from).collect())
    }

    async fn rebind(&self, product_id: &str, generation_id: &str) -> Result<BoundProduct> {
        let product_id = product_id.to_string();
        let generation_id = generation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BoundProduct> {
                let updated = diesel::update(products::table.find(&product_id))
                    .set(products::generation_id.eq(generation_id))
                    .returning(ProductDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                updated
                    .map(BoundProduct::from)
                    .ok_or_else(|| NotFoundError::Product(product_id).into())
            })
            .await
    }
}
