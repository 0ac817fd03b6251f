use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use modelfolio_core::funds::{Fund, FundCatalogTrait};
use modelfolio_core::Result;

use super::model::FundDB;
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::funds;

/// Read-only view over the `funds` table.
pub struct FundCatalogRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl FundCatalogRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        FundCatalogRepository { pool }
    }

    pub fn list_funds(&self) -> Result<Vec<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = funds::table
            .order(funds::name.asc())
            .select(FundDB::as_select())
            .load::<FundDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Fund::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl FundCatalogTrait for FundCatalogRepository {
    async fn resolve(&self, fund_id: &str) -> Result<Option<Fund>> {
        let mut conn = get_connection(&self.pool)?;
        let row = funds::table
            .find(fund_id)
            .select(FundDB::as_select())
            .first::<FundDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Fund::try_from).transpose()?)
    }
}
