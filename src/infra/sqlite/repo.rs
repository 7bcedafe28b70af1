use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::table::{FetchParams, FetchResult};
use crate::domain::entities::voucher::Voucher;
use crate::infra::sqlite::queries::{build_voucher_query, query_vouchers};
use crate::infra::sqlite::schema::{init_db, seed_demo_vouchers};
use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::fetch::{FetchError, RowSource};

pub struct SqliteVoucherSource {
    pub db_path: PathBuf,
}

impl SqliteVoucherSource {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Creates the schema and seeds demo rows on an empty database.
    pub fn init(&self, seed_rows: u32) -> anyhow::Result<u32> {
        init_db(&self.db_path)?;
        seed_demo_vouchers(&self.db_path, seed_rows)
    }
}

#[async_trait]
impl RowSource<Voucher> for SqliteVoucherSource {
    async fn fetch(&self, params: &FetchParams) -> Result<FetchResult<Voucher>, FetchError> {
        let query = build_voucher_query(params)
            .map_err(|err| FetchError::InvalidParams(err.to_string()))?;
        let db_path = self.db_path.clone();
        run_blocking("query_vouchers", move || query_vouchers(&db_path, &query))
            .await
            .map_err(|err| FetchError::other(format!("voucher query task failed: {err}")))?
            .map_err(FetchError::backend)
    }
}
