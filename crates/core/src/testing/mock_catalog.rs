//! Catalog store that is always unavailable.

use crate::catalog::{
    CatalogEntry, CatalogError, CatalogSearchQuery, CatalogStats, CatalogStore, NewCatalogEntry,
};

/// Catalog whose every read and write fails with a database error.
///
/// Used to check that storage outages drop single messages and turn reads
/// into empty results.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCatalog;

fn unavailable() -> CatalogError {
    CatalogError::Database("mock catalog unavailable".to_string())
}

impl CatalogStore for FailingCatalog {
    fn upsert(&self, _entry: &NewCatalogEntry) -> Result<i64, CatalogError> {
        Err(unavailable())
    }

    fn get(&self, _id: i64) -> Result<CatalogEntry, CatalogError> {
        Err(unavailable())
    }

    fn get_by_file_ref(&self, _file_ref: &str) -> Result<CatalogEntry, CatalogError> {
        Err(unavailable())
    }

    fn get_all_by_title(&self, _title: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        Err(unavailable())
    }

    fn search(&self, _query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        Err(unavailable())
    }

    fn recent(&self, _limit: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        Err(unavailable())
    }

    fn count(&self) -> Result<u64, CatalogError> {
        Err(unavailable())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        Err(unavailable())
    }
}
