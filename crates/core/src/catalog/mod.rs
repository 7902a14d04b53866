//! Catalog of indexed channel files.
//!
//! One row per underlying file, keyed by the platform's file reference. A file
//! that is announced again (caption edit, backfill replaying a live message)
//! overwrites its row instead of adding a second one.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Insert an entry, or overwrite the row that already holds its `file_ref`.
    ///
    /// The overwrite is a single statement, so concurrent upserts of the same
    /// file serialize in the database and the last committed one wins. The
    /// row keeps its id and `created_at`.
    ///
    /// Returns the id of the row.
    fn upsert(&self, entry: &NewCatalogEntry) -> Result<i64, CatalogError>;

    /// Get an entry by id.
    fn get(&self, id: i64) -> Result<CatalogEntry, CatalogError>;

    /// Get an entry by its file reference.
    fn get_by_file_ref(&self, file_ref: &str) -> Result<CatalogEntry, CatalogError>;

    /// All entries whose title equals `title` (case-insensitive), lowest
    /// quality first.
    fn get_all_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Ranked search over titles and filenames.
    ///
    /// Substring mode orders exact title matches first, then title prefix
    /// matches, then any other match; within a tier by year (newest first)
    /// and then title.
    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Most recently indexed entries first.
    fn recent(&self, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Number of entries.
    fn count(&self) -> Result<u64, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;
}
