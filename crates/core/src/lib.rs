pub mod catalog;
pub mod config;
mod db;
pub mod extractor;
pub mod ingest;
pub mod metrics;
pub mod search;
pub mod testing;
pub mod users;

pub use catalog::{
    CatalogEntry, CatalogError, CatalogSearchQuery, CatalogStats, CatalogStore, MatchMode,
    MessageRef, NewCatalogEntry, SqliteCatalog,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use extractor::{extract, format_size, Extraction};
pub use ingest::{
    create_ingest_system, reconcile_backlog, BackfillReport, ChannelMessage, HistorySource,
    IngestError, IngestHandle, IngestOutcome, IngestWorker, Ingester, JsonlHistory,
    MediaAttachment, MediaKind, SourceError,
};
pub use search::{SearchConfig, SearchPage, SearchService};
pub use users::{
    create_user_system, ProfileUpdate, SearchRecord, SqliteUserRegistry, UserError, UserProfile,
    UserRecorder, UserRegistry, UserWriter,
};
