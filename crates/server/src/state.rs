use std::sync::Arc;

use filmzi_core::{
    CatalogStore, Config, IngestHandle, SearchService, UserRecorder, UserRegistry,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn CatalogStore>,
    search: SearchService,
    users: Arc<dyn UserRegistry>,
    recorder: UserRecorder,
    ingest: IngestHandle,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn UserRegistry>,
        recorder: UserRecorder,
        ingest: IngestHandle,
    ) -> Self {
        let search = SearchService::new(Arc::clone(&catalog), config.search.clone());
        Self {
            config,
            catalog,
            search,
            users,
            recorder,
            ingest,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn users(&self) -> &dyn UserRegistry {
        self.users.as_ref()
    }

    pub fn recorder(&self) -> &UserRecorder {
        &self.recorder
    }

    pub fn ingest(&self) -> &IngestHandle {
        &self.ingest
    }
}
