use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Channel section exists (enforced by serde) and names a channel
/// - Server port is not 0
/// - Queue and page sizes are not 0
/// - The "show more" page is not smaller than the first page
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.channel.id == 0 {
        return Err(ConfigError::ValidationError(
            "channel.id cannot be 0".to_string(),
        ));
    }

    // Ingestion validation
    let sizes = [
        ("ingest.queue_size", config.ingest.queue_size),
        ("ingest.backfill_window", config.ingest.backfill_window),
        ("ingest.page_size", config.ingest.page_size),
        ("search.page_size", config.search.page_size as usize),
        ("users.queue_size", config.users.queue_size),
    ];
    if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
    }

    // Search validation
    if config.search.more_page_size < config.search.page_size {
        return Err(ConfigError::ValidationError(format!(
            "search.more_page_size ({}) cannot be smaller than search.page_size ({})",
            config.search.more_page_size, config.search.page_size
        )));
    }

    Ok(())
}
