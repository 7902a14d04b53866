//! Registry of users who interacted with the front end.
//!
//! Profiles are created or refreshed on every interaction and never deleted.
//! Writes from the front end go through [`UserRecorder`], which queues them
//! for a background [`UserWriter`] so the calling flow never waits on storage.

mod recorder;
mod sqlite;
mod types;

pub use recorder::*;
pub use sqlite::SqliteUserRegistry;
pub use types::*;

use chrono::{DateTime, Utc};

/// Trait for user registry storage.
pub trait UserRegistry: Send + Sync {
    /// Create the user, or refresh its display name, handle and last-seen time.
    ///
    /// Never touches `first_seen_at` or the premium flag of an existing user.
    fn record(
        &self,
        user_id: i64,
        profile: &ProfileUpdate,
        seen_at: DateTime<Utc>,
    ) -> Result<(), UserError>;

    /// Get a user by id.
    fn get(&self, user_id: i64) -> Result<UserProfile, UserError>;

    /// Set or clear the premium flag of an existing user.
    fn set_premium(&self, user_id: i64, is_premium: bool) -> Result<(), UserError>;

    /// Number of known users.
    fn count(&self) -> Result<u64, UserError>;

    /// Append a query to the user's search history.
    fn record_search(
        &self,
        user_id: i64,
        query: &str,
        searched_at: DateTime<Utc>,
    ) -> Result<(), UserError>;

    /// Most recent searches of a user, newest first.
    fn recent_searches(&self, user_id: i64, limit: u32) -> Result<Vec<SearchRecord>, UserError>;
}
