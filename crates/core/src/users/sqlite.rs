use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};

use super::{ProfileUpdate, SearchRecord, UserError, UserProfile, UserRegistry};
use crate::db;

/// SQLite-backed user registry
pub struct SqliteUserRegistry {
    conn: Mutex<Connection>,
}

impl SqliteUserRegistry {
    /// Create a new SQLite user registry, creating the database file and tables if needed
    pub fn new(path: &Path) -> Result<Self, UserError> {
        let conn = db::open(path).map_err(|e| UserError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite user registry (useful for testing)
    pub fn in_memory() -> Result<Self, UserError> {
        let conn = db::open_in_memory().map_err(|e| UserError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), UserError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                handle TEXT,
                is_premium INTEGER NOT NULL DEFAULT 0,
                first_seen_at TEXT NOT NULL,
                last_seen_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                query TEXT NOT NULL,
                searched_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_search_history_user ON search_history(user_id, searched_at);
            "#,
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, UserError> {
        self.conn
            .lock()
            .map_err(|_| UserError::Internal("user registry lock poisoned".to_string()))
    }
}

fn to_db_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp read from column `idx`.
fn from_db_time(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl UserRegistry for SqliteUserRegistry {
    fn record(
        &self,
        user_id: i64,
        profile: &ProfileUpdate,
        seen_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let conn = self.lock()?;
        let seen_at = to_db_time(seen_at);

        conn.execute(
            "INSERT INTO users (user_id, display_name, handle, is_premium, first_seen_at, last_seen_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                handle = excluded.handle,
                last_seen_at = MAX(last_seen_at, excluded.last_seen_at)",
            params![user_id, &profile.display_name, &profile.handle, &seen_at],
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(())
    }

    fn get(&self, user_id: i64) -> Result<UserProfile, UserError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT user_id, display_name, handle, is_premium, first_seen_at, last_seen_at
             FROM users WHERE user_id = ?",
            params![user_id],
            |row| {
                let first_seen: String = row.get(4)?;
                let last_seen: String = row.get(5)?;
                Ok(UserProfile {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                    handle: row.get(2)?,
                    is_premium: row.get(3)?,
                    first_seen_at: from_db_time(4, &first_seen)?,
                    last_seen_at: from_db_time(5, &last_seen)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => UserError::NotFound(user_id),
            _ => UserError::Database(e.to_string()),
        })
    }

    fn set_premium(&self, user_id: i64, is_premium: bool) -> Result<(), UserError> {
        let conn = self.lock()?;

        let rows_affected = conn
            .execute(
                "UPDATE users SET is_premium = ? WHERE user_id = ?",
                params![is_premium, user_id],
            )
            .map_err(|e| UserError::Database(e.to_string()))?;

        if rows_affected == 0 {
            return Err(UserError::NotFound(user_id));
        }

        Ok(())
    }

    fn count(&self) -> Result<u64, UserError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(|e| UserError::Database(e.to_string()))
    }

    fn record_search(
        &self,
        user_id: i64,
        query: &str,
        searched_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO search_history (user_id, query, searched_at) VALUES (?, ?, ?)",
            params![user_id, query, to_db_time(searched_at)],
        )
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(())
    }

    fn recent_searches(&self, user_id: i64, limit: u32) -> Result<Vec<SearchRecord>, UserError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT user_id, query, searched_at FROM search_history
                 WHERE user_id = ?
                 ORDER BY searched_at DESC, id DESC
                 LIMIT ?",
            )
            .map_err(|e| UserError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let searched_at: String = row.get(2)?;
                Ok(SearchRecord {
                    user_id: row.get(0)?,
                    query: row.get(1)?,
                    searched_at: from_db_time(2, &searched_at)?,
                })
            })
            .map_err(|e| UserError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| UserError::Database(e.to_string()))?);
        }
        Ok(records)
    }
}
