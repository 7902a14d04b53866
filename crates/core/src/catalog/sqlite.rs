//! SQLite-backed file catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    CatalogEntry, CatalogError, CatalogSearchQuery, CatalogStats, CatalogStore, MatchMode,
    MessageRef, NewCatalogEntry,
};
use crate::db;
use crate::extractor::quality_rank;

const ENTRY_COLUMNS: &str =
    "id, file_ref, file_name, title, year, quality, size_label, source_message_ref, created_at";

/// Number of titles listed in [`CatalogStats::recent_titles`].
const RECENT_TITLES: u32 = 3;

/// SQLite-backed file catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = db::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = db::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per underlying file (file_ref is the de-duplication key)
            CREATE TABLE IF NOT EXISTS catalog (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_ref TEXT NOT NULL UNIQUE,
                file_name TEXT NOT NULL,
                title TEXT NOT NULL,
                year INTEGER,
                quality TEXT,
                size_label TEXT NOT NULL,
                source_message_ref TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_title ON catalog(title COLLATE NOCASE);
            CREATE INDEX IF NOT EXISTS idx_catalog_created_at ON catalog(created_at);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    /// Convert a row selected with [`ENTRY_COLUMNS`] to a `CatalogEntry`.
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let message_ref_str: String = row.get(7)?;
        let source_message_ref = message_ref_str
            .parse::<MessageRef>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

        let created_at_str: String = row.get(8)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

        Ok(CatalogEntry {
            id: row.get(0)?,
            file_ref: row.get(1)?,
            file_name: row.get(2)?,
            title: row.get(3)?,
            year: row.get(4)?,
            quality: row.get(5)?,
            size_label: row.get(6)?,
            source_message_ref,
            created_at,
        })
    }

    fn query_entries(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_entry)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(entries)
    }

    /// Substring search ranked exact > prefix > other, then year and title.
    fn search_substring(
        conn: &Connection,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let escaped = db::escape_like(query);
        let contains = format!("%{}%", escaped);
        let prefix = format!("{}%", escaped);

        let sql = format!(
            r"SELECT {ENTRY_COLUMNS} FROM catalog
              WHERE title LIKE ?1 ESCAPE '\' OR file_name LIKE ?1 ESCAPE '\'
              ORDER BY
                  CASE
                      WHEN title = ?2 COLLATE NOCASE THEN 0
                      WHEN title LIKE ?3 ESCAPE '\' THEN 1
                      ELSE 2
                  END,
                  year IS NULL,
                  year DESC,
                  title COLLATE NOCASE,
                  id
              LIMIT ?4"
        );

        Self::query_entries(
            conn,
            &sql,
            &[&contains, &query, &prefix, &(limit as i64)],
        )
    }

    /// Entries containing every word of the query, newest year first.
    fn search_all_terms(
        conn: &Connection,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let patterns: Vec<String> = query
            .split_whitespace()
            .map(|term| format!("%{}%", db::escape_like(term)))
            .collect();

        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let conditions: Vec<String> = (1..=patterns.len())
            .map(|i| format!(r"(title LIKE ?{i} ESCAPE '\' OR file_name LIKE ?{i} ESCAPE '\')"))
            .collect();
        let limit_param = patterns.len() + 1;

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM catalog
             WHERE {}
             ORDER BY year IS NULL, year DESC, title COLLATE NOCASE, id
             LIMIT ?{limit_param}",
            conditions.join(" AND ")
        );

        let limit = limit as i64;
        let mut params: Vec<&dyn rusqlite::ToSql> =
            patterns.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
        params.push(&limit);

        Self::query_entries(conn, &sql, &params)
    }
}

impl CatalogStore for SqliteCatalog {
    fn upsert(&self, entry: &NewCatalogEntry) -> Result<i64, CatalogError> {
        let conn = self.lock()?;
        let now_str = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        conn.query_row(
            "INSERT INTO catalog (file_ref, file_name, title, year, quality, size_label, source_message_ref, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(file_ref) DO UPDATE SET
                file_name = excluded.file_name,
                title = excluded.title,
                year = excluded.year,
                quality = excluded.quality,
                size_label = excluded.size_label,
                source_message_ref = excluded.source_message_ref
             RETURNING id",
            params![
                entry.file_ref(),
                entry.file_name(),
                entry.title(),
                entry.year(),
                entry.quality(),
                entry.size_label(),
                entry.source_message_ref().to_string(),
                &now_str,
            ],
            |row| row.get(0),
        )
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn get(&self, id: i64) -> Result<CatalogEntry, CatalogError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM catalog WHERE id = ?"),
            params![id],
            Self::row_to_entry,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(id.to_string()),
            _ => CatalogError::Database(e.to_string()),
        })
    }

    fn get_by_file_ref(&self, file_ref: &str) -> Result<CatalogEntry, CatalogError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM catalog WHERE file_ref = ?"),
            params![file_ref],
            Self::row_to_entry,
        )
        .optional()
        .map_err(|e| CatalogError::Database(e.to_string()))?
        .ok_or_else(|| CatalogError::NotFound(file_ref.to_string()))
    }

    fn get_all_by_title(&self, title: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.lock()?;
        let mut entries = Self::query_entries(
            &conn,
            &format!("SELECT {ENTRY_COLUMNS} FROM catalog WHERE title = ?1 COLLATE NOCASE"),
            &[&title.trim()],
        )?;

        entries.sort_by_key(|e| (e.quality.as_deref().map_or(u32::MAX, quality_rank), e.id));
        Ok(entries)
    }

    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        let text = query.query.trim();
        if text.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        match query.mode {
            MatchMode::Substring => Self::search_substring(&conn, text, query.limit),
            MatchMode::AllTerms => Self::search_all_terms(&conn, text, query.limit),
        }
    }

    fn recent(&self, limit: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.lock()?;
        Self::query_entries(
            &conn,
            &format!("SELECT {ENTRY_COLUMNS} FROM catalog ORDER BY created_at DESC, id DESC LIMIT ?1"),
            &[&(limit as i64)],
        )
    }

    fn count(&self) -> Result<u64, CatalogError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM catalog", [], |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let total_entries = self.count()?;
        let recent_titles = self
            .recent(RECENT_TITLES)?
            .into_iter()
            .map(|e| e.title)
            .collect();

        let conn = self.lock()?;
        let (oldest, newest): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT MIN(created_at), MAX(created_at) FROM catalog",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let parse = |s: Option<String>| {
            s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        };

        Ok(CatalogStats {
            total_entries,
            oldest_entry: parse(oldest),
            newest_entry: parse(newest),
            recent_titles,
        })
    }
}
