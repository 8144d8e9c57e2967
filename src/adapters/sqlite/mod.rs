//! SQLite adapter: Implementation of Storage.
//!
//! Provides local persistence for user accounts and prediction records.
//!
//! # Schema
//!
//! Prediction columns are nullable so that rows written by older or external
//! writers can still be read; such rows are skipped by owner queries and
//! removed by `purge_incomplete_predictions`. Symptoms and resources are
//! stored as JSON text, timestamps as RFC 3339.
//!
//! # Mutex Behavior
//!
//! Database connection is protected by `Mutex`. A poisoned mutex (from panic
//! in another thread) will cause panic. This fail-fast behavior is intentional
//! for data integrity in healthcare applications.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{PredictionRecord, Resource, Severity, SymptomVector, UserAccount};
use crate::ports::{PredictionPage, Storage};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

const RECORD_COLUMNS: &str = "id, username, symptoms, age, gender, severity, \
     recommendation_text, recommendation_resources, created_at";

const COMPLETE_FOR_OWNER: &str = "username = ?1 \
     AND severity IS NOT NULL AND symptoms IS NOT NULL AND created_at IS NOT NULL";

/// SQLite storage adapter.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage with the given database path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT,
                symptoms TEXT,
                age INTEGER,
                gender TEXT,
                severity INTEGER,
                recommendation_text TEXT,
                recommendation_resources TEXT,
                created_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_predictions_owner
                ON predictions(username, created_at);
            ",
        )?;

        Ok(())
    }

    fn conversion_error(col: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    }

    /// Map a row selected with `RECORD_COLUMNS`.
    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
        let id: i64 = row.get(0)?;
        let owner: Option<String> = row.get(1)?;
        let symptoms_json: String = row.get(2)?;
        let age: Option<i64> = row.get(3)?;
        let gender: Option<String> = row.get(4)?;
        let severity: i64 = row.get(5)?;
        let text: Option<String> = row.get(6)?;
        let resources_json: Option<String> = row.get(7)?;
        let created_at_str: String = row.get(8)?;

        let symptoms: SymptomVector =
            serde_json::from_str(&symptoms_json).map_err(|e| Self::conversion_error(2, e))?;
        let resources: Vec<Resource> = match resources_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| Self::conversion_error(7, e))?,
            None => Vec::new(),
        };
        let timestamp = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::conversion_error(8, e))?;

        Ok(PredictionRecord {
            id: Some(id),
            owner,
            symptoms,
            age: u32::try_from(age.unwrap_or(0).max(0)).unwrap_or(u32::MAX),
            gender: gender.unwrap_or_default(),
            severity: Severity::from_raw(severity),
            recommendation_text: text.unwrap_or_default(),
            recommendation_resources: resources,
            timestamp,
        })
    }
}

impl Storage for SqliteStorage {
    type Error = StorageError;

    fn create_user(&self, username: &str, password_hash: &str) -> Result<bool, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, password_hash, Utc::now().to_rfc3339()],
        )?;

        if inserted == 1 {
            tracing::info!("Registered user {}", username);
        }
        Ok(inserted == 1)
    }

    fn find_user(&self, username: &str) -> Result<Option<UserAccount>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let row = conn
            .query_row(
                "SELECT username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                |row| {
                    let username: String = row.get(0)?;
                    let password_hash: String = row.get(1)?;
                    let created_at: String = row.get(2)?;
                    Ok((username, password_hash, created_at))
                },
            )
            .optional()?;

        let Some((username, password_hash, created_at)) = row else {
            return Ok(None);
        };
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Some(UserAccount {
            username,
            password_hash,
            created_at,
        }))
    }

    fn insert_prediction(&self, record: &PredictionRecord) -> Result<i64, Self::Error> {
        let symptoms = serde_json::to_string(&record.symptoms)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let resources = serde_json::to_string(&record.recommendation_resources)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().expect("Lock failed");
        conn.execute(
            r"
            INSERT INTO predictions (
                username, symptoms, age, gender, severity,
                recommendation_text, recommendation_resources, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                record.owner,
                symptoms,
                i64::from(record.age),
                record.gender,
                i64::from(record.severity.level()),
                record.recommendation_text,
                resources,
                record.timestamp.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Saved prediction {} to storage", id);
        Ok(id)
    }

    fn load_predictions_for_owner(&self, owner: &str) -> Result<Vec<PredictionRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM predictions WHERE {COMPLETE_FOR_OWNER} \
             ORDER BY created_at ASC, id ASC"
        ))?;

        let records = stmt
            .query_map(params![owner], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn load_predictions_for_owner_paginated(
        &self,
        owner: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PredictionPage, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let total_count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM predictions WHERE {COMPLETE_FOR_OWNER}"),
            params![owner],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM predictions WHERE {COMPLETE_FOR_OWNER} \
             ORDER BY created_at ASC, id ASC LIMIT ?2 OFFSET ?3"
        ))?;

        // Out-of-range values clamp to i64::MAX, never wrap negative.
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql_offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![owner, sql_limit, sql_offset], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PredictionPage::new(records, total_count as usize, offset, limit))
    }

    fn count_predictions(&self) -> Result<usize, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    fn purge_incomplete_predictions(&self) -> Result<usize, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let removed = conn.execute(
            "DELETE FROM predictions \
             WHERE severity IS NULL OR symptoms IS NULL OR created_at IS NULL",
            [],
        )?;

        if removed > 0 {
            tracing::warn!("Purged {} incomplete prediction rows", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{recommend, Demographics};
    use chrono::{Duration, TimeZone};

    fn record(owner: Option<&str>, severity: Severity, minutes: i64) -> PredictionRecord {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        PredictionRecord::build(
            owner,
            SymptomVector::from_flags([true, false, true, false, false, false]),
            &Demographics::new(44, "female"),
            severity,
            &recommend(severity),
            now,
        )
    }

    #[test]
    fn test_user_registration() {
        let storage = SqliteStorage::in_memory().expect("Should create db");

        assert!(storage.find_user("alice").expect("Should query").is_none());
        assert!(storage.create_user("alice", "$argon2id$hash").expect("Should insert"));
        assert!(!storage.create_user("alice", "$argon2id$other").expect("Should query"));

        let user = storage.find_user("alice").expect("Should query").expect("Should exist");
        assert_eq!(user.password_hash, "$argon2id$hash");
    }

    #[test]
    fn test_prediction_roundtrip() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        let original = record(Some("alice"), Severity::Severe, 0);

        let id = storage.insert_prediction(&original).expect("Should save");
        let loaded = storage.load_predictions_for_owner("alice").expect("Should load");

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, Some(id));
        assert_eq!(loaded[0].symptoms, original.symptoms);
        assert_eq!(loaded[0].severity, Severity::Severe);
        assert_eq!(loaded[0].recommendation_resources.len(), 5);
        assert_eq!(loaded[0].timestamp, original.timestamp);
    }

    #[test]
    fn test_owner_scoping_and_order() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        storage.insert_prediction(&record(Some("alice"), Severity::Mild, 0)).expect("Should save");
        storage.insert_prediction(&record(Some("bob"), Severity::Severe, 1)).expect("Should save");
        storage.insert_prediction(&record(Some("alice"), Severity::Moderate, 2)).expect("Should save");
        storage.insert_prediction(&record(None, Severity::Controlled, 3)).expect("Should save");

        let alice = storage.load_predictions_for_owner("alice").expect("Should load");
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].severity, Severity::Mild);
        assert_eq!(alice[1].severity, Severity::Moderate);

        assert_eq!(storage.count_predictions().expect("Should count"), 4);
    }

    #[test]
    fn test_paginated_owner_query() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        for minute in 0..5 {
            storage
                .insert_prediction(&record(Some("alice"), Severity::Mild, minute))
                .expect("Should save");
        }

        let first = storage
            .load_predictions_for_owner_paginated("alice", 0, 2)
            .expect("Should load");
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total_count, 5);
        assert_eq!(first.next_offset(), Some(2));

        let last = storage
            .load_predictions_for_owner_paginated("alice", 4, 2)
            .expect("Should load");
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[test]
    fn test_purge_incomplete_rows() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        storage.insert_prediction(&record(Some("alice"), Severity::Mild, 0)).expect("Should save");
        storage.insert_prediction(&record(None, Severity::Mild, 1)).expect("Should save");
        {
            let conn = storage.conn.lock().expect("Lock failed");
            conn.execute(
                "INSERT INTO predictions (username, symptoms, created_at) VALUES ('alice', '[1,0,0,0,0,0]', '2024-05-01T12:00:00+00:00')",
                [],
            )
            .expect("Should insert legacy row");
            conn.execute("INSERT INTO predictions (username, severity) VALUES ('alice', 2)", [])
                .expect("Should insert legacy row");
        }

        assert_eq!(storage.load_predictions_for_owner("alice").expect("Should load").len(), 1);
        assert_eq!(storage.purge_incomplete_predictions().expect("Should purge"), 2);
        assert_eq!(storage.purge_incomplete_predictions().expect("Should purge"), 0);
        assert_eq!(storage.count_predictions().expect("Should count"), 2);
    }
}
