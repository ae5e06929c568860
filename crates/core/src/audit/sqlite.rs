use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{AuditError, SyncAttempt, SyncLogStore, SyncStatus};

/// SQLite-backed sync log
pub struct SqliteSyncLog {
    conn: Mutex<Connection>,
}

impl SqliteSyncLog {
    /// Create a new SQLite sync log, creating the database file and table if
    /// needed
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let conn = Connection::open(path).map_err(|e| AuditError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite sync log (useful for testing)
    pub fn in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory().map_err(|e| AuditError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), AuditError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sync_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'S',
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_sync_log_status ON sync_log(status);
            CREATE INDEX IF NOT EXISTS idx_sync_log_timestamp ON sync_log(timestamp);
            "#,
        )
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(())
    }
}

impl SyncLogStore for SqliteSyncLog {
    fn create(&self) -> Result<i64, AuditError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sync_log (timestamp, status) VALUES (?, 'S')",
            params![Utc::now().to_rfc3339()],
        )
        .map_err(|e| AuditError::Database(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    fn conclude(&self, id: i64, status: SyncStatus, description: &str) -> Result<(), AuditError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE sync_log SET status = ?, description = ? WHERE id = ?",
                params![status.as_code(), description, id],
            )
            .map_err(|e| AuditError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(AuditError::Database(format!("no sync attempt with id {id}")));
        }
        Ok(())
    }

    fn last_successful(&self) -> Result<Option<DateTime<Utc>>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let timestamp: Option<String> = conn
            .query_row(
                "SELECT timestamp FROM sync_log WHERE status = 'K' \
                 ORDER BY timestamp DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(AuditError::Database(e.to_string())),
            })?;

        Ok(timestamp.and_then(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }

    fn recent(&self, limit: u32) -> Result<Vec<SyncAttempt>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, status, description FROM sync_log \
                 ORDER BY timestamp DESC, id DESC LIMIT ?",
            )
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let timestamp_str: String = row.get(1)?;
                let status_code: String = row.get(2)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    timestamp_str,
                    status_code,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let mut attempts = Vec::new();
        for row in rows {
            let (id, timestamp_str, status_code, description) =
                row.map_err(|e| AuditError::Database(e.to_string()))?;

            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AuditError::Database(format!("Invalid timestamp: {e}")))?;

            let status = SyncStatus::from_code(&status_code)
                .ok_or_else(|| AuditError::Database(format!("Unknown status '{status_code}'")))?;

            attempts.push(SyncAttempt {
                id,
                timestamp,
                status,
                description,
            });
        }

        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_log() -> SqliteSyncLog {
        SqliteSyncLog::in_memory().unwrap()
    }

    #[test]
    fn test_create_starts_attempt() {
        let log = create_test_log();
        let id = log.create().unwrap();
        assert!(id > 0);

        let attempts = log.recent(10).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, SyncStatus::Started);
        assert!(attempts[0].description.is_empty());
    }

    #[test]
    fn test_conclude_updates_in_place() {
        let log = create_test_log();
        let id = log.create().unwrap();
        log.conclude(id, SyncStatus::Ok, "added/updated 2 series")
            .unwrap();

        let attempts = log.recent(10).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].id, id);
        assert_eq!(attempts[0].status, SyncStatus::Ok);
        assert_eq!(attempts[0].description, "added/updated 2 series");
    }

    #[test]
    fn test_conclude_unknown_id() {
        let log = create_test_log();
        let result = log.conclude(404, SyncStatus::Error, "boom");
        assert!(matches!(result, Err(AuditError::Database(_))));
    }

    #[test]
    fn test_last_successful_empty() {
        let log = create_test_log();
        assert!(log.last_successful().unwrap().is_none());
    }

    #[test]
    fn test_last_successful_ignores_started_and_error() {
        let log = create_test_log();

        let id = log.create().unwrap();
        log.conclude(id, SyncStatus::Error, "server error 500")
            .unwrap();
        let _running = log.create().unwrap();

        assert!(log.last_successful().unwrap().is_none());

        let id = log.create().unwrap();
        log.conclude(id, SyncStatus::Ok, "no updates were found")
            .unwrap();

        let last = log.last_successful().unwrap();
        assert!(last.is_some());
    }

    #[test]
    fn test_last_successful_is_most_recent_ok() {
        let log = create_test_log();

        let first = log.create().unwrap();
        log.conclude(first, SyncStatus::Ok, "ok").unwrap();
        let second = log.create().unwrap();
        log.conclude(second, SyncStatus::Ok, "ok").unwrap();

        let attempts = log.recent(10).unwrap();
        let last = log.last_successful().unwrap().unwrap();
        // Most recent attempt is listed first and defines last-successful
        assert_eq!(attempts[0].id, second);
        assert_eq!(last, attempts[0].timestamp);
    }

    #[test]
    fn test_recent_respects_limit() {
        let log = create_test_log();
        for _ in 0..5 {
            log.create().unwrap();
        }

        assert_eq!(log.recent(3).unwrap().len(), 3);
        assert_eq!(log.recent(10).unwrap().len(), 5);
    }

    #[test]
    fn test_file_based_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("sync_log.db");

        let log = SqliteSyncLog::new(&db_path).unwrap();
        let id = log.create().unwrap();
        log.conclude(id, SyncStatus::Ok, "done").unwrap();
        assert!(db_path.exists());

        drop(log);
        let reopened = SqliteSyncLog::new(&db_path).unwrap();
        assert!(reopened.last_successful().unwrap().is_some());
    }
}
