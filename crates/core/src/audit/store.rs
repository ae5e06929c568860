use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Status of a sync attempt, stored as a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Started,
    Ok,
    Error,
}

impl SyncStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            SyncStatus::Started => "S",
            SyncStatus::Ok => "K",
            SyncStatus::Error => "E",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(SyncStatus::Started),
            "K" => Some(SyncStatus::Ok),
            "E" => Some(SyncStatus::Error),
            _ => None,
        }
    }
}

/// One synchronization attempt in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAttempt {
    pub id: i64,
    /// When the attempt started.
    pub timestamp: DateTime<Utc>,
    pub status: SyncStatus,
    /// Human-readable outcome (empty while the attempt is running).
    pub description: String,
}

/// Durable record of sync attempts.
///
/// One row is created at the start of every attempt and concluded in place to
/// its terminal status; rows are never deleted. Only `ok` rows define the
/// time of last successful sync.
pub trait SyncLogStore: Send + Sync {
    /// Insert a new `started` row, returning its id.
    fn create(&self) -> Result<i64, AuditError>;

    /// Conclude an attempt in place with its terminal status and description.
    fn conclude(&self, id: i64, status: SyncStatus, description: &str) -> Result<(), AuditError>;

    /// Timestamp of the most recent `ok` attempt, if any.
    fn last_successful(&self) -> Result<Option<DateTime<Utc>>, AuditError>;

    /// Most recent attempts, newest first.
    fn recent(&self, limit: u32) -> Result<Vec<SyncAttempt>, AuditError>;
}
