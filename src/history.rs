use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::Session;

/// Number of practice sessions kept; older ones are pruned on insert.
pub const HISTORY_LIMIT: usize = 10;

/// Outcome of one practice run, as shown on the summary screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub date: DateTime<Local>,
    pub wpm: u32,
    pub accuracy: u32,
    /// Length of the practiced note in characters.
    pub length: usize,
}

impl SessionSummary {
    pub fn from_session(session: &Session, date: DateTime<Local>) -> Self {
        Self {
            date,
            wpm: session.wpm(),
            accuracy: session.accuracy(),
            length: session.reference_len(),
        }
    }
}

/// A stored summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: i64,
    pub summary: SessionSummary,
}

/// SQLite-backed practice history
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the history database in the user's state directory
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("typenotes_history.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS practice_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                length INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Store a summary and drop everything beyond the newest `HISTORY_LIMIT`.
    pub fn record(&self, summary: &SessionSummary) -> Result<SessionRecord> {
        self.conn.execute(
            "INSERT INTO practice_sessions (date, wpm, accuracy, length) VALUES (?1, ?2, ?3, ?4)",
            params![
                summary.date.to_rfc3339(),
                summary.wpm,
                summary.accuracy,
                summary.length as i64,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.conn.execute(
            r#"
            DELETE FROM practice_sessions
            WHERE id NOT IN (
                SELECT id FROM practice_sessions ORDER BY id DESC LIMIT ?1
            )
            "#,
            [HISTORY_LIMIT as i64],
        )?;

        Ok(SessionRecord {
            id,
            summary: summary.clone(),
        })
    }

    /// Stored sessions, newest first
    pub fn recent(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, wpm, accuracy, length FROM practice_sessions ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let date_str: String = row.get(1)?;
            let date = DateTime::parse_from_rfc3339(&date_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        1,
                        "date".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionRecord {
                id: row.get(0)?,
                summary: SessionSummary {
                    date,
                    wpm: row.get(2)?,
                    accuracy: row.get(3)?,
                    length: row.get::<_, i64>(4)?.max(0) as usize,
                },
            })
        })?;

        let records = rows.collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM practice_sessions", [])?;
        Ok(())
    }
}
