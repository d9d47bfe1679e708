//! Path-record persistence.
//!
//! Every decoded path is upserted with the time it was seen; listing orders
//! pinned records first, then by recency. The table is keyed by the path
//! string itself; a path has no identity beyond its value.

use std::path::Path;

use chrono::DateTime;
use chrono::Utc;
use rusqlite::Connection;
use rusqlite::params;
use serde::Serialize;

use crate::error::Result;

/// One tracked path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRecord {
    /// Filesystem path string.
    pub path: String,
    /// Pinned records sort before everything else.
    pub pinned: bool,
    /// Last time the path appeared in a decode or was manually added.
    pub last_seen: DateTime<Utc>,
}

/// SQLite-backed store of discovered paths.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Opens (and initializes if needed) a store at the given file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS path_record (
                path TEXT PRIMARY KEY,
                pinned INTEGER NOT NULL DEFAULT 0,
                last_seen INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Inserts a path or refreshes its last-seen time, leaving the pinned
    /// flag untouched.
    pub fn upsert(&self, path: &str, seen: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO path_record (path, pinned, last_seen) VALUES (?1, 0, ?2)
             ON CONFLICT(path) DO UPDATE SET last_seen = excluded.last_seen",
            params![path, seen.timestamp()],
        )?;
        Ok(())
    }

    /// Upserts every path in the slice with the same timestamp and returns
    /// how many were recorded.
    pub fn sync(&self, paths: &[String], seen: DateTime<Utc>) -> Result<usize> {
        for path in paths {
            self.upsert(path, seen)?;
        }
        Ok(paths.len())
    }

    /// Lists all records, pinned first, then most recently seen, then by
    /// path for a stable order.
    pub fn list_all(&self) -> Result<Vec<PathRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, pinned, last_seen FROM path_record
             ORDER BY pinned DESC, last_seen DESC, path ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, bool>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (path, pinned, last_seen) = row?;
            records.push(PathRecord {
                path,
                pinned,
                last_seen: DateTime::from_timestamp(last_seen, 0).unwrap_or_default(),
            });
        }
        Ok(records)
    }

    /// Sets or clears the pinned flag; returns `false` when the path is not
    /// tracked.
    pub fn set_pinned(&self, path: &str, pinned: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE path_record SET pinned = ?2 WHERE path = ?1",
            params![path, pinned],
        )?;
        Ok(changed > 0)
    }

    /// Removes every record and returns how many were deleted.
    pub fn delete_all(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM path_record", [])?;
        Ok(deleted)
    }
}
