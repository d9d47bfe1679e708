//! Keyed persistence for authorized-directory bookmarks.
//!
//! The original design kept authorization bookmarks in global process state
//! keyed by string; this store makes that relationship explicit. Each key
//! (e.g. the recents file the user granted access to) maps to one bookmark
//! blob, and resolving through the store refreshes the stored blob when its
//! encoding no longer matches what [`bookmark::create`] would produce.

use std::path::Path;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use tracing::debug;
use tracing::warn;

use crate::error::Result;
use crate::formats::ResolvedBookmark;
use crate::formats::bookmark;

/// SQLite-backed keyed bookmark store.
pub struct BookmarkStore {
    conn: Connection,
}

impl BookmarkStore {
    /// Opens (and initializes if needed) a store at the given file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS authorized_bookmark (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Stores a bookmark blob under a key, replacing any previous blob.
    pub fn save(&self, key: &str, blob: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO authorized_bookmark (key, data) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data",
            params![key, blob],
        )?;
        Ok(())
    }

    /// Loads the raw blob stored under a key.
    pub fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blob = self
            .conn
            .query_row(
                "SELECT data FROM authorized_bookmark WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(blob)
    }

    /// Resolves the bookmark stored under a key.
    ///
    /// Returns `Ok(None)` when no blob is stored or the stored blob cannot
    /// be parsed (the latter is logged; a corrupt row should not take the
    /// caller down). A stale or drifted blob is re-minted from the resolved
    /// path and written back, so the stored encoding heals on the next
    /// resolve.
    pub fn resolve(&self, key: &str) -> Result<Option<ResolvedBookmark>> {
        let Some(blob) = self.load(key)? else {
            debug!(key, "no bookmark stored");
            return Ok(None);
        };
        let resolved = match bookmark::resolve(&blob) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(key, error = %err, "stored bookmark not resolvable");
                return Ok(None);
            }
        };

        if let Ok(fresh) = bookmark::create(&resolved.path)
            && fresh != blob
        {
            self.save(key, &fresh)?;
        }
        Ok(Some(resolved))
    }
}
