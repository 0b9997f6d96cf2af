//! SQLite-backed cache implementation
//!
//! One database file holds both cache tables. `CacheDb` owns the connection
//! and hands out the two typed store handles; the handles share the
//! connection behind a mutex because walkers on separate tasks use them
//! concurrently.

use crate::cache::{cache_key, Cache, CacheError, CacheResult};
use crate::record::BookRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// The shared cache database
pub struct CacheDb {
    conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
    /// Opens or creates the cache database at the given path
    pub fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// The raw page content store
    pub fn page_cache(&self) -> SqlitePageCache {
        SqlitePageCache {
            conn: Arc::clone(&self.conn),
        }
    }

    /// The extracted record store
    pub fn record_cache(&self) -> SqliteRecordCache {
        SqliteRecordCache {
            conn: Arc::clone(&self.conn),
        }
    }

    /// Number of cached raw pages
    pub fn count_pages(&self) -> CacheResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM page_cache", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of cached records
    pub fn count_records(&self) -> CacheResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM record_cache", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of cached records missing the source URL field
    ///
    /// These are pre-schema-migration entries the pipeline will repair on
    /// next access.
    pub fn count_incomplete_records(&self) -> CacheResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM record_cache WHERE source_url = ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS page_cache (
            url_key     TEXT PRIMARY KEY,
            url         TEXT NOT NULL,
            content     TEXT NOT NULL,
            fetched_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record_cache (
            url_key           TEXT PRIMARY KEY,
            url               TEXT NOT NULL,
            book_name         TEXT NOT NULL,
            author_name       TEXT NOT NULL,
            edition_language  TEXT NOT NULL,
            source_url        TEXT NOT NULL,
            extracted_at      TEXT NOT NULL
        );
    ",
    )
}

/// SQLite store of raw fetched page content, keyed by detail URL
pub struct SqlitePageCache {
    conn: Arc<Mutex<Connection>>,
}

impl Cache<String> for SqlitePageCache {
    fn has(&self, url: &str) -> CacheResult<bool> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM page_cache WHERE url_key = ?1",
                params![cache_key(url)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(existing.is_some())
    }

    fn get(&self, url: &str) -> CacheResult<String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT content FROM page_cache WHERE url_key = ?1",
            params![cache_key(url)],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| CacheError::NotFound {
            url: url.to_string(),
        })
    }

    fn put(&self, url: &str, value: &String) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO page_cache (url_key, url, content, fetched_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url_key) DO UPDATE SET content = ?3, fetched_at = ?4",
            params![cache_key(url), url, value, now],
        )?;
        Ok(())
    }
}

/// SQLite store of extracted book records, keyed by detail URL
pub struct SqliteRecordCache {
    conn: Arc<Mutex<Connection>>,
}

impl Cache<BookRecord> for SqliteRecordCache {
    fn has(&self, url: &str) -> CacheResult<bool> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM record_cache WHERE url_key = ?1",
                params![cache_key(url)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(existing.is_some())
    }

    fn get(&self, url: &str) -> CacheResult<BookRecord> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT book_name, author_name, edition_language, source_url
             FROM record_cache WHERE url_key = ?1",
            params![cache_key(url)],
            |row| {
                Ok(BookRecord {
                    book_name: row.get(0)?,
                    author_name: row.get(1)?,
                    edition_language: row.get(2)?,
                    source_url: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| CacheError::NotFound {
            url: url.to_string(),
        })
    }

    fn put(&self, url: &str, value: &BookRecord) -> CacheResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO record_cache
                 (url_key, url, book_name, author_name, edition_language, source_url, extracted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url_key) DO UPDATE SET
                 book_name = ?3, author_name = ?4, edition_language = ?5,
                 source_url = ?6, extracted_at = ?7",
            params![
                cache_key(url),
                url,
                value.book_name,
                value.author_name,
                value.edition_language,
                value.source_url,
                now
            ],
        )?;
        Ok(())
    }
}
