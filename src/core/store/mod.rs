//! SQLite store handle
//!
//! One `Store` is opened per process and handed to the service. Every mutating
//! service operation runs inside a single IMMEDIATE transaction taken from
//! [`Store::transaction`], so the existence and rights checks, the history
//! snapshot and the row update commit or roll back together.

mod rows;
mod serialize;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::DatabaseConfig;
use crate::core::error::ServiceResult;

pub use rows::{FromRow, BID_COLUMNS, EMPLOYEE_COLUMNS, ORGANIZATION_COLUMNS, TENDER_COLUMNS};

/// Bumped whenever the table layout below changes
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS employee (
    id TEXT PRIMARY KEY,
    username VARCHAR(50) UNIQUE NOT NULL,
    first_name VARCHAR(50),
    last_name VARCHAR(50),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization (
    id TEXT PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    type TEXT NOT NULL CHECK (type IN ('IE', 'LLC', 'JSC')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization_responsible (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organization(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES employee(id) ON DELETE CASCADE,
    UNIQUE (organization_id, user_id)
);

CREATE TABLE IF NOT EXISTS tender (
    id TEXT PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    service_type TEXT NOT NULL CHECK (service_type IN ('Construction', 'Delivery', 'Manufacture')),
    status TEXT NOT NULL CHECK (status IN ('Created', 'Published', 'Closed')),
    organization_id TEXT NOT NULL REFERENCES organization(id) ON DELETE CASCADE,
    version INTEGER NOT NULL DEFAULT 1 CHECK (version >= 1),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tender_history (
    id TEXT PRIMARY KEY,
    tender_id TEXT NOT NULL REFERENCES tender(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    service_type TEXT NOT NULL,
    status TEXT NOT NULL,
    organization_id TEXT NOT NULL REFERENCES organization(id) ON DELETE CASCADE,
    version INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (tender_id, version)
);

CREATE TABLE IF NOT EXISTS bid (
    id TEXT PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('Created', 'Published', 'Canceled', 'Approved', 'Rejected')),
    tender_id TEXT NOT NULL REFERENCES tender(id) ON DELETE CASCADE,
    author_type TEXT NOT NULL CHECK (author_type IN ('Organization', 'User')),
    author_id TEXT NOT NULL REFERENCES employee(id),
    version INTEGER NOT NULL DEFAULT 1 CHECK (version >= 1),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bid_history (
    id TEXT PRIMARY KEY,
    bid_id TEXT NOT NULL REFERENCES bid(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    tender_id TEXT NOT NULL REFERENCES tender(id) ON DELETE CASCADE,
    author_type TEXT NOT NULL,
    author_id TEXT NOT NULL REFERENCES employee(id),
    version INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (bid_id, version)
);

CREATE TABLE IF NOT EXISTS decisions (
    id TEXT PRIMARY KEY,
    bid_id TEXT NOT NULL REFERENCES bid(id) ON DELETE CASCADE,
    decision VARCHAR(50) NOT NULL CHECK (decision IN ('Approved', 'Rejected')),
    created_at TEXT NOT NULL,
    created_by VARCHAR(100) NOT NULL REFERENCES employee(username)
);

CREATE TABLE IF NOT EXISTS bid_reviews (
    id TEXT PRIMARY KEY,
    bid_id TEXT NOT NULL REFERENCES bid(id) ON DELETE CASCADE,
    review TEXT NOT NULL,
    reviewer TEXT NOT NULL REFERENCES employee(id),
    created_at TEXT NOT NULL,
    bid_author_id TEXT NOT NULL REFERENCES employee(id)
);

CREATE INDEX IF NOT EXISTS idx_membership_user ON organization_responsible (user_id);
CREATE INDEX IF NOT EXISTS idx_tender_org ON tender (organization_id);
CREATE INDEX IF NOT EXISTS idx_tender_history_tender_id ON tender_history (tender_id);
CREATE INDEX IF NOT EXISTS idx_bid_tender ON bid (tender_id);
CREATE INDEX IF NOT EXISTS idx_bid_history_bid_id ON bid_history (bid_id);
CREATE INDEX IF NOT EXISTS idx_bid_history_version ON bid_history (bid_id, version);
CREATE INDEX IF NOT EXISTS idx_reviews_author ON bid_reviews (bid_author_id);
"#;

/// Owned connection to the tender database
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> ServiceResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open the database described by the `database` config section
    pub fn from_config(config: &DatabaseConfig) -> ServiceResult<Self> {
        Self::open(&config.path, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> ServiceResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> ServiceResult<Self> {
        // Cascades are off per connection unless asked for
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION],
        )?;
        tracing::debug!(path = ?path, "store opened");
        Ok(Self { conn, path })
    }

    /// Shared read access
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction
    ///
    /// IMMEDIATE takes the write lock up front so nothing changes between the
    /// checks and the write. Dropping the transaction without `commit` rolls
    /// it back.
    pub fn transaction(&mut self) -> ServiceResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Round-trip a trivial query
    pub fn ping(&self) -> ServiceResult<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown
    pub fn close(self) -> ServiceResult<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}
