//! Append-only version history
//!
//! Before any write to a tender or bid row, the row as it stands is copied
//! into `tender_history` / `bid_history` under its current version. The live
//! table only ever holds the newest version, so the history of an entity at
//! version N has exactly N - 1 rows.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::entity::{Bid, Tender};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::identity::generate_id;
use crate::core::store::{FromRow, BID_COLUMNS, TENDER_COLUMNS};

/// Which versioned table an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tender,
    Bid,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Tender => "tender",
            EntityKind::Bid => "bid",
        }
    }

    pub fn history_table(self) -> &'static str {
        match self {
            EntityKind::Tender => "tender_history",
            EntityKind::Bid => "bid_history",
        }
    }

    /// Column in the history table that points back at the live row
    pub fn key_column(self) -> &'static str {
        match self {
            EntityKind::Tender => "tender_id",
            EntityKind::Bid => "bid_id",
        }
    }

    /// Live-table columns in `FromRow` order
    pub fn columns(self) -> &'static str {
        match self {
            EntityKind::Tender => TENDER_COLUMNS,
            EntityKind::Bid => BID_COLUMNS,
        }
    }

    /// Every column except the id, shared verbatim by live and history tables
    fn payload_columns(self) -> &'static str {
        let columns = self.columns();
        columns.strip_prefix("id, ").unwrap_or(columns)
    }

    /// Error reported when an entity of this kind is missing
    pub fn not_found(self) -> ServiceError {
        match self {
            EntityKind::Tender => ServiceError::NoSuchTender,
            EntityKind::Bid => ServiceError::NoSuchBid,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// An entity stored with a live row plus history snapshots
pub trait Versioned: FromRow {
    const KIND: EntityKind;

    fn version(&self) -> i64;
}

impl Versioned for Tender {
    const KIND: EntityKind = EntityKind::Tender;

    fn version(&self) -> i64 {
        self.version
    }
}

impl Versioned for Bid {
    const KIND: EntityKind = EntityKind::Bid;

    fn version(&self) -> i64 {
        self.version
    }
}

/// Read the live row for `id`
pub fn fetch<T: Versioned>(conn: &Connection, id: &str) -> ServiceResult<Option<T>> {
    let kind = T::KIND;
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        kind.columns(),
        kind.table()
    );
    Ok(conn.query_row(&sql, [id], T::from_row).optional()?)
}

/// Read the live row for `id`, failing with the kind's not-found error
pub fn require<T: Versioned>(conn: &Connection, id: &str) -> ServiceResult<T> {
    fetch(conn, id)?.ok_or_else(|| T::KIND.not_found())
}

/// Snapshot writer and reader over one connection or transaction
pub struct HistoryRecorder<'c> {
    conn: &'c Connection,
}

impl<'c> HistoryRecorder<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Copy the current row of `id` into its history table
    ///
    /// Must run on the same transaction as the write that follows, so a
    /// snapshot never lands without its version bump.
    pub fn snapshot_before_write(&self, kind: EntityKind, id: &str) -> ServiceResult<()> {
        let payload = kind.payload_columns();
        let sql = format!(
            "INSERT INTO {history} (id, {key}, {payload})
             SELECT ?1, id, {payload} FROM {table} WHERE id = ?2",
            history = kind.history_table(),
            key = kind.key_column(),
            table = kind.table(),
        );
        let copied = self.conn.execute(&sql, params![generate_id(), id])?;
        if copied == 0 {
            return Err(kind.not_found());
        }
        tracing::debug!(%kind, id, "history snapshot");
        Ok(())
    }

    /// The snapshot of `id` taken at `version`
    pub fn get_version<T: Versioned>(&self, id: &str, version: i64) -> ServiceResult<Option<T>> {
        let kind = T::KIND;
        let sql = format!(
            "SELECT {key}, {payload} FROM {history} WHERE {key} = ?1 AND version = ?2",
            key = kind.key_column(),
            payload = kind.payload_columns(),
            history = kind.history_table(),
        );
        Ok(self
            .conn
            .query_row(&sql, params![id, version], T::from_row)
            .optional()?)
    }

    /// All snapshots of `id`, oldest first
    pub fn list_versions<T: Versioned>(&self, id: &str) -> ServiceResult<Vec<T>> {
        let kind = T::KIND;
        let sql = format!(
            "SELECT {key}, {payload} FROM {history} WHERE {key} = ?1 ORDER BY version",
            key = kind.key_column(),
            payload = kind.payload_columns(),
            history = kind.history_table(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([id], T::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of snapshots held for `id`
    pub fn count(&self, kind: EntityKind, id: &str) -> ServiceResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            kind.history_table(),
            kind.key_column()
        );
        Ok(self.conn.query_row(&sql, [id], |row| row.get(0))?)
    }
}
