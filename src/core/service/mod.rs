//! Tender service - the one entry point the request layer talks to
//!
//! Every operation checks, in order: the acting user exists, the target
//! entity exists, the user has the needed responsibility. Mutating operations
//! do all of that, plus the history snapshot and the row update, on one
//! transaction.

mod bid;
mod feedback;
mod tender;

pub use bid::{BidPatch, NewBid};
pub use tender::{NewTender, TenderPatch};

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::Connection;

use crate::core::auth::AuthorizationResolver;
use crate::core::config::{Config, ListingConfig};
use crate::core::directory::Directory;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::history::{require, HistoryRecorder, Versioned};
use crate::core::store::Store;
use crate::core::workflow::StatusMachine;

/// Page of a listing, already validated against the listing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Validate caller-supplied paging, filling in the default limit
    pub fn new(limits: &ListingConfig, limit: Option<u32>, offset: Option<u32>) -> ServiceResult<Self> {
        let limit = limit.unwrap_or(limits.default_limit);
        if limit == 0 || limit > limits.max_limit {
            return Err(ServiceError::InvalidPage(format!(
                "limit must be between 1 and {}, got {}",
                limits.max_limit, limit
            )));
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    /// Apply to an already ordered, in-memory result
    fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: ListingConfig::default().default_limit,
            offset: 0,
        }
    }
}

/// Tenders, bids, decisions and reviews over one store
pub struct TenderService {
    store: Store,
    machine: StatusMachine,
    listing: ListingConfig,
}

impl TenderService {
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            machine: StatusMachine::new(config.workflow),
            listing: config.listing,
        }
    }

    /// Open the configured database and wrap it
    pub fn open(config: &Config) -> ServiceResult<Self> {
        let store = Store::from_config(&config.database)?;
        Ok(Self::new(store, config))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Validate paging against this service's listing limits
    pub fn page(&self, limit: Option<u32>, offset: Option<u32>) -> ServiceResult<Page> {
        Page::new(&self.listing, limit, offset)
    }

    /// Registration of employees, organizations and memberships
    pub fn directory(&mut self) -> Directory<'_> {
        Directory::new(&mut self.store)
    }

    /// Store round trip
    pub fn ping(&self) -> ServiceResult<()> {
        self.store.ping()
    }

    pub fn close(self) -> ServiceResult<()> {
        self.store.close()
    }
}

fn require_user(auth: &AuthorizationResolver<'_>, username: &str) -> ServiceResult<()> {
    if auth.employee_exists(username)? {
        Ok(())
    } else {
        Err(ServiceError::NoSuchUser)
    }
}

fn require_rights(allowed: bool, username: &str, entity_id: &str) -> ServiceResult<()> {
    if allowed {
        Ok(())
    } else {
        tracing::warn!(username, entity_id, "insufficient rights");
        Err(ServiceError::InsufficientRights)
    }
}

/// Snapshot the row, apply `changes`, bump the version and return the fresh row
///
/// Runs on the caller's transaction. An empty `changes` list still produces a
/// snapshot and a new version.
fn write_version<T: Versioned>(
    conn: &Connection,
    id: &str,
    changes: &[(&'static str, &dyn ToSql)],
) -> ServiceResult<T> {
    let kind = T::KIND;
    HistoryRecorder::new(conn).snapshot_before_write(kind, id)?;

    let mut assignments: Vec<String> = changes
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect();
    assignments.push("version = version + 1".to_string());
    assignments.push(format!("updated_at = ?{}", changes.len() + 1));

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        kind.table(),
        assignments.join(", "),
        changes.len() + 2
    );

    let now = Utc::now();
    let mut values: Vec<&dyn ToSql> = changes.iter().map(|(_, value)| *value).collect();
    values.push(&now);
    values.push(&id);
    conn.execute(&sql, values.as_slice())?;

    let row: T = require(conn, id)?;
    tracing::info!(%kind, id, version = row.version(), "new version written");
    Ok(row)
}
