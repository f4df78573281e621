//! Row mapping
//!
//! Column lists are positional: `from_row` reads by index, so every SELECT
//! that feeds it must list columns in exactly this order. History tables
//! carry the same columns with the entity id under `tender_id` / `bid_id`.

use rusqlite::Row;

use crate::core::entity::{Bid, Decision, Employee, Feedback, Organization, Tender};

pub const TENDER_COLUMNS: &str =
    "id, name, description, service_type, status, organization_id, version, created_at, updated_at";

pub const BID_COLUMNS: &str =
    "id, name, description, status, tender_id, author_type, author_id, version, created_at, updated_at";

pub const EMPLOYEE_COLUMNS: &str = "id, username, first_name, last_name, created_at, updated_at";

pub const ORGANIZATION_COLUMNS: &str = "id, name, description, type, created_at, updated_at";

/// Build a value from a result row
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl FromRow for Tender {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tender {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            service_type: row.get(3)?,
            status: row.get(4)?,
            organization_id: row.get(5)?,
            version: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl FromRow for Bid {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Bid {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            tender_id: row.get(4)?,
            author_type: row.get(5)?,
            author_id: row.get(6)?,
            version: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl FromRow for Employee {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Employee {
            id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for Organization {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Organization {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            org_type: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// `id, review, created_at` from `bid_reviews`
impl FromRow for Feedback {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Feedback {
            id: row.get(0)?,
            description: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

/// `id, bid_id, decision, created_by, created_at` from `decisions`
impl FromRow for Decision {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Decision {
            id: row.get(0)?,
            bid_id: row.get(1)?,
            decision: row.get(2)?,
            created_by: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
