//! Authorization resolver
//!
//! Rights are never stored on tenders or bids. Every answer is recomputed by
//! walking employee -> organization_responsible -> owning organization at the
//! moment of the call. Within a mutating operation the resolver is built on
//! the operation's transaction so the check and the write see the same rows.
//!
//! A `false` answer is not an error; callers turn it into
//! `ServiceError::InsufficientRights`. Existence is probed separately and must
//! be checked first.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::ServiceResult;

/// Point-in-time membership and responsibility queries
pub struct AuthorizationResolver<'c> {
    conn: &'c Connection,
}

impl<'c> AuthorizationResolver<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, sql: &str, params: impl rusqlite::Params) -> ServiceResult<bool> {
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }

    // =========================================================================
    // Existence probes
    // =========================================================================

    pub fn employee_exists(&self, username: &str) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM employee WHERE username = ?1)",
            [username],
        )
    }

    pub fn employee_id_exists(&self, employee_id: &str) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM employee WHERE id = ?1)",
            [employee_id],
        )
    }

    pub fn organization_exists(&self, organization_id: &str) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM organization WHERE id = ?1)",
            [organization_id],
        )
    }

    pub fn tender_exists(&self, tender_id: &str) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM tender WHERE id = ?1)",
            [tender_id],
        )
    }

    pub fn bid_exists(&self, bid_id: &str) -> ServiceResult<bool> {
        self.exists("SELECT EXISTS(SELECT 1 FROM bid WHERE id = ?1)", [bid_id])
    }

    /// Resolve a username to its employee id
    pub fn employee_id(&self, username: &str) -> ServiceResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM employee WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?)
    }

    // =========================================================================
    // Responsibility
    // =========================================================================

    /// The employee belongs to the organization
    pub fn is_organization_member(
        &self,
        username: &str,
        organization_id: &str,
    ) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(
                SELECT 1
                FROM organization_responsible r
                JOIN employee e ON e.id = r.user_id
                WHERE e.username = ?1 AND r.organization_id = ?2
            )",
            params![username, organization_id],
        )
    }

    /// The employee is a member of the organization that owns the tender
    ///
    /// Any of the employee's memberships counts, not just the first.
    pub fn is_responsible_for_tender(
        &self,
        username: &str,
        tender_id: &str,
    ) -> ServiceResult<bool> {
        let allowed = self.exists(
            "SELECT EXISTS(
                SELECT 1
                FROM tender t
                JOIN organization_responsible r ON r.organization_id = t.organization_id
                JOIN employee e ON e.id = r.user_id
                WHERE t.id = ?2 AND e.username = ?1
            )",
            params![username, tender_id],
        )?;
        tracing::debug!(username, tender_id, allowed, "tender responsibility");
        Ok(allowed)
    }

    /// The employee shares at least one organization with the bid's author
    ///
    /// This is the co-worker rule used for edits, status updates and rollbacks.
    /// An author with no memberships fails it even for their own bids.
    pub fn can_edit_bid(&self, username: &str, bid_id: &str) -> ServiceResult<bool> {
        let allowed = self.exists(
            "SELECT EXISTS(
                SELECT 1
                FROM bid b
                JOIN organization_responsible author_org ON author_org.user_id = b.author_id
                JOIN organization_responsible user_org
                    ON user_org.organization_id = author_org.organization_id
                JOIN employee e ON e.id = user_org.user_id
                WHERE b.id = ?2 AND e.username = ?1
            )",
            params![username, bid_id],
        )?;
        tracing::debug!(username, bid_id, allowed, "bid edit rights");
        Ok(allowed)
    }

    /// The employee may see the bid
    ///
    /// True for the bid's own author, for anyone sharing an organization with
    /// the author, and for anyone responsible for the bid's tender.
    pub fn is_responsible_for_bid(&self, username: &str, bid_id: &str) -> ServiceResult<bool> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT b.tender_id, e.username
                 FROM bid b
                 JOIN employee e ON e.id = b.author_id
                 WHERE b.id = ?1",
                [bid_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((tender_id, author)) = row else {
            return Ok(false);
        };

        if author == username {
            return Ok(true);
        }
        if self.can_edit_bid(username, bid_id)? {
            return Ok(true);
        }
        self.is_responsible_for_tender(username, &tender_id)
    }

    /// The employee has authored at least one bid on the tender
    pub fn has_bid_on_tender(&self, username: &str, tender_id: &str) -> ServiceResult<bool> {
        self.exists(
            "SELECT EXISTS(
                SELECT 1
                FROM bid b
                JOIN employee e ON e.id = b.author_id
                WHERE e.username = ?1 AND b.tender_id = ?2
            )",
            params![username, tender_id],
        )
    }
}
