//! Bid operations and decisions

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, OptionalExtension};

use super::{require_rights, require_user, write_version, Page, TenderService};
use crate::core::auth::AuthorizationResolver;
use crate::core::entity::{AuthorType, Bid, BidStatus, Decision, Tender, TenderStatus, Verdict};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::history::{require, HistoryRecorder};
use crate::core::identity::generate_id;
use crate::core::store::{FromRow, BID_COLUMNS};
use crate::core::workflow::Lifecycle;

/// Input for a new bid
///
/// `author_id` is an employee id; for organization bids it is the employee
/// submitting on the organization's behalf.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub name: String,
    pub description: String,
    pub tender_id: String,
    pub author_type: AuthorType,
    pub author_id: String,
}

/// Fields to change on a bid; `None` and empty strings leave a field as is
#[derive(Debug, Clone, Default)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<BidStatus>,
}

impl BidPatch {
    fn changes(&self) -> Vec<(&'static str, &dyn ToSql)> {
        let mut changes: Vec<(&'static str, &dyn ToSql)> = Vec::new();
        if let Some(name) = self.name.as_ref().filter(|s| !s.is_empty()) {
            changes.push(("name", name as &dyn ToSql));
        }
        if let Some(description) = self.description.as_ref().filter(|s| !s.is_empty()) {
            changes.push(("description", description as &dyn ToSql));
        }
        if let Some(status) = self.status.as_ref() {
            changes.push(("status", status as &dyn ToSql));
        }
        changes
    }
}

impl From<&Bid> for BidPatch {
    fn from(snapshot: &Bid) -> Self {
        Self {
            name: Some(snapshot.name.clone()),
            description: Some(snapshot.description.clone()),
            status: Some(snapshot.status),
        }
    }
}

impl TenderService {
    /// Submit a bid; the author may not bid on a tender their organization owns
    pub fn create_bid(&mut self, new: NewBid) -> ServiceResult<Bid> {
        let tx = self.store.transaction()?;
        let author: Option<String> = tx
            .query_row(
                "SELECT username FROM employee WHERE id = ?1",
                [&new.author_id],
                |row| row.get(0),
            )
            .optional()?;
        let author = author.ok_or(ServiceError::NoSuchUser)?;

        let auth = AuthorizationResolver::new(&tx);
        if !auth.tender_exists(&new.tender_id)? {
            return Err(ServiceError::NoSuchTender);
        }
        require_rights(
            !auth.is_responsible_for_tender(&author, &new.tender_id)?,
            &author,
            &new.tender_id,
        )?;

        let now = Utc::now();
        let bid = Bid {
            id: generate_id(),
            name: new.name,
            description: new.description,
            status: BidStatus::Created,
            tender_id: new.tender_id,
            author_type: new.author_type,
            author_id: new.author_id,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            &format!("INSERT INTO bid ({BID_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            params![
                bid.id,
                bid.name,
                bid.description,
                bid.status,
                bid.tender_id,
                bid.author_type,
                bid.author_id,
                bid.version,
                bid.created_at,
                bid.updated_at
            ],
        )?;
        tx.commit()?;

        tracing::info!(id = %bid.id, tender_id = %bid.tender_id, author = %author, "bid created");
        Ok(bid)
    }

    /// Read a bid; `Created` and `Canceled` bids only for those responsible
    pub fn get_bid(&self, bid_id: &str, username: &str) -> ServiceResult<Bid> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        let bid: Bid = require(conn, bid_id)?;

        if bid.status.is_gated() {
            require_rights(
                auth.is_responsible_for_bid(username, bid_id)?,
                username,
                bid_id,
            )?;
        }
        Ok(bid)
    }

    pub fn get_bid_status(&self, bid_id: &str, username: &str) -> ServiceResult<BidStatus> {
        self.get_bid(bid_id, username).map(|b| b.status)
    }

    /// Set a bid's status as a new version
    pub fn update_bid_status(
        &mut self,
        bid_id: &str,
        status: BidStatus,
        username: &str,
    ) -> ServiceResult<Bid> {
        let machine = self.machine;
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        let current: Bid = require(&tx, bid_id)?;
        require_rights(auth.can_edit_bid(username, bid_id)?, username, bid_id)?;
        machine.check(current.status, status)?;

        let value: &dyn ToSql = &status;
        let updated = write_version(&tx, bid_id, &[("status", value)])?;
        tx.commit()?;
        Ok(updated)
    }

    /// Apply the non-empty fields of `patch` as a new version
    ///
    /// A status in the patch goes through the transition policy.
    pub fn edit_bid(&mut self, bid_id: &str, patch: &BidPatch, username: &str) -> ServiceResult<Bid> {
        let machine = self.machine;
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        let current: Bid = require(&tx, bid_id)?;
        require_rights(auth.can_edit_bid(username, bid_id)?, username, bid_id)?;
        if let Some(status) = patch.status {
            machine.check(current.status, status)?;
        }

        let updated = write_version(&tx, bid_id, &patch.changes())?;
        tx.commit()?;
        Ok(updated)
    }

    /// Re-apply the fields of an earlier version as a new version
    pub fn rollback_bid(&mut self, bid_id: &str, version: i64, username: &str) -> ServiceResult<Bid> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        if !auth.bid_exists(bid_id)? {
            return Err(ServiceError::NoSuchBid);
        }
        let snapshot: Bid = HistoryRecorder::new(&tx)
            .get_version(bid_id, version)?
            .ok_or(ServiceError::NoSuchVersion)?;
        require_rights(auth.can_edit_bid(username, bid_id)?, username, bid_id)?;

        let patch = BidPatch::from(&snapshot);
        let updated = write_version(&tx, bid_id, &patch.changes())?;
        tx.commit()?;

        tracing::info!(id = bid_id, from_version = version, "bid rolled back");
        Ok(updated)
    }

    /// Earlier versions of a bid, oldest first
    pub fn bid_history(&self, bid_id: &str, username: &str) -> ServiceResult<Vec<Bid>> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        if !auth.bid_exists(bid_id)? {
            return Err(ServiceError::NoSuchBid);
        }
        require_rights(
            auth.is_responsible_for_bid(username, bid_id)?,
            username,
            bid_id,
        )?;
        HistoryRecorder::new(conn).list_versions(bid_id)
    }

    /// Bids authored by `username`, by name
    ///
    /// An empty username matches nobody and yields an empty list.
    pub fn list_my_bids(&self, page: Page, username: &str) -> ServiceResult<Vec<Bid>> {
        let conn = self.store.conn();
        if !username.is_empty() {
            require_user(&AuthorizationResolver::new(conn), username)?;
        }

        let mut stmt = conn.prepare(
            "SELECT b.id, b.name, b.description, b.status, b.tender_id, b.author_type,
                    b.author_id, b.version, b.created_at, b.updated_at
             FROM bid b
             JOIN employee e ON e.id = b.author_id
             WHERE e.username = ?1
             ORDER BY b.name, b.id
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![username, page.limit, page.offset], Bid::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Bids on a tender that `username` may see, by name
    ///
    /// Once the tender is no longer published only its organization may list.
    /// A page with nothing visible on it is reported as `NoSuchBid`.
    pub fn list_bids_for_tender(
        &self,
        tender_id: &str,
        username: &str,
        page: Page,
    ) -> ServiceResult<Vec<Bid>> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        let tender: Tender = require(conn, tender_id)?;
        if tender.status != TenderStatus::Published {
            require_rights(
                auth.is_responsible_for_tender(username, tender_id)?,
                username,
                tender_id,
            )?;
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {BID_COLUMNS} FROM bid WHERE tender_id = ?1 ORDER BY name, id"
        ))?;
        let all = stmt
            .query_map([tender_id], Bid::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut visible = Vec::with_capacity(all.len());
        for bid in all {
            if auth.is_responsible_for_bid(username, &bid.id)? {
                visible.push(bid);
            }
        }

        let bids = page.slice(visible);
        if bids.is_empty() {
            return Err(ServiceError::NoSuchBid);
        }
        Ok(bids)
    }

    /// Record a verdict on a bid; approving closes the bid's tender
    ///
    /// The bid itself is returned unchanged. The tender's move to `Closed` is
    /// a versioned write in the same transaction and ignores the transition
    /// policy.
    pub fn submit_decision(
        &mut self,
        bid_id: &str,
        verdict: Verdict,
        username: &str,
    ) -> ServiceResult<Bid> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        let bid: Bid = require(&tx, bid_id)?;
        require_rights(
            auth.is_responsible_for_tender(username, &bid.tender_id)?,
            username,
            &bid.tender_id,
        )?;

        let decision = Decision {
            id: generate_id(),
            bid_id: bid.id.clone(),
            decision: verdict,
            created_by: username.to_string(),
            created_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO decisions (id, bid_id, decision, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                decision.id,
                decision.bid_id,
                decision.decision,
                decision.created_at,
                decision.created_by
            ],
        )?;

        if verdict == Verdict::Approved {
            let closed: &dyn ToSql = &TenderStatus::Closed;
            write_version::<Tender>(&tx, &bid.tender_id, &[("status", closed)])?;
        }
        tx.commit()?;

        tracing::info!(bid_id, %verdict, username, "decision recorded");
        Ok(bid)
    }

    /// Verdicts recorded on a bid, oldest first
    pub fn bid_decisions(&self, bid_id: &str, username: &str) -> ServiceResult<Vec<Decision>> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        if !auth.bid_exists(bid_id)? {
            return Err(ServiceError::NoSuchBid);
        }
        require_rights(
            auth.is_responsible_for_bid(username, bid_id)?,
            username,
            bid_id,
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, bid_id, decision, created_by, created_at
             FROM decisions WHERE bid_id = ?1
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([bid_id], Decision::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorkflowConfig;
    use crate::core::history::EntityKind;
    use crate::core::testing::Fixture;

    fn published_tender(fx: &mut Fixture) -> String {
        let org_a = fx.org_a.clone();
        let tender = fx.tender_for(&org_a, "alice", "Warehouse");
        fx.publish(&tender, "alice");
        tender
    }

    #[test]
    fn test_create_bid_checks() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bob_id = fx.employee_id("bob");
        let anna_id = fx.employee_id("anna");

        let new_bid = |tender_id: &str, author_id: &str| NewBid {
            name: "Offer".to_string(),
            description: "We can do it".to_string(),
            tender_id: tender_id.to_string(),
            author_type: AuthorType::Organization,
            author_id: author_id.to_string(),
        };

        let bid = fx.service.create_bid(new_bid(&tender, &bob_id)).unwrap();
        assert_eq!(bid.version, 1);
        assert_eq!(bid.status, BidStatus::Created);

        assert!(matches!(
            fx.service.create_bid(new_bid(&tender, "nobody")),
            Err(ServiceError::NoSuchUser)
        ));
        assert!(matches!(
            fx.service.create_bid(new_bid("missing", &bob_id)),
            Err(ServiceError::NoSuchTender)
        ));
        // the tender's own organization cannot bid on it
        assert!(matches!(
            fx.service.create_bid(new_bid(&tender, &anna_id)),
            Err(ServiceError::InsufficientRights)
        ));
    }

    #[test]
    fn test_created_bid_status_is_gated() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        for user in ["bob", "bianca", "alice"] {
            assert_eq!(
                fx.service.get_bid_status(&bid, user).unwrap(),
                BidStatus::Created
            );
        }
        assert!(matches!(
            fx.service.get_bid_status(&bid, "carol"),
            Err(ServiceError::InsufficientRights)
        ));

        fx.service
            .update_bid_status(&bid, BidStatus::Published, "bianca")
            .unwrap();
        assert_eq!(
            fx.service.get_bid_status(&bid, "carol").unwrap(),
            BidStatus::Published
        );
        assert!(matches!(
            fx.service.get_bid_status("missing", "carol"),
            Err(ServiceError::NoSuchBid)
        ));
    }

    #[test]
    fn test_only_coworkers_update_bids() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        assert!(matches!(
            fx.service
                .update_bid_status(&bid, BidStatus::Canceled, "alice"),
            Err(ServiceError::InsufficientRights)
        ));
        assert!(matches!(
            fx.service.edit_bid(
                &bid,
                &BidPatch {
                    name: Some("Hijacked".to_string()),
                    ..Default::default()
                },
                "alice"
            ),
            Err(ServiceError::InsufficientRights)
        ));

        let canceled = fx
            .service
            .update_bid_status(&bid, BidStatus::Canceled, "bob")
            .unwrap();
        assert_eq!(canceled.version, 2);
    }

    #[test]
    fn test_enforced_bid_transitions() {
        let mut fx = Fixture::with_workflow(WorkflowConfig {
            enforce_transitions: true,
        });
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        assert!(matches!(
            fx.service
                .update_bid_status(&bid, BidStatus::Approved, "bob"),
            Err(ServiceError::InvalidTransition { .. })
        ));
        fx.service
            .update_bid_status(&bid, BidStatus::Published, "bob")
            .unwrap();
        let approved = fx
            .service
            .update_bid_status(&bid, BidStatus::Approved, "bob")
            .unwrap();
        assert_eq!(approved.version, 3);
    }

    #[test]
    fn test_enforced_transitions_apply_to_bid_edits() {
        let mut fx = Fixture::with_workflow(WorkflowConfig {
            enforce_transitions: true,
        });
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        let skip = BidPatch {
            status: Some(BidStatus::Approved),
            ..Default::default()
        };
        assert!(matches!(
            fx.service.edit_bid(&bid, &skip, "bob"),
            Err(ServiceError::InvalidTransition { .. })
        ));

        let step = BidPatch {
            description: Some("Faster".into()),
            status: Some(BidStatus::Published),
            ..Default::default()
        };
        let edited = fx.service.edit_bid(&bid, &step, "bob").unwrap();
        assert_eq!(edited.status, BidStatus::Published);
        assert_eq!(edited.version, 2);
    }

    #[test]
    fn test_version_counts_every_mutation() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        fx.service
            .edit_bid(
                &bid,
                &BidPatch {
                    description: Some("Cheaper".to_string()),
                    ..Default::default()
                },
                "bob",
            )
            .unwrap();
        fx.service
            .update_bid_status(&bid, BidStatus::Published, "bianca")
            .unwrap();
        let latest = fx.service.rollback_bid(&bid, 1, "bob").unwrap();

        assert_eq!(latest.version, 4);
        assert_eq!(latest.description, "Offer description");
        assert_eq!(latest.status, BidStatus::Created);
        assert_eq!(
            HistoryRecorder::new(fx.conn())
                .count(EntityKind::Bid, &bid)
                .unwrap(),
            3
        );
        assert_eq!(fx.service.bid_history(&bid, "alice").unwrap().len(), 3);
    }

    #[test]
    fn test_rollback_bid_unknown_version() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        assert!(matches!(
            fx.service.rollback_bid(&bid, 1, "bob"),
            Err(ServiceError::NoSuchVersion)
        ));
        assert!(matches!(
            fx.service.rollback_bid("missing", 1, "bob"),
            Err(ServiceError::NoSuchBid)
        ));
    }

    #[test]
    fn test_list_my_bids() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        fx.bid_by("bob", &tender, "Zeta");
        fx.bid_by("bob", &tender, "Alpha");
        fx.bid_by("bianca", &tender, "Other");

        let page = Page::default();
        let names: Vec<String> = fx
            .service
            .list_my_bids(page, "bob")
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert!(fx.service.list_my_bids(page, "").unwrap().is_empty());
        assert!(matches!(
            fx.service.list_my_bids(page, "ghost"),
            Err(ServiceError::NoSuchUser)
        ));
    }

    #[test]
    fn test_list_bids_for_tender_visibility() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        fx.bid_by("bob", &tender, "Offer");
        let page = Page::default();

        assert_eq!(
            fx.service
                .list_bids_for_tender(&tender, "alice", page)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            fx.service
                .list_bids_for_tender(&tender, "bianca", page)
                .unwrap()
                .len(),
            1
        );
        // may list, but sees nothing
        assert!(matches!(
            fx.service.list_bids_for_tender(&tender, "carol", page),
            Err(ServiceError::NoSuchBid)
        ));
        assert!(matches!(
            fx.service.list_bids_for_tender("missing", "carol", page),
            Err(ServiceError::NoSuchTender)
        ));
    }

    #[test]
    fn test_approval_closes_tender() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        assert!(matches!(
            fx.service.submit_decision(&bid, Verdict::Approved, "bob"),
            Err(ServiceError::InsufficientRights)
        ));

        let returned = fx
            .service
            .submit_decision(&bid, Verdict::Approved, "alice")
            .unwrap();
        assert_eq!(returned.status, BidStatus::Created);
        assert_eq!(returned.version, 1);

        let closed: Tender = require(fx.conn(), &tender).unwrap();
        assert_eq!(closed.status, TenderStatus::Closed);
        assert_eq!(closed.version, 3);

        let decisions = fx.service.bid_decisions(&bid, "bob").unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].decision, Verdict::Approved);
        assert_eq!(decisions[0].created_by, "alice");

        // the bidder's side can no longer list once the tender is closed
        assert!(matches!(
            fx.service
                .list_bids_for_tender(&tender, "bianca", Page::default()),
            Err(ServiceError::InsufficientRights)
        ));
    }

    #[test]
    fn test_rejection_leaves_tender_open() {
        let mut fx = Fixture::new();
        let tender = published_tender(&mut fx);
        let bid = fx.bid_by("bob", &tender, "Offer");

        fx.service
            .submit_decision(&bid, Verdict::Rejected, "anna")
            .unwrap();
        fx.service
            .submit_decision(&bid, Verdict::Rejected, "anna")
            .unwrap();

        let open: Tender = require(fx.conn(), &tender).unwrap();
        assert_eq!(open.status, TenderStatus::Published);
        assert_eq!(open.version, 2);
        assert_eq!(fx.service.bid_decisions(&bid, "anna").unwrap().len(), 2);
    }
}
