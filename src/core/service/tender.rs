//! Tender operations

use chrono::Utc;
use rusqlite::params;
use rusqlite::types::ToSql;

use super::{require_rights, require_user, write_version, Page, TenderService};
use crate::core::auth::AuthorizationResolver;
use crate::core::entity::{ServiceType, Tender, TenderStatus};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::history::{fetch, require, HistoryRecorder};
use crate::core::identity::generate_id;
use crate::core::store::{FromRow, TENDER_COLUMNS};
use crate::core::workflow::Lifecycle;

/// Input for a new tender
#[derive(Debug, Clone)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub organization_id: String,
}

/// Fields to change on a tender; `None` and empty strings leave a field as is
#[derive(Debug, Clone, Default)]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<TenderStatus>,
}

impl TenderPatch {
    fn changes(&self) -> Vec<(&'static str, &dyn ToSql)> {
        let mut changes: Vec<(&'static str, &dyn ToSql)> = Vec::new();
        if let Some(name) = self.name.as_ref().filter(|s| !s.is_empty()) {
            changes.push(("name", name as &dyn ToSql));
        }
        if let Some(description) = self.description.as_ref().filter(|s| !s.is_empty()) {
            changes.push(("description", description as &dyn ToSql));
        }
        if let Some(service_type) = self.service_type.as_ref() {
            changes.push(("service_type", service_type as &dyn ToSql));
        }
        if let Some(status) = self.status.as_ref() {
            changes.push(("status", status as &dyn ToSql));
        }
        changes
    }
}

impl From<&Tender> for TenderPatch {
    fn from(snapshot: &Tender) -> Self {
        Self {
            name: Some(snapshot.name.clone()),
            description: Some(snapshot.description.clone()),
            service_type: Some(snapshot.service_type),
            status: Some(snapshot.status),
        }
    }
}

impl TenderService {
    /// Create a tender on behalf of a member of its organization
    pub fn create_tender(&mut self, new: NewTender, username: &str) -> ServiceResult<Tender> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        require_rights(
            auth.is_organization_member(username, &new.organization_id)?,
            username,
            &new.organization_id,
        )?;

        let now = Utc::now();
        let tender = Tender {
            id: generate_id(),
            name: new.name,
            description: new.description,
            service_type: new.service_type,
            status: TenderStatus::Created,
            organization_id: new.organization_id,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            &format!("INSERT INTO tender ({TENDER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                tender.id,
                tender.name,
                tender.description,
                tender.service_type,
                tender.status,
                tender.organization_id,
                tender.version,
                tender.created_at,
                tender.updated_at
            ],
        )?;
        tx.commit()?;

        tracing::info!(id = %tender.id, username, "tender created");
        Ok(tender)
    }

    /// Read a tender; `Created` and `Closed` tenders only for their organization
    pub fn get_tender(&self, tender_id: &str, username: &str) -> ServiceResult<Tender> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        let tender: Tender = require(conn, tender_id)?;

        if tender.status.is_gated() {
            require_rights(
                auth.is_responsible_for_tender(username, tender_id)?,
                username,
                tender_id,
            )?;
        }
        Ok(tender)
    }

    pub fn get_tender_status(&self, tender_id: &str, username: &str) -> ServiceResult<TenderStatus> {
        self.get_tender(tender_id, username).map(|t| t.status)
    }

    /// Set a tender's status as a new version
    pub fn update_tender_status(
        &mut self,
        tender_id: &str,
        status: TenderStatus,
        username: &str,
    ) -> ServiceResult<Tender> {
        let machine = self.machine;
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        let current: Tender = require(&tx, tender_id)?;
        require_rights(
            auth.is_responsible_for_tender(username, tender_id)?,
            username,
            tender_id,
        )?;
        machine.check(current.status, status)?;

        let value: &dyn ToSql = &status;
        let updated = write_version(&tx, tender_id, &[("status", value)])?;
        tx.commit()?;
        Ok(updated)
    }

    /// Apply the non-empty fields of `patch` as a new version
    ///
    /// A status in the patch goes through the same transition policy as
    /// `update_tender_status`.
    pub fn edit_tender(
        &mut self,
        tender_id: &str,
        patch: &TenderPatch,
        username: &str,
    ) -> ServiceResult<Tender> {
        let machine = self.machine;
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        let current: Tender = require(&tx, tender_id)?;
        require_rights(
            auth.is_responsible_for_tender(username, tender_id)?,
            username,
            tender_id,
        )?;
        if let Some(status) = patch.status {
            machine.check(current.status, status)?;
        }

        let updated = write_version(&tx, tender_id, &patch.changes())?;
        tx.commit()?;
        Ok(updated)
    }

    /// Re-apply the fields of an earlier version as a new version
    pub fn rollback_tender(
        &mut self,
        tender_id: &str,
        version: i64,
        username: &str,
    ) -> ServiceResult<Tender> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        require_user(&auth, username)?;
        if !auth.tender_exists(tender_id)? {
            return Err(ServiceError::NoSuchTender);
        }
        let snapshot: Tender = HistoryRecorder::new(&tx)
            .get_version(tender_id, version)?
            .ok_or(ServiceError::NoSuchVersion)?;
        require_rights(
            auth.is_responsible_for_tender(username, tender_id)?,
            username,
            tender_id,
        )?;

        let patch = TenderPatch::from(&snapshot);
        let updated = write_version(&tx, tender_id, &patch.changes())?;
        tx.commit()?;

        tracing::info!(id = tender_id, from_version = version, "tender rolled back");
        Ok(updated)
    }

    /// Earlier versions of a tender, oldest first
    pub fn tender_history(&self, tender_id: &str, username: &str) -> ServiceResult<Vec<Tender>> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, username)?;
        if fetch::<Tender>(conn, tender_id)?.is_none() {
            return Err(ServiceError::NoSuchTender);
        }
        require_rights(
            auth.is_responsible_for_tender(username, tender_id)?,
            username,
            tender_id,
        )?;
        HistoryRecorder::new(conn).list_versions(tender_id)
    }

    /// Published tenders, by name, optionally limited to some service types
    pub fn list_published(
        &self,
        page: Page,
        service_types: &[ServiceType],
    ) -> ServiceResult<Vec<Tender>> {
        let mut sql = format!("SELECT {TENDER_COLUMNS} FROM tender WHERE status = ?1");
        let mut values: Vec<&dyn ToSql> = vec![&TenderStatus::Published as &dyn ToSql];
        if !service_types.is_empty() {
            let placeholders: Vec<String> = (0..service_types.len())
                .map(|i| format!("?{}", i + 2))
                .collect();
            sql.push_str(&format!(" AND service_type IN ({})", placeholders.join(", ")));
            values.extend(service_types.iter().map(|s| s as &dyn ToSql));
        }
        let next = values.len();
        sql.push_str(&format!(
            " ORDER BY name, id LIMIT ?{} OFFSET ?{}",
            next + 1,
            next + 2
        ));
        values.push(&page.limit);
        values.push(&page.offset);

        let mut stmt = self.store.conn().prepare(&sql)?;
        let rows = stmt.query_map(values.as_slice(), Tender::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Tenders owned by any organization `username` belongs to, by name
    ///
    /// An empty username matches nobody and yields an empty list.
    pub fn list_my_tenders(&self, page: Page, username: &str) -> ServiceResult<Vec<Tender>> {
        let conn = self.store.conn();
        if !username.is_empty() {
            require_user(&AuthorizationResolver::new(conn), username)?;
        }

        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.service_type, t.status,
                    t.organization_id, t.version, t.created_at, t.updated_at
             FROM tender t
             JOIN organization_responsible r ON r.organization_id = t.organization_id
             JOIN employee e ON e.id = r.user_id
             WHERE e.username = ?1
             ORDER BY t.name, t.id
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![username, page.limit, page.offset], Tender::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
