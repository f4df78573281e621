//! Employees, organizations and who belongs where
//!
//! Membership rows are the only place rights come from. Adding a member is
//! idempotent; removing one takes effect on the next authorization check.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::core::auth::AuthorizationResolver;
use crate::core::entity::{Employee, Organization, OrganizationType};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::identity::generate_id;
use crate::core::store::{FromRow, Store, EMPLOYEE_COLUMNS, ORGANIZATION_COLUMNS};

/// Registration handle borrowed from the service
pub struct Directory<'s> {
    store: &'s mut Store,
}

impl<'s> Directory<'s> {
    pub fn new(store: &'s mut Store) -> Self {
        Self { store }
    }

    pub fn add_employee(
        &mut self,
        username: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> ServiceResult<Employee> {
        if username.is_empty() {
            return Err(ServiceError::NoSuchUser);
        }

        let tx = self.store.transaction()?;
        if AuthorizationResolver::new(&tx).employee_exists(username)? {
            return Err(ServiceError::UsernameTaken(username.to_string()));
        }

        let now = Utc::now();
        let employee = Employee {
            id: generate_id(),
            username: username.to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            &format!("INSERT INTO employee ({EMPLOYEE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                employee.id,
                employee.username,
                employee.first_name,
                employee.last_name,
                employee.created_at,
                employee.updated_at
            ],
        )?;
        tx.commit()?;

        tracing::info!(id = %employee.id, username, "employee added");
        Ok(employee)
    }

    pub fn add_organization(
        &mut self,
        name: &str,
        description: Option<&str>,
        org_type: OrganizationType,
    ) -> ServiceResult<Organization> {
        let now = Utc::now();
        let organization = Organization {
            id: generate_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
            org_type,
            created_at: now,
            updated_at: now,
        };
        self.store.conn().execute(
            &format!(
                "INSERT INTO organization ({ORGANIZATION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                organization.id,
                organization.name,
                organization.description,
                organization.org_type,
                organization.created_at,
                organization.updated_at
            ],
        )?;

        tracing::info!(id = %organization.id, name, "organization added");
        Ok(organization)
    }

    /// Make `username` responsible for `organization_id`
    pub fn add_member(&mut self, organization_id: &str, username: &str) -> ServiceResult<()> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        let user_id = auth.employee_id(username)?.ok_or(ServiceError::NoSuchUser)?;
        if !auth.organization_exists(organization_id)? {
            return Err(ServiceError::NoSuchOrganization);
        }

        let added = tx.execute(
            "INSERT OR IGNORE INTO organization_responsible (id, organization_id, user_id)
             VALUES (?1, ?2, ?3)",
            params![generate_id(), organization_id, user_id],
        )?;
        tx.commit()?;

        if added > 0 {
            tracing::info!(organization_id, username, "member added");
        }
        Ok(())
    }

    /// Returns whether a membership was removed
    pub fn remove_member(&mut self, organization_id: &str, username: &str) -> ServiceResult<bool> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        let user_id = auth.employee_id(username)?.ok_or(ServiceError::NoSuchUser)?;
        if !auth.organization_exists(organization_id)? {
            return Err(ServiceError::NoSuchOrganization);
        }

        let removed = tx.execute(
            "DELETE FROM organization_responsible WHERE organization_id = ?1 AND user_id = ?2",
            params![organization_id, user_id],
        )?;
        tx.commit()?;

        if removed > 0 {
            tracing::info!(organization_id, username, "member removed");
        }
        Ok(removed > 0)
    }

    pub fn employee_by_username(&self, username: &str) -> ServiceResult<Employee> {
        self.store
            .conn()
            .query_row(
                &format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE username = ?1"),
                [username],
                Employee::from_row,
            )
            .optional()?
            .ok_or(ServiceError::NoSuchUser)
    }

    pub fn organization(&self, organization_id: &str) -> ServiceResult<Organization> {
        self.store
            .conn()
            .query_row(
                &format!("SELECT {ORGANIZATION_COLUMNS} FROM organization WHERE id = ?1"),
                [organization_id],
                Organization::from_row,
            )
            .optional()?
            .ok_or(ServiceError::NoSuchOrganization)
    }

    /// Members of an organization, by username
    pub fn list_members(&self, organization_id: &str) -> ServiceResult<Vec<Employee>> {
        let conn = self.store.conn();
        if !AuthorizationResolver::new(conn).organization_exists(organization_id)? {
            return Err(ServiceError::NoSuchOrganization);
        }

        let mut stmt = conn.prepare(
            "SELECT e.id, e.username, e.first_name, e.last_name, e.created_at, e.updated_at
             FROM employee e
             JOIN organization_responsible r ON r.user_id = e.id
             WHERE r.organization_id = ?1
             ORDER BY e.username",
        )?;
        let rows = stmt.query_map([organization_id], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
