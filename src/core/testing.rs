//! Shared in-memory fixture for unit tests
//!
//! Two organizations with two members each, plus two unaffiliated employees:
//!
//! | employee | membership |
//! |----------|------------|
//! | alice, anna | `org_a` (LLC) |
//! | bob, bianca | `org_b` (JSC) |
//! | carol, dave | none |

use rusqlite::Connection;

use crate::core::config::{Config, WorkflowConfig};
use crate::core::entity::{AuthorType, OrganizationType, ServiceType, TenderStatus};
use crate::core::service::{NewBid, NewTender, TenderService};
use crate::core::store::Store;

pub(crate) struct Fixture {
    pub service: TenderService,
    pub org_a: String,
    pub org_b: String,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_workflow(WorkflowConfig::default())
    }

    pub fn with_workflow(workflow: WorkflowConfig) -> Self {
        let config = Config {
            workflow,
            ..Config::default()
        };
        let mut service = TenderService::new(Store::open_in_memory().unwrap(), &config);

        let mut directory = service.directory();
        for username in ["alice", "anna", "bob", "bianca", "carol", "dave"] {
            directory.add_employee(username, None, None).unwrap();
        }
        let org_a = directory
            .add_organization("Acme Builders", Some("General contractor"), OrganizationType::Llc)
            .unwrap()
            .id;
        let org_b = directory
            .add_organization("Bolt Logistics", None, OrganizationType::Jsc)
            .unwrap()
            .id;
        for (org, username) in [
            (&org_a, "alice"),
            (&org_a, "anna"),
            (&org_b, "bob"),
            (&org_b, "bianca"),
        ] {
            directory.add_member(org, username).unwrap();
        }

        Self {
            service,
            org_a,
            org_b,
        }
    }

    pub fn conn(&self) -> &Connection {
        self.service.store().conn()
    }

    pub fn employee_id(&self, username: &str) -> String {
        self.conn()
            .query_row(
                "SELECT id FROM employee WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .unwrap()
    }

    pub fn add_member(&mut self, organization_id: &str, username: &str) {
        self.service
            .directory()
            .add_member(organization_id, username)
            .unwrap();
    }

    /// A `Created` construction tender
    pub fn tender_for(&mut self, organization_id: &str, username: &str, name: &str) -> String {
        self.service
            .create_tender(
                NewTender {
                    name: name.to_string(),
                    description: format!("{name} description"),
                    service_type: ServiceType::Construction,
                    organization_id: organization_id.to_string(),
                },
                username,
            )
            .unwrap()
            .id
    }

    pub fn publish(&mut self, tender_id: &str, username: &str) {
        self.service
            .update_tender_status(tender_id, TenderStatus::Published, username)
            .unwrap();
    }

    /// A `Created` organization bid authored by `username`
    pub fn bid_by(&mut self, username: &str, tender_id: &str, name: &str) -> String {
        let author_id = self.employee_id(username);
        self.service
            .create_bid(NewBid {
                name: name.to_string(),
                description: format!("{name} description"),
                tender_id: tender_id.to_string(),
                author_type: AuthorType::Organization,
                author_id,
            })
            .unwrap()
            .id
    }
}
