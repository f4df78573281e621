//! Library-level tests for the tender service over a file-backed store

use std::time::Duration;

use tdesk::core::{
    AuthorType, BidPatch, BidStatus, Config, NewBid, NewTender, OrganizationType, ServiceError,
    ServiceType, Store, TenderPatch, TenderService, TenderStatus, Verdict,
};
use tempfile::TempDir;

struct Market {
    _tmp: TempDir,
    service: TenderService,
    buyer_org: String,
    seller_org: String,
}

/// buyer: ivan (and olga) in "City Works"; seller: petr in "Fast Freight"; nina unaffiliated
fn market() -> Market {
    let tmp = TempDir::new().unwrap();
    let store = Store::open(tmp.path().join("market.db"), Duration::from_secs(1)).unwrap();
    let mut service = TenderService::new(store, &Config::default());

    let (buyer_org, seller_org) = {
        let mut dir = service.directory();
        for user in ["ivan", "olga", "petr", "nina"] {
            dir.add_employee(user, None, None).unwrap();
        }
        let buyer = dir
            .add_organization("City Works", None, OrganizationType::Jsc)
            .unwrap()
            .id;
        let seller = dir
            .add_organization("Fast Freight", Some("Carrier"), OrganizationType::Ie)
            .unwrap()
            .id;
        dir.add_member(&buyer, "ivan").unwrap();
        dir.add_member(&buyer, "olga").unwrap();
        dir.add_member(&seller, "petr").unwrap();
        (buyer, seller)
    };

    Market {
        _tmp: tmp,
        service,
        buyer_org,
        seller_org,
    }
}

impl Market {
    fn tender(&mut self, name: &str) -> String {
        let org = self.buyer_org.clone();
        self.service
            .create_tender(
                NewTender {
                    name: name.to_string(),
                    description: format!("{name} for the city"),
                    service_type: ServiceType::Delivery,
                    organization_id: org,
                },
                "ivan",
            )
            .unwrap()
            .id
    }

    fn published_tender(&mut self, name: &str) -> String {
        let id = self.tender(name);
        self.service
            .update_tender_status(&id, TenderStatus::Published, "ivan")
            .unwrap();
        id
    }

    fn bid(&mut self, username: &str, tender: &str, name: &str) -> String {
        let author_id = self
            .service
            .directory()
            .employee_by_username(username)
            .unwrap()
            .id;
        self.service
            .create_bid(NewBid {
                name: name.to_string(),
                description: format!("{name} terms"),
                tender_id: tender.to_string(),
                author_type: AuthorType::Organization,
                author_id,
            })
            .unwrap()
            .id
    }
}

// ============================================================================
// Versioning
// ============================================================================

#[test]
fn test_version_counts_writes() {
    let mut m = market();
    let tender = m.tender("Sand");

    m.service
        .update_tender_status(&tender, TenderStatus::Published, "ivan")
        .unwrap();
    m.service
        .edit_tender(
            &tender,
            &TenderPatch {
                description: Some("Fine sand".into()),
                ..Default::default()
            },
            "olga",
        )
        .unwrap();
    let last = m.service.rollback_tender(&tender, 1, "ivan").unwrap();

    assert_eq!(last.version, 4);
    let history = m.service.tender_history(&tender, "ivan").unwrap();
    let versions: Vec<i64> = history.iter().map(|t| t.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
}

#[test]
fn test_rollback_restores_fields_but_keeps_identity() {
    let mut m = market();
    let tender = m.published_tender("Sand");
    let original = m.service.get_tender(&tender, "ivan").unwrap();

    m.service
        .edit_tender(
            &tender,
            &TenderPatch {
                name: Some("Gravel".into()),
                service_type: Some(ServiceType::Manufacture),
                ..Default::default()
            },
            "ivan",
        )
        .unwrap();
    let restored = m.service.rollback_tender(&tender, 2, "ivan").unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.name, "Sand");
    assert_eq!(restored.service_type, ServiceType::Delivery);
    assert_eq!(restored.status, TenderStatus::Published);
    assert_eq!(restored.organization_id, original.organization_id);
    assert_eq!(restored.created_at, original.created_at);
    assert_eq!(restored.version, 4);
}

#[test]
fn test_failed_write_leaves_no_history() {
    let mut m = market();
    let tender = m.tender("Sand");

    let err = m
        .service
        .update_tender_status(&tender, TenderStatus::Published, "petr")
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientRights));
    assert!(m.service.tender_history(&tender, "ivan").unwrap().is_empty());
    assert_eq!(m.service.get_tender(&tender, "ivan").unwrap().version, 1);
}

#[test]
fn test_bid_rollback() {
    let mut m = market();
    let tender = m.published_tender("Sand");
    let bid = m.bid("petr", &tender, "Truckload");

    m.service
        .edit_bid(
            &bid,
            &BidPatch {
                name: Some("Two truckloads".into()),
                ..Default::default()
            },
            "petr",
        )
        .unwrap();
    m.service
        .update_bid_status(&bid, BidStatus::Published, "petr")
        .unwrap();
    let back = m.service.rollback_bid(&bid, 1, "petr").unwrap();

    assert_eq!(back.name, "Truckload");
    assert_eq!(back.status, BidStatus::Created);
    assert_eq!(back.version, 4);
    assert_eq!(m.service.bid_history(&bid, "petr").unwrap().len(), 3);
}

// ============================================================================
// Authorization
// ============================================================================

#[test]
fn test_visibility_truth_table() {
    let mut m = market();
    let tender = m.tender("Sand");

    // (user, sees unpublished tender)
    for (user, expected) in [("ivan", true), ("olga", true), ("petr", false), ("nina", false)] {
        let result = m.service.get_tender_status(&tender, user);
        assert_eq!(result.is_ok(), expected, "user {user}");
    }
    assert!(matches!(
        m.service.get_tender_status(&tender, "ghost"),
        Err(ServiceError::NoSuchUser)
    ));

    m.service
        .update_tender_status(&tender, TenderStatus::Published, "ivan")
        .unwrap();
    for user in ["ivan", "olga", "petr", "nina"] {
        assert_eq!(
            m.service.get_tender_status(&tender, user).unwrap(),
            TenderStatus::Published
        );
    }
}

#[test]
fn test_membership_change_takes_effect_immediately() {
    let mut m = market();
    let tender = m.tender("Sand");
    assert!(m.service.get_tender(&tender, "nina").is_err());

    let org = m.buyer_org.clone();
    m.service.directory().add_member(&org, "nina").unwrap();
    assert!(m.service.get_tender(&tender, "nina").is_ok());

    m.service.directory().remove_member(&org, "nina").unwrap();
    assert!(matches!(
        m.service.get_tender(&tender, "nina"),
        Err(ServiceError::InsufficientRights)
    ));
}

#[test]
fn test_existence_checked_before_rights() {
    let mut m = market();
    let tender = m.tender("Sand");

    assert!(matches!(
        m.service.rollback_tender("01NOPE", 1, "petr"),
        Err(ServiceError::NoSuchTender)
    ));
    assert!(matches!(
        m.service.rollback_tender(&tender, 9, "petr"),
        Err(ServiceError::NoSuchVersion)
    ));
    assert!(matches!(
        m.service.rollback_tender(&tender, 1, "petr"),
        Err(ServiceError::NoSuchVersion)
    ));
}

// ============================================================================
// Full scenario
// ============================================================================

#[test]
fn test_tender_to_approval_scenario() {
    let mut m = market();
    let tender = m.published_tender("Sand");
    let bid = m.bid("petr", &tender, "Truckload");

    let listed = m
        .service
        .list_published(m.service.page(None, None).unwrap(), &[ServiceType::Delivery])
        .unwrap();
    assert_eq!(listed.len(), 1);

    let page = m.service.page(None, None).unwrap();
    let seen_by_buyer = m.service.list_bids_for_tender(&tender, "olga", page).unwrap();
    assert_eq!(seen_by_buyer.len(), 1);

    m.service
        .add_feedback(&bid, "On-time record is good", "olga")
        .unwrap();
    let reviews = m
        .service
        .get_feedback(&tender, "ivan", "petr", page)
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].description, "On-time record is good");

    let decided = m
        .service
        .submit_decision(&bid, Verdict::Approved, "ivan")
        .unwrap();
    assert_eq!(decided.version, 1);
    assert_eq!(decided.status, BidStatus::Created);

    let closed = m.service.get_tender(&tender, "ivan").unwrap();
    assert_eq!(closed.status, TenderStatus::Closed);
    assert_eq!(closed.version, 3);

    // closed tenders drop out of the public listing and bid listing tightens
    let listed = m.service.list_published(page, &[]).unwrap();
    assert!(listed.is_empty());
    assert!(matches!(
        m.service.list_bids_for_tender(&tender, "nina", page),
        Err(ServiceError::InsufficientRights)
    ));

    let decisions = m.service.bid_decisions(&bid, "petr").unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].decision, Verdict::Approved);
    assert_eq!(decisions[0].created_by, "ivan");
}

#[test]
fn test_rejection_leaves_tender_open() {
    let mut m = market();
    let tender = m.published_tender("Sand");
    let bid = m.bid("petr", &tender, "Truckload");

    m.service
        .submit_decision(&bid, Verdict::Rejected, "olga")
        .unwrap();
    let still = m.service.get_tender(&tender, "petr").unwrap();
    assert_eq!(still.status, TenderStatus::Published);
    assert_eq!(still.version, 2);
}

#[test]
fn test_seller_cannot_bid_on_own_tender() {
    let mut m = market();
    let tender = m.published_tender("Sand");
    let ivan = m
        .service
        .directory()
        .employee_by_username("ivan")
        .unwrap()
        .id;

    let err = m
        .service
        .create_bid(NewBid {
            name: "Inside job".into(),
            description: "Own tender".into(),
            tender_id: tender,
            author_type: AuthorType::User,
            author_id: ivan,
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientRights));
}

#[test]
fn test_data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("market.db");

    let tender = {
        let store = Store::open(&path, Duration::from_secs(1)).unwrap();
        let mut service = TenderService::new(store, &Config::default());
        let org = {
            let mut dir = service.directory();
            dir.add_employee("ivan", Some("Ivan"), None).unwrap();
            let org = dir
                .add_organization("City Works", None, OrganizationType::Llc)
                .unwrap()
                .id;
            dir.add_member(&org, "ivan").unwrap();
            org
        };
        let tender = service
            .create_tender(
                NewTender {
                    name: "Sand".into(),
                    description: "Sand".into(),
                    service_type: ServiceType::Construction,
                    organization_id: org,
                },
                "ivan",
            )
            .unwrap();
        service.close().unwrap();
        tender
    };

    let store = Store::open(&path, Duration::from_secs(1)).unwrap();
    let service = TenderService::new(store, &Config::default());
    assert_eq!(service.get_tender(&tender.id, "ivan").unwrap(), tender);
}

#[test]
fn test_seller_org_is_separate() {
    let mut m = market();
    let seller_org = m.seller_org.clone();
    let members = m.service.directory().list_members(&seller_org).unwrap();
    let names: Vec<&str> = members.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["petr"]);
}
