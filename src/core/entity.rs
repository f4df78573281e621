//! Entity types - tenders, bids and the records that hang off them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tender lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TenderStatus {
    #[default]
    Created,
    Published,
    Closed,
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenderStatus::Created => write!(f, "Created"),
            TenderStatus::Published => write!(f, "Published"),
            TenderStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for TenderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(TenderStatus::Created),
            "Published" => Ok(TenderStatus::Published),
            "Closed" => Ok(TenderStatus::Closed),
            _ => Err(format!("Unknown tender status: {}", s)),
        }
    }
}

/// Bid lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BidStatus {
    #[default]
    Created,
    Published,
    Canceled,
    Approved,
    Rejected,
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BidStatus::Created => write!(f, "Created"),
            BidStatus::Published => write!(f, "Published"),
            BidStatus::Canceled => write!(f, "Canceled"),
            BidStatus::Approved => write!(f, "Approved"),
            BidStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl std::str::FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(BidStatus::Created),
            "Published" => Ok(BidStatus::Published),
            "Canceled" => Ok(BidStatus::Canceled),
            "Approved" => Ok(BidStatus::Approved),
            "Rejected" => Ok(BidStatus::Rejected),
            _ => Err(format!("Unknown bid status: {}", s)),
        }
    }
}

/// Kind of service a tender asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::Construction => write!(f, "Construction"),
            ServiceType::Delivery => write!(f, "Delivery"),
            ServiceType::Manufacture => write!(f, "Manufacture"),
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Construction" => Ok(ServiceType::Construction),
            "Delivery" => Ok(ServiceType::Delivery),
            "Manufacture" => Ok(ServiceType::Manufacture),
            _ => Err(format!("Unknown service type: {}", s)),
        }
    }
}

/// Who a bid is submitted on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorType {
    Organization,
    User,
}

impl std::fmt::Display for AuthorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorType::Organization => write!(f, "Organization"),
            AuthorType::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for AuthorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Organization" => Ok(AuthorType::Organization),
            "User" => Ok(AuthorType::User),
            _ => Err(format!("Unknown author type: {}", s)),
        }
    }
}

/// Verdict the tender side gives on a bid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Approved => write!(f, "Approved"),
            Verdict::Rejected => write!(f, "Rejected"),
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Verdict::Approved),
            "Rejected" => Ok(Verdict::Rejected),
            _ => Err(format!("Unknown decision: {}", s)),
        }
    }
}

/// Legal form of an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrganizationType {
    #[serde(rename = "IE")]
    Ie,
    #[default]
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "JSC")]
    Jsc,
}

impl std::fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizationType::Ie => write!(f, "IE"),
            OrganizationType::Llc => write!(f, "LLC"),
            OrganizationType::Jsc => write!(f, "JSC"),
        }
    }
}

impl std::str::FromStr for OrganizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IE" => Ok(OrganizationType::Ie),
            "LLC" => Ok(OrganizationType::Llc),
            "JSC" => Ok(OrganizationType::Jsc),
            _ => Err(format!("Unknown organization type: {}", s)),
        }
    }
}

/// A person who can act on behalf of organizations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub org_type: OrganizationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A request for services published by an organization
///
/// The live row always holds the current version; earlier versions live in
/// `tender_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A proposal against a tender
///
/// `author_id` is always an employee id, even for organization bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: String,
    pub author_type: AuthorType,
    pub author_id: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recorded verdict on a bid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub bid_id: String,
    pub decision: Verdict,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Review left by the tender side on a bid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
