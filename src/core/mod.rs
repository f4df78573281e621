//! Core module - storage, authorization, versioning and the tender service

pub mod auth;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod feedback;
pub mod history;
pub mod identity;
pub mod service;
pub mod store;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthorizationResolver;
pub use config::{Config, ConfigError};
pub use directory::Directory;
pub use entity::{
    AuthorType, Bid, BidStatus, Decision, Employee, Feedback, Organization, OrganizationType,
    ServiceType, Tender, TenderStatus, Verdict,
};
pub use error::{ServiceError, ServiceResult};
pub use feedback::FeedbackLedger;
pub use history::{EntityKind, HistoryRecorder, Versioned};
pub use service::{BidPatch, NewBid, NewTender, Page, TenderPatch, TenderService};
pub use store::Store;
pub use workflow::{Lifecycle, StatusMachine};
