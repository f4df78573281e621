//! Service error taxonomy
//!
//! Six domain outcomes (`NoSuchUser`, `NoSuchTender`, `NoSuchBid`,
//! `NoSuchVersion`, `InsufficientRights`, `NoSuchReviews`) plus storage
//! failures. Callers check existence before rights, so the variant returned
//! for a request that fails several checks is fixed by call order.

use thiserror::Error;

/// Errors returned by the tender service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("The user does not exist or is invalid")]
    NoSuchUser,

    #[error("The tender does not exist")]
    NoSuchTender,

    #[error("The bid does not exist")]
    NoSuchBid,

    #[error("The requested version does not exist")]
    NoSuchVersion,

    #[error("Insufficient rights to perform the action")]
    InsufficientRights,

    #[error("No reviews exist for this requester")]
    NoSuchReviews,

    #[error("The organization does not exist")]
    NoSuchOrganization,

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid status transition: {from} → {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Stable machine-readable code for the request layer
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NoSuchUser => "no_such_user",
            ServiceError::NoSuchTender => "no_such_tender",
            ServiceError::NoSuchBid => "no_such_bid",
            ServiceError::NoSuchVersion => "no_such_version",
            ServiceError::InsufficientRights => "insufficient_rights",
            ServiceError::NoSuchReviews => "no_such_reviews",
            ServiceError::NoSuchOrganization => "no_such_organization",
            ServiceError::UsernameTaken(_) => "username_taken",
            ServiceError::InvalidTransition { .. } => "invalid_transition",
            ServiceError::InvalidPage(_) => "invalid_page",
            ServiceError::Storage(_) | ServiceError::Io(_) => "internal",
        }
    }

    /// True when the failure came from below the domain layer
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Storage(_) | ServiceError::Io(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
