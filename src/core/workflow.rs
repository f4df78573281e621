//! Status lifecycles for tenders and bids
//!
//! Each status enum knows its forward transitions and which of its values are
//! gated (visible only to the owning side). `StatusMachine` decides whether an
//! explicit status update is accepted: by default any value may replace any
//! other, and `workflow.enforce_transitions` switches to the transition table.

use crate::core::config::WorkflowConfig;
use crate::core::entity::{BidStatus, TenderStatus};
use crate::core::error::{ServiceError, ServiceResult};

/// A status enum with a transition table
pub trait Lifecycle: Copy + PartialEq + std::fmt::Display {
    /// Statuses reachable from `self` by a single update
    fn allowed_transitions(self) -> Vec<Self>;

    /// Statuses only the responsible side may see
    fn is_gated(self) -> bool;

    fn is_valid_transition(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

impl Lifecycle for TenderStatus {
    fn allowed_transitions(self) -> Vec<Self> {
        match self {
            TenderStatus::Created => vec![TenderStatus::Published],
            TenderStatus::Published => vec![TenderStatus::Closed],
            TenderStatus::Closed => vec![],
        }
    }

    fn is_gated(self) -> bool {
        matches!(self, TenderStatus::Created | TenderStatus::Closed)
    }
}

impl Lifecycle for BidStatus {
    fn allowed_transitions(self) -> Vec<Self> {
        match self {
            BidStatus::Created => vec![BidStatus::Published, BidStatus::Canceled],
            BidStatus::Published => vec![
                BidStatus::Canceled,
                BidStatus::Approved,
                BidStatus::Rejected,
            ],
            BidStatus::Canceled | BidStatus::Approved | BidStatus::Rejected => vec![],
        }
    }

    fn is_gated(self) -> bool {
        matches!(self, BidStatus::Created | BidStatus::Canceled)
    }
}

/// Transition policy for explicit status updates
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusMachine {
    enforce: bool,
}

impl StatusMachine {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            enforce: config.enforce_transitions,
        }
    }

    /// Accept or reject an update from `from` to `to`
    ///
    /// Setting the current status again is always accepted.
    pub fn check<S: Lifecycle>(&self, from: S, to: S) -> ServiceResult<()> {
        if !self.enforce || from == to || from.is_valid_transition(to) {
            return Ok(());
        }
        Err(ServiceError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
