//! tender-desk: tenders and bids with versioned history and
//! membership-derived authorization
//!
//! The library is the service core; the `tdesk` binary is a thin CLI over it.

pub mod cli;
pub mod core;
