//! CLI command implementations

pub mod bid;
pub mod employee;
pub mod org;
pub mod ping;
pub mod tender;
