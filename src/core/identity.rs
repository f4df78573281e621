//! Identifier generation
//!
//! Ids are opaque strings. New rows get a ULID; ids that already exist in the
//! store (UUIDs from an older deployment, for instance) are used verbatim.

use ulid::Ulid;

/// Generate a fresh, sortable, unique id
pub fn generate_id() -> String {
    Ulid::new().to_string()
}

/// Truncate an id for table output
pub fn short_id(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}
