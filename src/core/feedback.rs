//! Review ledger for bids
//!
//! Reviews are append-only. Each row records the reviewer and, separately,
//! the author of the reviewed bid, so a bid author's reviews can be read
//! without walking back through the bids.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::core::entity::{Bid, Feedback};
use crate::core::error::ServiceResult;
use crate::core::identity::generate_id;
use crate::core::store::FromRow;

pub struct FeedbackLedger<'c> {
    conn: &'c Connection,
}

impl<'c> FeedbackLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Record `review` on `bid` by the employee `reviewer_id`
    pub fn append(&self, bid: &Bid, reviewer_id: &str, review: &str) -> ServiceResult<Feedback> {
        let feedback = Feedback {
            id: generate_id(),
            description: review.to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO bid_reviews (id, bid_id, review, reviewer, created_at, bid_author_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                feedback.id,
                bid.id,
                feedback.description,
                reviewer_id,
                feedback.created_at,
                bid.author_id
            ],
        )?;
        Ok(feedback)
    }

    /// Reviews left on any bid authored by `username`, oldest first
    pub fn for_author(&self, username: &str, limit: u32, offset: u32) -> ServiceResult<Vec<Feedback>> {
        let mut stmt = self.conn.prepare(
            "SELECT br.id, br.review, br.created_at
             FROM bid_reviews br
             JOIN employee e ON e.id = br.bid_author_id
             WHERE e.username = ?1
             ORDER BY br.created_at, br.id
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![username, limit, offset], Feedback::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
