//! Reviews on bids

use super::{require_rights, require_user, Page, TenderService};
use crate::core::auth::AuthorizationResolver;
use crate::core::entity::{Bid, Feedback};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::feedback::FeedbackLedger;
use crate::core::history::require;

impl TenderService {
    /// Leave a review on a bid; only the tender's organization may review
    pub fn add_feedback(&mut self, bid_id: &str, review: &str, username: &str) -> ServiceResult<Bid> {
        let tx = self.store.transaction()?;
        let auth = AuthorizationResolver::new(&tx);
        let reviewer_id = auth.employee_id(username)?.ok_or(ServiceError::NoSuchUser)?;
        let bid: Bid = require(&tx, bid_id)?;
        require_rights(
            auth.is_responsible_for_tender(username, &bid.tender_id)?,
            username,
            &bid.tender_id,
        )?;

        let feedback = FeedbackLedger::new(&tx).append(&bid, &reviewer_id, review)?;
        tx.commit()?;

        tracing::info!(bid_id, review_id = %feedback.id, username, "review added");
        Ok(bid)
    }

    /// Reviews left on `requester_username`'s bids, read by the tender side
    ///
    /// `author_username` must be responsible for the tender, and the
    /// requester must have bid on it; otherwise there are no reviews to show.
    pub fn get_feedback(
        &self,
        tender_id: &str,
        author_username: &str,
        requester_username: &str,
        page: Page,
    ) -> ServiceResult<Vec<Feedback>> {
        let conn = self.store.conn();
        let auth = AuthorizationResolver::new(conn);
        require_user(&auth, author_username)?;
        require_user(&auth, requester_username)?;
        if !auth.tender_exists(tender_id)? {
            return Err(ServiceError::NoSuchTender);
        }
        require_rights(
            auth.is_responsible_for_tender(author_username, tender_id)?,
            author_username,
            tender_id,
        )?;
        if !auth.has_bid_on_tender(requester_username, tender_id)? {
            return Err(ServiceError::NoSuchReviews);
        }

        FeedbackLedger::new(conn).for_author(requester_username, page.limit, page.offset)
    }
}
