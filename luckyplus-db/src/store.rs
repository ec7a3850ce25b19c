use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db;
use crate::models::{Ticket, TicketStatus};

/// Ticket persistence as seen by the check flow.
pub trait TicketStore {
    fn tickets(&self, user: &str, round: Option<&str>) -> Result<Vec<Ticket>>;

    /// Returns `false` when no ticket with this id belongs to `user`.
    fn update_status(
        &self,
        user: &str,
        id: i64,
        status: &TicketStatus,
        at: NaiveDateTime,
    ) -> Result<bool>;
}

impl TicketStore for Connection {
    fn tickets(&self, user: &str, round: Option<&str>) -> Result<Vec<Ticket>> {
        db::fetch_tickets(self, user, round)
    }

    fn update_status(
        &self,
        user: &str,
        id: i64,
        status: &TicketStatus,
        at: NaiveDateTime,
    ) -> Result<bool> {
        db::update_status(self, user, id, status, at)
    }
}
