use luckyplus_db::models::{DrawResult, PrizeTier, Ticket, TicketStatus};
use luckyplus_db::store::TicketStore;

use crate::aggregate::{aggregate, AggregateReport};
use crate::error::EngineError;
use crate::matcher::TicketMatcher;
use crate::round::{current_round, Clock, RoundLabel};
use crate::source::DrawSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckScope {
    /// Only tickets never evaluated so far.
    #[default]
    Unchecked,
    All,
}

#[derive(Debug, Clone)]
pub struct CheckedTicket {
    /// The ticket as written back, with its new status and timestamp.
    pub ticket: Ticket,
    pub tier: Option<PrizeTier>,
}

#[derive(Debug)]
pub struct TicketFailure {
    pub ticket_id: i64,
    pub error: EngineError,
}

#[derive(Debug)]
pub struct CheckReport {
    pub draw: DrawResult,
    /// Round the tickets were selected from.
    pub round: String,
    pub checked: Vec<CheckedTicket>,
    /// Tickets of a round not drawn yet; left `unchecked`.
    pub pending: Vec<i64>,
    pub failures: Vec<TicketFailure>,
}

impl CheckReport {
    pub fn winners(&self) -> impl Iterator<Item = &CheckedTicket> {
        self.checked.iter().filter(|c| c.tier.is_some())
    }
}

/// Evaluates a user's stored tickets of one round against the latest draw.
pub struct TicketChecker<'a> {
    store: &'a dyn TicketStore,
    source: &'a dyn DrawSource,
    clock: &'a dyn Clock,
    matcher: TicketMatcher,
}

impl<'a> TicketChecker<'a> {
    pub fn new(store: &'a dyn TicketStore, source: &'a dyn DrawSource, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            source,
            clock,
            matcher: TicketMatcher::default(),
        }
    }

    pub fn with_matcher(mut self, matcher: TicketMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Checks the tickets of `round`, or of the latest drawn round when none
    /// is given. Tickets whose round is drawn after the current one stay
    /// `unchecked`.
    ///
    /// Fetches the draw first so that a fetch failure leaves every stored
    /// status untouched. Per-ticket write failures are collected in the report
    /// and do not undo tickets already written.
    pub fn check(
        &self,
        user: &str,
        round: Option<&str>,
        scope: CheckScope,
    ) -> Result<CheckReport, EngineError> {
        let draw = self.source.latest()?;
        let current = current_round(self.clock);
        let round = round.map_or_else(|| current.to_string(), str::to_string);
        log::info!(
            "Checking round {} of {} against draw {} ({:?})",
            round,
            user,
            draw.date,
            self.matcher.policy()
        );

        let tickets = self.store.tickets(user, Some(&round))?;
        let mut report = CheckReport {
            draw,
            round,
            checked: Vec::new(),
            pending: Vec::new(),
            failures: Vec::new(),
        };

        for mut ticket in tickets {
            if scope == CheckScope::Unchecked && !ticket.status.is_unchecked() {
                continue;
            }
            if is_later_round(&ticket.round, current) {
                log::debug!("Ticket {} waits for round {}", ticket.id, ticket.round);
                report.pending.push(ticket.id);
                continue;
            }

            let tier = self.matcher.classify(&ticket, &report.draw);
            let status = TicketStatus::from_match(tier);
            let at = self.clock.now();

            match self.store.update_status(user, ticket.id, &status, at) {
                Ok(true) => {
                    ticket.status = status;
                    ticket.updated_at = at;
                    report.checked.push(CheckedTicket { ticket, tier });
                }
                Ok(false) => {
                    log::warn!("Ticket {} vanished before its status was written", ticket.id);
                    report.failures.push(TicketFailure {
                        ticket_id: ticket.id,
                        error: EngineError::InvalidTicketReference(ticket.id),
                    });
                }
                Err(e) => {
                    log::warn!("Cannot write status of ticket {}: {:#}", ticket.id, e);
                    report.failures.push(TicketFailure {
                        ticket_id: ticket.id,
                        error: EngineError::Store(e),
                    });
                }
            }
        }

        log::info!(
            "Checked {} tickets, {} failed",
            report.checked.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn is_later_round(round: &str, current: RoundLabel) -> bool {
    RoundLabel::parse(round).is_ok_and(|label| label > current)
}

/// Summarizes stored statuses; does not evaluate anything.
pub fn analyze(
    store: &dyn TicketStore,
    user: &str,
    round: Option<&str>,
) -> Result<AggregateReport, EngineError> {
    let tickets = store.tickets(user, round)?;
    Ok(aggregate(&tickets))
}
