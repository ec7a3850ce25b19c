use serde::{Serialize, Serializer};

use luckyplus_db::models::Ticket;

use crate::prize::resolve_status;
use crate::tally::Tally;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketOutcome {
    pub id: i64,
    pub number: String,
    pub round: String,
    pub win: bool,
    /// Unit value times quantity.
    pub prize: u64,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub total_tickets: u64,
    pub total_winning_tickets: u64,
    pub win_rate_percent: f64,
    pub total_prize_value: u64,
    #[serde(serialize_with = "serialize_lucky_digit")]
    pub lucky_digit: Option<char>,
    pub results: Vec<TicketOutcome>,
}

pub const NO_LUCKY_DIGIT: &str = "none";

fn serialize_lucky_digit<S: Serializer>(digit: &Option<char>, s: S) -> Result<S::Ok, S::Error> {
    match digit {
        Some(c) => s.serialize_char(*c),
        None => s.serialize_str(NO_LUCKY_DIGIT),
    }
}

impl AggregateReport {
    pub fn empty() -> Self {
        Self {
            total_tickets: 0,
            total_winning_tickets: 0,
            win_rate_percent: 0.0,
            total_prize_value: 0,
            lucky_digit: None,
            results: Vec::new(),
        }
    }

    pub fn lucky_digit_label(&self) -> String {
        self.lucky_digit
            .map(String::from)
            .unwrap_or_else(|| NO_LUCKY_DIGIT.to_string())
    }
}

pub fn aggregate(tickets: &[Ticket]) -> AggregateReport {
    if tickets.is_empty() {
        return AggregateReport::empty();
    }

    let mut report = AggregateReport::empty();
    let mut digits: Tally<u64> = Tally::new();

    for ticket in tickets {
        let quantity = ticket.effective_quantity();
        let value = resolve_status(&ticket.status);
        let prize = value.unit_value * quantity;

        report.total_tickets += quantity;
        if value.win {
            report.total_winning_tickets += quantity;
            report.total_prize_value += prize;
            for c in ticket.number.chars() {
                digits.add(c, quantity);
            }
        }

        report.results.push(TicketOutcome {
            id: ticket.id,
            number: ticket.number.clone(),
            round: ticket.round.clone(),
            win: value.win,
            prize,
            quantity,
        });
    }

    if report.total_winning_tickets > 0 {
        report.lucky_digit = digits.top().map(|(c, _)| c);
    }
    if report.total_tickets > 0 {
        report.win_rate_percent =
            report.total_winning_tickets as f64 / report.total_tickets as f64 * 100.0;
    }

    report
}
