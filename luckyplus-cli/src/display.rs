use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use luckyplus_db::models::{Ticket, TicketStatus};
use luckyplus_engine::aggregate::AggregateReport;
use luckyplus_engine::check::CheckReport;
use luckyplus_engine::predictor::Prediction;
use luckyplus_engine::prize::prize_value;

/// `1234567` → `1,234,567`
pub fn format_baht(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn status_cell(status: &TicketStatus) -> Cell {
    let color = match status {
        TicketStatus::Won(_) => Color::Green,
        TicketStatus::NoWin => Color::Red,
        TicketStatus::Unchecked => Color::White,
        TicketStatus::Unknown(_) => Color::Yellow,
    };
    Cell::new(status.to_string()).fg(color)
}

pub fn display_tickets(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("No tickets to display.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Round", "Number", "Qty", "Status", "Updated"]);

    for ticket in tickets {
        table.add_row(vec![
            Cell::new(ticket.id),
            Cell::new(&ticket.round),
            Cell::new(&ticket.number),
            Cell::new(ticket.quantity),
            status_cell(&ticket.status),
            Cell::new(ticket.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
}

pub fn display_check_report(report: &CheckReport) {
    println!("\nDraw of {}, round {}\n", report.draw.date, report.round);

    if report.checked.is_empty() {
        println!("No tickets needed checking.");
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["ID", "Round", "Number", "Qty", "Result", "Prize (฿)"]);

        for checked in &report.checked {
            let ticket = &checked.ticket;
            let prize = match checked.tier {
                Some(tier) => format_baht(prize_value(tier) * ticket.effective_quantity()),
                None => "-".to_string(),
            };
            table.add_row(vec![
                Cell::new(ticket.id),
                Cell::new(&ticket.round),
                Cell::new(&ticket.number),
                Cell::new(ticket.quantity),
                status_cell(&ticket.status),
                Cell::new(prize),
            ]);
        }
        println!("{table}");
        println!(
            "{} checked, {} winning",
            report.checked.len(),
            report.winners().count()
        );
    }

    if !report.pending.is_empty() {
        println!(
            "{} tickets wait for a later draw and stay unchecked.",
            report.pending.len()
        );
    }

    if !report.failures.is_empty() {
        println!("\nCould not update:");
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["ID", "Error"]);
        for failure in &report.failures {
            table.add_row(vec![
                Cell::new(failure.ticket_id),
                Cell::new(failure.error.to_string()).fg(Color::Red),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_analysis(report: &AggregateReport) {
    println!("\nTicket summary\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tickets", "Winning", "Win rate", "Total prize (฿)", "Lucky digit"]);
    table.add_row(vec![
        report.total_tickets.to_string(),
        report.total_winning_tickets.to_string(),
        format!("{:.2} %", report.win_rate_percent),
        format_baht(report.total_prize_value),
        report.lucky_digit_label(),
    ]);
    println!("{table}");

    if report.results.is_empty() {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Round", "Number", "Qty", "Win", "Prize (฿)"]);
    for outcome in &report.results {
        let win = if outcome.win {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(outcome.id),
            Cell::new(&outcome.round),
            Cell::new(&outcome.number),
            Cell::new(outcome.quantity),
            win,
            Cell::new(format_baht(outcome.prize)),
        ]);
    }
    println!("{table}");
}

pub fn display_prediction(prediction: &Prediction) {
    println!("\nPositional frequency over {} draws\n", prediction.draws_used);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Prediction", "Share per position"]);

    for field in prediction.fields() {
        let shares = field
            .picks
            .iter()
            .map(|p| format!("{}:{:.0}%", p.digit, p.share * 100.0))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![
            Cell::new(field.field.label()),
            Cell::new(&field.number).fg(Color::Cyan),
            Cell::new(shares),
        ]);
    }
    println!("{table}");
}

pub fn display_rounds(current: &str, upcoming: &str, stored: &[String]) {
    println!("Latest drawn round : {}", current);
    println!("Upcoming round     : {}", upcoming);

    if stored.is_empty() {
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rounds with tickets"]);
    for round in stored {
        table.add_row(vec![round]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Lines read : {}", result.total_records);
    println!("  Inserted   : {}", result.inserted);
    println!("  Merged     : {}", result.merged);
    if result.errors > 0 {
        println!("  Errors     : {}", result.errors);
    }
}
