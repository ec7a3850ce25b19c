use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use luckyplus_db::rusqlite::Connection;
use std::path::Path;

use luckyplus_db::db::{add_ticket, AddOutcome};
use luckyplus_db::models::{validate_ticket_number, NewTicket};
use luckyplus_engine::round::RoundLabel;

fn parse_record(record: &csv::StringRecord) -> Result<NewTicket> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    let number = get(0)?;
    validate_ticket_number(&number)?;

    let round = RoundLabel::parse(&get(1)?)?.to_string();

    let quantity_str = get(2).unwrap_or_default();
    let quantity: i32 = if quantity_str.is_empty() {
        1
    } else {
        quantity_str
            .parse()
            .with_context(|| format!("Cannot parse quantity '{}'", quantity_str))?
    };

    Ok(NewTicket {
        round,
        number,
        quantity,
    })
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub merged: u32,
    pub errors: u32,
}

/// Reads `number;round;quantity` rows (header line expected, quantity
/// optional) into the user's tickets, in one transaction.
pub fn import_csv(conn: &Connection, user: &str, path: &Path, now: NaiveDateTime) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        merged: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Cannot read line {}: {}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        let ticket = match parse_record(&record) {
            Ok(ticket) => ticket,
            Err(e) => {
                eprintln!("Cannot parse line {}: {:#}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        match add_ticket(&tx, user, &ticket, now) {
            Ok(AddOutcome::Inserted(_)) => result.inserted += 1,
            Ok(AddOutcome::Merged(_)) => result.merged += 1,
            Err(e) => {
                eprintln!("Cannot store line {}: {:#}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    log::info!(
        "Imported {} tickets from {:?} ({} merged, {} errors)",
        result.inserted,
        path,
        result.merged,
        result.errors
    );
    Ok(result)
}
