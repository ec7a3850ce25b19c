use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{normalize_quantity, NewTicket, Ticket, TicketStatus};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tickets (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     TEXT NOT NULL,
    round       TEXT NOT NULL,
    number      TEXT NOT NULL,
    quantity    INTEGER NOT NULL DEFAULT 1,
    status      TEXT NOT NULL DEFAULT 'unchecked',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (user_id, round, number)
);
CREATE INDEX IF NOT EXISTS idx_tickets_user_round ON tickets (user_id, round);
";

const TICKET_COLUMNS: &str =
    "id, user_id, round, number, quantity, status, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted(i64),
    /// The same number was already recorded for this round; its quantity grew.
    Merged(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
    /// Another ticket of the same user already holds this round/number.
    Conflict,
}

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("luckyplus.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

fn ticket_from_row(row: &Row) -> rusqlite::Result<Ticket> {
    let status: String = row.get(5)?;
    Ok(Ticket {
        id: row.get(0)?,
        user_id: row.get(1)?,
        round: row.get(2)?,
        number: row.get(3)?,
        quantity: row.get(4)?,
        status: TicketStatus::parse(&status),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn add_ticket(
    conn: &Connection,
    user: &str,
    ticket: &NewTicket,
    now: NaiveDateTime,
) -> Result<AddOutcome> {
    let quantity = normalize_quantity(ticket.quantity);
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM tickets WHERE user_id = ?1 AND round = ?2 AND number = ?3",
            rusqlite::params![user, ticket.round, ticket.number],
            |row| row.get(0),
        )
        .optional()
        .context("Ticket lookup failed")?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE tickets SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![quantity, now, id],
            )
            .context("Cannot update ticket quantity")?;
            Ok(AddOutcome::Merged(id))
        }
        None => {
            conn.execute(
                "INSERT INTO tickets (user_id, round, number, quantity, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user,
                    ticket.round,
                    ticket.number,
                    quantity,
                    TicketStatus::Unchecked.to_string(),
                    now,
                    now,
                ],
            )
            .context("Insert failed")?;
            Ok(AddOutcome::Inserted(conn.last_insert_rowid()))
        }
    }
}

pub fn fetch_tickets(conn: &Connection, user: &str, round: Option<&str>) -> Result<Vec<Ticket>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets
         WHERE user_id = ?1 AND (?2 IS NULL OR round = ?2)
         ORDER BY id"
    ))?;
    let tickets = stmt
        .query_map(rusqlite::params![user, round], ticket_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tickets)
}

pub fn fetch_ticket(conn: &Connection, user: &str, id: i64) -> Result<Option<Ticket>> {
    let ticket = conn
        .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![id, user],
            ticket_from_row,
        )
        .optional()?;
    Ok(ticket)
}

/// Rewrites round, number and quantity of a ticket. The stored status goes
/// back to `unchecked` since it no longer describes the new number.
pub fn update_ticket(
    conn: &Connection,
    user: &str,
    id: i64,
    ticket: &NewTicket,
    now: NaiveDateTime,
) -> Result<UpdateOutcome> {
    if fetch_ticket(conn, user, id)?.is_none() {
        return Ok(UpdateOutcome::NotFound);
    }

    let clashes: u32 = conn.query_row(
        "SELECT COUNT(*) FROM tickets
         WHERE user_id = ?1 AND round = ?2 AND number = ?3 AND id != ?4",
        rusqlite::params![user, ticket.round, ticket.number, id],
        |row| row.get(0),
    )?;
    if clashes > 0 {
        return Ok(UpdateOutcome::Conflict);
    }

    conn.execute(
        "UPDATE tickets SET round = ?1, number = ?2, quantity = ?3, status = ?4, updated_at = ?5
         WHERE id = ?6 AND user_id = ?7",
        rusqlite::params![
            ticket.round,
            ticket.number,
            normalize_quantity(ticket.quantity),
            TicketStatus::Unchecked.to_string(),
            now,
            id,
            user,
        ],
    )
    .context("Ticket update failed")?;
    Ok(UpdateOutcome::Updated)
}

pub fn delete_ticket(conn: &Connection, user: &str, id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "DELETE FROM tickets WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user],
        )
        .context("Delete failed")?;
    Ok(changed > 0)
}

pub fn update_status(
    conn: &Connection,
    user: &str,
    id: i64,
    status: &TicketStatus,
    at: NaiveDateTime,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            rusqlite::params![status.to_string(), at, id, user],
        )
        .with_context(|| format!("Cannot write status of ticket {}", id))?;
    Ok(changed > 0)
}

pub fn list_rounds(conn: &Connection, user: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT round FROM tickets WHERE user_id = ?1")?;
    let rounds = stmt
        .query_map([user], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(rounds)
}

pub fn count_tickets(conn: &Connection, user: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM tickets WHERE user_id = ?1",
        [user],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrizeTier;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn new_ticket(round: &str, number: &str, quantity: i32) -> NewTicket {
        NewTicket {
            round: round.to_string(),
            number: number.to_string(),
            quantity,
        }
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = test_conn();
        assert_eq!(count_tickets(&conn, "alice").unwrap(), 0);

        let outcome = add_ticket(&conn, "alice", &new_ticket("16/10/2568", "123456", 1), now()).unwrap();
        assert!(matches!(outcome, AddOutcome::Inserted(_)));
        assert_eq!(count_tickets(&conn, "alice").unwrap(), 1);
        assert_eq!(count_tickets(&conn, "bob").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_merges_quantity() {
        let conn = test_conn();
        let first = add_ticket(&conn, "alice", &new_ticket("16/10/2568", "123456", 2), now()).unwrap();
        let second = add_ticket(&conn, "alice", &new_ticket("16/10/2568", "123456", 0), now()).unwrap();

        let AddOutcome::Inserted(id) = first else { panic!("expected insert") };
        assert_eq!(second, AddOutcome::Merged(id));

        let tickets = fetch_tickets(&conn, "alice", None).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].quantity, 3);
        assert_eq!(tickets[0].status, TicketStatus::Unchecked);
    }

    #[test]
    fn test_fetch_filters_round_and_user() {
        let conn = test_conn();
        add_ticket(&conn, "alice", &new_ticket("1/10/2568", "111111", 1), now()).unwrap();
        add_ticket(&conn, "alice", &new_ticket("16/10/2568", "222222", 1), now()).unwrap();
        add_ticket(&conn, "bob", &new_ticket("16/10/2568", "333333", 1), now()).unwrap();

        let all = fetch_tickets(&conn, "alice", None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].number, "111111");

        let round = fetch_tickets(&conn, "alice", Some("16/10/2568")).unwrap();
        assert_eq!(round.len(), 1);
        assert_eq!(round[0].number, "222222");
    }

    #[test]
    fn test_update_status_roundtrip() {
        let conn = test_conn();
        let AddOutcome::Inserted(id) =
            add_ticket(&conn, "alice", &new_ticket("16/10/2568", "000789", 1), now()).unwrap()
        else {
            panic!("expected insert")
        };

        let status = TicketStatus::Won(PrizeTier::BackTwo);
        assert!(update_status(&conn, "alice", id, &status, now()).unwrap());
        assert!(!update_status(&conn, "bob", id, &status, now()).unwrap());
        assert!(!update_status(&conn, "alice", id + 100, &status, now()).unwrap());

        let ticket = fetch_ticket(&conn, "alice", id).unwrap().unwrap();
        assert_eq!(ticket.status, status);
    }

    #[test]
    fn test_update_ticket_conflict_and_reset() {
        let conn = test_conn();
        add_ticket(&conn, "alice", &new_ticket("16/10/2568", "111111", 1), now()).unwrap();
        let AddOutcome::Inserted(id) =
            add_ticket(&conn, "alice", &new_ticket("16/10/2568", "222222", 1), now()).unwrap()
        else {
            panic!("expected insert")
        };
        update_status(&conn, "alice", id, &TicketStatus::NoWin, now()).unwrap();

        let clash = update_ticket(&conn, "alice", id, &new_ticket("16/10/2568", "111111", 1), now()).unwrap();
        assert_eq!(clash, UpdateOutcome::Conflict);

        let ok = update_ticket(&conn, "alice", id, &new_ticket("1/11/2568", "333333", -1), now()).unwrap();
        assert_eq!(ok, UpdateOutcome::Updated);
        let ticket = fetch_ticket(&conn, "alice", id).unwrap().unwrap();
        assert_eq!(ticket.number, "333333");
        assert_eq!(ticket.quantity, 1);
        assert_eq!(ticket.status, TicketStatus::Unchecked);

        let missing = update_ticket(&conn, "bob", id, &new_ticket("1/11/2568", "333333", 1), now()).unwrap();
        assert_eq!(missing, UpdateOutcome::NotFound);
    }

    #[test]
    fn test_delete_scoped_to_user() {
        let conn = test_conn();
        let AddOutcome::Inserted(id) =
            add_ticket(&conn, "alice", &new_ticket("16/10/2568", "123456", 1), now()).unwrap()
        else {
            panic!("expected insert")
        };
        assert!(!delete_ticket(&conn, "bob", id).unwrap());
        assert!(delete_ticket(&conn, "alice", id).unwrap());
        assert_eq!(count_tickets(&conn, "alice").unwrap(), 0);
    }

    #[test]
    fn test_list_rounds_distinct() {
        let conn = test_conn();
        add_ticket(&conn, "alice", &new_ticket("1/10/2568", "111111", 1), now()).unwrap();
        add_ticket(&conn, "alice", &new_ticket("1/10/2568", "222222", 1), now()).unwrap();
        add_ticket(&conn, "alice", &new_ticket("16/10/2568", "333333", 1), now()).unwrap();

        let mut rounds = list_rounds(&conn, "alice").unwrap();
        rounds.sort();
        assert_eq!(rounds, vec!["1/10/2568", "16/10/2568"]);
    }
}
