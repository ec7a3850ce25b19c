mod config;
mod display;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::display::{
    display_analysis, display_check_report, display_import_summary, display_prediction,
    display_rounds, display_tickets,
};
use luckyplus_db::db::{
    add_ticket, count_tickets, delete_ticket, fetch_ticket, fetch_tickets, list_rounds, migrate,
    open_db, update_ticket, AddOutcome, UpdateOutcome,
};
use luckyplus_db::models::{validate_ticket_number, NewTicket};
use luckyplus_db::rusqlite::Connection;
use luckyplus_engine::check::{analyze, CheckScope, TicketChecker};
use luckyplus_engine::history::load_history;
use luckyplus_engine::matcher::{MatchPolicy, TicketMatcher};
use luckyplus_engine::predictor::DigitPredictor;
use luckyplus_engine::round::{current_round, sort_rounds_desc, upcoming_round, Clock, RoundLabel, SystemClock};
use luckyplus_engine::source::{DrawSource, FileDrawSource, HttpDrawSource};

#[derive(Parser)]
#[command(name = "luckyplus", about = "Thai government lottery ticket tracker")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true, default_value = "luckyplus.json")]
    config: PathBuf,

    /// Ticket owner, overrides the configured user
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a ticket
    Add {
        /// Ticket number, 2 to 6 digits
        number: String,

        /// Round label D/M/Y (defaults to the upcoming draw)
        #[arg(short, long)]
        round: Option<String>,

        /// Number of copies
        #[arg(short, long, default_value = "1")]
        quantity: i32,
    },

    /// List recorded tickets
    List {
        #[arg(short, long)]
        round: Option<String>,
    },

    /// Change a ticket's number, round or quantity
    Edit {
        id: i64,

        #[arg(short, long)]
        number: Option<String>,

        #[arg(short, long)]
        round: Option<String>,

        #[arg(short, long)]
        quantity: Option<i32>,
    },

    /// Remove a ticket
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Import tickets from a `number;round;quantity` CSV file
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the latest drawn round, the upcoming one and rounds with tickets
    Rounds,

    /// Evaluate tickets against the latest draw and store the results
    Check {
        /// Round to check (defaults to the latest drawn round)
        #[arg(short, long)]
        round: Option<String>,

        /// Re-check tickets that already have a result
        #[arg(short, long)]
        all: bool,

        /// Read the draw from a saved results payload instead of the API
        #[arg(long)]
        draw_file: Option<PathBuf>,

        #[arg(short, long)]
        policy: Option<MatchPolicy>,
    },

    /// Summarize stored ticket results
    Analyze {
        #[arg(short, long)]
        round: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Predict the next draw from positional digit frequencies
    Predict {
        #[arg(long)]
        draw_file: Option<PathBuf>,

        /// Use the built-in history only
        #[arg(long)]
        offline: bool,

        /// Per-draw recency decay in (0, 1], 1.0 weighs all draws equally
        #[arg(short, long)]
        decay: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Print the database path
    DbPath,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let user = cli.user.clone().unwrap_or_else(|| config.user.clone());
    let path = config.resolved_db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;
    let clock = SystemClock;

    match cli.command {
        Command::Add { number, round, quantity } => {
            cmd_add(&conn, &clock, &user, number, round, quantity)
        }
        Command::List { round } => cmd_list(&conn, &user, round),
        Command::Edit { id, number, round, quantity } => {
            cmd_edit(&conn, &clock, &user, id, number, round, quantity)
        }
        Command::Delete { id, yes } => cmd_delete(&conn, &user, id, yes),
        Command::Import { file } => cmd_import(&conn, &clock, &user, &file),
        Command::Rounds => cmd_rounds(&conn, &clock, &user),
        Command::Check { round, all, draw_file, policy } => {
            cmd_check(&conn, &clock, &config, &user, round, all, draw_file, policy)
        }
        Command::Analyze { round, json } => cmd_analyze(&conn, &user, round, json),
        Command::Predict { draw_file, offline, decay, json } => {
            cmd_predict(&config, draw_file, offline, decay, json)
        }
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Canonical form so that `01/10/2568` and `1/10/2025` name the same round.
fn normalize_round(round: Option<String>) -> Result<Option<String>> {
    round
        .map(|r| RoundLabel::parse(&r).map(|label| label.to_string()))
        .transpose()
}

fn draw_source(config: &AppConfig, draw_file: Option<PathBuf>) -> Result<Box<dyn DrawSource>> {
    match draw_file {
        Some(path) => Ok(Box::new(FileDrawSource::new(path))),
        None => {
            let source = HttpDrawSource::new(&config.draw_api_url, config.fetch_timeout())
                .context("Cannot build HTTP client")?;
            log::info!("Fetching draw results from {}", source.url());
            Ok(Box::new(source))
        }
    }
}

fn cmd_add(
    conn: &Connection,
    clock: &dyn Clock,
    user: &str,
    number: String,
    round: Option<String>,
    quantity: i32,
) -> Result<()> {
    validate_ticket_number(&number)?;
    let round = match normalize_round(round)? {
        Some(round) => round,
        None => upcoming_round(clock.now()).to_string(),
    };
    let ticket = NewTicket { round, number, quantity };

    match add_ticket(conn, user, &ticket, clock.now())? {
        AddOutcome::Inserted(id) => println!(
            "Ticket #{} added: {} for round {}",
            id, ticket.number, ticket.round
        ),
        AddOutcome::Merged(id) => println!(
            "Ticket #{} already held {} for round {}, quantity increased",
            id, ticket.number, ticket.round
        ),
    }
    Ok(())
}

fn cmd_list(conn: &Connection, user: &str, round: Option<String>) -> Result<()> {
    if count_tickets(conn, user)? == 0 {
        println!("No tickets yet. Start with: luckyplus add <number>");
        return Ok(());
    }
    let round = normalize_round(round)?;
    let tickets = fetch_tickets(conn, user, round.as_deref())?;
    display_tickets(&tickets);
    Ok(())
}

fn cmd_edit(
    conn: &Connection,
    clock: &dyn Clock,
    user: &str,
    id: i64,
    number: Option<String>,
    round: Option<String>,
    quantity: Option<i32>,
) -> Result<()> {
    let Some(existing) = fetch_ticket(conn, user, id)? else {
        bail!("Ticket #{} not found", id);
    };

    let number = number.unwrap_or(existing.number);
    validate_ticket_number(&number)?;
    let ticket = NewTicket {
        round: normalize_round(round)?.unwrap_or(existing.round),
        number,
        quantity: quantity.unwrap_or(existing.quantity),
    };

    match update_ticket(conn, user, id, &ticket, clock.now())? {
        UpdateOutcome::Updated => {
            println!("Ticket #{} updated, its result will be checked again.", id);
            Ok(())
        }
        UpdateOutcome::NotFound => bail!("Ticket #{} not found", id),
        UpdateOutcome::Conflict => bail!(
            "Another ticket already holds {} for round {}",
            ticket.number,
            ticket.round
        ),
    }
}

fn cmd_delete(conn: &Connection, user: &str, id: i64, yes: bool) -> Result<()> {
    let Some(ticket) = fetch_ticket(conn, user, id)? else {
        bail!("Ticket #{} not found", id);
    };
    display_tickets(std::slice::from_ref(&ticket));

    if !yes {
        let confirm = prompt("\nDelete this ticket? (y/n) : ")?;
        if confirm.to_lowercase() != "y" {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    if delete_ticket(conn, user, id)? {
        println!("Ticket #{} deleted.", id);
    } else {
        println!("Ticket #{} was already gone.", id);
    }
    Ok(())
}

fn cmd_import(conn: &Connection, clock: &dyn Clock, user: &str, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, user, file, clock.now())?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_rounds(conn: &Connection, clock: &dyn Clock, user: &str) -> Result<()> {
    let current = current_round(clock);
    let upcoming = upcoming_round(clock.now());
    let stored = sort_rounds_desc(&list_rounds(conn, user)?);
    display_rounds(&current.to_string(), &upcoming.to_string(), &stored);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_check(
    conn: &Connection,
    clock: &dyn Clock,
    config: &AppConfig,
    user: &str,
    round: Option<String>,
    all: bool,
    draw_file: Option<PathBuf>,
    policy: Option<MatchPolicy>,
) -> Result<()> {
    let round = normalize_round(round)?;
    let source = draw_source(config, draw_file)?;
    let matcher = TicketMatcher::new(policy.unwrap_or(config.match_policy));
    let scope = if all { CheckScope::All } else { CheckScope::Unchecked };

    let checker = TicketChecker::new(conn, source.as_ref(), clock).with_matcher(matcher);
    let report = checker.check(user, round.as_deref(), scope)?;
    display_check_report(&report);

    if !report.failures.is_empty() {
        bail!("{} tickets could not be updated", report.failures.len());
    }
    Ok(())
}

fn cmd_analyze(conn: &Connection, user: &str, round: Option<String>, json: bool) -> Result<()> {
    let round = normalize_round(round)?;
    let report = analyze(conn, user, round.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_analysis(&report);
    }
    Ok(())
}

fn cmd_predict(
    config: &AppConfig,
    draw_file: Option<PathBuf>,
    offline: bool,
    decay: Option<f64>,
    json: bool,
) -> Result<()> {
    let decay = decay.unwrap_or(config.recency_decay);
    if !(decay > 0.0 && decay <= 1.0) {
        bail!("Recency decay must lie in (0, 1], got {}", decay);
    }

    let source = if offline {
        None
    } else {
        Some(draw_source(config, draw_file)?)
    };
    let history = load_history(source.as_deref());
    let prediction = DigitPredictor::new(decay).predict(&history);

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        display_prediction(&prediction);
    }
    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Cannot read from stdin")?;
    Ok(input.trim().to_string())
}
