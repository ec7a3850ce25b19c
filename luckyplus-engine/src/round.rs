use anyhow::{bail, Context, Result};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Timelike};

pub const BUDDHIST_ERA_OFFSET: i32 = 543;
/// Results are final from this local hour on a draw day.
pub const DRAW_HOUR: u32 = 17;
/// Draws happen twice a month.
pub const DRAW_DAYS: [u32; 2] = [1, 16];

/// Years below this in a parsed label are taken as Gregorian.
const BUDDHIST_YEAR_THRESHOLD: i32 = 2500;

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A draw cycle, written `D/M/Y` with a Buddhist-era year (Gregorian + 543).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundLabel {
    date: NaiveDate,
}

impl RoundLabel {
    pub fn from_date(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Gregorian calendar date of the draw.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn buddhist_year(&self) -> i32 {
        self.date.year() + BUDDHIST_ERA_OFFSET
    }

    /// Accepts `D/M/Y` with or without zero padding. A year below 2500 is
    /// read as Gregorian, anything else as Buddhist era.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split('/').collect();
        if parts.len() != 3 {
            bail!("Invalid round label '{}', expected D/M/Y", raw);
        }
        let day: u32 = parts[0]
            .parse()
            .with_context(|| format!("Invalid day in round '{}'", raw))?;
        let month: u32 = parts[1]
            .parse()
            .with_context(|| format!("Invalid month in round '{}'", raw))?;
        let year: i32 = parts[2]
            .parse()
            .with_context(|| format!("Invalid year in round '{}'", raw))?;
        let gregorian = if year < BUDDHIST_YEAR_THRESHOLD {
            year
        } else {
            year - BUDDHIST_ERA_OFFSET
        };
        let date = NaiveDate::from_ymd_opt(gregorian, month, day)
            .with_context(|| format!("No such date in round '{}'", raw))?;
        Ok(Self { date })
    }
}

impl std::fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.date.day(), self.date.month(), self.buddhist_year())
    }
}

/// Moves back within the same month to `day`. Caller guarantees
/// `date.day() >= day`.
fn back_to_day(date: NaiveDate, day: u32) -> NaiveDate {
    date - Days::new(u64::from(date.day() - day))
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    let mut d = date + Days::new(1);
    while d.day() != 1 {
        d = d + Days::new(1);
    }
    d
}

fn is_drawn(now: NaiveDateTime) -> bool {
    now.hour() >= DRAW_HOUR
}

/// Most recent draw whose results are out at `now`.
pub fn identify_round(now: NaiveDateTime) -> RoundLabel {
    let today = now.date();
    let day = today.day();

    let date = if DRAW_DAYS.contains(&day) && is_drawn(now) {
        today
    } else if day > 16 {
        back_to_day(today, 16)
    } else if day > 1 {
        back_to_day(today, 1)
    } else {
        back_to_day(today - Days::new(1), 16)
    };
    RoundLabel::from_date(date)
}

/// Next draw a ticket bought at `now` takes part in.
pub fn upcoming_round(now: NaiveDateTime) -> RoundLabel {
    let today = now.date();
    let day = today.day();

    let date = if DRAW_DAYS.contains(&day) && !is_drawn(now) {
        today
    } else if day < 16 {
        today + Days::new(u64::from(16 - day))
    } else {
        next_month_start(today)
    };
    RoundLabel::from_date(date)
}

pub fn current_round(clock: &dyn Clock) -> RoundLabel {
    identify_round(clock.now())
}

/// Newest first. Labels that do not parse keep their relative order at the end.
pub fn sort_rounds_desc(rounds: &[String]) -> Vec<String> {
    let mut parsed: Vec<(Option<RoundLabel>, &String)> = rounds
        .iter()
        .map(|r| (RoundLabel::parse(r).ok(), r))
        .collect();
    parsed.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    parsed.into_iter().map(|(_, r)| r.clone()).collect()
}
