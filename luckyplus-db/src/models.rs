use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrizeTier {
    First,
    FirstAdjacent,
    Second,
    Third,
    Fourth,
    Fifth,
    FrontThree,
    BackThree,
    BackTwo,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 9] = [
        PrizeTier::First,
        PrizeTier::FirstAdjacent,
        PrizeTier::Second,
        PrizeTier::Third,
        PrizeTier::Fourth,
        PrizeTier::Fifth,
        PrizeTier::FrontThree,
        PrizeTier::BackThree,
        PrizeTier::BackTwo,
    ];

    /// Tier ID as published by the upstream results API.
    pub fn identifier(&self) -> &'static str {
        match self {
            PrizeTier::First => "prizeFirst",
            PrizeTier::FirstAdjacent => "prizeFirstNear",
            PrizeTier::Second => "prizeSecond",
            PrizeTier::Third => "prizeThird",
            PrizeTier::Fourth => "prizeForth",
            PrizeTier::Fifth => "prizeFifth",
            PrizeTier::FrontThree => "runningNumberFrontThree",
            PrizeTier::BackThree => "runningNumberBackThree",
            PrizeTier::BackTwo => "runningNumberBackTwo",
        }
    }

    pub fn from_identifier(id: &str) -> Option<PrizeTier> {
        // The upstream API spells the fourth tier "prizeForth".
        if id == "prizeFourth" {
            return Some(PrizeTier::Fourth);
        }
        PrizeTier::ALL.into_iter().find(|t| t.identifier() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrizeTier::First => "first prize",
            PrizeTier::FirstAdjacent => "first prize adjacent",
            PrizeTier::Second => "second prize",
            PrizeTier::Third => "third prize",
            PrizeTier::Fourth => "fourth prize",
            PrizeTier::Fifth => "fifth prize",
            PrizeTier::FrontThree => "front three",
            PrizeTier::BackThree => "back three",
            PrizeTier::BackTwo => "back two",
        }
    }

    pub fn from_label(label: &str) -> Option<PrizeTier> {
        PrizeTier::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl std::fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Stored evaluation state of a ticket.
///
/// Anything that does not parse as one of the known forms is kept verbatim
/// in `Unknown` so it survives a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Unchecked,
    NoWin,
    Won(PrizeTier),
    Unknown(String),
}

impl TicketStatus {
    const UNCHECKED: &'static str = "unchecked";
    const NO_WIN: &'static str = "no-win";
    const WON_PREFIX: &'static str = "won:";

    pub fn parse(raw: &str) -> TicketStatus {
        match raw {
            Self::UNCHECKED => TicketStatus::Unchecked,
            Self::NO_WIN => TicketStatus::NoWin,
            _ => raw
                .strip_prefix(Self::WON_PREFIX)
                .and_then(PrizeTier::from_label)
                .map(TicketStatus::Won)
                .unwrap_or_else(|| TicketStatus::Unknown(raw.to_string())),
        }
    }

    pub fn from_match(tier: Option<PrizeTier>) -> TicketStatus {
        match tier {
            Some(t) => TicketStatus::Won(t),
            None => TicketStatus::NoWin,
        }
    }

    pub fn is_unchecked(&self) -> bool {
        matches!(self, TicketStatus::Unchecked)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Unchecked => write!(f, "{}", Self::UNCHECKED),
            TicketStatus::NoWin => write!(f, "{}", Self::NO_WIN),
            TicketStatus::Won(tier) => write!(f, "{}{}", Self::WON_PREFIX, tier.label()),
            TicketStatus::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub user_id: String,
    pub round: String,
    pub number: String,
    pub quantity: i32,
    pub status: TicketStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Ticket {
    pub fn effective_quantity(&self) -> u64 {
        normalize_quantity(self.quantity) as u64
    }
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub round: String,
    pub number: String,
    pub quantity: i32,
}

pub fn normalize_quantity(quantity: i32) -> i32 {
    quantity.max(1)
}

pub fn validate_ticket_number(number: &str) -> Result<()> {
    if number.len() < 2 || number.len() > 6 {
        bail!("Ticket number '{}' must have 2 to 6 digits", number);
    }
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        bail!("Ticket number '{}' must contain only digits", number);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct TierNumbers {
    pub tier: PrizeTier,
    /// Display name from the draw source, e.g. the localized tier name.
    pub label: String,
    pub numbers: Vec<String>,
}

/// One official draw, normalized from whatever the draw source returned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawResult {
    pub date: String,
    pub tiers: Vec<TierNumbers>,
}

impl DrawResult {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: PrizeTier, numbers: &[&str]) -> Self {
        self.push_tier(
            tier,
            tier.label().to_string(),
            numbers.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    /// Appends numbers to a tier, merging with an existing entry for it.
    pub fn push_tier(&mut self, tier: PrizeTier, label: String, numbers: Vec<String>) {
        match self.tiers.iter_mut().find(|t| t.tier == tier) {
            Some(existing) => existing.numbers.extend(numbers),
            None => self.tiers.push(TierNumbers { tier, label, numbers }),
        }
    }

    pub fn numbers(&self, tier: PrizeTier) -> &[String] {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map(|t| t.numbers.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_prize(&self) -> &str {
        self.numbers(PrizeTier::First)
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// The subset of a draw the digit predictor learns from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalDraw {
    pub date: String,
    pub first_prize: String,
    pub front_three: Vec<String>,
    pub back_three: Vec<String>,
    pub back_two: String,
}

impl From<&DrawResult> for HistoricalDraw {
    fn from(draw: &DrawResult) -> Self {
        let first_of = |tier: PrizeTier| {
            draw.numbers(tier).first().cloned().unwrap_or_default()
        };
        Self {
            date: draw.date.clone(),
            first_prize: first_of(PrizeTier::First),
            front_three: draw.numbers(PrizeTier::FrontThree).to_vec(),
            back_three: draw.numbers(PrizeTier::BackThree).to_vec(),
            back_two: first_of(PrizeTier::BackTwo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_known_forms() {
        assert_eq!(TicketStatus::parse("unchecked"), TicketStatus::Unchecked);
        assert_eq!(TicketStatus::parse("no-win"), TicketStatus::NoWin);
        assert_eq!(
            TicketStatus::parse("won:back two"),
            TicketStatus::Won(PrizeTier::BackTwo)
        );
    }

    #[test]
    fn test_status_unknown_kept_verbatim() {
        let status = TicketStatus::parse("won:jackpot");
        assert_eq!(status, TicketStatus::Unknown("won:jackpot".to_string()));
        assert_eq!(status.to_string(), "won:jackpot");
    }

    #[test]
    fn test_status_display_parses_back() {
        for tier in PrizeTier::ALL {
            let status = TicketStatus::Won(tier);
            assert_eq!(TicketStatus::parse(&status.to_string()), status);
        }
    }

    #[test]
    fn test_from_identifier_fourth_spellings() {
        assert_eq!(PrizeTier::from_identifier("prizeForth"), Some(PrizeTier::Fourth));
        assert_eq!(PrizeTier::from_identifier("prizeFourth"), Some(PrizeTier::Fourth));
        assert_eq!(PrizeTier::from_identifier("prizeSixth"), None);
    }

    #[test]
    fn test_validate_ticket_number() {
        assert!(validate_ticket_number("12").is_ok());
        assert!(validate_ticket_number("012345").is_ok());
        assert!(validate_ticket_number("1").is_err());
        assert!(validate_ticket_number("1234567").is_err());
        assert!(validate_ticket_number("12a4").is_err());
    }

    #[test]
    fn test_effective_quantity() {
        assert_eq!(normalize_quantity(0), 1);
        assert_eq!(normalize_quantity(-3), 1);
        assert_eq!(normalize_quantity(4), 4);
    }

    #[test]
    fn test_draw_absent_tier_is_empty() {
        let draw = DrawResult::new("1 Jan").with_tier(PrizeTier::BackTwo, &["89"]);
        assert!(draw.numbers(PrizeTier::FrontThree).is_empty());
        assert_eq!(draw.first_prize(), "");
        assert_eq!(draw.numbers(PrizeTier::BackTwo), &["89".to_string()]);
    }

    #[test]
    fn test_push_tier_merges() {
        let mut draw = DrawResult::new("d");
        draw.push_tier(PrizeTier::BackThree, "x".into(), vec!["111".into()]);
        draw.push_tier(PrizeTier::BackThree, "y".into(), vec!["222".into()]);
        assert_eq!(draw.tiers.len(), 1);
        assert_eq!(draw.numbers(PrizeTier::BackThree).len(), 2);
    }

    #[test]
    fn test_historical_from_draw() {
        let draw = DrawResult::new("16/10/2568")
            .with_tier(PrizeTier::First, &["059696"])
            .with_tier(PrizeTier::FrontThree, &["531", "955"])
            .with_tier(PrizeTier::BackThree, &["476", "889"])
            .with_tier(PrizeTier::BackTwo, &["61"]);
        let hist = HistoricalDraw::from(&draw);
        assert_eq!(hist.first_prize, "059696");
        assert_eq!(hist.front_three, vec!["531", "955"]);
        assert_eq!(hist.back_two, "61");
    }
}
