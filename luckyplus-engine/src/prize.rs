use luckyplus_db::models::{PrizeTier, TicketStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Whole ticket number equals the pattern.
    ExactFull,
    SuffixTwo,
    SuffixThree,
    PrefixThree,
}

#[derive(Debug, Clone, Copy)]
pub struct PrizeSpec {
    pub tier: PrizeTier,
    pub rule: MatchRule,
    /// Payout per ticket, in baht.
    pub value: u64,
}

/// Indexed by `PrizeTier as usize`.
pub const PRIZE_SCHEMA: [PrizeSpec; 9] = [
    PrizeSpec { tier: PrizeTier::First, rule: MatchRule::ExactFull, value: 6_000_000 },
    PrizeSpec { tier: PrizeTier::FirstAdjacent, rule: MatchRule::ExactFull, value: 100_000 },
    PrizeSpec { tier: PrizeTier::Second, rule: MatchRule::ExactFull, value: 200_000 },
    PrizeSpec { tier: PrizeTier::Third, rule: MatchRule::ExactFull, value: 80_000 },
    PrizeSpec { tier: PrizeTier::Fourth, rule: MatchRule::ExactFull, value: 40_000 },
    PrizeSpec { tier: PrizeTier::Fifth, rule: MatchRule::ExactFull, value: 20_000 },
    PrizeSpec { tier: PrizeTier::FrontThree, rule: MatchRule::PrefixThree, value: 4_000 },
    PrizeSpec { tier: PrizeTier::BackThree, rule: MatchRule::SuffixThree, value: 4_000 },
    PrizeSpec { tier: PrizeTier::BackTwo, rule: MatchRule::SuffixTwo, value: 2_000 },
];

pub fn spec_for(tier: PrizeTier) -> &'static PrizeSpec {
    &PRIZE_SCHEMA[tier as usize]
}

pub fn prize_value(tier: PrizeTier) -> u64 {
    spec_for(tier).value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusValue {
    pub win: bool,
    pub unit_value: u64,
}

pub fn resolve_status(status: &TicketStatus) -> StatusValue {
    match status {
        TicketStatus::Won(tier) => StatusValue {
            win: true,
            unit_value: prize_value(*tier),
        },
        TicketStatus::Unchecked | TicketStatus::NoWin | TicketStatus::Unknown(_) => StatusValue {
            win: false,
            unit_value: 0,
        },
    }
}
