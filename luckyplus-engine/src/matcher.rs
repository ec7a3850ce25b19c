use serde::{Deserialize, Serialize};

use luckyplus_db::models::{DrawResult, PrizeTier, Ticket};

use crate::prize::{spec_for, MatchRule, PRIZE_SCHEMA};

/// How to settle a ticket that satisfies more than one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// The tier scanned last wins: exact tiers, then back two, back three,
    /// front three.
    #[default]
    LastMatch,
    /// The most valuable matching tier wins.
    HighestValue,
}

const SCAN_ORDER: [MatchRule; 4] = [
    MatchRule::ExactFull,
    MatchRule::SuffixTwo,
    MatchRule::SuffixThree,
    MatchRule::PrefixThree,
];

fn suffix(number: &str, n: usize) -> Option<&str> {
    if number.len() < n {
        return None;
    }
    number.get(number.len() - n..)
}

fn prefix(number: &str, n: usize) -> Option<&str> {
    number.get(..n)
}

pub fn rule_matches(rule: MatchRule, number: &str, pattern: &str) -> bool {
    if number.is_empty() || pattern.is_empty() {
        return false;
    }
    match rule {
        MatchRule::ExactFull => number == pattern,
        MatchRule::SuffixTwo => suffix(number, 2) == Some(pattern),
        MatchRule::SuffixThree => suffix(number, 3) == Some(pattern),
        MatchRule::PrefixThree => prefix(number, 3) == Some(pattern),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketMatcher {
    policy: MatchPolicy,
}

impl TicketMatcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn classify(&self, ticket: &Ticket, draw: &DrawResult) -> Option<PrizeTier> {
        self.classify_number(&ticket.number, draw)
    }

    pub fn classify_number(&self, number: &str, draw: &DrawResult) -> Option<PrizeTier> {
        let mut matched: Option<PrizeTier> = None;

        for rule in SCAN_ORDER {
            for spec in PRIZE_SCHEMA.iter().filter(|s| s.rule == rule) {
                for pattern in draw.numbers(spec.tier) {
                    if !rule_matches(rule, number, pattern) {
                        continue;
                    }
                    matched = match (self.policy, matched) {
                        (MatchPolicy::HighestValue, Some(prev))
                            if spec_for(prev).value >= spec.value =>
                        {
                            Some(prev)
                        }
                        _ => Some(spec.tier),
                    };
                }
            }
        }

        matched
    }
}

pub fn classify(ticket: &Ticket, draw: &DrawResult) -> Option<PrizeTier> {
    TicketMatcher::default().classify(ticket, draw)
}
