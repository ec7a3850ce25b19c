use serde::Serialize;

use luckyplus_db::models::HistoricalDraw;

use crate::history::DrawHistory;
use crate::tally::Tally;

/// Digit emitted for a position nothing was observed at.
pub const FALLBACK_DIGIT: char = '0';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstPrize,
    FrontThree,
    BackThree,
    BackTwo,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FirstPrize,
        Field::FrontThree,
        Field::BackThree,
        Field::BackTwo,
    ];

    pub fn width(&self) -> usize {
        match self {
            Field::FirstPrize => 6,
            Field::FrontThree | Field::BackThree => 3,
            Field::BackTwo => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstPrize => "first prize",
            Field::FrontThree => "front three",
            Field::BackThree => "back three",
            Field::BackTwo => "back two",
        }
    }

    pub fn numbers_from<'a>(&self, draw: &'a HistoricalDraw) -> Vec<&'a str> {
        match self {
            Field::FirstPrize => vec![draw.first_prize.as_str()],
            Field::FrontThree => draw.front_three.iter().map(String::as_str).collect(),
            Field::BackThree => draw.back_three.iter().map(String::as_str).collect(),
            Field::BackTwo => vec![draw.back_two.as_str()],
        }
    }
}

/// Weighted digit counts for each position of a fixed-width number.
#[derive(Debug, Clone)]
pub struct PositionalFrequency {
    positions: Vec<Tally<f64>>,
}

impl PositionalFrequency {
    pub fn new(width: usize) -> Self {
        Self {
            positions: vec![Tally::new(); width],
        }
    }

    /// Characters past the width are ignored.
    pub fn observe(&mut self, number: &str, weight: f64) {
        for (tally, c) in self.positions.iter_mut().zip(number.chars()) {
            tally.add(c, weight);
        }
    }

    pub fn position(&self, index: usize) -> Option<&Tally<f64>> {
        self.positions.get(index)
    }

    pub fn select(&self) -> Vec<DigitPick> {
        self.positions
            .iter()
            .map(|tally| match tally.top() {
                Some((digit, weight)) => DigitPick {
                    digit,
                    share: weight / tally.total(),
                },
                None => DigitPick {
                    digit: FALLBACK_DIGIT,
                    share: 0.0,
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigitPick {
    pub digit: char,
    /// Weight of the chosen digit over the total weight seen at its position.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldPrediction {
    pub field: Field,
    pub number: String,
    pub picks: Vec<DigitPick>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub first_prize: FieldPrediction,
    pub front_three: FieldPrediction,
    pub back_three: FieldPrediction,
    pub back_two: FieldPrediction,
    pub draws_used: usize,
}

impl Prediction {
    pub fn fields(&self) -> [&FieldPrediction; 4] {
        [&self.first_prize, &self.front_three, &self.back_three, &self.back_two]
    }
}

pub struct DigitPredictor {
    recency_decay: f64,
}

impl Default for DigitPredictor {
    fn default() -> Self {
        Self { recency_decay: 1.0 }
    }
}

impl DigitPredictor {
    /// `recency_decay` scales each draw by `decay^age`, age 0 being the most
    /// recent draw. 1.0 weighs every draw equally.
    pub fn new(recency_decay: f64) -> Self {
        Self { recency_decay }
    }

    pub fn frequencies(&self, history: &DrawHistory, field: Field) -> PositionalFrequency {
        let mut freq = PositionalFrequency::new(field.width());
        let n = history.len();
        for (i, draw) in history.draws().iter().enumerate() {
            let age = (n - 1 - i) as i32;
            let weight = self.recency_decay.powi(age);
            for number in field.numbers_from(draw) {
                freq.observe(number, weight);
            }
        }
        freq
    }

    pub fn predict_field(&self, history: &DrawHistory, field: Field) -> FieldPrediction {
        let picks = self.frequencies(history, field).select();
        FieldPrediction {
            field,
            number: picks.iter().map(|p| p.digit).collect(),
            picks,
        }
    }

    pub fn predict(&self, history: &DrawHistory) -> Prediction {
        if history.is_empty() {
            log::warn!("No draw history, every digit falls back to {}", FALLBACK_DIGIT);
        }
        Prediction {
            first_prize: self.predict_field(history, Field::FirstPrize),
            front_three: self.predict_field(history, Field::FrontThree),
            back_three: self.predict_field(history, Field::BackThree),
            back_two: self.predict_field(history, Field::BackTwo),
            draws_used: history.len(),
        }
    }
}
