use luckyplus_db::models::HistoricalDraw;

use crate::source::DrawSource;

/// (date, first prize, front three, back three, back two), oldest first.
/// Positional ties go to the digit seen first, so this order decides them.
const SEED_DRAWS: [(&str, &str, [&str; 2], [&str; 2], &str); 20] = [
    ("2/1/2568", "730209", ["446", "065"], ["376", "297"], "51"),
    ("17/1/2568", "807779", ["699", "961"], ["448", "477"], "23"),
    ("1/2/2568", "558700", ["285", "418"], ["685", "824"], "51"),
    ("16/2/2568", "847377", ["268", "613"], ["652", "001"], "50"),
    ("1/3/2568", "818894", ["139", "530"], ["656", "781"], "54"),
    ("16/3/2568", "757563", ["595", "927"], ["457", "309"], "32"),
    ("1/4/2568", "669687", ["635", "760"], ["180", "666"], "36"),
    ("16/4/2568", "266227", ["413", "254"], ["474", "760"], "85"),
    ("2/5/2568", "213388", ["826", "116"], ["167", "662"], "06"),
    ("16/5/2568", "251309", ["109", "231"], ["965", "631"], "87"),
    ("1/6/2568", "559352", ["349", "134"], ["307", "044"], "20"),
    ("16/6/2568", "507392", ["243", "017"], ["299", "736"], "06"),
    ("1/7/2568", "949246", ["680", "169"], ["918", "261"], "91"),
    ("16/7/2568", "245324", ["995", "171"], ["084", "336"], "26"),
    ("1/8/2568", "811852", ["142", "525"], ["512", "891"], "50"),
    ("16/8/2568", "994865", ["247", "602"], ["834", "989"], "63"),
    ("1/9/2568", "506356", ["131", "012"], ["022", "209"], "31"),
    ("16/9/2568", "074646", ["512", "740"], ["308", "703"], "58"),
    ("1/10/2568", "876978", ["843", "532"], ["280", "605"], "77"),
    ("16/10/2568", "059696", ["531", "955"], ["476", "889"], "61"),
];

/// Past draws in chronological order, the most recent last.
#[derive(Debug, Clone, Default)]
pub struct DrawHistory {
    draws: Vec<HistoricalDraw>,
}

impl DrawHistory {
    pub fn new(draws: Vec<HistoricalDraw>) -> Self {
        Self { draws }
    }

    pub fn seed() -> Self {
        let draws = SEED_DRAWS
            .iter()
            .map(|(date, first, front, back, two)| HistoricalDraw {
                date: date.to_string(),
                first_prize: first.to_string(),
                front_three: front.iter().map(|n| n.to_string()).collect(),
                back_three: back.iter().map(|n| n.to_string()).collect(),
                back_two: two.to_string(),
            })
            .collect();
        Self { draws }
    }

    pub fn push(&mut self, draw: HistoricalDraw) {
        self.draws.push(draw);
    }

    pub fn draws(&self) -> &[HistoricalDraw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Seed history with the latest official draw appended. A failing source is
/// logged and the seed is used alone.
pub fn load_history(source: Option<&dyn DrawSource>) -> DrawHistory {
    let mut history = DrawHistory::seed();
    let Some(source) = source else {
        return history;
    };
    match source.latest() {
        Ok(draw) => {
            log::info!("Appending latest draw {} to history", draw.date);
            history.push(HistoricalDraw::from(&draw));
        }
        Err(e) => log::warn!("Predicting from seed history only: {}", e),
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use luckyplus_db::models::{DrawResult, PrizeTier};

    struct StubSource(Option<DrawResult>);

    impl DrawSource for StubSource {
        fn latest(&self) -> Result<DrawResult, EngineError> {
            self.0
                .clone()
                .ok_or_else(|| EngineError::DrawFetchFailed("offline".into()))
        }
    }

    #[test]
    fn test_seed_shape() {
        let history = DrawHistory::seed();
        assert_eq!(history.len(), 20);
        for draw in history.draws() {
            assert_eq!(draw.first_prize.len(), 6);
            assert_eq!(draw.front_three.len(), 2);
            assert_eq!(draw.back_three.len(), 2);
            assert_eq!(draw.back_two.len(), 2);
        }
        assert_eq!(history.draws()[19].first_prize, "059696");
    }

    #[test]
    fn test_load_appends_latest() {
        let draw = DrawResult::new("1/11/2568")
            .with_tier(PrizeTier::First, &["999999"])
            .with_tier(PrizeTier::BackTwo, &["99"]);
        let source = StubSource(Some(draw));
        let history = load_history(Some(&source));
        assert_eq!(history.len(), 21);
        assert_eq!(history.draws()[20].first_prize, "999999");
        assert!(history.draws()[20].front_three.is_empty());
    }

    #[test]
    fn test_load_falls_back_to_seed() {
        let source = StubSource(None);
        assert_eq!(load_history(Some(&source)).len(), 20);
        assert_eq!(load_history(None).len(), 20);
    }

    #[test]
    fn test_seed_forecast_ties_follow_chronology() {
        use crate::predictor::DigitPredictor;

        let history = DrawHistory::seed();
        assert!(!history.is_empty());
        let prediction = DigitPredictor::default().predict(&history);
        assert_eq!(prediction.first_prize.number, "857306");
        assert_eq!(prediction.front_three.number, "135");
        assert_eq!(prediction.back_three.number, "686");
        assert_eq!(prediction.back_two.number, "51");

        let mut reversed = history.draws().to_vec();
        reversed.reverse();
        let prediction = DigitPredictor::default().predict(&DrawHistory::new(reversed));
        assert_eq!(prediction.first_prize.number, "859396");
    }
}
