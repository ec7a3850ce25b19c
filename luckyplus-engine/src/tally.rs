use std::ops::AddAssign;

/// Per-character weights kept in first-seen order, so that `top` breaks ties
/// the same way on every run.
#[derive(Debug, Clone)]
pub struct Tally<W> {
    entries: Vec<(char, W)>,
}

impl<W> Default for Tally<W> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<W: Copy + PartialOrd + AddAssign + Default> Tally<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, c: char, weight: W) {
        match self.entries.iter_mut().find(|(k, _)| *k == c) {
            Some((_, w)) => *w += weight,
            None => self.entries.push((c, weight)),
        }
    }

    /// Highest weight; the earliest inserted character wins a tie.
    pub fn top(&self) -> Option<(char, W)> {
        let mut best: Option<(char, W)> = None;
        for &(c, w) in &self.entries {
            match best {
                Some((_, bw)) if w <= bw => {}
                _ => best = Some((c, w)),
            }
        }
        best
    }

    pub fn total(&self) -> W {
        let mut sum = W::default();
        for &(_, w) in &self.entries {
            sum += w;
        }
        sum
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(char, W)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_highest() {
        let mut t: Tally<u64> = Tally::new();
        t.add('1', 1);
        t.add('2', 3);
        t.add('1', 1);
        assert_eq!(t.top(), Some(('2', 3)));
        assert_eq!(t.total(), 5);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let mut t: Tally<f64> = Tally::new();
        t.add('7', 2.0);
        t.add('3', 2.0);
        assert_eq!(t.top(), Some(('7', 2.0)));
    }

    #[test]
    fn test_empty() {
        let t: Tally<u64> = Tally::new();
        assert!(t.is_empty());
        assert_eq!(t.top(), None);
    }
}
