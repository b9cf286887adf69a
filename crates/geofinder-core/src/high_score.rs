//! Device-local best score.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The best cumulative score seen on this device. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HighScore(i64);

impl HighScore {
    pub fn new(value: i64) -> Self {
        Self(value.max(0))
    }

    /// Parses the persisted plain-integer form. Missing or unreadable values
    /// count as zero.
    pub fn parse(stored: Option<&str>) -> Self {
        match stored.map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => raw.parse::<i64>().map(Self::new).unwrap_or_else(|_| {
                warn!(value = raw, "[HighScore] Ignoring unreadable stored high score");
                Self::default()
            }),
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Raises the high score if `score` beats it. Returns the new value when
    /// it changed so the caller can persist it.
    pub fn observe(&mut self, score: i64) -> Option<i64> {
        if score > self.0 {
            self.0 = score;
            Some(score)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(HighScore::parse(Some("42")).value(), 42);
        assert_eq!(HighScore::parse(Some(" 7 ")).value(), 7);
        assert_eq!(HighScore::parse(Some("abc")).value(), 0);
        assert_eq!(HighScore::parse(None).value(), 0);
    }

    #[test]
    fn test_observe_is_monotonic_and_tracks_max() {
        let mut high = HighScore::default();
        let scores = [3, 5, 4, 9, 2, 9, 11, -1];
        let mut max_seen = 0;
        for score in scores {
            let before = high.value();
            high.observe(score);
            max_seen = max_seen.max(score);
            assert!(high.value() >= before);
            assert_eq!(high.value(), max_seen);
        }
    }

    #[test]
    fn test_observe_reports_only_raises() {
        let mut high = HighScore::new(5);
        assert_eq!(high.observe(5), None);
        assert_eq!(high.observe(6), Some(6));
    }
}
