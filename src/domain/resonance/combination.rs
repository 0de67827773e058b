use crate::domain::market::timeframe::Timeframe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whitelisted set of timeframes that must resonate together.
///
/// Members are kept in canonical order (slowest first, deduplicated), so
/// two combinations built from the same timeframes compare and hash equal.
/// The first member is the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Combination(Vec<Timeframe>);

impl Combination {
    /// Builds the canonical form. Returns `None` for fewer than two distinct timeframes.
    pub fn new(timeframes: impl IntoIterator<Item = Timeframe>) -> Option<Self> {
        let mut members: Vec<Timeframe> = timeframes.into_iter().collect();
        members.sort_unstable_by(|a, b| b.cmp(a));
        members.dedup();
        if members.len() < 2 {
            return None;
        }
        Some(Self(members))
    }

    /// Largest (slowest) member
    pub fn anchor(&self) -> Timeframe {
        self.0[0]
    }

    pub fn members(&self) -> &[Timeframe] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, timeframe: Timeframe) -> bool {
        self.0.contains(&timeframe)
    }

    /// True when every member of `self` is in `other` and `other` has more members
    pub fn is_strict_subset_of(&self, other: &Combination) -> bool {
        self.len() < other.len() && self.0.iter().all(|tf| other.contains(*tf))
    }

    /// Members of `self` missing from `base`
    pub fn added_over<'a>(&'a self, base: &'a Combination) -> impl Iterator<Item = Timeframe> + 'a {
        self.0.iter().copied().filter(move |tf| !base.contains(*tf))
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|tf| tf.as_str()).collect();
        f.write_str(&labels.join("+"))
    }
}
