use crate::types::NeighborCounts;
use serde::Serialize;

/// Counting-phase state for one distinct span text.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RawCandidate {
    pub(crate) count: u64,
    pub(crate) left_counts: NeighborCounts,
    pub(crate) right_counts: NeighborCounts,
}

impl RawCandidate {
    pub(crate) fn observe(&mut self, left: Option<char>, right: Option<char>) {
        self.count += 1;
        self.observe_neighbors(left, right);
    }

    pub(crate) fn observe_neighbors(&mut self, left: Option<char>, right: Option<char>) {
        if let Some(ch) = left {
            *self.left_counts.entry(ch).or_insert(0) += 1;
        }
        if let Some(ch) = right {
            *self.right_counts.entry(ch).or_insert(0) += 1;
        }
    }

    pub(crate) fn merge(&mut self, other: RawCandidate) {
        self.count += other.count;
        for (ch, n) in other.left_counts {
            *self.left_counts.entry(ch).or_insert(0) += n;
        }
        for (ch, n) in other.right_counts {
            *self.right_counts.entry(ch).or_insert(0) += n;
        }
    }
}

/// Final, immutable view of a candidate after scoring.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub text: String,
    pub count: u64,
    pub freq: f64,
    pub left_entropy: f64,
    pub right_entropy: f64,
    pub aggregation: f64,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
