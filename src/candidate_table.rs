use crate::candidate::RawCandidate;
use crate::normalizer::Corpus;
use crate::spans::{spans, spans_starting_in};
use crate::types::{CandidateText, COUNT_SHARD_LEN, PARALLEL_COUNT_THRESHOLD};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Whether the counting pass also keeps neighbor multisets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum NeighborTracking {
    Record,
    Skip,
}

/// Owned table of every distinct span text seen in a corpus.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CandidateTable {
    pub(crate) entries: FxHashMap<CandidateText, RawCandidate>,
    pub(crate) corpus_length: usize,
}

impl CandidateTable {
    pub(crate) fn count(
        corpus: &Corpus,
        max_word_len: usize,
        tracking: NeighborTracking,
        parallel: bool,
    ) -> Self {
        if parallel && corpus.len() >= PARALLEL_COUNT_THRESHOLD {
            Self::count_sharded(corpus, max_word_len, tracking, COUNT_SHARD_LEN)
        } else {
            Self::count_range(corpus, max_word_len, tracking, 0..corpus.len())
        }
    }

    pub(crate) fn count_range(
        corpus: &Corpus,
        max_word_len: usize,
        tracking: NeighborTracking,
        starts: Range<usize>,
    ) -> Self {
        let mut table = Self {
            entries: FxHashMap::default(),
            corpus_length: corpus.len(),
        };
        for span in spans_starting_in(corpus, max_word_len, starts) {
            let candidate = table
                .entries
                .entry(CandidateText::from_slice(span.text(corpus)))
                .or_default();
            match tracking {
                NeighborTracking::Record => {
                    candidate.observe(span.left(corpus), span.right(corpus));
                }
                NeighborTracking::Skip => candidate.count += 1,
            }
        }
        table
    }

    /// Counts contiguous shards of start positions independently and merges
    /// them. Each shard sees the whole corpus, so spans and neighbors that
    /// cross a shard edge are counted exactly once.
    pub(crate) fn count_sharded(
        corpus: &Corpus,
        max_word_len: usize,
        tracking: NeighborTracking,
        shard_len: usize,
    ) -> Self {
        let shard_len = shard_len.max(1);
        let shards = (0..corpus.len())
            .step_by(shard_len)
            .map(|start| start..start.saturating_add(shard_len).min(corpus.len()))
            .collect::<Vec<_>>();

        let mut table = shards
            .into_par_iter()
            .map(|starts| Self::count_range(corpus, max_word_len, tracking, starts))
            .reduce(Self::default, |mut acc, shard| {
                acc.merge(shard);
                acc
            });
        table.corpus_length = corpus.len();
        table
    }

    pub(crate) fn merge(&mut self, other: CandidateTable) {
        if self.entries.len() < other.entries.len() {
            let smaller = std::mem::replace(&mut self.entries, other.entries);
            self.merge_entries(smaller);
        } else {
            self.merge_entries(other.entries);
        }
        self.corpus_length = self.corpus_length.max(other.corpus_length);
    }

    fn merge_entries(&mut self, entries: FxHashMap<CandidateText, RawCandidate>) {
        for (text, candidate) in entries {
            self.entries.entry(text).or_default().merge(candidate);
        }
    }

    /// Second scan for the low-memory strategy: neighbors are recorded only
    /// for texts already in the table, every other span is ignored.
    pub(crate) fn collect_neighbors(&mut self, corpus: &Corpus, max_word_len: usize) {
        for span in spans(corpus, max_word_len) {
            if let Some(candidate) = self.entries.get_mut(span.text(corpus)) {
                candidate.observe_neighbors(span.left(corpus), span.right(corpus));
            }
        }
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&[char], &RawCandidate) -> bool) {
        self.entries.retain(|text, candidate| keep(text, candidate));
    }

    pub(crate) fn get(&self, text: &[char]) -> Option<&RawCandidate> {
        self.entries.get(text)
    }

    /// `count / corpus_length`, or `0.0` for texts never observed.
    pub(crate) fn freq(&self, text: &[char]) -> f64 {
        match self.get(text) {
            Some(candidate) if self.corpus_length > 0 => {
                candidate.count as f64 / self.corpus_length as f64
            }
            _ => 0.0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use crate::types::NoisePolicy;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn counts_every_span_once() {
        let corpus = normalize("十四是十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Record, false);
        assert_eq!(table.get(&chars("十四")).map(|c| c.count), Some(2));
        assert_eq!(table.get(&chars("四是")).map(|c| c.count), Some(1));
        assert_eq!(table.get(&chars("四")).map(|c| c.count), Some(2));
        assert_eq!(table.corpus_length, 5);
    }

    #[test]
    fn neighbor_counts_skip_corpus_edges() {
        let corpus = normalize("十四是十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Record, false);
        let word = table.get(&chars("十四")).expect("candidate");
        assert_eq!(word.left_counts.get(&'是'), Some(&1));
        assert_eq!(word.left_counts.len(), 1);
        assert_eq!(word.right_counts.get(&'是'), Some(&1));
        assert_eq!(word.right_counts.len(), 1);
    }

    #[test]
    fn skip_tracking_records_counts_only() {
        let corpus = normalize("十四是十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Skip, false);
        let word = table.get(&chars("十四")).expect("candidate");
        assert_eq!(word.count, 2);
        assert!(word.left_counts.is_empty());
        assert!(word.right_counts.is_empty());
    }

    #[test]
    fn second_pass_matches_single_pass_for_kept_texts() {
        let corpus = normalize("十四是十四四十是四十", NoisePolicy::default());
        let full = CandidateTable::count(&corpus, 3, NeighborTracking::Record, false);
        let mut deferred = CandidateTable::count(&corpus, 3, NeighborTracking::Skip, false);
        deferred.retain(|text, _| text.len() == 2);
        deferred.collect_neighbors(&corpus, 3);

        assert!(!deferred.entries.is_empty());
        for (text, candidate) in &deferred.entries {
            assert_eq!(full.get(text), Some(candidate));
        }
    }

    #[test]
    fn sharded_counts_equal_sequential_counts() {
        let text = "十四是十四四十是四十，十四不是四十四十不是十四";
        let corpus = normalize(text, NoisePolicy::default());
        let sequential = CandidateTable::count(&corpus, 4, NeighborTracking::Record, false);
        for shard_len in [1, 2, 3, 7, 100] {
            let sharded =
                CandidateTable::count_sharded(&corpus, 4, NeighborTracking::Record, shard_len);
            assert_eq!(sharded, sequential, "shard_len={shard_len}");
        }
    }

    #[test]
    fn missing_text_has_zero_freq() {
        let corpus = normalize("十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Skip, false);
        assert_eq!(table.freq(&chars("四十")), 0.0);
        assert_eq!(table.freq(&chars("十四")), 0.5);
    }
}
