//! Map-oriented formulation of the acceptance pipeline: counts and the two
//! neighbor sides live in separate per-length maps, entropy is computed per
//! side, then the sides are fused and filtered. Acceptance goes through
//! [`Discoverer::accepts`] so both paths share one predicate.

use crate::candidate::ScoredCandidate;
use crate::engine::{rank, Discoverer};
use crate::normalizer::{normalize, Corpus};
use crate::scoring::{aggregation_with, entropy, quality_score};
use crate::spans::spans;
use crate::types::{CandidateText, NeighborCounts};
use rustc_hash::FxHashMap;

type SideCounts = FxHashMap<CandidateText, NeighborCounts>;

/// Counts and neighbor maps for spans of one length.
#[derive(Debug, Default)]
pub(crate) struct LengthCounts {
    pub(crate) counts: FxHashMap<CandidateText, u64>,
    pub(crate) left: SideCounts,
    pub(crate) right: SideCounts,
}

/// Entropy of each side a word was seen on. A side with no recorded
/// neighbor is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct FusedEntropy {
    pub(crate) left: Option<f64>,
    pub(crate) right: Option<f64>,
}

/// Index `k` holds spans of length `k + 1`. No span is longer than the
/// corpus, so there are at most `corpus.len()` buckets.
pub(crate) fn count_by_length(corpus: &Corpus, max_word_len: usize) -> Vec<LengthCounts> {
    let mut by_length = (0..max_word_len.min(corpus.len()))
        .map(|_| LengthCounts::default())
        .collect::<Vec<_>>();
    for span in spans(corpus, max_word_len) {
        let text = span.text(corpus);
        let bucket = &mut by_length[text.len() - 1];
        *bucket.counts.entry(CandidateText::from_slice(text)).or_insert(0) += 1;
        if let Some(ch) = span.left(corpus) {
            *bucket
                .left
                .entry(CandidateText::from_slice(text))
                .or_default()
                .entry(ch)
                .or_insert(0) += 1;
        }
        if let Some(ch) = span.right(corpus) {
            *bucket
                .right
                .entry(CandidateText::from_slice(text))
                .or_default()
                .entry(ch)
                .or_insert(0) += 1;
        }
    }
    by_length
}

/// Left entropy comes from left-neighbor counts and right from right.
pub(crate) fn side_entropies(side: &SideCounts) -> FxHashMap<CandidateText, f64> {
    side.iter()
        .map(|(text, counts)| (text.clone(), entropy(counts.values())))
        .collect()
}

pub(crate) fn fuse_sides(
    left: FxHashMap<CandidateText, f64>,
    right: FxHashMap<CandidateText, f64>,
) -> FxHashMap<CandidateText, FusedEntropy> {
    let mut fused = left
        .into_iter()
        .map(|(text, h)| {
            (
                text,
                FusedEntropy {
                    left: Some(h),
                    right: None,
                },
            )
        })
        .collect::<FxHashMap<_, _>>();
    for (text, h) in right {
        fused.entry(text).or_default().right = Some(h);
    }
    fused
}

pub(crate) fn filter_fused(
    discoverer: &Discoverer,
    by_length: &[LengthCounts],
    fused: FxHashMap<CandidateText, FusedEntropy>,
    corpus_length: usize,
) -> Vec<ScoredCandidate> {
    let freq_of = |text: &[char]| -> f64 {
        by_length
            .get(text.len().wrapping_sub(1))
            .and_then(|bucket| bucket.counts.get(text))
            .map_or(0.0, |&n| n as f64 / corpus_length as f64)
    };

    let mut accepted = fused
        .into_iter()
        .filter(|(text, _)| text.len() > 1)
        .filter_map(|(text, sides)| {
            let count = *by_length[text.len() - 1].counts.get(&text)?;
            let freq = freq_of(text.as_slice());
            let aggregation = aggregation_with(&text, freq, freq_of);
            let left_entropy = sides.left.unwrap_or(0.0);
            let right_entropy = sides.right.unwrap_or(0.0);
            let candidate = ScoredCandidate {
                text: text.iter().collect(),
                count,
                freq,
                left_entropy,
                right_entropy,
                aggregation,
                score: quality_score(freq, left_entropy, right_entropy, aggregation),
            };
            (discoverer.accepts(&candidate) && !discoverer.is_excluded(&candidate))
                .then_some(candidate)
        })
        .collect::<Vec<_>>();
    rank(&mut accepted, discoverer.config().ranking_key);
    accepted
}

/// Runs the map-oriented pipeline end to end. Produces the same ranked
/// words as [`Discoverer::discover`].
pub fn discover_fused(discoverer: &Discoverer, text: &str) -> Vec<ScoredCandidate> {
    let corpus = normalize(text, discoverer.config().noise);
    if corpus.is_empty() {
        return Vec::new();
    }
    let by_length = count_by_length(&corpus, discoverer.config().max_word_len);

    let mut left = FxHashMap::default();
    let mut right = FxHashMap::default();
    for bucket in by_length.iter().skip(1) {
        left.extend(side_entropies(&bucket.left));
        right.extend(side_entropies(&bucket.right));
    }
    let fused = fuse_sides(left, right);
    filter_fused(discoverer, &by_length, fused, corpus.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoisePolicy;

    fn chars(text: &str) -> CandidateText {
        text.chars().collect()
    }

    #[test]
    fn length_buckets_hold_only_their_length() {
        let corpus = normalize("十四是十四", NoisePolicy::default());
        let by_length = count_by_length(&corpus, 3);
        assert_eq!(by_length.len(), 3);
        for (ix, bucket) in by_length.iter().enumerate() {
            assert!(bucket.counts.keys().all(|text| text.len() == ix + 1));
        }
        assert_eq!(by_length[1].counts.get(&chars("十四")), Some(&2));
    }

    #[test]
    fn buckets_are_capped_by_corpus_length() {
        let corpus = normalize("十四是十四", NoisePolicy::default());
        let by_length = count_by_length(&corpus, 1 << 40);
        assert_eq!(by_length.len(), corpus.len());
        assert_eq!(by_length[4].counts.get(&chars("十四是十四")), Some(&1));
    }

    #[test]
    fn left_entropy_reads_left_neighbors() {
        // 四十 is preceded by 是/四/不 but always followed by 是 or 不
        let corpus = normalize("是四十是四四十不不四十是", NoisePolicy::default());
        let by_length = count_by_length(&corpus, 2);
        let left = side_entropies(&by_length[1].left);
        let right = side_entropies(&by_length[1].right);
        let word = chars("四十");
        let expected_left = entropy(by_length[1].left[&word].values());
        let expected_right = entropy(by_length[1].right[&word].values());
        assert_eq!(left[&word], expected_left);
        assert_eq!(right[&word], expected_right);
        assert!((expected_left - 3f64.log2()).abs() < 1e-9);
        let skewed = 2.0 / 3.0 * 1.5f64.log2() + 1.0 / 3.0 * 3f64.log2();
        assert!((expected_right - skewed).abs() < 1e-9);
    }

    #[test]
    fn fusion_keeps_one_sided_words() {
        let mut left = FxHashMap::default();
        left.insert(chars("甲乙"), 1.0);
        left.insert(chars("乙丙"), 0.5);
        let mut right = FxHashMap::default();
        right.insert(chars("乙丙"), 2.0);
        right.insert(chars("丙丁"), 1.5);

        let fused = fuse_sides(left, right);
        assert_eq!(fused.len(), 3);
        assert_eq!(
            fused[&chars("甲乙")],
            FusedEntropy {
                left: Some(1.0),
                right: None
            }
        );
        assert_eq!(
            fused[&chars("乙丙")],
            FusedEntropy {
                left: Some(0.5),
                right: Some(2.0)
            }
        );
        assert_eq!(fused[&chars("丙丁")].left, None);
    }
}
