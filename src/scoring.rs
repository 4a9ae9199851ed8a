use crate::candidate::{RawCandidate, ScoredCandidate};
use crate::candidate_table::CandidateTable;
use crate::types::{NeighborCounts, RankingKey, PARALLEL_SCORE_THRESHOLD};
use rayon::prelude::*;

fn coerce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Shannon entropy (base 2) of a neighbor multiset. Empty maps score `0.0`.
pub(crate) fn entropy<'a>(counts: impl IntoIterator<Item = &'a u64> + Clone) -> f64 {
    let total = counts.clone().into_iter().map(|&n| n as f64).sum::<f64>();
    if total <= 0.0 {
        return 0.0;
    }
    let h = counts
        .into_iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>();
    // one distinct neighbor sums to -0.0
    if h > 0.0 {
        coerce(h)
    } else {
        0.0
    }
}

pub(crate) fn neighbor_entropy(counts: &NeighborCounts) -> f64 {
    entropy(counts.values())
}

/// Minimum over all binary splits of `freq(whole) / (freq(left) * freq(right))`.
/// Splits with an unseen part are skipped; no usable split gives `0.0`.
pub(crate) fn aggregation(text: &[char], freq: f64, table: &CandidateTable) -> f64 {
    aggregation_with(text, freq, |part| table.freq(part))
}

pub(crate) fn aggregation_with(
    text: &[char],
    freq: f64,
    freq_of: impl Fn(&[char]) -> f64,
) -> f64 {
    if text.len() < 2 {
        return 0.0;
    }
    let min = (1..text.len())
        .filter_map(|split| {
            let left = freq_of(&text[..split]);
            let right = freq_of(&text[split..]);
            if left > 0.0 && right > 0.0 {
                Some(freq / (left * right))
            } else {
                None
            }
        })
        .fold(f64::INFINITY, f64::min);
    coerce(min)
}

pub(crate) fn quality_score(
    freq: f64,
    left_entropy: f64,
    right_entropy: f64,
    aggregation: f64,
) -> f64 {
    coerce(aggregation.log10() * freq * (left_entropy + right_entropy))
}

pub(crate) fn rank_value(candidate: &ScoredCandidate, key: RankingKey) -> f64 {
    match key {
        RankingKey::Score => candidate.score,
        RankingKey::Freq => candidate.freq,
        RankingKey::Aggregation => candidate.aggregation,
        RankingKey::Entropy => candidate.left_entropy + candidate.right_entropy,
    }
}

fn score_entry(text: &[char], raw: &RawCandidate, counts: &CandidateTable) -> ScoredCandidate {
    let freq = counts.freq(text);
    let aggregation = aggregation(text, freq, counts);
    let left_entropy = neighbor_entropy(&raw.left_counts);
    let right_entropy = neighbor_entropy(&raw.right_counts);
    ScoredCandidate {
        text: text.iter().collect(),
        count: raw.count,
        freq,
        left_entropy,
        right_entropy,
        aggregation,
        score: quality_score(freq, left_entropy, right_entropy, aggregation),
    }
}

/// Scores every entry of `neighbors` that passes `keep`. Frequencies and
/// cohesion are read from `counts`, which must be fully counted for every
/// length. Both may be the same table.
pub(crate) fn score_table(
    neighbors: &CandidateTable,
    counts: &CandidateTable,
    keep: impl Fn(&[char]) -> bool + Sync,
    parallel: bool,
) -> Vec<ScoredCandidate> {
    if parallel && neighbors.len() >= PARALLEL_SCORE_THRESHOLD {
        neighbors
            .entries
            .par_iter()
            .filter(|(text, _)| keep(text))
            .map(|(text, raw)| score_entry(text, raw, counts))
            .collect()
    } else {
        neighbors
            .entries
            .iter()
            .filter(|(text, _)| keep(text))
            .map(|(text, raw)| score_entry(text, raw, counts))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate_table::NeighborTracking;
    use crate::normalizer::normalize;
    use crate::types::NoisePolicy;

    fn counts(values: &[u64]) -> Vec<u64> {
        values.to_vec()
    }

    #[test]
    fn single_neighbor_has_zero_entropy() {
        let h = entropy(&counts(&[7]));
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());
    }

    #[test]
    fn uniform_neighbors_have_log2_k_entropy() {
        for k in 1..=16u32 {
            let h = entropy(&vec![3; k as usize]);
            assert!((h - (k as f64).log2()).abs() < 1e-6, "k={k} h={h}");
        }
    }

    #[test]
    fn empty_neighbors_have_zero_entropy() {
        assert_eq!(entropy(&counts(&[])), 0.0);
    }

    #[test]
    fn skewed_neighbors_have_lower_entropy_than_uniform() {
        assert!(entropy(&counts(&[9, 1])) < entropy(&counts(&[5, 5])));
    }

    #[test]
    fn aggregation_is_min_over_binary_splits() {
        let text = "十四是十四四十是四十十四不是四十四十不是十四";
        let corpus = normalize(text, NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 3, NeighborTracking::Skip, false);
        let text = "是十四".chars().collect::<Vec<_>>();
        let whole = table.freq(&text);
        let expected = (1..text.len())
            .map(|split| whole / (table.freq(&text[..split]) * table.freq(&text[split..])))
            .fold(f64::INFINITY, f64::min);
        assert!((aggregation(&text, whole, &table) - expected).abs() < 1e-12);
    }

    #[test]
    fn single_character_has_zero_aggregation() {
        let corpus = normalize("十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Skip, false);
        assert_eq!(aggregation(&['十'], table.freq(&['十']), &table), 0.0);
    }

    #[test]
    fn unseen_parts_are_skipped() {
        let corpus = normalize("十四", NoisePolicy::default());
        let table = CandidateTable::count(&corpus, 2, NeighborTracking::Skip, false);
        assert_eq!(aggregation(&['不', '是'], 0.5, &table), 0.0);
    }

    #[test]
    fn score_of_weak_cohesion_is_non_positive() {
        assert!(quality_score(0.1, 1.0, 1.0, 0.5) < 0.0);
        assert_eq!(quality_score(0.1, 1.0, 1.0, 0.0), 0.0);
    }
}
