use crate::candidate::ScoredCandidate;
use crate::candidate_table::{CandidateTable, NeighborTracking};
use crate::config::DiscoveryConfig;
use crate::errors::DiscoveryError;
use crate::normalizer::{normalize, Corpus};
use crate::scoring::{aggregation, rank_value, score_table};
use crate::types::{CandidateText, EntropyThresholdMode, MemoryMode, RankingKey};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::time::Instant;

/// Averages over the accepted words. All zero when nothing was accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiscoverySummary {
    pub accepted: usize,
    pub avg_len: f64,
    pub avg_freq: f64,
    pub avg_left_entropy: f64,
    pub avg_right_entropy: f64,
    pub avg_aggregation: f64,
}

impl DiscoverySummary {
    fn from_candidates(candidates: &[ScoredCandidate]) -> Self {
        if candidates.is_empty() {
            return Self::default();
        }
        let n = candidates.len() as f64;
        let mean = |f: fn(&ScoredCandidate) -> f64| candidates.iter().map(f).sum::<f64>() / n;
        Self {
            accepted: candidates.len(),
            avg_len: mean(|c| c.char_len() as f64),
            avg_freq: mean(|c| c.freq),
            avg_left_entropy: mean(|c| c.left_entropy),
            avg_right_entropy: mean(|c| c.right_entropy),
            avg_aggregation: mean(|c| c.aggregation),
        }
    }
}

/// Ranked result of one discovery run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Discovery {
    pub candidates: Vec<ScoredCandidate>,
    pub corpus_length: usize,
    pub summary: DiscoverySummary,
}

impl Discovery {
    pub fn words(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn words_with_freq(&self) -> Vec<(&str, f64)> {
        self.candidates
            .iter()
            .map(|c| (c.text.as_str(), c.freq))
            .collect()
    }

    pub fn get(&self, text: &str) -> Option<&ScoredCandidate> {
        self.candidates.iter().find(|c| c.text == text)
    }
}

/// A discovery session bound to one validated configuration.
#[derive(Clone, Debug)]
pub struct Discoverer {
    config: DiscoveryConfig,
    excluded: FxHashSet<String>,
}

impl Discoverer {
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;
        let excluded = config.excluded_words.iter().cloned().collect();
        Ok(Self { config, excluded })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn discover(&self, text: &str) -> Discovery {
        let corpus = normalize(text, self.config.noise);
        self.discover_corpus(&corpus)
    }

    pub fn discover_file(&self, path: &Path) -> Result<Discovery, DiscoveryError> {
        let bytes = std::fs::read(path).map_err(|source| DiscoveryError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|source| DiscoveryError::InvalidUtf8 {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.discover(&text))
    }

    pub fn discover_corpus(&self, corpus: &Corpus) -> Discovery {
        let started = Instant::now();
        if corpus.is_empty() {
            tracing::info!("empty corpus, no candidates");
            return Discovery::default();
        }

        let scored = self.score_candidates(corpus);
        let scored_count = scored.len();
        let mut candidates = scored
            .into_iter()
            .filter(|candidate| self.accepts(candidate) && !self.is_excluded(candidate))
            .collect::<Vec<_>>();
        rank(&mut candidates, self.config.ranking_key);

        let summary = DiscoverySummary::from_candidates(&candidates);
        tracing::info!(
            corpus_length = corpus.len(),
            scored = scored_count,
            accepted = candidates.len(),
            memory_mode = self.config.memory_mode.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "word discovery finished"
        );

        Discovery {
            candidates,
            corpus_length: corpus.len(),
            summary,
        }
    }

    /// Every multi-character candidate with all fields computed; in
    /// low-memory mode only those surviving the early filter.
    pub(crate) fn score_candidates(&self, corpus: &Corpus) -> Vec<ScoredCandidate> {
        let max_word_len = self.config.max_word_len;
        let parallel = self.config.parallel;

        match self.config.memory_mode {
            MemoryMode::HighMemory => {
                let table =
                    CandidateTable::count(corpus, max_word_len, NeighborTracking::Record, parallel);
                tracing::debug!(candidates = table.len(), "counted spans with neighbors");
                score_table(&table, &table, |text| text.len() > 1, parallel)
            }
            MemoryMode::LowMemory => {
                let counts =
                    CandidateTable::count(corpus, max_word_len, NeighborTracking::Skip, parallel);
                tracing::debug!(candidates = counts.len(), "counted spans");

                let mut survivors = self.early_survivors(&counts);
                tracing::debug!(survivors = survivors.len(), "early frequency/cohesion filter");
                survivors.collect_neighbors(corpus, max_word_len);

                score_table(&survivors, &counts, |_| true, parallel)
            }
        }
    }

    /// Copies counts of texts passing the length, frequency and cohesion
    /// predicates into a fresh table with empty neighbor maps.
    fn early_survivors(&self, counts: &CandidateTable) -> CandidateTable {
        let entries = counts
            .entries
            .iter()
            .filter(|(text, _)| {
                if text.len() < 2 {
                    return false;
                }
                let freq = counts.freq(text);
                freq > self.config.min_freq
                    && aggregation(text, freq, counts) > self.config.min_aggregation
            })
            .map(|(text, raw)| {
                let mut kept = raw.clone();
                kept.left_counts.clear();
                kept.right_counts.clear();
                (CandidateText::from_slice(text), kept)
            })
            .collect();
        CandidateTable {
            entries,
            corpus_length: counts.corpus_length,
        }
    }

    pub(crate) fn accepts(&self, candidate: &ScoredCandidate) -> bool {
        let config = &self.config;
        let entropy_ok = match config.entropy_threshold_mode {
            EntropyThresholdMode::Both => {
                candidate.left_entropy > config.min_entropy
                    && candidate.right_entropy > config.min_entropy
            }
            EntropyThresholdMode::Average => {
                (candidate.left_entropy + candidate.right_entropy) / 2.0 > config.min_entropy
            }
        };
        candidate.char_len() > 1
            && candidate.freq > config.min_freq
            && candidate.aggregation > config.min_aggregation
            && entropy_ok
    }

    pub(crate) fn is_excluded(&self, candidate: &ScoredCandidate) -> bool {
        if self.excluded.contains(&candidate.text) {
            return true;
        }
        self.config.exclude_numeric && is_numeric_word(&candidate.text)
    }
}

fn is_numeric_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_digit() || ('０'..='９').contains(&ch))
}

/// Descending by `key`, then ascending by text so equal scores keep a
/// reproducible order.
pub(crate) fn rank(candidates: &mut [ScoredCandidate], key: RankingKey) {
    candidates.sort_by(|a, b| {
        rank_value(b, key)
            .total_cmp(&rank_value(a, key))
            .then_with(|| a.text.cmp(&b.text))
    });
}
