//! Statistical discovery of unknown multi-character words in unsegmented
//! text. Candidates are ranked by frequency, internal cohesion and the
//! branching entropy of their neighbor characters.

mod candidate;
mod candidate_table;
mod config;
mod engine;
mod errors;
mod fused;
mod normalizer;
mod output;
#[cfg(feature = "python")]
mod py_bindings;
mod scoring;
mod spans;
mod types;

pub use candidate::ScoredCandidate;
pub use config::DiscoveryConfig;
pub use engine::{Discoverer, Discovery, DiscoverySummary};
pub use errors::DiscoveryError;
pub use fused::discover_fused;
pub use normalizer::{normalize, Corpus};
pub use output::{
    render, scaled_count, write_discovery, write_full, write_json_lines, write_minimal,
    OutputFormat, FULL_HEADER,
};
pub use types::{
    EntropyThresholdMode, MemoryMode, NoisePolicy, RankingKey, BOUNDARY, DEFAULT_MAX_WORD_LEN,
    DEFAULT_MIN_AGGREGATION, DEFAULT_MIN_ENTROPY, DEFAULT_MIN_FREQ,
};

/// One-shot discovery over an in-memory buffer.
pub fn discover(text: &str, config: DiscoveryConfig) -> Result<Discovery, DiscoveryError> {
    Ok(Discoverer::new(config)?.discover(text))
}

/// One-shot discovery over a UTF-8 file.
pub fn discover_file(
    path: &std::path::Path,
    config: DiscoveryConfig,
) -> Result<Discovery, DiscoveryError> {
    Discoverer::new(config)?.discover_file(path)
}
