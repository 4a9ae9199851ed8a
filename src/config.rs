use crate::errors::DiscoveryError;
use crate::types::{
    EntropyThresholdMode, MemoryMode, NoisePolicy, RankingKey, DEFAULT_MAX_WORD_LEN,
    DEFAULT_MIN_AGGREGATION, DEFAULT_MIN_ENTROPY, DEFAULT_MIN_FREQ,
};
use serde::Deserialize;
use std::path::Path;

/// Validated settings for one discovery session.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryConfig {
    pub max_word_len: usize,
    pub min_freq: f64,
    pub min_entropy: f64,
    pub min_aggregation: f64,
    pub entropy_threshold_mode: EntropyThresholdMode,
    pub memory_mode: MemoryMode,
    pub noise: NoisePolicy,
    pub ranking_key: RankingKey,
    /// Accepted words hidden from the ranked output, e.g. an existing dictionary.
    pub excluded_words: Vec<String>,
    /// Hide accepted words made only of digits.
    pub exclude_numeric: bool,
    pub parallel: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_word_len: DEFAULT_MAX_WORD_LEN,
            min_freq: DEFAULT_MIN_FREQ,
            min_entropy: DEFAULT_MIN_ENTROPY,
            min_aggregation: DEFAULT_MIN_AGGREGATION,
            entropy_threshold_mode: EntropyThresholdMode::default(),
            memory_mode: MemoryMode::default(),
            noise: NoisePolicy::default(),
            ranking_key: RankingKey::default(),
            excluded_words: Vec::new(),
            exclude_numeric: false,
            parallel: true,
        }
    }
}

/// On-disk form. Enum-valued options stay strings until `TryFrom` so an
/// unknown value reports the accepted set instead of a serde type error.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    max_word_len: usize,
    min_freq: f64,
    min_entropy: f64,
    min_aggregation: f64,
    entropy_threshold_mode: String,
    memory_mode: String,
    treat_digits_as_content: bool,
    treat_latin_as_content: bool,
    ranking_key: String,
    excluded_words: Vec<String>,
    exclude_numeric: bool,
    parallel: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self {
            max_word_len: config.max_word_len,
            min_freq: config.min_freq,
            min_entropy: config.min_entropy,
            min_aggregation: config.min_aggregation,
            entropy_threshold_mode: config.entropy_threshold_mode.as_str().to_string(),
            memory_mode: config.memory_mode.as_str().to_string(),
            treat_digits_as_content: config.noise.treat_digits_as_content,
            treat_latin_as_content: config.noise.treat_latin_as_content,
            ranking_key: config.ranking_key.as_str().to_string(),
            excluded_words: config.excluded_words,
            exclude_numeric: config.exclude_numeric,
            parallel: config.parallel,
        }
    }
}

impl TryFrom<RawConfig> for DiscoveryConfig {
    type Error = DiscoveryError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = Self {
            max_word_len: raw.max_word_len,
            min_freq: raw.min_freq,
            min_entropy: raw.min_entropy,
            min_aggregation: raw.min_aggregation,
            entropy_threshold_mode: EntropyThresholdMode::parse(&raw.entropy_threshold_mode)?,
            memory_mode: MemoryMode::parse(&raw.memory_mode)?,
            noise: NoisePolicy {
                treat_digits_as_content: raw.treat_digits_as_content,
                treat_latin_as_content: raw.treat_latin_as_content,
            },
            ranking_key: RankingKey::parse(&raw.ranking_key)?,
            excluded_words: raw.excluded_words,
            exclude_numeric: raw.exclude_numeric,
            parallel: raw.parallel,
        };
        config.validate()?;
        Ok(config)
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.max_word_len == 0 {
            return Err(DiscoveryError::config(
                "max_word_len must be greater than or equal to 1.",
            ));
        }

        let thresholds = [
            ("min_freq", self.min_freq),
            ("min_entropy", self.min_entropy),
            ("min_aggregation", self.min_aggregation),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(DiscoveryError::config(format!("{name} must be finite.")));
            }
            if value < 0.0 {
                return Err(DiscoveryError::config(format!(
                    "{name} must be greater than or equal to 0."
                )));
            }
        }
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DiscoveryError> {
        let raw: RawConfig = toml::from_str(source).map_err(|err| DiscoveryError::ConfigParse {
            path: "<inline>".into(),
            message: err.message().to_string(),
        })?;
        raw.try_into()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DiscoveryError> {
        let source = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&source).map_err(|err| DiscoveryError::ConfigParse {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })?;
        raw.try_into()
    }
}
