use crate::errors::DiscoveryError;
use smallvec::SmallVec;

pub(crate) const PARALLEL_SCORE_THRESHOLD: usize = 500;
pub(crate) const PARALLEL_COUNT_THRESHOLD: usize = 1 << 16;
pub(crate) const COUNT_SHARD_LEN: usize = 1 << 14;

/// Single character every noise run collapses to. Spans never contain it.
pub const BOUNDARY: char = ' ';

pub const DEFAULT_MAX_WORD_LEN: usize = 5;
pub const DEFAULT_MIN_FREQ: f64 = 0.00005;
pub const DEFAULT_MIN_ENTROPY: f64 = 2.0;
pub const DEFAULT_MIN_AGGREGATION: f64 = 50.0;

pub(crate) type CandidateText = SmallVec<[char; 8]>;
pub(crate) type NeighborCounts = rustc_hash::FxHashMap<char, u64>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EntropyThresholdMode {
    #[default]
    Both,
    Average,
}

impl EntropyThresholdMode {
    pub fn parse(value: &str) -> Result<Self, DiscoveryError> {
        match value {
            "both" => Ok(Self::Both),
            "average" => Ok(Self::Average),
            _ => Err(DiscoveryError::Configuration(format!(
                "Invalid entropy_threshold_mode {value:?}. Expected one of: 'both', 'average'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Average => "average",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MemoryMode {
    #[default]
    HighMemory,
    LowMemory,
}

impl MemoryMode {
    pub fn parse(value: &str) -> Result<Self, DiscoveryError> {
        match value {
            "high_memory" => Ok(Self::HighMemory),
            "low_memory" => Ok(Self::LowMemory),
            _ => Err(DiscoveryError::Configuration(format!(
                "Invalid memory_mode {value:?}. Expected one of: 'high_memory', 'low_memory'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighMemory => "high_memory",
            Self::LowMemory => "low_memory",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RankingKey {
    #[default]
    Score,
    Freq,
    Aggregation,
    Entropy,
}

impl RankingKey {
    pub fn parse(value: &str) -> Result<Self, DiscoveryError> {
        match value {
            "score" => Ok(Self::Score),
            "freq" | "frequency" => Ok(Self::Freq),
            "aggregation" => Ok(Self::Aggregation),
            "entropy" => Ok(Self::Entropy),
            _ => Err(DiscoveryError::Configuration(format!(
                "Invalid ranking_key {value:?}. Expected one of: 'score', 'freq', 'aggregation', 'entropy'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Freq => "freq",
            Self::Aggregation => "aggregation",
            Self::Entropy => "entropy",
        }
    }
}

/// Which character classes count as noise during normalization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoisePolicy {
    pub treat_digits_as_content: bool,
    pub treat_latin_as_content: bool,
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self {
            treat_digits_as_content: true,
            treat_latin_as_content: false,
        }
    }
}
