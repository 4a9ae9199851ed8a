use crate::candidate::ScoredCandidate;
use crate::config::DiscoveryConfig;
use crate::engine::{Discoverer, Discovery};
use crate::errors::DiscoveryError;
use crate::types::{
    EntropyThresholdMode, MemoryMode, NoisePolicy, RankingKey, DEFAULT_MAX_WORD_LEN,
    DEFAULT_MIN_AGGREGATION, DEFAULT_MIN_ENTROPY, DEFAULT_MIN_FREQ,
};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

#[pyclass(frozen)]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredWord {
    #[pyo3(get)]
    pub(crate) text: String,
    #[pyo3(get)]
    pub(crate) count: u64,
    #[pyo3(get)]
    pub(crate) freq: f64,
    #[pyo3(get)]
    pub(crate) left_entropy: f64,
    #[pyo3(get)]
    pub(crate) right_entropy: f64,
    #[pyo3(get)]
    pub(crate) aggregation: f64,
    #[pyo3(get)]
    pub(crate) score: f64,
}

impl From<ScoredCandidate> for ScoredWord {
    fn from(candidate: ScoredCandidate) -> Self {
        Self {
            text: candidate.text,
            count: candidate.count,
            freq: candidate.freq,
            left_entropy: candidate.left_entropy,
            right_entropy: candidate.right_entropy,
            aggregation: candidate.aggregation,
            score: candidate.score,
        }
    }
}

impl From<DiscoveryError> for PyErr {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Configuration(_) | DiscoveryError::ConfigParse { .. } => {
                PyValueError::new_err(err.to_string())
            }
            DiscoveryError::Input { .. }
            | DiscoveryError::InvalidUtf8 { .. }
            | DiscoveryError::Output { .. } => PyOSError::new_err(err.to_string()),
        }
    }
}

fn panic_payload_to_string(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}

#[allow(clippy::too_many_arguments)]
fn build_discoverer(
    max_word_len: usize,
    min_freq: f64,
    min_entropy: f64,
    min_aggregation: f64,
    entropy_threshold_mode: &str,
    memory_mode: &str,
    treat_digits_as_content: bool,
    treat_latin_as_content: bool,
    ranking_key: &str,
    excluded_words: Option<Vec<String>>,
    exclude_numeric: bool,
) -> PyResult<Discoverer> {
    let config = DiscoveryConfig {
        max_word_len,
        min_freq,
        min_entropy,
        min_aggregation,
        entropy_threshold_mode: EntropyThresholdMode::parse(entropy_threshold_mode)?,
        memory_mode: MemoryMode::parse(memory_mode)?,
        noise: NoisePolicy {
            treat_digits_as_content,
            treat_latin_as_content,
        },
        ranking_key: RankingKey::parse(ranking_key)?,
        excluded_words: excluded_words.unwrap_or_default(),
        exclude_numeric,
        parallel: true,
    };
    Ok(Discoverer::new(config)?)
}

fn run_guarded(
    py: Python<'_>,
    name: &str,
    job: impl FnOnce() -> Result<Discovery, DiscoveryError> + Send,
) -> PyResult<Vec<ScoredWord>> {
    let result =
        py.allow_threads(|| catch_unwind(AssertUnwindSafe(job)).map_err(panic_payload_to_string));
    match result {
        Ok(discovery) => Ok(discovery?
            .candidates
            .into_iter()
            .map(ScoredWord::from)
            .collect()),
        Err(message) => Err(PyRuntimeError::new_err(format!(
            "word discovery panicked during {name}(): {message}"
        ))),
    }
}

#[pyfunction]
#[pyo3(signature = (
    text,
    max_word_len=DEFAULT_MAX_WORD_LEN,
    min_freq=DEFAULT_MIN_FREQ,
    min_entropy=DEFAULT_MIN_ENTROPY,
    min_aggregation=DEFAULT_MIN_AGGREGATION,
    entropy_threshold_mode="both",
    memory_mode="high_memory",
    treat_digits_as_content=true,
    treat_latin_as_content=false,
    ranking_key="score",
    excluded_words=None,
    exclude_numeric=false,
))]
#[allow(clippy::too_many_arguments)]
fn discover(
    py: Python<'_>,
    text: String,
    max_word_len: usize,
    min_freq: f64,
    min_entropy: f64,
    min_aggregation: f64,
    entropy_threshold_mode: &str,
    memory_mode: &str,
    treat_digits_as_content: bool,
    treat_latin_as_content: bool,
    ranking_key: &str,
    excluded_words: Option<Vec<String>>,
    exclude_numeric: bool,
) -> PyResult<Vec<ScoredWord>> {
    let discoverer = build_discoverer(
        max_word_len,
        min_freq,
        min_entropy,
        min_aggregation,
        entropy_threshold_mode,
        memory_mode,
        treat_digits_as_content,
        treat_latin_as_content,
        ranking_key,
        excluded_words,
        exclude_numeric,
    )?;
    run_guarded(py, "discover", move || Ok(discoverer.discover(&text)))
}

#[pyfunction]
#[pyo3(signature = (
    path,
    max_word_len=DEFAULT_MAX_WORD_LEN,
    min_freq=DEFAULT_MIN_FREQ,
    min_entropy=DEFAULT_MIN_ENTROPY,
    min_aggregation=DEFAULT_MIN_AGGREGATION,
    entropy_threshold_mode="both",
    memory_mode="high_memory",
    treat_digits_as_content=true,
    treat_latin_as_content=false,
    ranking_key="score",
    excluded_words=None,
    exclude_numeric=false,
))]
#[allow(clippy::too_many_arguments)]
fn discover_file(
    py: Python<'_>,
    path: PathBuf,
    max_word_len: usize,
    min_freq: f64,
    min_entropy: f64,
    min_aggregation: f64,
    entropy_threshold_mode: &str,
    memory_mode: &str,
    treat_digits_as_content: bool,
    treat_latin_as_content: bool,
    ranking_key: &str,
    excluded_words: Option<Vec<String>>,
    exclude_numeric: bool,
) -> PyResult<Vec<ScoredWord>> {
    let discoverer = build_discoverer(
        max_word_len,
        min_freq,
        min_entropy,
        min_aggregation,
        entropy_threshold_mode,
        memory_mode,
        treat_digits_as_content,
        treat_latin_as_content,
        ranking_key,
        excluded_words,
        exclude_numeric,
    )?;
    run_guarded(py, "discover_file", move || discoverer.discover_file(&path))
}

#[pymodule(gil_used = true)]
fn _core(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<ScoredWord>()?;
    module.add_function(wrap_pyfunction!(discover, module)?)?;
    module.add_function(wrap_pyfunction!(discover_file, module)?)?;
    Ok(())
}
