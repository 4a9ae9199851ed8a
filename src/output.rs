use crate::candidate::ScoredCandidate;
use crate::engine::Discovery;
use crate::errors::DiscoveryError;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const FULL_HEADER: &str = "text\tfreq\tleft_entropy\tright_entropy\taggregation\tscore";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// `text\tcount`
    Minimal,
    /// Tab-separated with a header row.
    Full,
    /// One JSON object per line.
    JsonLines,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, DiscoveryError> {
        match value {
            "minimal" => Ok(Self::Minimal),
            "full" => Ok(Self::Full),
            "jsonl" | "json_lines" => Ok(Self::JsonLines),
            _ => Err(DiscoveryError::Configuration(format!(
                "Invalid output format {value:?}. Expected one of: 'minimal', 'full', 'jsonl'."
            ))),
        }
    }
}

/// `freq` scaled back to an occurrence count.
pub fn scaled_count(candidate: &ScoredCandidate, corpus_length: usize) -> u64 {
    (candidate.freq * corpus_length as f64).round() as u64
}

fn write_minimal_rows(out: &mut impl Write, discovery: &Discovery) -> std::io::Result<()> {
    for candidate in &discovery.candidates {
        writeln!(
            out,
            "{}\t{}",
            candidate.text,
            scaled_count(candidate, discovery.corpus_length)
        )?;
    }
    Ok(())
}

fn write_full_rows(out: &mut impl Write, discovery: &Discovery) -> std::io::Result<()> {
    writeln!(out, "{FULL_HEADER}")?;
    for c in &discovery.candidates {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            c.text, c.freq, c.left_entropy, c.right_entropy, c.aggregation, c.score
        )?;
    }
    Ok(())
}

fn write_json_rows(out: &mut impl Write, discovery: &Discovery) -> std::io::Result<()> {
    for candidate in &discovery.candidates {
        serde_json::to_writer(&mut *out, candidate)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

pub fn render(discovery: &Discovery, format: OutputFormat) -> std::io::Result<String> {
    let mut buf = Vec::new();
    write_rows(&mut buf, discovery, format)?;
    String::from_utf8(buf)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

fn write_rows(
    out: &mut impl Write,
    discovery: &Discovery,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Minimal => write_minimal_rows(out, discovery),
        OutputFormat::Full => write_full_rows(out, discovery),
        OutputFormat::JsonLines => write_json_rows(out, discovery),
    }
}

/// Serializes into a temporary file next to `path` and renames it into
/// place only once every row is flushed. On error `path` is untouched.
pub fn write_discovery(
    path: &Path,
    discovery: &Discovery,
    format: OutputFormat,
) -> Result<(), DiscoveryError> {
    let output_err = |source: std::io::Error| DiscoveryError::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staged = NamedTempFile::new_in(dir).map_err(output_err)?;
    let mut writer = BufWriter::new(staged);
    write_rows(&mut writer, discovery, format).map_err(output_err)?;
    let staged = writer
        .into_inner()
        .map_err(|err| output_err(err.into_error()))?;
    staged.as_file().sync_all().map_err(output_err)?;
    staged.persist(path).map_err(|err| output_err(err.error))?;

    tracing::debug!(
        path = %path.display(),
        rows = discovery.candidates.len(),
        "wrote discovery results"
    );
    Ok(())
}

pub fn write_minimal(path: &Path, discovery: &Discovery) -> Result<(), DiscoveryError> {
    write_discovery(path, discovery, OutputFormat::Minimal)
}

pub fn write_full(path: &Path, discovery: &Discovery) -> Result<(), DiscoveryError> {
    write_discovery(path, discovery, OutputFormat::Full)
}

pub fn write_json_lines(path: &Path, discovery: &Discovery) -> Result<(), DiscoveryError> {
    write_discovery(path, discovery, OutputFormat::JsonLines)
}
