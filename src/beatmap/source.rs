// Timing sources - Bracket-delimited lists of seconds values on disk
//
// The offline analysis stage emits six text files, index-aligned per beat.
// Format: an optional pair of square brackets around non-negative decimal
// values separated by whitespace and/or commas. Any missing, unreadable, or
// non-numeric source aborts beat map construction; there is no empty-list
// fallback.

use std::fs;
use std::path::{Path, PathBuf};

use super::builder::TimingTables;

/// Fatal timing-source failure. Surfaced to the caller before any session
/// starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read timing source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid token {token:?} in timing source {path}")]
    InvalidToken { path: PathBuf, token: String },
}

/// Parse one timing list. Values are rounded to millisecond precision, the
/// resolution the analysis stage emits.
fn parse_timing_list(text: &str, path: &Path) -> Result<Vec<f64>, ConfigError> {
    text.replace(['[', ']'], " ")
        .split([' ', '\t', '\n', '\r', ','])
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map(|value| (value * 1000.0).round() / 1000.0)
                .map_err(|_| ConfigError::InvalidToken {
                    path: path.to_path_buf(),
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Read and parse one timing source file.
pub fn read_timing_file(path: &Path) -> Result<Vec<f64>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_timing_list(&text, path)
}

/// Locations of the six timing sources.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSourcePaths {
    pub beat_time: PathBuf,
    pub lead_up_start: PathBuf,
    pub atw_start: PathBuf,
    pub atw_end: PathBuf,
    pub ptw_start: PathBuf,
    pub ptw_end: PathBuf,
}

impl TimingSourcePaths {
    /// Default filenames as written by the analysis stage, resolved under
    /// `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            beat_time: dir.join("generatedMap.txt"),
            lead_up_start: dir.join("beatLeadUp.txt"),
            atw_start: dir.join("atwBefore.txt"),
            atw_end: dir.join("atwAfter.txt"),
            ptw_start: dir.join("ptwBefore.txt"),
            ptw_end: dir.join("ptwAfter.txt"),
        }
    }

    /// Load all six sources. The first failure aborts the load.
    pub fn load(&self) -> Result<TimingTables, ConfigError> {
        Ok(TimingTables {
            beat_time: read_timing_file(&self.beat_time)?,
            lead_up_start: read_timing_file(&self.lead_up_start)?,
            atw_start: read_timing_file(&self.atw_start)?,
            atw_end: read_timing_file(&self.atw_end)?,
            ptw_start: read_timing_file(&self.ptw_start)?,
            ptw_end: read_timing_file(&self.ptw_end)?,
        })
    }
}
