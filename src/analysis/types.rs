use crate::ignore::DEFAULT_IGNORE_FILE;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Shortest sequence length the counter can produce
pub const MIN_SEQUENCE_LENGTH: usize = 2;
/// Longest sequence length the counter can produce
pub const MAX_SEQUENCE_LENGTH: usize = 3;

/// One readable text file waiting to be counted
#[derive(Debug, Clone)]
pub struct FileJob {
    pub path: PathBuf,
    pub content: String,
    pub ascii_only: bool,
    pub sequences: SequenceConfig,
}

/// Which byte sequences are counted and which make it into the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub enabled: bool,
    pub min_length: usize,
    pub max_length: usize,
    /// Sequences seen fewer times than this across the whole tree are dropped
    pub threshold: usize,
    /// Keep only the N most frequent sequences after thresholding
    pub top_n: Option<usize>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_length: MIN_SEQUENCE_LENGTH,
            max_length: MAX_SEQUENCE_LENGTH,
            threshold: 2,
            top_n: None,
        }
    }
}

impl SequenceConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_length < MIN_SEQUENCE_LENGTH || self.max_length > MAX_SEQUENCE_LENGTH {
            bail!(
                "Sequence lengths must be between {} and {} (got {}..={})",
                MIN_SEQUENCE_LENGTH,
                MAX_SEQUENCE_LENGTH,
                self.min_length,
                self.max_length
            );
        }
        if self.min_length > self.max_length {
            bail!(
                "Sequence min_length ({}) is greater than max_length ({})",
                self.min_length,
                self.max_length
            );
        }
        Ok(())
    }

    /// Whether sequences of `length` bytes are counted at all
    #[inline]
    pub fn includes_length(&self, length: usize) -> bool {
        self.enabled && (self.min_length..=self.max_length).contains(&length)
    }
}

/// Analysis settings loaded from the `[analysis]` config section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Worker threads, 0 means one per CPU
    pub workers: usize,
    pub include_dotfiles: bool,
    pub ascii_only: bool,
    /// File name of the per-directory ignore file
    pub ignore_file: String,
    /// Added to the built-in extension denylist
    pub extra_ignored_extensions: Vec<String>,
    /// Removed from the built-in extension denylist
    pub allowed_extensions: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            include_dotfiles: false,
            ascii_only: true,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            extra_ignored_extensions: Vec::new(),
            allowed_extensions: Vec::new(),
        }
    }
}

/// Counts produced by one worker for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResult {
    pub chars: HashMap<char, usize>,
    /// Keyed by [`crate::analysis::ngram::pack2`]
    pub pairs: HashMap<u16, usize>,
    /// Keyed by [`crate::analysis::ngram::pack3`]
    pub triples: HashMap<u32, usize>,
    pub file_count: usize,
    pub char_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharCount {
    #[serde(rename = "char")]
    pub character: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceCount {
    pub sequence: String,
    pub count: usize,
    pub percentage: f64,
}

/// Wall-clock durations of each phase, for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingBreakdown {
    pub total: Duration,
    /// Ignore-file loading plus path matching
    pub ignore: Duration,
    pub traversal: Duration,
    pub sorting: Duration,
    /// Filled in by whoever renders the result
    pub output: Duration,
}

/// Final sorted, percentage-annotated statistics for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub root: PathBuf,
    pub characters: Vec<CharCount>,
    pub sequences: Vec<SequenceCount>,
    pub files_found: usize,
    pub files_ignored: usize,
    pub files_processed: usize,
    pub total_characters: usize,
    pub unique_characters: usize,
    /// Distinct sequences counted, before threshold and top-N
    pub unique_sequences: usize,
    pub timing: TimingBreakdown,
}
