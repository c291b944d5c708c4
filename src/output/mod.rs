//! Rendering of a finished analysis
//!
//! Every renderer writes to any `io::Write` so the CLI can target stdout and
//! tests can target a buffer.

pub mod csv;
pub mod json;
pub mod table;

use crate::analysis::AnalysisResult;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Rendering switches shared by all formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub percentages: bool,
    /// JSON only
    pub metadata: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            percentages: true,
            metadata: true,
        }
    }
}

pub fn render<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    result: &AnalysisResult,
    options: RenderOptions,
) -> Result<()> {
    tracing::debug!("Outputting results as {:?}", format);
    match format {
        OutputFormat::Table => table::write_table(writer, result, options),
        OutputFormat::Csv => csv::write_csv(writer, result, options),
        OutputFormat::Json => json::write_json(writer, result, options),
    }
}

/// Readable name for a whitespace character in the character table
pub fn display_char(character: &str) -> &str {
    match character {
        " " => "<space>",
        "\t" => "<tab>",
        "\n" => "<newline>",
        "\r" => "<return>",
        "\u{c}" => "<formfeed>",
        "\u{b}" => "<vert_tab>",
        other => other,
    }
}

/// Visible stand-ins for whitespace inside a sequence
pub fn display_sequence(sequence: &str) -> String {
    sequence
        .chars()
        .map(|c| match c {
            '\n' => '↵',
            ' ' => '⎵',
            '\t' => '⇥',
            '\r' => '⏎',
            other => other,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::analysis::{AnalysisResult, CharCount, SequenceCount, TimingBreakdown};
    use std::path::PathBuf;
    use std::time::Duration;

    pub fn sample_result() -> AnalysisResult {
        AnalysisResult {
            root: PathBuf::from("project"),
            characters: vec![
                CharCount {
                    character: "a".to_string(),
                    count: 3,
                    percentage: 60.0,
                },
                CharCount {
                    character: " ".to_string(),
                    count: 2,
                    percentage: 40.0,
                },
            ],
            sequences: vec![SequenceCount {
                sequence: "a a".to_string(),
                count: 2,
                percentage: 50.0,
            }],
            files_found: 3,
            files_ignored: 1,
            files_processed: 2,
            total_characters: 5,
            unique_characters: 2,
            unique_sequences: 4,
            timing: TimingBreakdown {
                total: Duration::from_nanos(1_000),
                ignore: Duration::from_nanos(100),
                traversal: Duration::from_nanos(800),
                sorting: Duration::from_nanos(50),
                output: Duration::ZERO,
            },
        }
    }
}
