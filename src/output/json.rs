use super::RenderOptions;
use crate::analysis::{AnalysisResult, CharCount, SequenceCount, TimingBreakdown};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    result: JsonResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<JsonMetadata<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonResult {
    characters: Vec<CharCount>,
    sequences: Vec<SequenceCount>,
}

#[derive(Debug, Serialize)]
struct JsonMetadata<'a> {
    directory: &'a str,
    files_found: usize,
    files_processed: usize,
    files_ignored: usize,
    total_characters: usize,
    unique_characters: usize,
    unique_sequences: usize,
    timing: JsonTiming,
}

/// Durations in nanoseconds
#[derive(Debug, Serialize)]
struct JsonTiming {
    total_duration: u64,
    ignore_duration: u64,
    traversal_duration: u64,
    sorting_duration: u64,
    output_duration: u64,
}

impl From<&TimingBreakdown> for JsonTiming {
    fn from(timing: &TimingBreakdown) -> Self {
        Self {
            total_duration: timing.total.as_nanos().try_into().unwrap_or(u64::MAX),
            ignore_duration: timing.ignore.as_nanos().try_into().unwrap_or(u64::MAX),
            traversal_duration: timing.traversal.as_nanos().try_into().unwrap_or(u64::MAX),
            sorting_duration: timing.sorting.as_nanos().try_into().unwrap_or(u64::MAX),
            output_duration: timing.output.as_nanos().try_into().unwrap_or(u64::MAX),
        }
    }
}

/// Pretty-printed `{"result": …, "metadata": …}` document
///
/// Percentages are zeroed rather than dropped when disabled, so the entry
/// shape stays the same either way.
pub fn write_json<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    options: RenderOptions,
) -> Result<()> {
    let mut characters = result.characters.clone();
    let mut sequences = result.sequences.clone();
    if !options.percentages {
        characters.iter_mut().for_each(|c| c.percentage = 0.0);
        sequences.iter_mut().for_each(|s| s.percentage = 0.0);
    }

    let directory = result.root.to_string_lossy();
    let metadata = options.metadata.then(|| JsonMetadata {
        directory: &directory,
        files_found: result.files_found,
        files_processed: result.files_processed,
        files_ignored: result.files_ignored,
        total_characters: result.total_characters,
        unique_characters: result.unique_characters,
        unique_sequences: result.unique_sequences,
        timing: JsonTiming::from(&result.timing),
    });

    let output = JsonOutput {
        result: JsonResult {
            characters,
            sequences,
        },
        metadata,
    };

    serde_json::to_writer_pretty(&mut *w, &output).context("Failed to serialize JSON output")?;
    writeln!(w)?;
    Ok(())
}
