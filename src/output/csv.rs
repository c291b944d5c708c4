use super::{RenderOptions, display_char};
use crate::analysis::AnalysisResult;
use anyhow::{Context, Result};
use std::io::Write;

/// `type,sequence,count[,percentage]`, characters first, then sequences
///
/// Character names use the same `<space>`-style labels as the table; sequences
/// are written raw and quoted by the writer when they contain a separator,
/// quote or newline.
pub fn write_csv<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    options: RenderOptions,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);

    let mut header = vec!["type", "sequence", "count"];
    if options.percentages {
        header.push("percentage");
    }
    wtr.write_record(&header)?;

    for entry in &result.characters {
        let label = display_char(&entry.character);
        write_record(&mut wtr, "character", label, entry.count, entry.percentage, options)?;
    }
    for entry in &result.sequences {
        write_record(&mut wtr, "sequence", &entry.sequence, entry.count, entry.percentage, options)?;
    }

    wtr.flush().context("Failed to write CSV output")?;
    Ok(())
}

fn write_record<W: Write>(
    wtr: &mut csv::Writer<W>,
    kind: &str,
    value: &str,
    count: usize,
    percentage: f64,
    options: RenderOptions,
) -> Result<()> {
    let count = count.to_string();
    if options.percentages {
        let percentage = format!("{percentage:.2}%");
        wtr.write_record([kind, value, count.as_str(), percentage.as_str()])?;
    } else {
        wtr.write_record([kind, value, count.as_str()])?;
    }
    Ok(())
}
