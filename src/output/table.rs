use super::{RenderOptions, display_char, display_sequence};
use crate::analysis::AnalysisResult;
use anyhow::Result;
use std::io::Write;

const RULE_WIDTH: usize = 35;

pub fn write_table<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    options: RenderOptions,
) -> Result<()> {
    let rule = "-".repeat(RULE_WIDTH);

    writeln!(w, "Characters:")?;
    writeln!(w, "{rule}")?;
    write_header(w, "Character", options.percentages)?;
    writeln!(w, "{rule}")?;
    for entry in &result.characters {
        let shown = display_char(&entry.character);
        write_row(w, shown, entry.count, entry.percentage, options)?;
    }
    writeln!(w, "{rule}")?;

    if !result.sequences.is_empty() {
        writeln!(w)?;
        writeln!(w, "Sequences (2-3 chars):")?;
        writeln!(w, "{rule}")?;
        write_header(w, "Sequence", options.percentages)?;
        writeln!(w, "{rule}")?;
        for entry in &result.sequences {
            let shown = display_sequence(&entry.sequence);
            write_row(w, &shown, entry.count, entry.percentage, options)?;
        }
        writeln!(w, "{rule}")?;
    }

    Ok(())
}

fn write_header<W: Write>(w: &mut W, label: &str, percentages: bool) -> Result<()> {
    write!(w, "{:<10} {:<10}", label, "Count")?;
    if percentages {
        write!(w, " {:<12}", "Percentage")?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_row<W: Write>(
    w: &mut W,
    label: &str,
    count: usize,
    percentage: f64,
    options: RenderOptions,
) -> Result<()> {
    write!(w, "{label:<10} {count:<10}")?;
    if options.percentages {
        write!(w, " {percentage:<12.2}%")?;
    }
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_result;

    fn render(options: RenderOptions) -> String {
        let mut buf = Vec::new();
        write_table(&mut buf, &sample_result(), options).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_layout() {
        let out = render(RenderOptions::default());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Characters:");
        assert_eq!(lines[1], "-".repeat(35));
        assert_eq!(lines[2], "Character  Count      Percentage  ");
        assert_eq!(lines[4], "a          3          60.00       %");
        assert!(lines[5].starts_with("<space>    2"));
        assert!(out.contains("Sequences (2-3 chars):"));
        assert!(out.contains("a⎵a"));
    }

    #[test]
    fn test_table_without_percentages() {
        let out = render(RenderOptions {
            percentages: false,
            metadata: true,
        });
        assert!(!out.contains('%'));
        assert!(!out.contains("Percentage"));
    }

    #[test]
    fn test_sequence_section_omitted_when_empty() {
        let mut result = sample_result();
        result.sequences.clear();
        let mut buf = Vec::new();
        write_table(&mut buf, &result, RenderOptions::default()).unwrap();
        assert!(!String::from_utf8(buf).unwrap().contains("Sequences"));
    }
}
