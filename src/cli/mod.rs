//! Command-line interface
//!
//! Parses flags, layers them over the loaded [`Config`], runs the analysis
//! and renders the result to stdout. Progress and summary lines go to stderr
//! so stdout stays machine-readable for CSV and JSON.

use crate::analysis::{AnalysisResult, Analyzer};
use crate::config::Config;
use crate::output::{self, OutputFormat, RenderOptions};
use crate::parallel::DiscoveryProgress;
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Count character and character-sequence frequencies across a codebase
#[derive(Debug, Parser)]
#[command(name = "symbolista", version, long_about = None)]
pub struct Cli {
    /// Directory to analyze
    #[arg(value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Show percentages (`--percentages=false` to hide)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub percentages: Option<bool>,

    /// Only count ASCII characters (`--ascii-only=false` for full Unicode)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub ascii_only: Option<bool>,

    /// Include run metadata in JSON output
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub metadata: Option<bool>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Include files and directories whose name starts with a dot
    #[arg(long)]
    pub include_dotfiles: bool,

    /// Name of the per-directory ignore file
    #[arg(long, value_name = "NAME")]
    pub ignore_file: Option<String>,

    /// Minimum occurrences for a sequence to be reported
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Report only the N most frequent sequences
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Skip sequence counting
    #[arg(long)]
    pub no_sequences: bool,

    /// Configuration file (defaults to ./symbolista.toml)
    #[arg(short, long, value_name = "FILE", env = "SYMBOLISTA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logging, progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not draw the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);

        let config = self.load_config()?;
        let show_progress = config.output.progress
            && !self.quiet
            && !self.no_progress
            && console::Term::stderr().is_term();

        let analyzer = Analyzer::new(config.analysis.clone(), config.sequences);
        let progress = DiscoveryProgress::new(show_progress);
        let outcome = analyzer.analyze(&self.directory, |found, processed| {
            progress.update(found, processed)
        });
        progress.finish();
        let mut result = outcome?;

        let output_start = Instant::now();
        let options = RenderOptions {
            percentages: config.output.percentages,
            metadata: config.output.metadata,
        };
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        output::render(&mut handle, config.output.format, &result, options)?;
        handle.flush().context("Failed to write output")?;
        result.timing.output = output_start.elapsed();

        if !self.quiet {
            print_summary(&result, self.verbose > 0);
        }
        Ok(())
    }

    /// Config file and environment, then explicit flags on top
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        tracing::trace!("Applying command-line overrides");
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(percentages) = self.percentages {
            config.output.percentages = percentages;
        }
        if let Some(metadata) = self.metadata {
            config.output.metadata = metadata;
        }
        if let Some(ascii_only) = self.ascii_only {
            config.analysis.ascii_only = ascii_only;
        }
        if let Some(workers) = self.workers {
            config.analysis.workers = workers;
        }
        if self.include_dotfiles {
            config.analysis.include_dotfiles = true;
        }
        if let Some(ignore_file) = &self.ignore_file {
            config.analysis.ignore_file = ignore_file.clone();
        }
        if let Some(threshold) = self.threshold {
            config.sequences.threshold = threshold;
        }
        if let Some(top) = self.top {
            config.sequences.top_n = Some(top);
        }
        if self.no_sequences {
            config.sequences.enabled = false;
        }
        if self.no_progress {
            config.output.progress = false;
        }
    }
}

fn print_summary(result: &AnalysisResult, verbose: bool) {
    let total = result.timing.total + result.timing.output;

    eprintln!("{} {}", style("Files/directories ignored:").dim(), result.files_ignored);
    eprintln!("{} {}", style("Total characters:").dim(), result.total_characters);
    eprintln!("{} {}", style("Unique characters:").dim(), result.unique_characters);

    if verbose {
        eprintln!();
        eprintln!("{}", style("Timing Breakdown:").bold());
        eprintln!("  Ignore rules: {:?}", result.timing.ignore);
        eprintln!("  File traversal & counting: {:?}", result.timing.traversal);
        eprintln!("  Sorting results: {:?}", result.timing.sorting);
        eprintln!("  Output formatting: {:?}", result.timing.output);
    }
    eprintln!("{} {:?}", style("Total time:").dim(), total);
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("error"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // A second init (tests driving `run` twice) is not an error worth failing on
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
