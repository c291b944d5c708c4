//! # Symbolista - character and sequence frequencies for codebases
//!
//! Walks a directory tree, skips whatever the ignore files, dotfile policy and
//! extension denylist exclude, and counts how often each character and each
//! 2- and 3-byte sequence appears across the remaining text files.
//!
//! ## Quick Start
//!
//! ```bash
//! # Table of the most common characters and sequences in the current tree
//! symbolista
//!
//! # JSON with metadata, sequences seen at least 10 times
//! symbolista ./src --format json --threshold 10
//! ```
//!
//! ## Library use
//!
//! ```rust,no_run
//! use symbolista::analysis::{AnalysisConfig, Analyzer, SequenceConfig};
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default(), SequenceConfig::default());
//! let result = analyzer.analyze(".", |_found, _processed| {})?;
//! println!("{} characters in {} files", result.total_characters, result.files_processed);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod ignore;
pub mod output;
pub mod parallel;

pub use analysis::{AnalysisResult, Analyzer};
pub use cli::Cli;
pub use config::Config;

/// Result type alias for Symbolista operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
