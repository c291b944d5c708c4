//! Character and byte-sequence frequency analysis
//!
//! A single walker thread discovers files and sends their content through a
//! bounded queue to a pool of counting workers. Per-file results come back on
//! a second queue and are merged by the calling thread into a
//! [`ResultCollector`]. Because merging is additive, the final counts do not
//! depend on worker count or delivery order.

pub mod analyzer;
pub mod collector;
pub mod counter;
pub mod discovery;
pub mod ngram;
pub mod types;

pub use analyzer::Analyzer;
pub use collector::{AggregateSnapshot, ResultCollector};
pub use counter::count_file;
pub use discovery::{TreeWalker, WalkStats};
pub use types::{
    AnalysisConfig, AnalysisResult, CharCount, FileJob, PartialResult, SequenceConfig,
    SequenceCount, TimingBreakdown,
};
