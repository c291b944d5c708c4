//! Thread management for the analysis pipeline
//!
//! ```text
//! ┌──────────┐  bounded   ┌────────────┐  bounded   ┌──────────────┐
//! │  walker  │──────────▶ │  workers   │──────────▶ │ calling      │
//! │ (1 thr)  │  FileJob   │  (N thr)   │  Partial   │ thread drains│
//! └──────────┘            └────────────┘  Result    └──────────────┘
//! ```
//!
//! Both queues hold `2 × workers` items. A full job queue blocks the walker,
//! which bounds how much file content is held in memory at once.

pub mod pool;
pub mod progress;

pub use pool::WorkerPool;
pub use progress::DiscoveryProgress;
