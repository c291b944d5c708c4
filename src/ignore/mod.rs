//! Hierarchical ignore rules
//!
//! Decides which paths under a scan root are left out of the analysis:
//! a static extension denylist, a dotfile policy and a cascade of
//! per-directory ignore files.

pub mod extension;
pub mod matcher;
pub mod rule;

pub use extension::{DEFAULT_IGNORED_EXTENSIONS, ExtensionDenylist};
pub use matcher::{DEFAULT_IGNORE_FILE, IgnoreMatcher, MatcherOptions};
pub use rule::{IgnoreRule, RelativePath};
