//! Single ignore-file pattern and its matching modes
//!
//! A rule is parsed once from one line of an ignore file and never changes.
//! Matching is done against a path that has already been made relative to the
//! directory the rule was loaded from and split into `/`-separated segments.

use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};

/// One pattern loaded from an ignore file
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// Pattern exactly as written in the file (trimmed)
    pattern: String,
    /// Directory containing the ignore file this rule came from
    source_dir: PathBuf,
    /// Trailing `/`: matches the named directory and everything under it
    dir_only: bool,
    /// Leading `/`: only matches relative to `source_dir`
    anchored: bool,
    matcher: PatternMatcher,
}

/// A path made relative to a rule directory, split once and reused for every rule
#[derive(Debug)]
pub struct RelativePath<'a> {
    full: &'a str,
    /// Byte ranges of the `/`-separated segments of `full`
    spans: Vec<(usize, usize)>,
}

impl<'a> RelativePath<'a> {
    pub fn new(full: &'a str) -> Self {
        let mut spans = Vec::new();
        let mut start = 0;
        for (i, byte) in full.bytes().enumerate() {
            if byte == b'/' {
                if i > start {
                    spans.push((start, i));
                }
                start = i + 1;
            }
        }
        if full.len() > start {
            spans.push((start, full.len()));
        }
        Self { full, spans }
    }

    pub fn as_str(&self) -> &str {
        self.full
    }

    fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn segments(&self) -> impl Iterator<Item = &'a str> + '_ {
        let full = self.full;
        self.spans.iter().map(move |&(start, end)| &full[start..end])
    }

    /// Prefixes from the top of the subtree down: `a`, `a/b`, `a/b/c`
    fn prefixes(&self) -> impl Iterator<Item = &'a str> + '_ {
        let full = self.full;
        let first = self.spans.first().map_or(0, |&(start, _)| start);
        self.spans.iter().map(move |&(_, end)| &full[first..end])
    }

    /// Suffixes obtained by dropping leading segments: `a/b/c`, `b/c`, `c`
    fn suffixes(&self) -> impl Iterator<Item = &'a str> + '_ {
        let full = self.full;
        let last = self.spans.last().map_or(0, |&(_, end)| end);
        self.spans.iter().map(move |&(start, _)| &full[start..last])
    }
}

impl IgnoreRule {
    /// Parse one ignore-file line
    ///
    /// Returns `None` for blank lines, comments and negation patterns. Negation
    /// (`!pattern`) has no meaning here: ancestor rule sets are OR-ed together
    /// and nothing can re-include a path.
    pub fn parse(line: &str, source_dir: &Path) -> Option<Self> {
        let pattern = line.trim();
        if pattern.is_empty() || pattern.starts_with('#') {
            return None;
        }
        if pattern.starts_with('!') {
            tracing::debug!(
                "Negation patterns are not supported, skipping '{}' in {}",
                pattern,
                source_dir.display()
            );
            return None;
        }

        let dir_only = pattern.ends_with('/');
        let anchored = pattern.starts_with('/');
        let body = pattern.trim_start_matches('/').trim_end_matches('/');
        if body.is_empty() {
            return None;
        }

        Some(Self {
            pattern: pattern.to_string(),
            source_dir: source_dir.to_path_buf(),
            dir_only,
            anchored,
            matcher: PatternMatcher::compile(body),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Test a path relative to [`Self::source_dir`]
    pub fn matches(&self, path: &RelativePath<'_>) -> bool {
        if path.is_empty() {
            return false;
        }

        match (self.dir_only, self.anchored) {
            // `/build/` - the directory at the top of this subtree or anything below it
            (true, true) => path.prefixes().any(|p| self.matcher.is_match(p)),
            // `build/` - a directory prefix, or a directory of that name at any depth
            (true, false) => {
                path.prefixes().any(|p| self.matcher.is_match(p))
                    || path.segments().any(|s| self.matcher.is_match(s))
            }
            // `/foo.txt` - whole path or any prefix, counted from the rule directory
            (false, true) => path.prefixes().any(|p| self.matcher.is_match(p)),
            // `*.log` - whole path, any single segment (includes the base name) or any suffix
            (false, false) => {
                path.segments().any(|s| self.matcher.is_match(s))
                    || path.suffixes().any(|p| self.matcher.is_match(p))
            }
        }
    }
}

/// Compiled form of a rule body
#[derive(Debug, Clone)]
enum PatternMatcher {
    Glob(GlobMatcher),
    /// Fallback for bodies globset rejects, such as an unclosed `[`
    Literal(String),
}

impl PatternMatcher {
    /// Compile a shell-style glob where `*` and `?` never cross a `/`
    fn compile(body: &str) -> Self {
        let glob = GlobBuilder::new(body)
            .literal_separator(true)
            .backslash_escape(true)
            .build();

        match glob {
            Ok(glob) => Self::Glob(glob.compile_matcher()),
            Err(e) => {
                tracing::warn!("Invalid ignore pattern '{}': {}, matching literally", body, e);
                Self::Literal(body.to_string())
            }
        }
    }

    fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Glob(glob) => glob.is_match(candidate),
            Self::Literal(literal) => literal == candidate,
        }
    }
}
