//! Path exclusion decisions for the tree walker
//!
//! Three independent policies are checked cheapest-first:
//!
//! ```text
//! path ──▶ extension denylist ──▶ dotfile policy ──▶ ignore-file cascade ──▶ keep
//!               │                      │                     │
//!               └──────────────────────┴─────────────────────┴──▶ ignore
//! ```
//!
//! The cascade is an OR over every ancestor directory's rule set, nearest
//! ancestor first. There is no negation: once any ancestor rule matches, the
//! path is excluded and no deeper ignore file can bring it back.
//!
//! Rule sets are loaded lazily as the walker enters directories. Each loaded
//! directory caches its full ancestor chain (own rules prepended to the
//! parent's chain), so a query is one map lookup followed by the rule tests.

use super::extension::ExtensionDenylist;
use super::rule::{IgnoreRule, RelativePath};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Name of the per-directory rule file
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Rules loaded from one directory's ignore file
#[derive(Debug)]
struct RuleSet {
    dir: PathBuf,
    rules: Vec<IgnoreRule>,
}

/// Nearest-first list of rule sets that apply below a directory
type RuleChain = Arc<[Arc<RuleSet>]>;

/// Construction options for [`IgnoreMatcher`]
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    pub include_dotfiles: bool,
    pub ignore_file: String,
    pub extensions: ExtensionDenylist,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            include_dotfiles: false,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            extensions: ExtensionDenylist::new(),
        }
    }
}

/// Decides whether a path below the scan root is excluded
///
/// Only the walker mutates the matcher, so the rule cache needs no lock.
/// Match time is an atomic nanosecond counter so queries only need `&self`.
#[derive(Debug)]
pub struct IgnoreMatcher {
    root: PathBuf,
    options: MatcherOptions,
    chains: HashMap<PathBuf, RuleChain>,
    load_time: Duration,
    match_time_nanos: AtomicU64,
}

impl IgnoreMatcher {
    /// Matcher with the default ignore file name and extension denylist
    pub fn new(root: impl AsRef<Path>, include_dotfiles: bool) -> Result<Self> {
        Self::with_options(
            root,
            MatcherOptions {
                include_dotfiles,
                ..MatcherOptions::default()
            },
        )
    }

    /// Build a matcher and load the root directory's ignore file
    ///
    /// Fails only if the root ignore file exists but cannot be read.
    pub fn with_options(root: impl AsRef<Path>, options: MatcherOptions) -> Result<Self> {
        let mut matcher = Self {
            root: root.as_ref().to_path_buf(),
            options,
            chains: HashMap::new(),
            load_time: Duration::ZERO,
            match_time_nanos: AtomicU64::new(0),
        };

        let root = matcher.root.clone();
        matcher.load_rules_for_directory(&root)?;
        tracing::debug!(
            "Ignore matcher ready for {} in {:?}",
            root.display(),
            matcher.load_time
        );
        Ok(matcher)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignore_file_name(&self) -> &str {
        &self.options.ignore_file
    }

    /// Load the ignore file of `dir`, if there is one
    ///
    /// A missing file is not an error. Loading the same directory twice is a
    /// no-op. Directories outside the root are never cached.
    pub fn load_rules_for_directory(&mut self, dir: &Path) -> Result<()> {
        if self.chains.contains_key(dir) || !dir.starts_with(&self.root) {
            return Ok(());
        }

        let start = Instant::now();
        let result = self.read_rule_file(dir);
        self.load_time += start.elapsed();

        let rules = result?;
        let parent_chain = dir
            .parent()
            .and_then(|parent| self.nearest_chain(parent))
            .unwrap_or_else(|| Arc::from(Vec::new()));

        let chain: RuleChain = if rules.is_empty() {
            parent_chain
        } else {
            tracing::info!(
                "Ignore patterns loaded: {} from {}",
                rules.len(),
                dir.display()
            );
            let own = Arc::new(RuleSet {
                dir: dir.to_path_buf(),
                rules,
            });
            std::iter::once(own)
                .chain(parent_chain.iter().cloned())
                .collect()
        };

        self.chains.insert(dir.to_path_buf(), chain);
        Ok(())
    }

    fn read_rule_file(&self, dir: &Path) -> Result<Vec<IgnoreRule>> {
        let path = dir.join(&self.options.ignore_file);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::trace!("No ignore file at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read ignore file: {}", path.display()));
            }
        };

        let rules: Vec<IgnoreRule> = content
            .lines()
            .filter_map(|line| IgnoreRule::parse(line, dir))
            .inspect(|rule| {
                tracing::trace!("Added ignore pattern '{}' from {}", rule.pattern(), dir.display())
            })
            .collect();
        Ok(rules)
    }

    /// Chain cached for `dir` or its closest loaded ancestor inside the root
    fn nearest_chain(&self, dir: &Path) -> Option<RuleChain> {
        dir.ancestors()
            .take_while(|ancestor| ancestor.starts_with(&self.root))
            .find_map(|ancestor| self.chains.get(ancestor).cloned())
    }

    /// Whether `path` should be excluded from the analysis
    pub fn should_ignore(&self, path: &Path) -> bool {
        let start = Instant::now();
        let ignored = self.evaluate(path);
        let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.match_time_nanos.fetch_add(nanos, Ordering::Relaxed);
        ignored
    }

    fn evaluate(&self, path: &Path) -> bool {
        if self.options.extensions.is_denied(path) {
            return true;
        }

        if !self.options.include_dotfiles && is_dotfile(path) {
            tracing::trace!("Ignoring dotfile: {}", path.display());
            return true;
        }

        self.matches_cascade(path)
    }

    fn matches_cascade(&self, path: &Path) -> bool {
        let Some(chain) = path.parent().and_then(|parent| self.nearest_chain(parent)) else {
            return false;
        };

        for set in chain.iter() {
            let Some(relative) = relative_slash_path(path, &set.dir) else {
                continue;
            };
            let relative = RelativePath::new(&relative);
            if let Some(rule) = set.rules.iter().find(|rule| rule.matches(&relative)) {
                tracing::trace!(
                    "Path {} matched pattern '{}' from {}",
                    relative.as_str(),
                    rule.pattern(),
                    set.dir.display()
                );
                return true;
            }
        }
        false
    }

    /// Time spent reading and parsing ignore files
    pub fn load_time(&self) -> Duration {
        self.load_time
    }

    /// Time spent answering [`Self::should_ignore`]
    pub fn match_time(&self) -> Duration {
        Duration::from_nanos(self.match_time_nanos.load(Ordering::Relaxed))
    }

    pub fn total_time(&self) -> Duration {
        self.load_time() + self.match_time()
    }

    /// Number of directories whose own ignore file contributed rules
    pub fn rule_directories(&self) -> usize {
        self.chains
            .iter()
            .filter(|(dir, chain)| chain.first().is_some_and(|set| set.dir == **dir))
            .count()
    }
}

/// Base name starts with `.` (but is not `.` or `..`)
fn is_dotfile(path: &Path) -> bool {
    match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().starts_with('.'),
        _ => false,
    }
}

/// `path` relative to `base`, joined with `/`
fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let mut joined = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            if !joined.is_empty() {
                joined.push('/');
            }
            joined.push_str(&part.to_string_lossy());
        }
    }
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_ignore_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let matcher = IgnoreMatcher::new(temp.path(), false).unwrap();
        assert!(!matcher.should_ignore(&temp.path().join("main.rs")));
        assert_eq!(matcher.rule_directories(), 0);
    }

    #[test]
    fn test_root_rules_apply_below_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "# logs\n*.log\n\n/dist\n");
        write(root, "src/lib.rs", "");

        let mut matcher = IgnoreMatcher::new(root, false).unwrap();
        matcher.load_rules_for_directory(&root.join("src")).unwrap();

        assert!(matcher.should_ignore(&root.join("app.log")));
        assert!(matcher.should_ignore(&root.join("src/debug.log")));
        assert!(matcher.should_ignore(&root.join("dist")));
        assert!(!matcher.should_ignore(&root.join("src/dist")));
        assert!(!matcher.should_ignore(&root.join("src/lib.rs")));
        assert_eq!(matcher.rule_directories(), 1);
    }

    #[test]
    fn test_hierarchical_precedence() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "*.log\n");
        write(root, "project/.gitignore", "*.tmp\n");

        let mut matcher = IgnoreMatcher::new(root, false).unwrap();
        matcher.load_rules_for_directory(&root.join("project")).unwrap();

        assert!(matcher.should_ignore(&root.join("app.log")));
        assert!(matcher.should_ignore(&root.join("project/app.log")));
        assert!(matcher.should_ignore(&root.join("project/app.tmp")));
        assert!(!matcher.should_ignore(&root.join("project/app.go")));
        assert!(!matcher.should_ignore(&root.join("app.tmp")));
    }

    #[test]
    fn test_nested_anchored_rule_is_relative_to_its_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "web/.gitignore", "/build\n");

        let mut matcher = IgnoreMatcher::new(root, false).unwrap();
        matcher.load_rules_for_directory(&root.join("web")).unwrap();

        assert!(matcher.should_ignore(&root.join("web/build")));
        assert!(!matcher.should_ignore(&root.join("build")));
        assert!(!matcher.should_ignore(&root.join("web/src/build")));
    }

    #[test]
    fn test_unloaded_directory_uses_nearest_loaded_ancestor() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "*.bak\n");

        let matcher = IgnoreMatcher::new(root, false).unwrap();
        assert!(matcher.should_ignore(&root.join("a/b/c/file.bak")));
    }

    #[test]
    fn test_dotfile_policy() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let hidden = IgnoreMatcher::new(root, false).unwrap();
        assert!(hidden.should_ignore(&root.join(".env")));
        assert!(hidden.should_ignore(&root.join(".git")));
        assert!(!hidden.should_ignore(&root.join("src/main.rs")));

        let visible = IgnoreMatcher::new(root, true).unwrap();
        assert!(!visible.should_ignore(&root.join(".env")));
    }

    #[test]
    fn test_extension_denylist_checked_first() {
        let temp = TempDir::new().unwrap();
        let matcher = IgnoreMatcher::new(temp.path(), true).unwrap();
        assert!(matcher.should_ignore(&temp.path().join("icon.svg")));

        let mut extensions = ExtensionDenylist::empty();
        extensions.add_extension("md");
        let matcher = IgnoreMatcher::with_options(
            temp.path(),
            MatcherOptions {
                include_dotfiles: true,
                extensions,
                ..MatcherOptions::default()
            },
        )
        .unwrap();
        assert!(matcher.should_ignore(&temp.path().join("README.md")));
        assert!(!matcher.should_ignore(&temp.path().join("icon.svg")));
    }

    #[test]
    fn test_custom_ignore_file_name() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".symbolistaignore", "vendor/\n");
        write(root, ".gitignore", "*.rs\n");

        let matcher = IgnoreMatcher::with_options(
            root,
            MatcherOptions {
                ignore_file: ".symbolistaignore".to_string(),
                ..MatcherOptions::default()
            },
        )
        .unwrap();
        assert_eq!(matcher.ignore_file_name(), ".symbolistaignore");
        assert!(matcher.should_ignore(&root.join("vendor/lib.c")));
        assert!(!matcher.should_ignore(&root.join("main.rs")));
    }

    #[test]
    fn test_unreadable_ignore_file_fails_construction() {
        let temp = TempDir::new().unwrap();
        // A directory in place of the ignore file cannot be read as text
        fs::create_dir(temp.path().join(".gitignore")).unwrap();

        let err = IgnoreMatcher::new(temp.path(), false).unwrap_err();
        assert!(err.to_string().contains("Failed to read ignore file"));
    }

    #[test]
    fn test_timing_accumulates() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".gitignore", "*.log\n");
        let matcher = IgnoreMatcher::new(temp.path(), false).unwrap();
        for _ in 0..10 {
            matcher.should_ignore(&temp.path().join("x.log"));
        }
        assert_eq!(matcher.total_time(), matcher.load_time() + matcher.match_time());
    }

    #[test]
    fn test_relative_slash_path() {
        assert_eq!(
            relative_slash_path(Path::new("/a/b/c.txt"), Path::new("/a")).as_deref(),
            Some("b/c.txt")
        );
        assert_eq!(relative_slash_path(Path::new("/a"), Path::new("/a")), None);
        assert_eq!(relative_slash_path(Path::new("/x/y"), Path::new("/a")), None);
    }

    #[test]
    fn test_is_dotfile() {
        assert!(is_dotfile(Path::new("dir/.hidden")));
        assert!(!is_dotfile(Path::new("dir/visible")));
        assert!(!is_dotfile(Path::new(".")));
        assert!(!is_dotfile(Path::new("..")));
        assert!(!is_dotfile(Path::new("./src")));
    }
}
