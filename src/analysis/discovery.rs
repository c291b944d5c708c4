//! Single-producer tree walk feeding the worker pool
//!
//! The walk is pre-order and sorted by file name, so the sequence of visits
//! (and therefore of progress callbacks) is the same on every run. Directories
//! get their ignore file loaded before they are tested for pruning, which lets
//! a directory's own rules apply to everything beneath it.

use super::collector::ResultCollector;
use super::types::{FileJob, SequenceConfig};
use crate::ignore::IgnoreMatcher;
use anyhow::{Context, Result, anyhow, bail};
use crossbeam::channel::{Sender, TrySendError};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directory counts from one walk, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub pruned: usize,
}

/// Why a found file was not turned into a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NotRegular,
    Ignored,
    Unreadable,
    NotUtf8,
}

/// Walks one root, classifies every file and publishes a [`FileJob`] per
/// eligible file
pub struct TreeWalker<'a> {
    matcher: IgnoreMatcher,
    collector: &'a ResultCollector,
    ascii_only: bool,
    sequences: SequenceConfig,
    span: tracing::Span,
}

impl<'a> TreeWalker<'a> {
    pub fn new(matcher: IgnoreMatcher, collector: &'a ResultCollector, span: tracing::Span) -> Self {
        Self {
            matcher,
            collector,
            ascii_only: true,
            sequences: SequenceConfig::default(),
            span,
        }
    }

    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    pub fn sequences(mut self, sequences: SequenceConfig) -> Self {
        self.sequences = sequences;
        self
    }

    pub fn into_matcher(self) -> IgnoreMatcher {
        self.matcher
    }

    /// Walk the whole tree, sending jobs into `jobs`
    ///
    /// `progress` receives cumulative `(found, found - ignored)` after each
    /// file is found. Errors below the root are handed to `on_error` and the
    /// walk continues with the next entry. Only a failure to read the root
    /// itself, or a job queue with no workers left, ends the walk early.
    ///
    /// `jobs` is borrowed; the caller closes the queue by dropping its sender.
    pub fn walk<P, E>(
        &mut self,
        jobs: &Sender<FileJob>,
        mut progress: P,
        mut on_error: E,
    ) -> Result<WalkStats>
    where
        P: FnMut(usize, usize),
        E: FnMut(anyhow::Error),
    {
        let span = self.span.clone();
        let _entered = span.enter();

        let root = self.matcher.root().to_path_buf();
        tracing::debug!("Starting file discovery in {}", root.display());

        let mut stats = WalkStats::default();
        let mut entries = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(anyhow!(e))
                        .with_context(|| format!("Failed to walk directory: {}", root.display()));
                }
                Err(e) => {
                    tracing::debug!("Traversal error: {}", e);
                    on_error(anyhow!(e).context("Failed to read directory entry"));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                stats.directories += 1;
                if let Err(e) = self.matcher.load_rules_for_directory(entry.path()) {
                    tracing::debug!("Error loading ignore file in {}: {:#}", entry.path().display(), e);
                    on_error(e);
                }

                if entry.depth() > 0 && self.matcher.should_ignore(entry.path()) {
                    tracing::debug!("Skipping directory (ignored): {}", entry.path().display());
                    stats.pruned += 1;
                    entries.skip_current_dir();
                } else {
                    tracing::trace!("Entering directory: {}", entry.path().display());
                }
                continue;
            }

            let found = self.collector.increment_found();
            progress(found, found - self.collector.files_ignored());

            match self.classify(&entry) {
                Ok(content) => self.publish(jobs, entry.path(), content)?,
                Err(reason) => {
                    tracing::debug!("Skipping file ({:?}): {}", reason, entry.path().display());
                    self.collector.increment_ignored();
                }
            }
        }

        tracing::debug!(
            "File discovery completed: {} directories, {} pruned, {} files found",
            stats.directories,
            stats.pruned,
            self.collector.files_found()
        );
        Ok(stats)
    }

    /// Read a found file's text, or say why it is skipped
    fn classify(&self, entry: &DirEntry) -> std::result::Result<String, SkipReason> {
        if !entry.file_type().is_file() {
            return Err(SkipReason::NotRegular);
        }
        if self.matcher.should_ignore(entry.path()) {
            return Err(SkipReason::Ignored);
        }

        let bytes = std::fs::read(entry.path()).map_err(|e| {
            tracing::debug!("Cannot read file {}: {}", entry.path().display(), e);
            SkipReason::Unreadable
        })?;
        String::from_utf8(bytes).map_err(|_| SkipReason::NotUtf8)
    }

    /// Non-blocking send first, then block until a worker frees a slot
    fn publish(&self, jobs: &Sender<FileJob>, path: &Path, content: String) -> Result<()> {
        tracing::trace!("Discovered file: {} ({} bytes)", path.display(), content.len());
        let job = FileJob {
            path: path.to_path_buf(),
            content,
            ascii_only: self.ascii_only,
            sequences: self.sequences,
        };

        match jobs.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                tracing::trace!("Job queue full, waiting for a worker");
                if jobs.send(job).is_err() {
                    bail!("Worker pool stopped accepting jobs");
                }
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => bail!("Worker pool stopped accepting jobs"),
        }
    }
}
