use super::collector::{AggregateSnapshot, ResultCollector};
use super::counter::count_file;
use super::discovery::TreeWalker;
use super::ngram::{unpack2, unpack3};
use super::types::{
    AnalysisConfig, AnalysisResult, CharCount, FileJob, SequenceConfig, SequenceCount,
    TimingBreakdown,
};
use crate::ignore::{ExtensionDenylist, IgnoreMatcher, MatcherOptions};
use crate::parallel::WorkerPool;
use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Runs the discovery and counting pipeline over one directory tree
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    sequences: SequenceConfig,
    span: tracing::Span,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, sequences: SequenceConfig) -> Self {
        Self {
            config,
            sequences,
            span: tracing::info_span!("analysis"),
        }
    }

    /// Parent span for everything this analyzer logs
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Analyze every eligible file under `root`
    ///
    /// `progress` is called on the walker thread with `(found, processed)`
    /// after each file is found. Any error recorded during the walk fails
    /// the whole run and no partial result is returned.
    pub fn analyze<P>(&self, root: impl AsRef<Path>, progress: P) -> Result<AnalysisResult>
    where
        P: FnMut(usize, usize) + Send,
    {
        let start = Instant::now();
        let root = root.as_ref();
        let _entered = self.span.enter();

        self.sequences.validate()?;
        check_root(root)?;

        tracing::info!(
            "Initializing ignore matcher for {} (include dotfiles: {})",
            root.display(),
            self.config.include_dotfiles
        );
        let matcher = IgnoreMatcher::with_options(root, self.matcher_options())?;

        let collector = ResultCollector::new();
        let pool = WorkerPool::new(self.config.workers, self.span.clone());

        tracing::info!("Starting concurrent file traversal and character counting");
        let traversal_start = Instant::now();
        let matcher = self.run_pipeline(&pool, matcher, &collector, progress)?;
        let snapshot = collector.snapshot();
        let traversal = traversal_start.elapsed();

        tracing::info!(
            "File processing completed: found {}, processed {}, ignored {}, {} characters ({} unique) in {:?}",
            snapshot.files_found,
            snapshot.files_processed,
            snapshot.files_ignored,
            snapshot.total_chars,
            snapshot.chars.len(),
            traversal
        );

        let sorting_start = Instant::now();
        let result = summarize(root, &snapshot, &self.sequences);
        let sorting = sorting_start.elapsed();
        tracing::debug!(
            "Counts sorted: {} characters, {} sequences in {:?}",
            result.characters.len(),
            result.sequences.len(),
            sorting
        );

        let timing = TimingBreakdown {
            total: start.elapsed(),
            ignore: matcher.total_time(),
            traversal,
            sorting,
            output: Default::default(),
        };
        tracing::info!(
            "Analysis completed in {:?} (ignore rules {:?}, traversal {:?}, sorting {:?})",
            timing.total,
            timing.ignore,
            timing.traversal,
            timing.sorting
        );

        Ok(AnalysisResult { timing, ..result })
    }

    fn matcher_options(&self) -> MatcherOptions {
        let mut extensions = ExtensionDenylist::new();
        for ext in &self.config.extra_ignored_extensions {
            extensions.add_extension(ext);
        }
        for ext in &self.config.allowed_extensions {
            extensions.remove_extension(ext);
        }
        MatcherOptions {
            include_dotfiles: self.config.include_dotfiles,
            ignore_file: self.config.ignore_file.clone(),
            extensions,
        }
    }

    /// Walker thread → worker pool → drain on this thread
    ///
    /// Returns the matcher once the walk is over so its timings can be read.
    fn run_pipeline<P>(
        &self,
        pool: &WorkerPool,
        matcher: IgnoreMatcher,
        collector: &ResultCollector,
        progress: P,
    ) -> Result<IgnoreMatcher>
    where
        P: FnMut(usize, usize) + Send,
    {
        let span = tracing::debug_span!(parent: &self.span, "walker");
        let walker = TreeWalker::new(matcher, collector, span)
            .ascii_only(self.config.ascii_only)
            .sequences(self.sequences);

        let outcome = crossbeam::thread::scope(|s| {
            let (job_tx, result_rx) = pool.start(s, |job: FileJob| count_file(&job));

            let walker_handle = s.spawn(move |_| {
                let mut walker = walker;
                let mut first_error: Option<anyhow::Error> = None;
                let outcome = walker.walk(&job_tx, progress, |e| {
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        tracing::debug!("Additional traversal error: {:#}", e);
                    }
                });
                drop(job_tx);
                (walker.into_matcher(), outcome, first_error)
            });

            for partial in result_rx.iter() {
                collector.add_result(partial);
            }

            walker_handle.join()
        })
        .map_err(|_| anyhow!("Worker thread panicked during analysis"))?;

        let (matcher, outcome, first_error) =
            outcome.map_err(|_| anyhow!("Walker thread panicked during analysis"))?;

        outcome?;
        if let Some(e) = first_error {
            tracing::error!("Error during file processing: {:#}", e);
            return Err(e);
        }
        Ok(matcher)
    }
}

fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        bail!("Path does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Path is not a directory: {}", root.display());
    }
    Ok(())
}

/// Turn the aggregate into sorted, percentage-annotated lists
///
/// Timing is left at zero for the caller to fill in.
pub fn summarize(
    root: &Path,
    snapshot: &AggregateSnapshot,
    sequences: &SequenceConfig,
) -> AnalysisResult {
    let characters = character_counts(&snapshot.chars, snapshot.total_chars);
    let (sequence_list, unique_sequences) = if sequences.enabled {
        sequence_counts(&snapshot.pairs, &snapshot.triples, sequences)
    } else {
        (Vec::new(), 0)
    };

    AnalysisResult {
        root: root.to_path_buf(),
        unique_characters: characters.len(),
        characters,
        sequences: sequence_list,
        files_found: snapshot.files_found,
        files_ignored: snapshot.files_ignored,
        files_processed: snapshot.files_processed,
        total_characters: snapshot.total_chars,
        unique_sequences,
        timing: TimingBreakdown::default(),
    }
}

/// Characters by descending count, ties by ascending character
pub fn character_counts(chars: &HashMap<char, usize>, total: usize) -> Vec<CharCount> {
    let mut entries: Vec<(char, usize)> = chars.iter().map(|(&c, &n)| (c, n)).collect();
    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    entries
        .into_iter()
        .map(|(c, count)| CharCount {
            character: c.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Unpack, sort and filter the sequence tables
///
/// Sequences are compared as raw bytes. Pair and triple keys never describe
/// the same bytes, so every key is its own entry and text is only produced for
/// the entries that are kept. Returns the kept sequences and the number of
/// distinct sequences before the threshold and top-N cap were applied.
/// Percentages are relative to all sequence occurrences, including the ones
/// filtered out.
pub fn sequence_counts(
    pairs: &HashMap<u16, usize>,
    triples: &HashMap<u32, usize>,
    config: &SequenceConfig,
) -> (Vec<SequenceCount>, usize) {
    let unique = pairs.len() + triples.len();
    let total: usize = pairs.values().chain(triples.values()).sum();

    let kept_pairs = pairs
        .iter()
        .filter(|(_, count)| **count >= config.threshold)
        .map(|(&key, &count)| (unpack2(key).to_vec(), count));
    let kept_triples = triples
        .iter()
        .filter(|(_, count)| **count >= config.threshold)
        .map(|(&key, &count)| (unpack3(key).to_vec(), count));
    let mut entries: Vec<(Vec<u8>, usize)> = kept_pairs.chain(kept_triples).collect();

    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(top) = config.top_n {
        entries.truncate(top);
    }

    let list = entries
        .into_iter()
        .map(|(bytes, count)| SequenceCount {
            sequence: sequence_text(&bytes),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    (list, unique)
}

/// Sequence bytes as text, with `\xNN` for bytes that are not valid UTF-8
///
/// A sequence cut inside a multi-byte character is not valid UTF-8 on its
/// own. Escaping each stray byte keeps different byte sequences apart.
pub fn sequence_text(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 4);
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        for byte in chunk.invalid() {
            text.push_str(&format!("\\x{byte:02X}"));
        }
    }
    text
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
