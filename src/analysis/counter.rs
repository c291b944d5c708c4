//! Per-file character and sequence counting
//!
//! Content is lower-cased once, then scanned in a single pass. A character is
//! counted when it is printable or whitespace; in ASCII-only mode it must also
//! be a single byte below 128. Every counted character feeds its UTF-8 bytes
//! into a [`ByteWindow`], which yields the 2-byte and 3-byte keys ending at
//! that byte. Skipped characters never enter the window, so ASCII-only mode
//! cannot produce a sequence containing a byte above 127.

use super::ngram::ByteWindow;
use super::types::{FileJob, PartialResult, SequenceConfig};
use unicode_general_category::{GeneralCategory, get_general_category};

/// Whether a character belongs in the character table
///
/// Whitespace always counts. Anything else must be graphic: controls, format
/// characters, private-use, surrogate and unassigned code points are skipped.
#[inline]
pub fn is_countable(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_graphic() || c.is_whitespace();
    }
    c.is_whitespace()
        || !matches!(
            get_general_category(c),
            GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::PrivateUse
                | GeneralCategory::Surrogate
                | GeneralCategory::Unassigned
        )
}

/// Count one file. Never fails: empty or fully filtered content yields an
/// all-zero result with a file count of one.
pub fn count_file(job: &FileJob) -> PartialResult {
    let lowered = job.content.to_lowercase();
    let mut counter = FileCounter::new(job.sequences, lowered.len());

    if job.ascii_only {
        for byte in lowered.bytes() {
            if byte.is_ascii() && is_countable(char::from(byte)) {
                counter.record(char::from(byte), &[byte]);
            }
        }
    } else {
        let mut buf = [0u8; 4];
        for c in lowered.chars() {
            if is_countable(c) {
                let bytes = c.encode_utf8(&mut buf).as_bytes();
                counter.record(c, bytes);
            }
        }
    }

    counter.finish()
}

struct FileCounter {
    sequences: SequenceConfig,
    count_pairs: bool,
    count_triples: bool,
    window: ByteWindow,
    result: PartialResult,
}

impl FileCounter {
    fn new(sequences: SequenceConfig, capacity_hint: usize) -> Self {
        let count_pairs = sequences.includes_length(2);
        let count_triples = sequences.includes_length(3);
        let mut result = PartialResult {
            file_count: 1,
            ..PartialResult::default()
        };
        // Small files dominate most trees; cap the hint so huge files do not
        // pre-allocate tables far beyond the distinct keys they can hold
        let hint = capacity_hint.min(4096);
        if count_pairs {
            result.pairs.reserve(hint);
        }
        if count_triples {
            result.triples.reserve(hint);
        }

        Self {
            sequences,
            count_pairs,
            count_triples,
            window: ByteWindow::new(),
            result,
        }
    }

    #[inline]
    fn record(&mut self, c: char, bytes: &[u8]) {
        *self.result.chars.entry(c).or_insert(0) += 1;
        self.result.char_count += 1;

        if !self.sequences.enabled {
            return;
        }
        for &byte in bytes {
            self.window.push(byte);
            if self.count_pairs
                && let Some(key) = self.window.pair()
            {
                *self.result.pairs.entry(key).or_insert(0) += 1;
            }
            if self.count_triples
                && let Some(key) = self.window.triple()
            {
                *self.result.triples.entry(key).or_insert(0) += 1;
            }
        }
    }

    fn finish(self) -> PartialResult {
        self.result
    }
}
