//! Line-by-line reading of an interchange stream.
//!
//! Comments and blank lines are dropped here so the parser only ever sees candidate records.
//! Malformed lines are logged and skipped; the batch keeps going.

use std::io::{BufRead, ErrorKind};

use ipmap_common::record::ScanRecord;
use tracing::{error, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: usize,
    pub comments: usize,
    pub records: usize,
    pub rejected: usize,
}

/// Lazy iterator over the records of a stream.
pub struct Records<R> {
    reader: R,
    buf: String,
    stats: IngestStats,
    error: Option<std::io::Error>,
    done: bool,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            stats: IngestStats::default(),
            error: None,
            done: false,
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// The read error that cut the stream short, if any.
    pub fn error(&self) -> Option<&std::io::Error> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = ScanRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.stats.lines += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);

                    if line.is_empty() || ScanRecord::is_comment(line) {
                        self.stats.comments += 1;
                        continue;
                    }

                    match line.parse::<ScanRecord>() {
                        Ok(record) => {
                            self.stats.records += 1;
                            return Some(record);
                        }
                        Err(e) => {
                            self.stats.rejected += 1;
                            warn!(line = self.stats.lines, field = e.field(), "Skipping malformed line: {e}");
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.stats.lines += 1;
                    self.stats.rejected += 1;
                    warn!(line = self.stats.lines, "Skipping unreadable line: {e}");
                }
                Err(e) => {
                    error!("Failed to read input: {e}");
                    self.error = Some(e);
                    self.done = true;
                }
            }
        }
        None
    }
}
