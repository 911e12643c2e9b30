use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use oe_core::Event;
use tracing::{debug, error, warn};

use crate::parse_event;

/// Lazily decodes events from a line source, in line order.
///
/// Rejected lines, including lines that are not valid UTF-8, are logged and
/// counted, never returned. Any other read error ends the stream. The reader
/// is single-pass.
pub struct EventReader<R> {
    lines: Option<io::Lines<R>>,
    source: String,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Some(reader.lines()),
            source: String::from("<input>"),
            line_no: 0,
            skipped: 0,
        }
    }

    /// A reader that yields nothing.
    pub fn empty() -> Self {
        Self {
            lines: None,
            source: String::from("<none>"),
            line_no: 0,
            skipped: 0,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Lines rejected so far (blank lines are not counted).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let next = self.lines.as_mut()?.next();
            let line = match next {
                Some(Ok(line)) => line,
                // the undecodable bytes are already consumed; the next read
                // starts on the following line
                Some(Err(err)) if err.kind() == io::ErrorKind::InvalidData => {
                    self.line_no += 1;
                    self.skipped += 1;
                    warn!(
                        source = %self.source,
                        line = self.line_no,
                        %err,
                        "skipping undecodable line"
                    );
                    continue;
                }
                Some(Err(err)) => {
                    error!(
                        source = %self.source,
                        line = self.line_no + 1,
                        %err,
                        "stopped reading events"
                    );
                    self.lines = None;
                    return None;
                }
                None => {
                    self.lines = None;
                    return None;
                }
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                debug!(source = %self.source, line = self.line_no, "skipping blank line");
                continue;
            }
            match parse_event(&line) {
                Ok(event) => return Some(event),
                Err(err) => {
                    self.skipped += 1;
                    warn!(
                        source = %self.source,
                        line = self.line_no,
                        %err,
                        "skipping event record"
                    );
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for EventReader<R> {}

/// Opens `path` for reading. An unreadable path is logged and gives an
/// empty reader.
pub fn read_events(path: impl AsRef<Path>) -> EventReader<BufReader<File>> {
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => {
            EventReader::new(BufReader::new(file)).with_source(path.display().to_string())
        }
        Err(err) => {
            error!(path = %path.display(), %err, "cannot read event source");
            EventReader::empty().with_source(path.display().to_string())
        }
    }
}
