//! In-memory lines for dry runs and tests.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use super::Line;

/// One recorded write to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEvent {
    /// Name of the line that was written.
    pub line: &'static str,
    /// Level after the write.
    pub energized: bool,
    /// When the write happened.
    pub at: Instant,
}

/// Ordered record of writes shared between several [`MemoryLine`]s.
///
/// Cloning yields another handle to the same record, so a test can keep
/// one handle while the lines themselves move into a controller.
#[derive(Debug, Clone, Default)]
pub struct LineJournal {
    events: Arc<Mutex<Vec<LineEvent>>>,
}

impl LineJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every write so far, in the order they happened.
    pub fn events(&self) -> Vec<LineEvent> {
        self.events.lock().clone()
    }

    /// Number of writes recorded so far.
    pub fn write_count(&self) -> usize {
        self.events.lock().len()
    }

    /// Last level written to `line`, or `false` if it was never written.
    pub fn level(&self, line: &str) -> bool {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|event| event.line == line)
            .is_some_and(|event| event.energized)
    }

    /// Replays the record and reports whether two or more lines were ever
    /// energized at the same time.
    pub fn overlap_detected(&self) -> bool {
        let events = self.events.lock();
        let mut live: Vec<&'static str> = Vec::new();
        for event in events.iter() {
            live.retain(|name| *name != event.line);
            if event.energized {
                live.push(event.line);
            }
            if live.len() > 1 {
                return true;
            }
        }
        false
    }

    fn record(&self, line: &'static str, energized: bool) {
        self.events.lock().push(LineEvent {
            line,
            energized,
            at: Instant::now(),
        });
    }
}

/// A line that only remembers its level.
#[derive(Debug)]
pub struct MemoryLine {
    name: &'static str,
    energized: bool,
    journal: Option<LineJournal>,
}

impl MemoryLine {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            energized: false,
            journal: None,
        }
    }

    /// Creates a line that appends every write to `journal`.
    pub fn journaled(name: &'static str, journal: &LineJournal) -> Self {
        Self {
            name,
            energized: false,
            journal: Some(journal.clone()),
        }
    }
}

impl Line for MemoryLine {
    fn set(&mut self, energized: bool) {
        debug!(line = self.name, from = self.energized, to = energized, "memory line write");
        self.energized = energized;
        if let Some(journal) = &self.journal {
            journal.record(self.name, energized);
        }
    }
}
