use std::collections::VecDeque;

pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub direction: Direction,
    pub line: String,
}

/// Raw JSON lines for every frame sent or received, independent of rendering.
///
/// Bounded; the oldest entries are evicted first. Sequence numbers keep
/// increasing across evictions so a reader can resume with
/// [`EventLog::entries_since`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, direction: Direction, line: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(LogEntry {
            seq: self.next_seq,
            direction,
            line: line.into(),
        });
        self.next_seq += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence number the next entry will receive.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries with `seq >= from` that are still retained.
    pub fn entries_since(&self, from: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| entry.seq >= from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entries_are_evicted_at_capacity() {
        let mut log = EventLog::with_capacity(2);
        log.push(Direction::Inbound, "a");
        log.push(Direction::Outbound, "b");
        log.push(Direction::Inbound, "c");

        let lines: Vec<_> = log.entries().map(|entry| entry.line.as_str()).collect();
        assert_eq!(lines, vec!["b", "c"]);
        assert_eq!(log.next_seq(), 3);
    }

    #[test]
    fn entries_since_resumes_after_last_seen() {
        let mut log = EventLog::default();
        log.push(Direction::Inbound, "first");
        let cursor = log.next_seq();
        log.push(Direction::Outbound, "second");

        let fresh: Vec<_> = log.entries_since(cursor).collect();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].direction, Direction::Outbound);
        assert_eq!(fresh[0].line, "second");
    }
}
