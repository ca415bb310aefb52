//! Scrollback history
//!
//! Rows evicted from the top of the primary screen, oldest first. Once the
//! capacity is reached the oldest rows are dropped; `evicted` counts every
//! row ever dropped so absolute positions can be kept stable.
//!
//! Rows are kept in fixed-size chunks behind `Arc`s so a snapshot can hold
//! the whole history by cloning two pointers. Only the partially filled
//! tail chunk is ever copied on write.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::line::Line;

pub const DEFAULT_SCROLLBACK_SIZE: usize = 10_000;

/// Rows per history chunk
const CHUNK_ROWS: usize = 256;

type Chunk = Arc<Vec<Arc<Line>>>;

/// Shared, append-only view of scrollback rows.
///
/// Logically the concatenation of `sealed` and `tail` with the first
/// `skip` rows removed. Every sealed chunk holds exactly `CHUNK_ROWS` rows
/// and `skip` stays below `CHUNK_ROWS` while any chunk is sealed.
#[derive(Debug, Clone, Default)]
pub(crate) struct HistoryRows {
    sealed: Arc<VecDeque<Chunk>>,
    tail: Chunk,
    skip: usize,
    len: usize,
}

impl HistoryRows {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// 0 is the oldest row.
    pub(crate) fn get(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        let pos = index + self.skip;
        let line = match self.sealed.get(pos / CHUNK_ROWS) {
            Some(chunk) => chunk.get(pos % CHUNK_ROWS),
            None => self.tail.get(pos - self.sealed.len() * CHUNK_ROWS),
        };
        line.map(|l| l.as_ref())
    }

    fn shared(&self) -> impl Iterator<Item = &Arc<Line>> {
        self.sealed
            .iter()
            .flat_map(|chunk| chunk.iter())
            .chain(self.tail.iter())
            .skip(self.skip)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Line> {
        self.shared().map(|l| l.as_ref())
    }

    fn push(&mut self, line: Arc<Line>) {
        Arc::make_mut(&mut self.tail).push(line);
        self.len += 1;
        if self.tail.len() == CHUNK_ROWS {
            let full = std::mem::take(&mut self.tail);
            Arc::make_mut(&mut self.sealed).push_back(full);
        }
    }

    fn drop_front(&mut self, count: usize) {
        if count >= self.len {
            *self = Self::default();
            return;
        }
        self.len -= count;
        self.skip += count;
        while self.skip >= CHUNK_ROWS && !self.sealed.is_empty() {
            Arc::make_mut(&mut self.sealed).pop_front();
            self.skip -= CHUNK_ROWS;
        }
    }
}

impl PartialEq for HistoryRows {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let same_storage = Arc::ptr_eq(&self.sealed, &other.sealed)
            && Arc::ptr_eq(&self.tail, &other.tail)
            && self.skip == other.skip;
        same_storage || self.iter().eq(other.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Scrollback {
    rows: HistoryRows,
    max_lines: usize,
    evicted: u64,
}

impl Scrollback {
    /// A `max_lines` of 0 disables history.
    pub fn new(max_lines: usize) -> Self {
        Self {
            rows: HistoryRows::default(),
            max_lines,
            evicted: 0,
        }
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }

    /// Rows dropped off the front since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Append a row. Returns how many of the oldest rows were dropped to
    /// make room.
    pub fn push(&mut self, line: Arc<Line>) -> usize {
        if self.max_lines == 0 {
            self.evicted += 1;
            return 1;
        }
        self.rows.push(line);
        self.trim()
    }

    pub fn push_lines(&mut self, lines: impl IntoIterator<Item = Arc<Line>>) -> usize {
        lines.into_iter().map(|line| self.push(line)).sum()
    }

    /// 0 is the oldest row.
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.rows.get(index)
    }

    /// 0 is the newest row.
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        self.len()
            .checked_sub(index + 1)
            .and_then(|i| self.get(i))
    }

    /// Remove and return every row, oldest first.
    pub(crate) fn drain_all(&mut self) -> Vec<Arc<Line>> {
        let lines = self.rows.shared().cloned().collect();
        self.rows = HistoryRows::default();
        lines
    }

    /// Every row, shared with this scrollback without copying.
    pub(crate) fn share(&self) -> HistoryRows {
        self.rows.clone()
    }

    pub fn clear(&mut self) {
        self.evicted += self.rows.len() as u64;
        self.rows = HistoryRows::default();
    }

    /// Change the capacity, dropping the oldest rows if needed.
    pub fn set_max_lines(&mut self, max_lines: usize) -> usize {
        self.max_lines = max_lines;
        self.trim()
    }

    fn trim(&mut self) -> usize {
        let excess = self.rows.len().saturating_sub(self.max_lines);
        if excess > 0 {
            self.rows.drop_front(excess);
            self.evicted += excess as u64;
        }
        excess
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.rows.iter()
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_SIZE)
    }
}
