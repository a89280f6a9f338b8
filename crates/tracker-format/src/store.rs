use serde::{Deserialize, Serialize};

use crate::cell::PatternCell;
use crate::pattern::{Pattern, PATTERN_BYTES};
use crate::seq_write::SeqWrite;

/// Lower bound from spec.md §6 ("MAX_PATTERNS ≥ 16"); the original's order
/// list XRAM sizing (`song.h`) implies 32 patterns, used as our default.
pub const MAX_PATTERNS_DEFAULT: usize = 32;
/// Fixed per spec.md §6.
pub const MAX_ORDERS_USER: usize = 64;

/// Sequence of pattern indices the sequencer walks in song mode
/// (spec.md §3).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongOrder {
    slots: [u8; MAX_ORDERS_USER],
    /// 1..MAX_ORDERS_USER; only the first `song_length` slots are active.
    song_length: u16,
}

impl Default for SongOrder {
    fn default() -> Self {
        SongOrder {
            slots: [0; MAX_ORDERS_USER],
            song_length: 1,
        }
    }
}

impl SongOrder {
    pub fn song_length(&self) -> u16 {
        self.song_length
    }

    /// Clamped to 1..=MAX_ORDERS_USER (spec.md has no failable operations
    /// in the engine path).
    pub fn set_song_length(&mut self, len: u16) {
        self.song_length = len.clamp(1, MAX_ORDERS_USER as u16);
    }

    pub fn read(&self, i: u16) -> u8 {
        self.slots[i as usize % MAX_ORDERS_USER]
    }

    pub fn write(&mut self, i: u16, pattern_id: u8) {
        self.slots[i as usize % MAX_ORDERS_USER] = pattern_id;
    }
}

/// C2 Pattern Store: addressable (pattern, row, channel) grid, plus the
/// song order list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternStore {
    patterns: Vec<Pattern>,
    pub order: SongOrder,
}

impl PatternStore {
    pub fn new(max_patterns: usize) -> PatternStore {
        let max_patterns = max_patterns.max(16);
        PatternStore {
            patterns: vec![Pattern::empty(); max_patterns],
            order: SongOrder::default(),
        }
    }

    pub fn max_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn clamp_pattern(&self, pat: u8) -> usize {
        pat as usize % self.patterns.len()
    }

    pub fn read_cell(&self, pat: u8, row: u8, ch: u8) -> PatternCell {
        self.patterns[self.clamp_pattern(pat)].cell(row, ch)
    }

    pub fn write_cell(&mut self, pat: u8, row: u8, ch: u8, cell: PatternCell) {
        let idx = self.clamp_pattern(pat);
        self.patterns[idx].set_cell(row, ch, cell);
    }

    pub fn pattern(&self, pat: u8) -> &Pattern {
        &self.patterns[self.clamp_pattern(pat)]
    }

    /// Snapshot of a whole pattern as a byte buffer (clipboard use).
    pub fn copy_pattern(&self, pat: u8) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PATTERN_BYTES);
        buf.seq_write(0, &self.patterns[self.clamp_pattern(pat)].to_bytes());
        buf
    }

    pub fn paste_pattern(&mut self, pat: u8, buf: &[u8]) {
        assert_eq!(buf.len(), PATTERN_BYTES);
        let idx = self.clamp_pattern(pat);
        self.patterns[idx] = Pattern::from_bytes(buf);
    }

    pub fn read_order(&self, i: u16) -> u8 {
        self.order.read(i)
    }

    pub fn write_order(&mut self, i: u16, pat_id: u8) {
        self.order.write(i, pat_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_paste_round_trip() {
        let mut store = PatternStore::new(MAX_PATTERNS_DEFAULT);
        let cell = PatternCell {
            note: 60,
            inst: 2,
            vol: 63,
            effect: 0x1300,
        };
        store.write_cell(0, 5, 3, cell);
        let before = store.pattern(0).clone();

        let buf = store.copy_pattern(0);
        // Clear pattern 0, then restore from clipboard.
        store.write_cell(0, 5, 3, PatternCell::EMPTY);
        assert_ne!(store.pattern(0), &before);
        store.paste_pattern(0, &buf);
        assert_eq!(store.pattern(0), &before);
    }

    #[test]
    fn order_wraps_within_max_orders_user() {
        let mut store = PatternStore::new(MAX_PATTERNS_DEFAULT);
        store.write_order(0, 7);
        assert_eq!(store.read_order(0), 7);
        assert_eq!(store.read_order(MAX_ORDERS_USER as u16), 7);
    }
}
