use serde::{Deserialize, Serialize};

use crate::cell::{PatternCell, CELL_SIZE};

/// Rows per pattern (spec.md §3: "exactly 32 rows").
pub const ROWS: usize = 32;
/// Channels per row — one per voice (spec.md §2: "9-voice").
pub const CHANNELS: usize = 9;
/// Size in bytes of one whole pattern, used by `copy_pattern`/`paste_pattern`.
pub const PATTERN_BYTES: usize = ROWS * CHANNELS * CELL_SIZE;

/// Byte address of a cell within a flat pattern-store address space
/// (spec.md §6): `addr(pat,row,ch) = pat*(32*9*5) + row*(9*5) + ch*5`.
pub fn addr(pat: u8, row: u8, ch: u8) -> usize {
    pat as usize * PATTERN_BYTES + row as usize * (CHANNELS * CELL_SIZE) + ch as usize * CELL_SIZE
}

/// One pattern: 32 rows of 9 cells. Zero-filled at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    rows: Vec<[PatternCell; CHANNELS]>,
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::empty()
    }
}

impl Pattern {
    pub fn empty() -> Pattern {
        Pattern {
            rows: vec![[PatternCell::EMPTY; CHANNELS]; ROWS],
        }
    }

    pub fn cell(&self, row: u8, ch: u8) -> PatternCell {
        self.rows[row as usize % ROWS][ch as usize % CHANNELS]
    }

    pub fn set_cell(&mut self, row: u8, ch: u8, cell: PatternCell) {
        self.rows[row as usize % ROWS][ch as usize % CHANNELS] = cell;
    }

    pub fn row(&self, row: u8) -> &[PatternCell; CHANNELS] {
        &self.rows[row as usize % ROWS]
    }

    /// Flattens the pattern into its `PATTERN_BYTES`-byte wire layout, for
    /// `copy_pattern`/bulk blit use (see [`crate::seq_write::SeqWrite`]).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PATTERN_BYTES);
        for row in &self.rows {
            for cell in row {
                out.extend_from_slice(&cell.to_bytes());
            }
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Pattern {
        assert_eq!(bytes.len(), PATTERN_BYTES);
        let mut rows = Vec::with_capacity(ROWS);
        for row_idx in 0..ROWS {
            let mut row = [PatternCell::EMPTY; CHANNELS];
            for ch_idx in 0..CHANNELS {
                let off = row_idx * CHANNELS * CELL_SIZE + ch_idx * CELL_SIZE;
                let mut raw = [0u8; CELL_SIZE];
                raw.copy_from_slice(&bytes[off..off + CELL_SIZE]);
                row[ch_idx] = PatternCell::from_bytes(raw);
            }
            rows.push(row);
        }
        Pattern { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_formula_matches_spec() {
        assert_eq!(addr(0, 0, 0), 0);
        assert_eq!(addr(0, 0, 1), CELL_SIZE);
        assert_eq!(addr(0, 1, 0), CHANNELS * CELL_SIZE);
        assert_eq!(addr(1, 0, 0), PATTERN_BYTES);
    }

    #[test]
    fn pattern_starts_zero_filled() {
        let p = Pattern::empty();
        for r in 0..ROWS as u8 {
            for c in 0..CHANNELS as u8 {
                assert_eq!(p.cell(r, c), PatternCell::EMPTY);
            }
        }
    }

    #[test]
    fn cell_write_read_round_trip() {
        let mut p = Pattern::empty();
        let cell = PatternCell {
            note: 60,
            inst: 1,
            vol: 63,
            effect: 0x1300,
        };
        p.set_cell(5, 3, cell);
        assert_eq!(p.cell(5, 3), cell);
    }

    #[test]
    fn byte_round_trip_preserves_all_cells() {
        let mut p = Pattern::empty();
        p.set_cell(0, 0, PatternCell { note: 60, inst: 2, vol: 40, effect: 0x8446 });
        p.set_cell(31, 8, PatternCell { note: 72, inst: 0, vol: 10, effect: 0xF000 });
        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), PATTERN_BYTES);
        let roundtripped = Pattern::from_bytes(&bytes);
        assert_eq!(roundtripped, p);
    }
}
