use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Note value meaning "this cell carries no note".
pub const NOTE_EMPTY: u8 = 0;
/// Note value meaning "stop whatever is sounding on this channel".
pub const NOTE_OFF: u8 = 255;
/// Lowest playable MIDI-style semitone (spec.md §6 "note range 12..119").
pub const NOTE_MIN: u8 = 12;
/// Highest playable MIDI-style semitone.
pub const NOTE_MAX: u8 = 119;
/// Linear volume ceiling for cells and the carrier.
pub const VOLUME_MAX: u8 = 63;

/// On-disk / in-memory byte layout of a cell (spec.md §6): `note | inst |
/// vol | effect_lo | effect_hi`, effect little-endian. `Pod`/`Zeroable` so a
/// whole pattern can be treated as a flat byte slice for bulk copy/paste.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct RawCell {
    pub note: u8,
    pub inst: u8,
    pub vol: u8,
    pub effect_lo: u8,
    pub effect_hi: u8,
}

pub const CELL_SIZE: usize = core::mem::size_of::<RawCell>();

/// The atomic editable unit (spec.md §3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCell {
    pub note: u8,
    pub inst: u8,
    pub vol: u8,
    pub effect: u16,
}

impl PatternCell {
    pub const EMPTY: PatternCell = PatternCell {
        note: NOTE_EMPTY,
        inst: 0,
        vol: 0,
        effect: 0,
    };

    /// Cell written by the editor's "backtick" binding (spec.md §4.6).
    pub fn note_off(current_inst: u8) -> PatternCell {
        PatternCell {
            note: NOTE_OFF,
            inst: current_inst,
            vol: 0,
            effect: 0xF000,
        }
    }

    pub fn has_note(&self) -> bool {
        self.note != NOTE_EMPTY
    }

    pub fn has_instrument(&self) -> bool {
        self.inst != 0
    }

    pub fn has_effect(&self) -> bool {
        self.effect != 0
    }

    pub fn to_raw(self) -> RawCell {
        RawCell {
            note: self.note,
            inst: self.inst,
            vol: self.vol,
            effect_lo: (self.effect & 0xFF) as u8,
            effect_hi: (self.effect >> 8) as u8,
        }
    }

    pub fn from_raw(raw: RawCell) -> PatternCell {
        PatternCell {
            note: raw.note,
            inst: raw.inst,
            vol: raw.vol,
            effect: u16::from(raw.effect_lo) | (u16::from(raw.effect_hi) << 8),
        }
    }

    pub fn to_bytes(self) -> [u8; CELL_SIZE] {
        bytemuck::cast(self.to_raw())
    }

    pub fn from_bytes(bytes: [u8; CELL_SIZE]) -> PatternCell {
        PatternCell::from_raw(bytemuck::cast(bytes))
    }
}

impl From<RawCell> for PatternCell {
    fn from(raw: RawCell) -> Self {
        PatternCell::from_raw(raw)
    }
}

impl From<PatternCell> for RawCell {
    fn from(cell: PatternCell) -> Self {
        cell.to_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_bytes() {
        let cell = PatternCell {
            note: 60,
            inst: 3,
            vol: 40,
            effect: 0x8446,
        };
        let bytes = cell.to_bytes();
        assert_eq!(bytes, [60, 3, 40, 0x46, 0x84]);
        assert_eq!(PatternCell::from_bytes(bytes), cell);
    }

    #[test]
    fn note_off_cell_matches_spec() {
        let cell = PatternCell::note_off(7);
        assert_eq!(cell.note, NOTE_OFF);
        assert_eq!(cell.inst, 7);
        assert_eq!(cell.vol, 0);
        assert_eq!(cell.effect, 0xF000);
    }
}
