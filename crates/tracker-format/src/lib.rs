//! Pattern/song data model (C2) and the byte-level vocabulary shared by the
//! rest of the workspace: cells, effect words, arpeggio and scale tables.

pub mod arp;
pub mod cell;
pub mod effect_word;
pub mod pattern;
pub mod scale;
pub mod seq_write;
pub mod store;

pub use arp::{arp_offset, arp_start_offset, cycle_len, ArpStyle};
pub use cell::{PatternCell, RawCell, CELL_SIZE, NOTE_EMPTY, NOTE_MAX, NOTE_MIN, NOTE_OFF, VOLUME_MAX};
pub use effect_word::{decode, EffectCmd, Nibbles, ARP_TICK_LUT};
pub use pattern::{addr, Pattern, CHANNELS, PATTERN_BYTES, ROWS};
pub use scale::{scale_offset, Scale};
pub use seq_write::SeqWrite;
pub use store::{PatternStore, SongOrder, MAX_ORDERS_USER, MAX_PATTERNS_DEFAULT};
