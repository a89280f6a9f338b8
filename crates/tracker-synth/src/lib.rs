//! C1 Synth Driver: OPL2-class register writer with shadow suppression.

pub mod driver;
pub mod freq;
pub mod patch;
pub mod registers;

pub use driver::{NullSink, RegisterSink, SynthDriver};
pub use freq::{detuned_block_fnum, midi_to_block_fnum, FNUM_TABLE};
pub use patch::{Patch, PatchBank, StaticPatchBank};
