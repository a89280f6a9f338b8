//! Per-voice effect state (C3), the row/effect parser (C4), the per-tick
//! processor (C5), and the row-clock sequencer (C6).

pub mod parser;
pub mod sequencer;
pub mod tick;
pub mod voice;

pub use parser::{parse_row, to_synth_volume};
pub use sequencer::{advance, JamMask, SequencerState};
pub use tick::{process_tick, TickCtx};
pub use voice::{
    ArpRuntime, AutoEchoState, GeneratorRuntime, NoteCutState, PitchEffect, PortaMode,
    PortaRuntime, RetriggerState, TremoloRuntime, VibratoRuntime, VolSlideMode, VolSlideRuntime,
    VoiceState, VolumeEffect, Waveform,
};
