//! Top-level composition: a single owned [`Engine`] value tying together
//! the pattern store, nine voices, sequencer, synth driver and editor
//! (spec.md §9 Design Notes, "single owned `Engine` value").

pub mod config;
pub mod error;
pub mod frame;

pub use config::EngineConfig;
pub use error::ConfigError;
pub use frame::Engine;
