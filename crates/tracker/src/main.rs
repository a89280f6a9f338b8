//! CLI demo: loads an `EngineConfig` (or its defaults), runs the engine
//! idle for a handful of frames, and reports how many register writes the
//! synth driver fired. No keyboard/text-mode backend is wired in here —
//! those remain external collaborators (spec.md §1).

use anyhow::{Context, Result};
use std::env;
use std::fs;

use tracker::{Engine, EngineConfig};
use tracker_editor::{InputOracle, Key, Modifiers};
use tracker_synth::StaticPatchBank;

struct NoInput;

impl InputOracle for NoInput {
    fn is_held(&self, _key: Key) -> bool {
        false
    }
    fn is_edge_pressed(&self, _key: Key) -> bool {
        false
    }
    fn is_edge_released(&self, _key: Key) -> bool {
        false
    }
    fn modifiers(&self) -> Modifiers {
        Modifiers::default()
    }
}

fn load_config() -> Result<EngineConfig> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            EngineConfig::from_toml_str(&text).with_context(|| format!("parsing config file {path}"))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let mut engine = Engine::new(&config, Vec::new(), StaticPatchBank::default());

    engine.sequencer.play();
    for _ in 0..config.ticks_per_row as usize * 4 {
        engine.tick(&NoInput);
    }

    tracing::info!(writes = engine.synth.sink().len(), "demo run complete");
    Ok(())
}
