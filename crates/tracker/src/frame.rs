use rand_pcg::Pcg32;
use tracing::info;

use tracker_editor::{Editor, InputOracle, Key};
use tracker_engine::{process_tick, sequencer, JamMask, SequencerState, TickCtx, VoiceState};
use tracker_format::PatternStore;
use tracker_render::{RenderAdapter, TextSurface};
use tracker_synth::{PatchBank, RegisterSink, SynthDriver};

use crate::config::EngineConfig;

/// Only voice 0 can be jammed live (spec.md §4.6); everything else is
/// always available to the sequencer.
struct VoiceZeroJam(bool);

impl JamMask for VoiceZeroJam {
    fn is_jamming(&self, ch: u8) -> bool {
        ch == 0 && self.0
    }
}

/// Design Notes §9 "single owned `Engine` value": the process-wide
/// singletons of the original are gathered here as one value parameterized
/// through the frame tick entry point. Test harnesses instantiate their own.
pub struct Engine<S: RegisterSink, P: PatchBank> {
    pub store: PatternStore,
    pub voices: [VoiceState; 9],
    pub sequencer: SequencerState,
    pub synth: SynthDriver<S>,
    pub editor: Editor,
    pub patch_bank: P,
    rng: Pcg32,
}

impl<S: RegisterSink, P: PatchBank> Engine<S, P> {
    pub fn new(config: &EngineConfig, sink: S, patch_bank: P) -> Self {
        let mut synth = SynthDriver::new(sink);
        synth.init();
        info!(ticks_per_row = config.ticks_per_row, "engine initialized");
        Engine {
            store: PatternStore::new(config.max_patterns),
            voices: std::array::from_fn(|_| VoiceState::default()),
            sequencer: SequencerState {
                ticks_per_row: config.ticks_per_row,
                ..SequencerState::default()
            },
            synth,
            editor: Editor::default(),
            patch_bank,
            rng: Pcg32::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7),
        }
    }

    /// Runs one vsync frame: `InputOracle -> Editor -> Sequencer ->
    /// Per-Tick Processor` (spec.md §2 control flow). The Renderer Adapter
    /// is a separate, externally-driven step (spec.md §1: rendering
    /// primitives are an external collaborator) — callers that have a
    /// `TextSurface` backend drive `tracker_render::RenderAdapter`
    /// themselves after this returns.
    pub fn tick(&mut self, input: &impl InputOracle) -> bool {
        self.handle_transport(input);

        self.editor.update(
            input,
            &mut self.store,
            &mut self.synth,
            &self.patch_bank,
            &mut self.voices[0],
            self.sequencer.is_playing,
        );

        let jam_mask = VoiceZeroJam(self.editor.is_jamming());
        let frame_tick = self.sequencer.tick_counter;
        let entered_row = sequencer::advance(
            &mut self.sequencer,
            &self.store,
            &mut self.voices,
            &jam_mask,
            &mut self.synth,
            &self.patch_bank,
        );

        for ch in 0..9u8 {
            let mut ctx = TickCtx {
                voice: &mut self.voices[ch as usize],
                ch,
                tick_counter: frame_tick,
                synth: &mut self.synth,
                patch_bank: &self.patch_bank,
                rng: &mut self.rng,
            };
            process_tick(&mut ctx);
        }

        entered_row
    }

    /// Drives the externally-supplied renderer over current engine state
    /// (spec.md §2 frame pipeline's final `Renderer Adapter` stage). Callers
    /// without a `TextSurface` backend simply never call this.
    pub fn render<T: TextSurface>(&mut self, adapter: &mut RenderAdapter<T>) {
        let pattern = self.store.pattern(self.editor.cursor.cur_pattern).clone();
        adapter.refresh_all_ui(
            &pattern,
            &self.editor.cursor,
            self.editor.octave,
            self.editor.cur_inst,
            self.editor.brush_vol,
            self.sequencer.play_row,
            &mut self.voices,
        );
    }

    /// Transport-stop (Shift+Enter) and panic (Esc) (spec.md §5
    /// "Cancellation"). Transport-stop silences everything and resets the
    /// row clock; panic mirrors it but preserves cursor/song state.
    fn handle_transport(&mut self, input: &impl InputOracle) {
        if input.is_edge_pressed(Key::Enter) {
            if input.modifiers().shift {
                self.sequencer.stop_and_reset();
                self.synth.silence_all();
                for voice in &mut self.voices {
                    voice.kill();
                }
            } else {
                self.sequencer.toggle_play_pause();
            }
        }
        if input.is_edge_pressed(Key::Escape) {
            self.synth.panic();
        }
    }
}
