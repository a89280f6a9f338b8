use tracing::{debug, info};

use tracker_format::{arp_start_offset, ArpStyle, PatternCell, PatternStore, NOTE_OFF};
use tracker_synth::{PatchBank, RegisterSink, SynthDriver};

use crate::parser::{parse_row, to_synth_volume};
use crate::voice::VoiceState;

/// C6 Sequencer state (spec.md §3, §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencerState {
    pub is_playing: bool,
    pub ticks_per_row: u16,
    pub tick_counter: u16,
    pub play_row: u8,
    pub cur_order_idx: u16,
    pub cur_pattern: u8,
    pub is_song_mode: bool,
}

impl Default for SequencerState {
    fn default() -> Self {
        SequencerState {
            is_playing: false,
            ticks_per_row: 6,
            tick_counter: 0,
            play_row: 0,
            cur_order_idx: 0,
            cur_pattern: 0,
            is_song_mode: false,
        }
    }
}

impl SequencerState {
    /// Enter play mode. Forces `tick_counter = 0` so the very next
    /// `advance()` call fires row entry immediately, whether this is a
    /// fresh sequencer or a resume from a mid-row pause (spec.md §4.5
    /// Transport: "on transition to playing ... the first row fires
    /// immediately").
    pub fn play(&mut self) {
        self.is_playing = true;
        self.tick_counter = 0;
        info!("sequencer: play");
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
        info!("sequencer: pause");
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Shift+Enter: stop+reset (spec.md §4.5 Transport, §5 Cancellation).
    pub fn stop_and_reset(&mut self) {
        self.is_playing = false;
        self.tick_counter = 0;
        self.play_row = 0;
        self.cur_order_idx = 0;
        info!("sequencer: stop+reset");
    }
}

/// Which voices the sequencer should skip this row entry because the
/// editor is live-jamming them (spec.md §4.5: "if the editor is
/// live-jamming this voice, skip").
pub trait JamMask {
    fn is_jamming(&self, ch: u8) -> bool;
}

impl JamMask for [bool; 9] {
    fn is_jamming(&self, ch: u8) -> bool {
        self[ch as usize % 9]
    }
}

/// Runs one vsync frame of the row clock. Returns `true` if a row was
/// entered this frame (useful for renderer diffing / follow mode).
#[allow(clippy::too_many_arguments)]
pub fn advance<S: RegisterSink, P: PatchBank>(
    seq: &mut SequencerState,
    store: &PatternStore,
    voices: &mut [VoiceState; 9],
    jam: &impl JamMask,
    synth: &mut SynthDriver<S>,
    patch_bank: &P,
) -> bool {
    if !seq.is_playing {
        return false;
    }
    let entered_row = seq.tick_counter == 0;
    if entered_row {
        enter_row(seq, store, voices, jam, synth, patch_bank);
    }
    seq.tick_counter += 1;
    if seq.tick_counter >= seq.ticks_per_row {
        seq.tick_counter = 0;
        advance_row_pointer(seq, store);
    }
    entered_row
}

fn enter_row<S: RegisterSink, P: PatchBank>(
    seq: &SequencerState,
    store: &PatternStore,
    voices: &mut [VoiceState; 9],
    jam: &impl JamMask,
    synth: &mut SynthDriver<S>,
    patch_bank: &P,
) {
    debug!(pattern = seq.cur_pattern, row = seq.play_row, "row entry");
    for ch in 0..9u8 {
        if jam.is_jamming(ch) {
            continue;
        }
        let cell = store.read_cell(seq.cur_pattern, seq.play_row, ch);
        let voice = &mut voices[ch as usize];
        parse_row(voice, ch, cell, synth);
        trigger_note(voice, ch, cell, synth, patch_bank);
    }
}

fn trigger_note<S: RegisterSink, P: PatchBank>(
    voice: &mut VoiceState,
    ch: u8,
    cell: PatternCell,
    synth: &mut SynthDriver<S>,
    patch_bank: &P,
) {
    if !cell.has_note() {
        return;
    }
    synth.note_off(ch);
    if cell.note == NOTE_OFF {
        return;
    }
    voice.last_note = cell.note;
    if cell.has_instrument() {
        voice.last_inst = cell.inst;
    }
    if cell.vol != 0 {
        voice.last_vol = cell.vol;
    }

    let style = arp_style_if_active(voice);
    let start_offset = style.map(arp_start_offset).unwrap_or(0);
    if let Some(style) = style {
        reset_arp_phase(voice, style);
    }

    let note = (cell.note as i16 + start_offset).clamp(0, 127) as u8;
    let patch = patch_bank.patch(voice.last_inst);
    synth.set_patch(ch, &patch);
    synth.set_volume(ch, to_synth_volume(voice.last_vol));
    synth.note_on(ch, note);
}

fn arp_style_if_active(voice: &VoiceState) -> Option<ArpStyle> {
    match voice.pitch_effect {
        crate::voice::PitchEffect::Arp(a) => Some(a.style),
        _ => None,
    }
}

fn reset_arp_phase(voice: &mut VoiceState, style: ArpStyle) {
    if let crate::voice::PitchEffect::Arp(mut a) = voice.pitch_effect {
        a.style = style;
        a.phase_timer = 0;
        a.step_index = 0;
        a.just_triggered = true;
        voice.pitch_effect = crate::voice::PitchEffect::Arp(a);
    }
}

fn advance_row_pointer(seq: &mut SequencerState, store: &PatternStore) {
    seq.play_row = (seq.play_row + 1) % 32;
    if seq.play_row == 0 && seq.is_song_mode {
        let song_length = store.order.song_length().max(1);
        seq.cur_order_idx = (seq.cur_order_idx + 1) % song_length;
        seq.cur_pattern = store.read_order(seq.cur_order_idx);
        debug!(order = seq.cur_order_idx, pattern = seq.cur_pattern, "song order advance");
    }
}
