use tracing::debug;

use tracker_engine::VoiceState;
use tracker_format::{PatternCell, PatternStore, NOTE_MAX, NOTE_MIN, NOTE_OFF, VOLUME_MAX};
use tracker_synth::{PatchBank, RegisterSink, SynthDriver};

use crate::cursor::Cursor;
use crate::key::{InputOracle, Key, Modifiers};
use crate::repeat::KeyRepeat;

const MAX_OCTAVE: u8 = 8;

/// C7 Editor: cursor, edit-mode overlay, keyboard-to-note mapping, cell
/// mutation, pattern copy/paste, and the live piano-jam preview
/// (spec.md §4.6).
pub struct Editor {
    pub cursor: Cursor,
    pub octave: u8,
    pub cur_inst: u8,
    pub brush_vol: u8,
    pub cur_order_slot: u16,
    clipboard: Option<Vec<u8>>,
    nav_repeat: NavRepeat,
    /// The piano key index currently jamming voice 0, if any
    /// (monophonic: one jam note across the whole keyboard scan,
    /// spec.md §4.6).
    jam_key: Option<u8>,
}

#[derive(Default)]
struct NavRepeat {
    up: KeyRepeat,
    down: KeyRepeat,
    left: KeyRepeat,
    right: KeyRepeat,
}

impl Default for Editor {
    fn default() -> Self {
        Editor {
            cursor: Cursor::default(),
            octave: 4,
            cur_inst: 0,
            brush_vol: VOLUME_MAX,
            cur_order_slot: 0,
            clipboard: None,
            nav_repeat: NavRepeat::default(),
            jam_key: None,
        }
    }
}

fn piano_key_to_note(octave: u8, key_idx: u8) -> u8 {
    let n = 12 + octave as i16 * 12 + key_idx as i16;
    n.clamp(NOTE_MIN as i16, NOTE_MAX as i16) as u8
}

impl Editor {
    /// Voice 0 is the editor's dedicated jam voice; the live pattern
    /// channel jammed into is the cursor's current channel.
    const JAM_VOICE: u8 = 0;

    /// Runs one vsync frame of editor input handling. `is_sequencer_playing`
    /// gates automatic row advance and the note-off-on-release rule
    /// (spec.md §4.6).
    #[allow(clippy::too_many_arguments)]
    pub fn update<O: InputOracle, S: RegisterSink, P: PatchBank>(
        &mut self,
        input: &O,
        store: &mut PatternStore,
        synth: &mut SynthDriver<S>,
        patch_bank: &P,
        jam_voice: &mut VoiceState,
        is_sequencer_playing: bool,
    ) {
        let m = input.modifiers();
        self.handle_navigation(input);
        self.handle_mode_toggles(input);
        self.handle_octave_instrument(input, store, synth, patch_bank, m);
        self.handle_volume_effect(input, store, m);
        self.handle_transpose(input, store, m);
        self.handle_pattern_select(input, store, m);
        self.handle_song_order(input, store, m);
        self.handle_clear_and_noteoff(input, store, m);
        self.handle_clipboard(input, store, m);
        self.handle_piano_jam(input, store, synth, patch_bank, jam_voice, is_sequencer_playing);
    }

    fn handle_navigation(&mut self, input: &impl InputOracle) {
        self.step_repeat(input, Key::Up, |e| e.cursor.move_row(-1));
        self.step_repeat(input, Key::Down, |e| e.cursor.move_row(1));
        self.step_repeat(input, Key::Left, |e| e.cursor.move_channel(-1));
        self.step_repeat(input, Key::Right, |e| e.cursor.move_channel(1));
    }

    fn step_repeat(&mut self, input: &impl InputOracle, key: Key, action: fn(&mut Editor)) {
        let repeat = match key {
            Key::Up => &mut self.nav_repeat.up,
            Key::Down => &mut self.nav_repeat.down,
            Key::Left => &mut self.nav_repeat.left,
            Key::Right => &mut self.nav_repeat.right,
            _ => unreachable!("navigation keys only"),
        };
        if input.is_edge_pressed(key) {
            repeat.reset();
            action(self);
        } else if input.is_held(key) {
            if repeat.tick_held() {
                action(self);
            }
        } else {
            repeat.reset();
        }
    }

    fn handle_mode_toggles(&mut self, input: &impl InputOracle) {
        if input.is_edge_pressed(Key::Space) {
            self.cursor.edit_mode = !self.cursor.edit_mode;
        }
        if input.is_edge_pressed(Key::Slash) {
            self.cursor.effect_view_mode = !self.cursor.effect_view_mode;
        }
        if input.is_edge_pressed(Key::F8) {
            self.cursor.is_song_mode = !self.cursor.is_song_mode;
        }
        if input.is_edge_pressed(Key::F6) {
            self.cursor.is_follow_mode = !self.cursor.is_follow_mode;
        }
    }

    fn handle_octave_instrument<S: RegisterSink, P: PatchBank>(
        &mut self,
        input: &impl InputOracle,
        store: &mut PatternStore,
        synth: &mut SynthDriver<S>,
        patch_bank: &P,
        _m: Modifiers,
    ) {
        if input.is_edge_pressed(Key::F1) {
            self.octave = self.octave.saturating_sub(1);
        }
        if input.is_edge_pressed(Key::F2) {
            self.octave = (self.octave + 1).min(MAX_OCTAVE);
        }
        if input.is_edge_pressed(Key::F3) {
            self.cur_inst = self.cur_inst.wrapping_sub(1);
            self.update_jam_patch(synth, patch_bank);
        }
        if input.is_edge_pressed(Key::F4) {
            self.cur_inst = self.cur_inst.wrapping_add(1);
            self.update_jam_patch(synth, patch_bank);
        }
        if input.is_edge_pressed(Key::F5) {
            let cell = self.current_cell(store);
            if cell.has_instrument() {
                self.cur_inst = cell.inst;
                self.update_jam_patch(synth, patch_bank);
            }
        }
    }

    fn update_jam_patch<S: RegisterSink, P: PatchBank>(
        &self,
        synth: &mut SynthDriver<S>,
        patch_bank: &P,
    ) {
        if self.jam_key.is_some() {
            let patch = patch_bank.patch(self.cur_inst);
            synth.set_patch(Self::JAM_VOICE, &patch);
        }
    }

    fn handle_volume_effect(&mut self, input: &impl InputOracle, store: &mut PatternStore, m: Modifiers) {
        if self.cursor.effect_view_mode {
            if input.is_edge_pressed(Key::LeftBracket) {
                self.nudge_effect_nibble(store, m.shift, -1);
            }
            if input.is_edge_pressed(Key::RightBracket) {
                self.nudge_effect_nibble(store, m.shift, 1);
            }
        } else if m.shift {
            if input.is_edge_pressed(Key::LeftBracket) {
                self.nudge_cell_vol(store, -1);
            }
            if input.is_edge_pressed(Key::RightBracket) {
                self.nudge_cell_vol(store, 1);
            }
        } else {
            if input.is_edge_pressed(Key::LeftBracket) {
                self.brush_vol = self.brush_vol.saturating_sub(1);
            }
            if input.is_edge_pressed(Key::RightBracket) {
                self.brush_vol = (self.brush_vol + 1).min(VOLUME_MAX);
            }
        }

        if input.is_edge_pressed(Key::Semicolon) {
            self.nudge_effect_low_byte(store, if m.shift { -16 } else { -1 });
        }
        if input.is_edge_pressed(Key::Apostrophe) {
            self.nudge_effect_low_byte(store, if m.shift { 16 } else { 1 });
        }
    }

    fn nudge_cell_vol(&mut self, store: &mut PatternStore, delta: i16) {
        let mut cell = self.current_cell(store);
        cell.vol = (cell.vol as i16 + delta).clamp(0, VOLUME_MAX as i16) as u8;
        self.write_current_cell(store, cell);
    }

    /// High two nibbles of the effect word: command (shift) or style/param
    /// (plain) (spec.md §4.6).
    fn nudge_effect_nibble(&mut self, store: &mut PatternStore, coarse: bool, delta: i16) {
        let mut cell = self.current_cell(store);
        if coarse {
            let cmd = (cell.effect >> 12) & 0xF;
            let cmd = (cmd as i16 + delta).rem_euclid(16) as u16;
            cell.effect = (cell.effect & 0x0FFF) | (cmd << 12);
        } else {
            let s = (cell.effect >> 8) & 0xF;
            let s = (s as i16 + delta).rem_euclid(16) as u16;
            cell.effect = (cell.effect & 0xF0FF) | (s << 8);
        }
        self.write_current_cell(store, cell);
    }

    fn nudge_effect_low_byte(&mut self, store: &mut PatternStore, delta: i16) {
        let mut cell = self.current_cell(store);
        let low = (cell.effect & 0xFF) as i16;
        let low = (low + delta).rem_euclid(256) as u16;
        cell.effect = (cell.effect & 0xFF00) | low;
        self.write_current_cell(store, cell);
    }

    fn handle_transpose(&mut self, input: &impl InputOracle, store: &mut PatternStore, m: Modifiers) {
        let step: i16 = if m.shift { 12 } else { 1 };
        if input.is_edge_pressed(Key::Minus) {
            self.transpose(store, -step);
        }
        if input.is_edge_pressed(Key::Equals) {
            self.transpose(store, step);
        }
    }

    fn transpose(&mut self, store: &mut PatternStore, delta: i16) {
        let mut cell = self.current_cell(store);
        if cell.has_note() && cell.note != NOTE_OFF {
            cell.note = (cell.note as i16 + delta).clamp(NOTE_MIN as i16, NOTE_MAX as i16) as u8;
            self.write_current_cell(store, cell);
        }
    }

    fn handle_pattern_select(&mut self, input: &impl InputOracle, store: &PatternStore, _m: Modifiers) {
        let max = store.max_patterns() as i16;
        if input.is_edge_pressed(Key::F9) {
            self.cursor.cur_pattern = ((self.cursor.cur_pattern as i16 - 1).rem_euclid(max)) as u8;
        }
        if input.is_edge_pressed(Key::F10) {
            self.cursor.cur_pattern = ((self.cursor.cur_pattern as i16 + 1).rem_euclid(max)) as u8;
        }
    }

    fn handle_song_order(&mut self, input: &impl InputOracle, store: &mut PatternStore, m: Modifiers) {
        if m.alt {
            if input.is_edge_pressed(Key::F11) {
                let len = store.order.song_length();
                store.order.set_song_length(len.saturating_sub(1));
            }
            if input.is_edge_pressed(Key::F12) {
                let len = store.order.song_length();
                store.order.set_song_length(len + 1);
            }
            return;
        }
        if m.shift {
            if input.is_edge_pressed(Key::F11) {
                let pat = store.read_order(self.cur_order_slot);
                store.write_order(self.cur_order_slot, pat.wrapping_sub(1));
            }
            if input.is_edge_pressed(Key::F12) {
                let pat = store.read_order(self.cur_order_slot);
                store.write_order(self.cur_order_slot, pat.wrapping_add(1));
            }
            return;
        }
        let len = store.order.song_length().max(1);
        if input.is_edge_pressed(Key::F11) {
            self.cur_order_slot = (self.cur_order_slot + len - 1) % len;
        }
        if input.is_edge_pressed(Key::F12) {
            self.cur_order_slot = (self.cur_order_slot + 1) % len;
        }
    }

    fn handle_clear_and_noteoff(&mut self, input: &impl InputOracle, store: &mut PatternStore, _m: Modifiers) {
        if input.is_edge_pressed(Key::Backspace) || input.is_edge_pressed(Key::Delete) {
            self.write_current_cell(store, PatternCell::EMPTY);
        }
        if input.is_edge_pressed(Key::Backtick) {
            self.write_current_cell(store, PatternCell::note_off(self.cur_inst));
        }
    }

    fn handle_clipboard(&mut self, input: &impl InputOracle, store: &mut PatternStore, m: Modifiers) {
        if m.ctrl && input.is_edge_pressed(Key::C) {
            self.clipboard = Some(store.copy_pattern(self.cursor.cur_pattern));
            debug!(pattern = self.cursor.cur_pattern, "copied pattern");
        }
        if m.ctrl && input.is_edge_pressed(Key::V) {
            if let Some(buf) = self.clipboard.clone() {
                store.paste_pattern(self.cursor.cur_pattern, &buf);
                debug!(pattern = self.cursor.cur_pattern, "pasted pattern");
            }
        }
    }

    /// Piano-row scan: jam voice 0 monophonically, write-through into the
    /// current cell when in edit mode (spec.md §4.6).
    #[allow(clippy::too_many_arguments)]
    fn handle_piano_jam<S: RegisterSink, P: PatchBank>(
        &mut self,
        input: &impl InputOracle,
        store: &mut PatternStore,
        synth: &mut SynthDriver<S>,
        patch_bank: &P,
        jam_voice: &mut VoiceState,
        is_sequencer_playing: bool,
    ) {
        let held = input.held_piano_key();
        match (self.jam_key, held) {
            (None, Some(key_idx)) => {
                self.jam_key = Some(key_idx);
                jam_voice.kill();
                let note = piano_key_to_note(self.octave, key_idx);
                synth.note_off(Self::JAM_VOICE);
                let patch = patch_bank.patch(self.cur_inst);
                synth.set_patch(Self::JAM_VOICE, &patch);
                synth.set_volume(Self::JAM_VOICE, (self.brush_vol as u16 * 2).min(127) as u8);
                synth.note_on(Self::JAM_VOICE, note);

                if self.cursor.edit_mode {
                    let mut cell = self.current_cell(store);
                    cell.note = note;
                    cell.inst = self.cur_inst;
                    cell.vol = self.brush_vol;
                    self.write_current_cell(store, cell);
                    if !is_sequencer_playing {
                        self.cursor.move_row(1);
                    }
                }
            }
            (Some(prev), Some(key_idx)) if prev != key_idx => {
                self.jam_key = Some(key_idx);
                let note = piano_key_to_note(self.octave, key_idx);
                synth.set_pitch(Self::JAM_VOICE, note);
            }
            (Some(_), None) => {
                self.jam_key = None;
                // spec.md §4.6: only the sequencer's stop state releases
                // the voice; while playing, the sequencer owns it.
                if !is_sequencer_playing {
                    synth.note_off(Self::JAM_VOICE);
                }
            }
            _ => {}
        }
    }

    /// Whether the editor currently holds voice 0 for live preview, so a
    /// composing engine can keep the sequencer from retriggering it on row
    /// entry (spec.md §4.6).
    pub fn is_jamming(&self) -> bool {
        self.jam_key.is_some()
    }

    fn current_cell(&self, store: &PatternStore) -> PatternCell {
        store.read_cell(self.cursor.cur_pattern, self.cursor.cur_row, self.cursor.cur_channel)
    }

    fn write_current_cell(&self, store: &mut PatternStore, cell: PatternCell) {
        store.write_cell(self.cursor.cur_pattern, self.cursor.cur_row, self.cursor.cur_channel, cell);
    }
}
