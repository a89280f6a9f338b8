use tracing::trace;

use tracker_editor::Cursor;
use tracker_engine::VoiceState;
use tracker_format::{Pattern, CHANNELS, ROWS};

use crate::colors;
use crate::meters::decay_peak;
use crate::traits::TextSurface;

const ROW_LABEL_WIDTH: u16 = 3;
const CHANNEL_WIDTH: u16 = 9;
const DASHBOARD_Y: u16 = ROWS as u16 + 1;
const METERS_Y: u16 = ROWS as u16 + 2;

fn channel_x(ch: u8) -> u16 {
    ROW_LABEL_WIDTH + ch as u16 * CHANNEL_WIDTH
}

/// C8 Renderer Adapter: converts cell/cursor/meter state into draw calls
/// against an external [`TextSurface`] (spec.md §4.7, contract only).
pub struct RenderAdapter<T: TextSurface> {
    surface: T,
}

impl<T: TextSurface> RenderAdapter<T> {
    pub fn new(surface: T) -> Self {
        RenderAdapter { surface }
    }

    pub fn into_inner(self) -> T {
        self.surface
    }

    pub fn surface_mut(&mut self) -> &mut T {
        &mut self.surface
    }

    /// Draws one row's 9 cells. Effect-view mode swaps the `inst|vol`
    /// fields for the raw effect word's four nibbles.
    pub fn render_row(&mut self, row_idx: u8, pattern: &Pattern, effect_view_mode: bool) {
        let y = row_idx as u16;
        self.surface
            .draw_hex_byte(0, y, row_idx, colors::GRAY, colors::BLACK);
        for ch in 0..CHANNELS as u8 {
            let cell = pattern.cell(row_idx, ch);
            let x = channel_x(ch);
            self.surface
                .draw_hex_byte(x, y, cell.note, colors::WHITE, colors::BLACK);
            if effect_view_mode {
                let text = format!("{:04X}", cell.effect);
                self.surface
                    .draw_string(x + 3, y, &text, colors::WHITE, colors::BLACK);
            } else {
                self.surface
                    .draw_hex_byte(x + 3, y, cell.inst, colors::WHITE, colors::BLACK);
                self.surface
                    .draw_hex_byte(x + 6, y, cell.vol, colors::WHITE, colors::BLACK);
            }
        }
    }

    pub fn render_grid(&mut self, pattern: &Pattern, effect_view_mode: bool) {
        for row in 0..ROWS as u8 {
            self.render_row(row, pattern, effect_view_mode);
        }
    }

    /// Recolors the row background when the cursor moves: clears the old
    /// row, highlights the new one in the mode-appropriate color
    /// (spec.md §4.7 color policy).
    pub fn update_cursor_visuals(
        &mut self,
        old_row: u8,
        new_row: u8,
        _old_ch: u8,
        _new_ch: u8,
        edit_mode: bool,
    ) {
        if old_row != new_row {
            self.surface.set_bg_row(old_row as u16, colors::BLACK);
        }
        let color = if edit_mode {
            colors::CURSOR_EDIT
        } else {
            colors::CURSOR_PLAY
        };
        self.surface.set_bg_row(new_row as u16, color);
        trace!(old_row, new_row, edit_mode, "cursor visuals updated");
    }

    /// Distinct background on the sequencer's playhead row.
    pub fn mark_playhead(&mut self, play_row: u8) {
        self.surface.set_bg_row(play_row as u16, colors::PLAYHEAD_BG);
    }

    pub fn update_dashboard(&mut self, cursor: &Cursor, octave: u8, cur_inst: u8, brush_vol: u8) {
        let mode = if cursor.edit_mode { "EDIT" } else { "PLAY" };
        self.surface
            .draw_string(0, DASHBOARD_Y, mode, colors::WHITE, colors::BLACK);
        self.surface
            .draw_string(6, DASHBOARD_Y, "OCT", colors::GRAY, colors::BLACK);
        self.surface
            .draw_hex_byte(10, DASHBOARD_Y, octave, colors::WHITE, colors::BLACK);
        self.surface
            .draw_string(14, DASHBOARD_Y, "INS", colors::GRAY, colors::BLACK);
        self.surface
            .draw_hex_byte(18, DASHBOARD_Y, cur_inst, colors::WHITE, colors::BLACK);
        self.surface
            .draw_string(22, DASHBOARD_Y, "VOL", colors::GRAY, colors::BLACK);
        self.surface
            .draw_hex_byte(26, DASHBOARD_Y, brush_vol, colors::WHITE, colors::BLACK);
    }

    /// Decays every voice's peak meter and redraws its bar
    /// (spec.md §4.7: "decays peaks by 2 per frame with underflow clamp").
    pub fn update_meters(&mut self, voices: &mut [VoiceState; 9]) {
        for (ch, voice) in voices.iter_mut().enumerate() {
            voice.peak = decay_peak(voice.peak);
            let x = channel_x(ch as u8);
            let fill = (voice.peak / 8).min(7);
            let bar: String = (0..8).map(|i| if i < fill { '#' } else { '.' }).collect();
            self.surface
                .draw_string(x, METERS_Y, &bar, colors::METER, colors::BLACK);
        }
    }

    pub fn refresh_all_ui(
        &mut self,
        pattern: &Pattern,
        cursor: &Cursor,
        octave: u8,
        cur_inst: u8,
        brush_vol: u8,
        play_row: u8,
        voices: &mut [VoiceState; 9],
    ) {
        self.render_grid(pattern, cursor.effect_view_mode);
        self.mark_playhead(play_row);
        self.update_cursor_visuals(cursor.cur_row, cursor.cur_row, cursor.cur_channel, cursor.cur_channel, cursor.edit_mode);
        self.update_dashboard(cursor, octave, cur_inst, brush_vol);
        self.update_meters(voices);
    }
}
