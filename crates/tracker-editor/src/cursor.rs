use tracker_format::ROWS;

/// Editor-owned viewport state (spec.md §3 "Cursor"). Distinct from the
/// sequencer's `play_row`, which may diverge unless follow mode is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub cur_pattern: u8,
    pub cur_row: u8,
    pub cur_channel: u8,
    pub edit_mode: bool,
    pub effect_view_mode: bool,
    pub is_follow_mode: bool,
    pub is_song_mode: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            cur_pattern: 0,
            cur_row: 0,
            cur_channel: 0,
            edit_mode: false,
            effect_view_mode: false,
            is_follow_mode: false,
            is_song_mode: false,
        }
    }
}

impl Cursor {
    /// Moving down from the last row wraps to row 0 (spec.md §8 boundary
    /// behavior); up from row 0 wraps to the last row.
    pub fn move_row(&mut self, delta: i8) {
        let row = self.cur_row as i16 + delta as i16;
        self.cur_row = row.rem_euclid(ROWS as i16) as u8;
    }

    /// Channel movement clamps at 0..8 rather than wrapping (spec.md §8).
    pub fn move_channel(&mut self, delta: i8) {
        let ch = (self.cur_channel as i16 + delta as i16).clamp(0, 8);
        self.cur_channel = ch as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_wraps_both_directions() {
        let mut c = Cursor {
            cur_row: 31,
            ..Default::default()
        };
        c.move_row(1);
        assert_eq!(c.cur_row, 0);
        c.move_row(-1);
        assert_eq!(c.cur_row, 31);
    }

    #[test]
    fn channel_clamps_at_boundaries() {
        let mut c = Cursor {
            cur_channel: 8,
            ..Default::default()
        };
        c.move_channel(1);
        assert_eq!(c.cur_channel, 8);
        c.cur_channel = 0;
        c.move_channel(-1);
        assert_eq!(c.cur_channel, 0);
    }
}
