/// 16-color text-mode palette index, matching the 80×60 grid's fg/bg
/// convention (spec.md §1, §4.7).
pub type Color = u8;

pub const BLACK: Color = 0;
pub const WHITE: Color = 15;
pub const GRAY: Color = 8;

/// Edit-mode cursor row highlight (spec.md §4.7 "edit-mode (red)").
pub const CURSOR_EDIT: Color = 4;
/// Play-mode cursor row highlight (spec.md §4.7 "play-mode (blue)").
pub const CURSOR_PLAY: Color = 1;
/// Distinct background marking the sequencer's playhead row.
pub const PLAYHEAD_BG: Color = 6;
/// Dashboard/peak-meter accent.
pub const METER: Color = 10;
