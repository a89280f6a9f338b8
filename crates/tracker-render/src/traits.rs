use crate::colors::Color;

/// The text layer the Renderer Adapter requires (spec.md §4.7 "Requires
/// from the text layer"). Implementing this is an external collaborator's
/// job — the core only consumes it.
pub trait TextSurface {
    fn draw_char(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color);
    fn set_bg_row(&mut self, y: u16, color: Color);
    fn draw_string(&mut self, x: u16, y: u16, s: &str, fg: Color, bg: Color);

    /// Convenience default built from `draw_string`: a zero-padded two-digit
    /// hex byte (spec.md's supplemented helper set for the HUD).
    fn draw_hex_byte(&mut self, x: u16, y: u16, value: u8, fg: Color, bg: Color) {
        self.draw_string(x, y, &format!("{value:02X}"), fg, bg);
    }

    /// Convenience default: blank out a span of a row in one color pair,
    /// built from repeated `draw_char` calls (spec.md's supplemented HUD
    /// helper set).
    fn set_text_color(&mut self, y: u16, x0: u16, x1: u16, fg: Color, bg: Color) {
        for x in x0..x1 {
            self.draw_char(x, y, ' ', fg, bg);
        }
    }
}
