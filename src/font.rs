// Tiny 5x7 bitmap font, drawn at integer scales.
// Captions on strips and polaroids, the countdown, HUD text and toasts all go
// through here, so exported images need no font files.

use crate::types::FrameBuffer;

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal advance in unscaled pixels (glyph + 1 px spacing).
pub const ADVANCE: usize = GLYPH_WIDTH + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub scale: usize,
    pub color: [u8; 4],
    /// Drawn first, offset down-right by one scaled pixel.
    pub shadow: Option<[u8; 4]>,
}

impl TextStyle {
    pub fn new(scale: usize, color: [u8; 4]) -> Self {
        Self {
            scale: scale.max(1),
            color,
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, shadow: [u8; 4]) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
pub fn glyph(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b10001,0b11111,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b10001,0b01010,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        'a' => g!(0b00000,0b00000,0b01110,0b00001,0b01111,0b10001,0b01111),
        'b' => g!(0b10000,0b10000,0b10110,0b11001,0b10001,0b10001,0b11110),
        'c' => g!(0b00000,0b00000,0b01110,0b10000,0b10000,0b10001,0b01110),
        'd' => g!(0b00001,0b00001,0b01101,0b10011,0b10001,0b10001,0b01111),
        'e' => g!(0b00000,0b00000,0b01110,0b10001,0b11111,0b10000,0b01110),
        'f' => g!(0b00110,0b01001,0b01000,0b11100,0b01000,0b01000,0b01000),
        'g' => g!(0b00000,0b01111,0b10001,0b10001,0b01111,0b00001,0b01110),
        'h' => g!(0b10000,0b10000,0b10110,0b11001,0b10001,0b10001,0b10001),
        'i' => g!(0b00100,0b00000,0b01100,0b00100,0b00100,0b00100,0b01110),
        'j' => g!(0b00010,0b00000,0b00110,0b00010,0b00010,0b10010,0b01100),
        'k' => g!(0b10000,0b10000,0b10010,0b10100,0b11000,0b10100,0b10010),
        'l' => g!(0b01100,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'm' => g!(0b00000,0b00000,0b11010,0b10101,0b10101,0b10001,0b10001),
        'n' => g!(0b00000,0b00000,0b10110,0b11001,0b10001,0b10001,0b10001),
        'o' => g!(0b00000,0b00000,0b01110,0b10001,0b10001,0b10001,0b01110),
        'p' => g!(0b00000,0b00000,0b11110,0b10001,0b11110,0b10000,0b10000),
        'q' => g!(0b00000,0b00000,0b01101,0b10011,0b01111,0b00001,0b00001),
        'r' => g!(0b00000,0b00000,0b10110,0b11001,0b10000,0b10000,0b10000),
        's' => g!(0b00000,0b00000,0b01110,0b10000,0b01110,0b00001,0b11110),
        't' => g!(0b01000,0b01000,0b11100,0b01000,0b01000,0b01001,0b00110),
        'u' => g!(0b00000,0b00000,0b10001,0b10001,0b10001,0b10011,0b01101),
        'v' => g!(0b00000,0b00000,0b10001,0b10001,0b10001,0b01010,0b00100),
        'w' => g!(0b00000,0b00000,0b10001,0b10001,0b10101,0b10101,0b01010),
        'x' => g!(0b00000,0b00000,0b10001,0b01010,0b00100,0b01010,0b10001),
        'y' => g!(0b00000,0b00000,0b10001,0b10001,0b01111,0b00001,0b01110),
        'z' => g!(0b00000,0b00000,0b11111,0b00010,0b00100,0b01000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b01100,0b00100,0b01000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        '\'' => g!(0b01100,0b00100,0b01000,0b00000,0b00000,0b00000,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),

        // A few pictographs so captions and the countdown keep their emoji.
        '\u{263A}' | '\u{1F60A}' => g!(0b01110,0b10001,0b11011,0b10001,0b11011,0b10101,0b01110),
        '\u{2665}' | '\u{2764}' | '\u{1F496}' => g!(0b00000,0b01010,0b11111,0b11111,0b01110,0b00100,0b00000),
        '\u{1F382}' => g!(0b00100,0b00100,0b01110,0b11111,0b10101,0b11111,0b11111),
        '\u{1F389}' | '\u{2728}' => g!(0b00100,0b10101,0b01110,0b11111,0b01110,0b10101,0b00100),
        _ => None,
    }
}

/// Width in pixels of `text` at `scale`, without trailing spacing.
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 {
        return 0;
    }
    (n * ADVANCE - 1) * scale
}

/// Largest scale in `1..=max_scale` at which `text` fits in `max_width`.
pub fn fit_scale(text: &str, max_width: usize, max_scale: usize) -> usize {
    (1..=max_scale.max(1))
        .rev()
        .find(|&s| text_width(text, s) <= max_width)
        .unwrap_or(1)
}

fn draw_glyph(fb: &mut FrameBuffer, x: i32, y: i32, rows: &[u8; 7], scale: usize, color: [u8; 4]) {
    for (ry, rowbits) in rows.iter().enumerate() {
        for rx in 0..GLYPH_WIDTH {
            if (rowbits & (1 << (4 - rx))) != 0 {
                let px = x + (rx * scale) as i32;
                let py = y + (ry * scale) as i32;
                fb.fill_rect(px, py, scale, scale, color);
            }
        }
    }
}

/// Draw `text` with its top-left corner at (x,y). Unknown characters
/// advance without drawing.
pub fn draw_text(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, style: &TextStyle) {
    let s = style.scale.max(1);
    if let Some(shadow) = style.shadow {
        let mut cx = x + s as i32;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                draw_glyph(fb, cx, y + s as i32, &rows, s, shadow);
            }
            cx += (ADVANCE * s) as i32;
        }
    }
    let mut cx = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            draw_glyph(fb, cx, y, &rows, s, style.color);
        }
        cx += (ADVANCE * s) as i32;
    }
}

/// Draw `text` horizontally centered on `cx`, with the bottom of the glyph
/// cell sitting on `baseline`.
pub fn draw_text_centered(fb: &mut FrameBuffer, cx: i32, baseline: i32, text: &str, style: &TextStyle) {
    let w = text_width(text, style.scale) as i32;
    let top = baseline - (GLYPH_HEIGHT * style.scale) as i32;
    draw_text(fb, cx - w / 2, top, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_captions_have_glyphs() {
        for ch in "Happy Birthday Meggu! \u{1F382}\u{1F496} Photo 1/3 - 0123456789".chars() {
            assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn width_scales_linearly() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn fit_scale_shrinks_long_text() {
        assert_eq!(fit_scale("Hi", 1000, 5), 5);
        assert_eq!(fit_scale("Happy Birthday Meggu!", 460, 5), 3);
        assert_eq!(fit_scale("way too long for a tiny box", 3, 4), 1);
    }

    #[test]
    fn draws_inside_the_expected_box() {
        let mut fb = FrameBuffer::new(40, 20);
        let style = TextStyle::new(2, [255, 0, 0, 255]);
        draw_text_centered(&mut fb, 20, 18, "I", &style);
        // "I" at scale 2 is 10x14, centered on x=20, bottom at y=18
        assert_eq!(fb.pixel(20, 4), [255, 0, 0, 255]);
        assert_eq!(fb.pixel(20, 17), [255, 0, 0, 255]);
        assert_eq!(fb.pixel(20, 18), [0, 0, 0, 0]);
        assert_eq!(fb.pixel(5, 10), [0, 0, 0, 0]);
    }

    #[test]
    fn shadow_is_offset() {
        let mut fb = FrameBuffer::new(10, 10);
        let style = TextStyle::new(1, [255, 255, 255, 255]).with_shadow([0, 0, 0, 255]);
        draw_text(&mut fb, 0, 0, "|", &style);
        assert_eq!(fb.pixel(2, 0), [255, 255, 255, 255]);
        assert_eq!(fb.pixel(3, 7), [0, 0, 0, 255]);
    }
}
