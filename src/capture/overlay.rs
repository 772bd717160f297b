//! Label and timestamp overlay
//!
//! Every published frame carries `"<label> | <YYYY-mm-dd HH:MM:SS>"` in its
//! bottom-right corner. The text is drawn twice: first in black shifted one
//! pixel down-right, then in white at the anchor, so it stays readable on any
//! background.
//!
//! Glyphs come from the 8x8 public-domain bitmap font in `font8x8`, scaled by
//! an integer factor.

use chrono::{DateTime, Local};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

const GLYPH_SIZE: u32 = 8;
const TEXT_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE_COLOUR: Rgb<u8> = Rgb([0, 0, 0]);

/// Overlay geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Gap between the text box (outline included) and the frame edges
    pub margin: u32,
    /// Integer glyph scale; 1 renders 8px tall text
    pub scale: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            margin: 10,
            scale: 2,
        }
    }
}

impl OverlayStyle {
    /// Size of `text` in pixels, outline excluded
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let cell = GLYPH_SIZE.saturating_mul(self.scale.max(1));
        (cell.saturating_mul(text.chars().count() as u32), cell)
    }

    /// Top-left corner of the white pass for `text` in a `width`x`height` frame
    ///
    /// Saturates at 0 when the text does not fit.
    pub fn anchor(&self, text: &str, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = self.text_size(text);
        (
            width.saturating_sub(self.margin.saturating_add(w).saturating_add(1)),
            height.saturating_sub(self.margin.saturating_add(h).saturating_add(1)),
        )
    }
}

/// Overlay text for a camera at a given time
pub fn caption(label: &str, at: DateTime<Local>) -> String {
    format!("{} | {}", label, at.format("%Y-%m-%d %H:%M:%S"))
}

/// Draw `text` onto `image` near its bottom-right corner
pub fn stamp(image: &mut RgbImage, text: &str, style: &OverlayStyle) {
    let (x, y) = style.anchor(text, image.width(), image.height());
    draw_text(
        image,
        text,
        x.saturating_add(1),
        y.saturating_add(1),
        style.scale,
        OUTLINE_COLOUR,
    );
    draw_text(image, text, x, y, style.scale, TEXT_COLOUR);
}

fn draw_text(image: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, colour: Rgb<u8>) {
    let scale = scale.max(1);
    let cell = GLYPH_SIZE.saturating_mul(scale);
    if y >= image.height() {
        return;
    }

    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x.saturating_add(cell.saturating_mul(i as u32));
        if origin_x >= image.width() {
            break;
        }

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // bit 0 is the leftmost pixel
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x.saturating_add(col.saturating_mul(scale));
                let py = y.saturating_add(scale.saturating_mul(row as u32));
                fill(image, px, py, scale, colour);
            }
        }
    }
}

fn fill(image: &mut RgbImage, x: u32, y: u32, size: u32, colour: Rgb<u8>) {
    let x_end = x.saturating_add(size).min(image.width());
    let y_end = y.saturating_add(size).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, colour);
        }
    }
}
