use crate::foundation::core::{Color, Rgba8};
use crate::render::composite::over_straight;
use crate::render::surface::PixelBuffer;

/// Line breaks become spaces. Returns `None` when nothing would be drawn.
pub fn fixup_text(text: &str) -> Option<String> {
    let fixed: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    if fixed.is_empty() || fixed == " " {
        return None;
    }
    Some(fixed)
}

/// Adds a black drop shadow one pixel down and right; the result is one pixel larger.
///
/// Blended pixels take the font colour, with alpha from straight "over" of glyph on shadow.
pub fn apply_shadow(glyphs: &PixelBuffer, font_color: Rgba8) -> PixelBuffer {
    let mut out = PixelBuffer::new(glyphs.width + 1, glyphs.height + 1);
    for y in 0..out.height {
        for x in 0..out.width {
            let src_a = glyphs.pixel(x, y).map_or(0, |p| p[3]);
            let shd_a = if x > 0 && y > 0 {
                glyphs.pixel(x - 1, y - 1).map_or(0, |p| p[3])
            } else {
                0
            };
            if src_a == 0 && shd_a == 0 {
                continue;
            }
            let co1 = f32::from(src_a) / 255.0;
            let co2 = f32::from(shd_a) / 255.0 * (1.0 - co1);
            let a = co1 + co2;
            let co3 = if a > 0.0 { co1 / a } else { 0.0 };
            let ch = |c: u8| (f32::from(c) * co3).round().clamp(0.0, 255.0) as u8;
            out.put_pixel(
                x,
                y,
                [
                    ch(font_color[0]),
                    ch(font_color[1]),
                    ch(font_color[2]),
                    (a * 255.0).round().clamp(0.0, 255.0) as u8,
                ],
            );
        }
    }
    out
}

/// Surrounds glyphs with a `size`-pixel outline in `out_color`; the result grows by `2 * size`.
pub fn apply_outline(glyphs: &PixelBuffer, out_color: Color, size: u32) -> PixelBuffer {
    if size == 0 {
        return glyphs.clone();
    }
    let s = size as i32;
    let mut out = PixelBuffer::new(glyphs.width + 2 * size, glyphs.height + 2 * size);
    let oc = out_color.opaque().to_rgba8();
    let view = glyphs.view();

    for y in 0..out.height as i32 {
        for x in 0..out.width as i32 {
            let mut cover = 0u8;
            for dy in -s..=s {
                for dx in -s..=s {
                    if dx * dx + dy * dy > s * s + s {
                        continue;
                    }
                    let gx = x - s + dx;
                    let gy = y - s + dy;
                    if gx < 0 || gy < 0 {
                        continue;
                    }
                    if let Some(p) = view.pixel(gx as u32, gy as u32) {
                        cover = cover.max(p[3]);
                    }
                }
            }
            if cover > 0 {
                out.put_pixel(x as u32, y as u32, [oc[0], oc[1], oc[2], cover]);
            }
        }
    }

    for y in 0..glyphs.height {
        for x in 0..glyphs.width {
            let Some(g) = glyphs.pixel(x, y) else {
                continue;
            };
            let (ox, oy) = (x + size, y + size);
            let Some(under) = out.pixel(ox, oy) else {
                continue;
            };
            out.put_pixel(ox, oy, over_straight(under, g, 1.0));
        }
    }
    out
}

/// Hard-thresholds coverage at 50% for solid (non anti-aliased) fonts.
pub fn threshold_alpha(buffer: &mut PixelBuffer) {
    for px in buffer.pixels.chunks_exact_mut(4) {
        px[3] = if px[3] >= 128 { 255 } else { 0 };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/effects.rs"]
mod tests;
