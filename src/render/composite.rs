use crate::foundation::core::Rgba8;
use crate::foundation::error::{TesseraError, TesseraResult};

/// Straight-alpha "over": `src` at `opacity` (0..=1) on top of `dst`.
///
/// `co1 = src.a * opacity`, `co2 = dst.a * (1 - co1)`, `a = co1 + co2`,
/// `rgb = (co1 * src + co2 * dst) / a` (source rgb when `a == 0`).
pub fn over_straight(dst: Rgba8, src: Rgba8, opacity: f32) -> Rgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    if opacity >= 1.0 && src[3] == 255 {
        return src;
    }

    let co1 = f32::from(src[3]) / 255.0 * opacity;
    let co2 = f32::from(dst[3]) / 255.0 * (1.0 - co1);
    let a = co1 + co2;

    let mut out = [0u8; 4];
    if a <= 0.0 {
        out[..3].copy_from_slice(&src[..3]);
    } else {
        for i in 0..3 {
            let c = (co1 * f32::from(src[i]) + co2 * f32::from(dst[i])) / a;
            out[i] = c.round().clamp(0.0, 255.0) as u8;
        }
    }
    out[3] = (a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> TesseraResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TesseraError::format(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over_straight([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Premultiplied RGBA8 (vello_cpu pixmaps) to straight RGBA8, in place.
pub fn unpremultiply_in_place(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            let v = (u32::from(*c) * 255 + u32::from(a) / 2) / u32::from(a);
            *c = v.min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
