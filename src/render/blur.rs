use rayon::prelude::*;

use crate::foundation::error::{TesseraError, TesseraResult};

/// Separable box blur of straight RGBA8 pixels: horizontal pass into `tmp`, vertical into `dst`.
///
/// Edges clamp. `radius == 1` is the 3-tap blur bitmaps use.
pub fn box_blur_rgba8(
    src: &[u8],
    tmp: &mut [u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    radius: u32,
) -> TesseraResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TesseraError::format("blur buffer size overflow"))?;
    if src.len() != expected_len || tmp.len() != expected_len || dst.len() != expected_len {
        return Err(TesseraError::format(
            "box_blur_rgba8 expects buffers matching width*height*4",
        ));
    }
    if expected_len == 0 {
        return Ok(());
    }
    if radius == 0 {
        dst.copy_from_slice(src);
        return Ok(());
    }

    let kernel = box_kernel_q16(radius);
    horizontal_pass(src, tmp, width, &kernel);
    vertical_pass(tmp, dst, width, height, &kernel);
    Ok(())
}

fn box_kernel_q16(radius: u32) -> Vec<u32> {
    let taps = (2 * radius + 1) as usize;
    let base = 65536 / taps as u32;
    let mut weights = vec![base; taps];
    // Rounding remainder goes to the centre tap so the kernel sums to exactly 1.0.
    weights[taps / 2] += 65536 - base * taps as u32;
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let stride = width as usize * 4;
    dst.par_chunks_exact_mut(stride)
        .zip(src.par_chunks_exact(stride))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                    let idx = sx as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(in_row[idx + c]);
                    }
                }
                let out_idx = x as usize * 4;
                for c in 0..4 {
                    out_row[out_idx + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let h = height as i32;
    let stride = width as usize * 4;
    dst.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..width as usize {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
                    let idx = sy as usize * stride + x * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    out_row[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
