use kurbo::{Affine, Point};
use rayon::prelude::*;

use crate::render::filter::{Filter, sample};
use crate::render::surface::{PixelBuffer, PixelView};

/// Clamped parameters of a radial blur.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialBlurParams {
    /// Total sweep in degrees, `[0, 359]`.
    pub angle: i32,
    /// Number of rotated copies, `[2, 100]`.
    pub divisions: i32,
}

impl RadialBlurParams {
    pub fn new(angle: i32, divisions: i32) -> Self {
        Self {
            angle: angle.clamp(0, 359),
            divisions: divisions.clamp(2, 100),
        }
    }

    /// Rotation of each copy in degrees, centred on zero.
    pub fn rotations(self) -> impl Iterator<Item = f64> {
        let step = f64::from(self.angle) / f64::from(self.divisions - 1);
        let base = -f64::from(self.angle) / 2.0;
        (0..self.divisions).map(move |i| base + step * f64::from(i))
    }
}

/// Sums `divisions` copies of `src`, each rotated about the image centre, at `1/divisions`
/// opacity. Areas uncovered by a rotated copy sample the mirrored image.
pub fn radial_blur_rgba8(src: &PixelView<'_>, params: RadialBlurParams) -> PixelBuffer {
    let (w, h) = (src.width, src.height);
    let mut out = PixelBuffer::new(w, h);
    if src.is_empty() {
        return out;
    }

    let centre = Point::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    let inverses: Vec<Affine> = params
        .rotations()
        .map(|deg| Affine::rotate_about(deg.to_radians(), centre).inverse())
        .collect();
    let opacity = 1.0 / params.divisions as f32;

    let stride = w as usize * 4;
    out.pixels
        .par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w as usize {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let mut acc = [0.0f32; 4];
                for inv in &inverses {
                    let q = *inv * p;
                    let u = mirror_coord(q.x as f32, w as f32);
                    let v = mirror_coord(q.y as f32, h as f32);
                    let s = sample(src, Filter::Bilinear, u, v);
                    for c in 0..4 {
                        acc[c] += f32::from(s[c]) * opacity;
                    }
                }
                for c in 0..4 {
                    row[x * 4 + c] = acc[c].round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    out
}

/// Reflects a coordinate once across either edge of `[0, len)`.
fn mirror_coord(v: f32, len: f32) -> f32 {
    if v < 0.0 {
        -v
    } else if v >= len {
        2.0 * len - v
    } else {
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/radial_blur.rs"]
mod tests;
