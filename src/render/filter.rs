use crate::foundation::core::Rgba8;
use crate::render::surface::PixelView;

/// Resampling method selectable for up- and down-scaling blits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothScaling {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
    EdgePreserving,
}

impl SmoothScaling {
    /// Methods a native framebuffer blit can express.
    pub fn is_fixed_function(self) -> bool {
        matches!(self, Self::Nearest | Self::Bilinear)
    }
}

/// Concrete sampler used for one rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Filter {
    Nearest,
    Bilinear,
    Bicubic { b: f32, c: f32 },
    Lanczos3,
    EdgePreserving,
}

/// Luma spread above which the edge-preserving filter keeps the nearest texel.
const EDGE_THRESHOLD: f32 = 48.0;

impl Filter {
    /// Mitchell-Netravali parameters from a 0..=100 sharpness: 0 is a B-spline, 100 Catmull-Rom.
    pub(crate) fn bicubic(sharpness: i32) -> Self {
        let s = sharpness.clamp(0, 100) as f32 / 100.0;
        Self::Bicubic {
            b: 1.0 - s,
            c: s / 2.0,
        }
    }

    pub(crate) fn simple(smooth: bool) -> Self {
        if smooth { Self::Bilinear } else { Self::Nearest }
    }
}

/// Samples `view` at texel-space coordinates (texel centres sit at `i + 0.5`).
pub(crate) fn sample(view: &PixelView<'_>, filter: Filter, u: f32, v: f32) -> Rgba8 {
    match filter {
        Filter::Nearest => view.clamped(u.floor() as i32, v.floor() as i32),
        Filter::Bilinear => separable(view, u, v, 1, tent),
        Filter::Bicubic { b, c } => separable(view, u, v, 2, |t| mitchell(t, b, c)),
        Filter::Lanczos3 => separable(view, u, v, 3, lanczos3),
        Filter::EdgePreserving => edge_preserving(view, u, v),
    }
}

fn separable(
    view: &PixelView<'_>,
    u: f32,
    v: f32,
    radius: i32,
    kernel: impl Fn(f32) -> f32,
) -> Rgba8 {
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor() as i32;
    let y0 = fy.floor() as i32;

    let mut acc = [0.0f32; 4];
    let mut wsum = 0.0f32;
    for j in (1 - radius)..=radius {
        let wy = kernel(fy - (y0 + j) as f32);
        if wy == 0.0 {
            continue;
        }
        for i in (1 - radius)..=radius {
            let w = kernel(fx - (x0 + i) as f32) * wy;
            if w == 0.0 {
                continue;
            }
            let px = view.clamped(x0 + i, y0 + j);
            for (a, &c) in acc.iter_mut().zip(px.iter()) {
                *a += w * f32::from(c);
            }
            wsum += w;
        }
    }

    if wsum.abs() < 1e-6 {
        return view.clamped(u.floor() as i32, v.floor() as i32);
    }
    acc.map(|a| (a / wsum).round().clamp(0.0, 255.0) as u8)
}

fn tent(t: f32) -> f32 {
    (1.0 - t.abs()).max(0.0)
}

fn mitchell(t: f32, b: f32, c: f32) -> f32 {
    let x = t.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x3 + (6.0 * b + 30.0 * c) * x2 + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        return 1.0;
    }
    let px = std::f32::consts::PI * x;
    px.sin() / px
}

fn lanczos3(t: f32) -> f32 {
    if t.abs() >= 3.0 {
        return 0.0;
    }
    sinc(t) * sinc(t / 3.0)
}

fn luma(px: Rgba8) -> f32 {
    0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2])
}

fn edge_preserving(view: &PixelView<'_>, u: f32, v: f32) -> Rgba8 {
    let x0 = (u - 0.5).floor() as i32;
    let y0 = (v - 0.5).floor() as i32;
    let taps = [
        view.clamped(x0, y0),
        view.clamped(x0 + 1, y0),
        view.clamped(x0, y0 + 1),
        view.clamped(x0 + 1, y0 + 1),
    ];
    let (lo, hi) = taps
        .iter()
        .map(|&p| luma(p))
        .fold((f32::MAX, f32::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)));
    if hi - lo > EDGE_THRESHOLD {
        view.clamped(u.floor() as i32, v.floor() as i32)
    } else {
        separable(view, u, v, 1, tent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/filter.rs"]
mod tests;
