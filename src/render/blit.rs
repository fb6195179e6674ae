use rayon::prelude::*;

use crate::config::Config;
use crate::foundation::core::{IntRect, Rgba8};
use crate::render::composite::over_straight;
use crate::render::filter::{Filter, SmoothScaling, sample};
use crate::render::surface::{PixelBuffer, PixelView, Surface};

/// Capabilities of the (software) graphics device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceCaps {
    /// Largest width or height of a single surface.
    pub max_texture_size: u32,
    /// Whether framebuffer-to-framebuffer blits are available.
    pub native_blit: bool,
}

impl DeviceCaps {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_texture_size: config.max_texture_size,
            native_blit: true,
        }
    }
}

/// Relation between the effective source and target extents of a blit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleClass {
    SameScale,
    UpScale,
    DownScale,
}

/// Classifies a blit from effective (hires-substituted) extents.
pub fn classify_scale(source: (i32, i32), target: (i32, i32)) -> ScaleClass {
    let (sw, sh) = (source.0.unsigned_abs(), source.1.unsigned_abs());
    let (tw, th) = (target.0.unsigned_abs(), target.1.unsigned_abs());
    if sw == tw && sh == th {
        ScaleClass::SameScale
    } else if tw < sw && th < sh {
        ScaleClass::DownScale
    } else {
        ScaleClass::UpScale
    }
}

/// How rectangles of a pass are resampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlitPath {
    /// Framebuffer blit: nearest or bilinear from the per-rectangle smooth flag.
    Native,
    /// Shader draw with the given method.
    Shader(SmoothScaling),
}

/// Pixels a pass renders into.
pub(crate) struct BlitTarget<'t> {
    width: u32,
    height: u32,
    pixels: &'t mut [u8],
}

impl<'t> BlitTarget<'t> {
    pub(crate) fn surface(surface: &'t mut Surface) -> Self {
        let (width, height) = (surface.width(), surface.height());
        Self {
            width,
            height,
            pixels: surface.pixels_mut(),
        }
    }

    pub(crate) fn buffer(buffer: &'t mut PixelBuffer) -> Self {
        Self {
            width: buffer.width,
            height: buffer.height,
            pixels: buffer.pixels.as_mut_slice(),
        }
    }
}

/// Sampled side of a blit, plus the logical (lores) size callers address it in.
#[derive(Clone, Copy)]
pub(crate) struct BlitSource<'s> {
    view: PixelView<'s>,
    lores: (u32, u32),
}

impl<'s> BlitSource<'s> {
    pub(crate) fn new(view: PixelView<'s>) -> Self {
        Self {
            view,
            lores: (view.width, view.height),
        }
    }

    pub(crate) fn with_lores(mut self, width: u32, height: u32) -> Self {
        self.lores = (width, height);
        self
    }

    pub(crate) fn effective(&self, rect: IntRect) -> (i32, i32) {
        let r = scale_rect(rect, (self.view.width, self.view.height), self.lores);
        (r.w, r.h)
    }
}

/// Path selection and filter settings shared by every blit of a context.
#[derive(Clone, Debug)]
pub struct BlitPipeline {
    caps: DeviceCaps,
    smooth_up: SmoothScaling,
    smooth_down: SmoothScaling,
    bicubic_sharpness: i32,
}

impl BlitPipeline {
    pub fn new(config: &Config, caps: DeviceCaps) -> Self {
        Self {
            caps,
            smooth_up: config.smooth_scaling,
            smooth_down: config.smooth_scaling_down,
            bicubic_sharpness: config.bicubic_sharpness,
        }
    }

    pub fn caps(&self) -> DeviceCaps {
        self.caps
    }

    /// Native blits are only used when neither configured method needs a shader.
    pub fn has_native_blit(&self) -> bool {
        self.caps.native_blit
            && self.smooth_up.is_fixed_function()
            && self.smooth_down.is_fixed_function()
    }

    pub fn scaling_method(&self, class: ScaleClass) -> SmoothScaling {
        match class {
            ScaleClass::SameScale => SmoothScaling::Nearest,
            ScaleClass::DownScale => self.smooth_down,
            ScaleClass::UpScale => self.smooth_up,
        }
    }

    pub fn path(&self, class: ScaleClass) -> BlitPath {
        if self.has_native_blit() {
            BlitPath::Native
        } else {
            BlitPath::Shader(self.scaling_method(class))
        }
    }

    pub(crate) fn begin<'t, 's>(&self, target: BlitTarget<'t>, class: ScaleClass) -> BlitPass<'t, 's> {
        let path = self.path(class);
        tracing::trace!(?class, ?path, "blit begin");
        BlitPass {
            target,
            source: None,
            path,
            class,
            bicubic_sharpness: self.bicubic_sharpness,
        }
    }
}

/// One `begin / source / rectangle* / end` sequence.
pub(crate) struct BlitPass<'t, 's> {
    target: BlitTarget<'t>,
    source: Option<BlitSource<'s>>,
    path: BlitPath,
    class: ScaleClass,
    bicubic_sharpness: i32,
}

impl<'t, 's> BlitPass<'t, 's> {
    pub(crate) fn source(&mut self, source: BlitSource<'s>) {
        self.source = Some(source);
    }

    /// Copies `src` (source lores coordinates) onto `dst` of the target, no blending.
    pub(crate) fn rectangle(&mut self, src: IntRect, dst: IntRect, smooth: bool) {
        let Some(source) = self.source else {
            tracing::warn!("blit rectangle without a bound source");
            return;
        };
        let filter = self.filter(smooth);
        let src = scale_rect(src, (source.view.width, source.view.height), source.lores);
        draw(&mut self.target, &source.view, src, dst, filter, Blend::Replace);
    }

    pub(crate) fn end(self) {}

    fn filter(&self, smooth: bool) -> Filter {
        if self.class == ScaleClass::SameScale {
            return Filter::Nearest;
        }
        match self.path {
            BlitPath::Native => Filter::simple(smooth),
            BlitPath::Shader(SmoothScaling::Bicubic) => Filter::bicubic(self.bicubic_sharpness),
            BlitPath::Shader(SmoothScaling::Lanczos3) => Filter::Lanczos3,
            BlitPath::Shader(SmoothScaling::EdgePreserving) => Filter::EdgePreserving,
            BlitPath::Shader(SmoothScaling::Nearest | SmoothScaling::Bilinear) => {
                Filter::simple(smooth)
            }
        }
    }
}

/// Draws `src` of `source` over `dst` of `target` with straight-alpha "over" at `opacity`.
pub(crate) fn composite_rectangle(
    target: &mut BlitTarget<'_>,
    source: BlitSource<'_>,
    src: IntRect,
    dst: IntRect,
    opacity: f32,
    smooth: bool,
) {
    let src = scale_rect(src, (source.view.width, source.view.height), source.lores);
    draw(
        target,
        &source.view,
        src,
        dst,
        Filter::simple(smooth),
        Blend::Over(opacity),
    );
}

/// Resamples `src` of `view` into a fresh `width x height` buffer.
pub(crate) fn resample(
    view: &PixelView<'_>,
    src: IntRect,
    width: u32,
    height: u32,
    filter: Filter,
) -> PixelBuffer {
    let mut out = PixelBuffer::new(width, height);
    let mut target = BlitTarget::buffer(&mut out);
    draw(
        &mut target,
        view,
        src,
        IntRect::sized(width as i32, height as i32),
        filter,
        Blend::Replace,
    );
    out
}

#[derive(Clone, Copy)]
enum Blend {
    Replace,
    Over(f32),
}

fn draw(
    target: &mut BlitTarget<'_>,
    view: &PixelView<'_>,
    src: IntRect,
    dst: IntRect,
    filter: Filter,
    blend: Blend,
) {
    if src.is_empty() || dst.is_empty() || view.is_empty() {
        return;
    }

    // A negative destination extent mirrors the source instead.
    let (mut src, mut dst) = (src, dst);
    if dst.w < 0 {
        dst = IntRect::new(dst.x + dst.w, dst.y, -dst.w, dst.h);
        src = IntRect::new(src.x + src.w, src.y, -src.w, src.h);
    }
    if dst.h < 0 {
        dst = IntRect::new(dst.x, dst.y + dst.h, dst.w, -dst.h);
        src = IntRect::new(src.x, src.y + src.h, src.w, -src.h);
    }

    let bounds = IntRect::sized(target.width as i32, target.height as i32);
    let Some(clip) = dst.intersect(bounds) else {
        return;
    };

    let sx = src.x as f32;
    let sy = src.y as f32;
    let kx = src.w as f32 / dst.w as f32;
    let ky = src.h as f32 / dst.h as f32;
    let shade = |x: i32, y: i32, cur: Rgba8| -> Rgba8 {
        let u = sx + (x - dst.x) as f32 * kx + 0.5 * kx;
        let v = sy + (y - dst.y) as f32 * ky + 0.5 * ky;
        let s = sample(view, filter, u, v);
        match blend {
            Blend::Replace => s,
            Blend::Over(opacity) => over_straight(cur, s, opacity),
        }
    };

    let stride = target.width as usize * 4;
    let rows = &mut target.pixels[clip.y as usize * stride..clip.bottom() as usize * stride];
    rows.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(row_i, row)| {
            let y = clip.y + row_i as i32;
            for x in clip.x..clip.right() {
                let i = x as usize * 4;
                let px = &mut row[i..i + 4];
                let out = shade(x, y, [px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&out);
            }
        });
}

/// Maps a rectangle from `lores` coordinates into a surface of size `actual`.
pub(crate) fn scale_rect(rect: IntRect, actual: (u32, u32), lores: (u32, u32)) -> IntRect {
    if actual == lores {
        return rect;
    }
    let sx = |v: i32| crate::foundation::math::scale_round(v, actual.0, lores.0);
    let sy = |v: i32| crate::foundation::math::scale_round(v, actual.1, lores.1);
    IntRect::from_edges(
        sx(rect.x).into(),
        sy(rect.y).into(),
        sx(rect.right()).into(),
        sy(rect.bottom()).into(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/blit.rs"]
mod tests;
