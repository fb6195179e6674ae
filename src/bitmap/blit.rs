use crate::bitmap::{BitmapId, BitmapState};
use crate::context::GraphicsContext;
use crate::foundation::core::IntRect;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::blit::{
    BlitSource, BlitTarget, classify_scale, composite_rectangle, resample, scale_rect,
};
use crate::render::filter::Filter;
use crate::render::surface::{PixelBuffer, PixelView};

#[derive(Clone, Copy, Debug)]
struct Span {
    pos: f32,
    len: f32,
}

impl Span {
    fn ends(self) -> (f32, f32) {
        if self.len > 0.0 {
            (self.pos, self.pos + self.len)
        } else {
            (self.pos + self.len, self.pos)
        }
    }
}

/// Clips `src` to `[0, bound)` and moves `dst` proportionally. Returns `true` when nothing of
/// `src` is left. With `normalize`, `src` comes out with a positive extent and `dst` carries
/// any flip.
fn shrink_span(src: &mut Span, bound: f32, dst: &mut Span, normalize: bool) -> bool {
    let (mut s_start, mut s_end) = src.ends();
    if s_start >= 0.0 && s_end < bound {
        return false;
    }
    if s_start >= bound || s_end < 0.0 {
        return true;
    }
    let mut s_length = s_end - s_start;
    if s_length == 0.0 {
        return true;
    }

    let (mut d_start, mut d_end) = dst.ends();
    let mut d_length = d_end - d_start;

    let over = s_end - bound;
    if over > 0.0 {
        let d_delta = over / s_length * d_length;
        s_length -= over;
        s_end = bound;
        d_end -= d_delta;
        d_length -= d_delta;
    }
    if s_start < 0.0 {
        let d_delta = s_start / s_length * d_length;
        s_length += s_start;
        s_start = 0.0;
        d_start -= d_delta;
        d_length += d_delta;
    }

    if normalize {
        let same = (dst.len > 0.0) == (src.len > 0.0);
        dst.pos = if same { d_start } else { d_end };
        dst.len = if same { d_length } else { -d_length };
        src.pos = s_start;
        src.len = s_length;
    } else {
        src.pos = if src.len > 0.0 { s_start } else { s_end };
        src.len = if src.len > 0.0 { s_length } else { -s_length };
        dst.pos = if dst.len > 0.0 { d_start } else { d_end };
        dst.len = if dst.len > 0.0 { d_length } else { -d_length };
    }
    false
}

/// One axis: clip the source, then the destination, then round back to pixels.
fn shrink_axis(
    (s_pos, s_len, s_bound): (i32, i32, u32),
    (d_pos, d_len, d_bound): (i32, i32, u32),
) -> Option<((i32, i32), (i32, i32))> {
    let mut src = Span {
        pos: s_pos as f32,
        len: s_len as f32,
    };
    let mut dst = Span {
        pos: d_pos as f32,
        len: d_len as f32,
    };
    let rejected = shrink_span(&mut src, s_bound as f32, &mut dst, true)
        || shrink_span(&mut dst, d_bound as f32, &mut src, false);
    let src = (src.pos.round() as i32, src.len.round() as i32);
    let dst = (dst.pos.round() as i32, dst.len.round() as i32);
    if rejected || src.1 == 0 || dst.1 == 0 {
        return None;
    }
    Some((src, dst))
}

/// Shrinks a source/destination rectangle pair so both lie inside their bitmaps, keeping the
/// mapping between them. Returns `None` when nothing is left to draw.
///
/// The source comes out with non-negative extents when it had to be clipped; a flip is then
/// carried by the destination.
pub fn shrink_rects(
    src: IntRect,
    src_size: (u32, u32),
    dst: IntRect,
    dst_size: (u32, u32),
) -> Option<(IntRect, IntRect)> {
    let ((sx, sw), (dx, dw)) = shrink_axis((src.x, src.w, src_size.0), (dst.x, dst.w, dst_size.0))?;
    let ((sy, sh), (dy, dh)) = shrink_axis((src.y, src.h, src_size.1), (dst.y, dst.h, dst_size.1))?;
    Some((IntRect::new(sx, sy, sw, sh), IntRect::new(dx, dy, dw, dh)))
}

/// Pixels a blit reads, addressed in `lores` coordinates.
#[derive(Clone, Copy)]
pub(crate) struct BlitInput<'a> {
    pub(crate) view: PixelView<'a>,
    pub(crate) lores: (u32, u32),
    /// Source lives in host memory and is uploaded per blit.
    pub(crate) mega: bool,
}

impl<'a> BlitInput<'a> {
    pub(crate) fn uploaded(buffer: &'a PixelBuffer) -> Self {
        Self {
            view: buffer.view(),
            lores: (buffer.width, buffer.height),
            mega: true,
        }
    }
}

fn source_positive(src: IntRect, dst: IntRect) -> (IntRect, IntRect) {
    let (mut src, mut dst) = (src, dst);
    if src.w < 0 {
        src = IntRect::new(src.right(), src.y, src.w.saturating_neg(), src.h);
        dst = IntRect::new(dst.right(), dst.y, dst.w.saturating_neg(), dst.h);
    }
    if src.h < 0 {
        src = IntRect::new(src.x, src.bottom(), src.w, src.h.saturating_neg());
        dst = IntRect::new(dst.x, dst.bottom(), dst.w, dst.h.saturating_neg());
    }
    (src, dst)
}

impl GraphicsContext {
    /// Copies `src_rect` of `src` unscaled to `(x, y)` of `dst`.
    pub fn blt(
        &mut self,
        dst: BitmapId,
        x: i32,
        y: i32,
        src: BitmapId,
        src_rect: IntRect,
        opacity: i32,
    ) -> TesseraResult<()> {
        let dst_rect = IntRect::new(
            x,
            y,
            src_rect.w.saturating_abs(),
            src_rect.h.saturating_abs(),
        );
        self.stretch_blt(dst, dst_rect, src, src_rect, opacity, false)
    }

    /// Draws `src_rect` of `src` scaled into `dst_rect` of `dst`.
    ///
    /// Both rectangles are shrunk to their bitmaps first; an opacity of 0 (after clamping to
    /// `0..=255`) or an empty result draws nothing.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn stretch_blt(
        &mut self,
        dst: BitmapId,
        dst_rect: IntRect,
        src: BitmapId,
        src_rect: IntRect,
        opacity: i32,
        smooth: bool,
    ) -> TesseraResult<()> {
        const OP: &str = "stretch_blt";
        self.state(dst, OP)?.ensure_not_mega(OP)?;
        let source = self.state(src, OP)?;
        let lores = (source.width, source.height);

        let opacity = opacity.clamp(0, 255);
        if opacity == 0 {
            return Ok(());
        }

        // Read through the source's mirror when it has one.
        let effective = self.mirror(src).map_or(src, |m| m.id);
        let snapshot = (effective == dst)
            .then(|| self.state(effective, OP).map(|s| s.current_view().to_buffer()))
            .transpose()?;

        let drawn = self.with_state(dst, OP, |ctx, state| {
            let input = match &snapshot {
                Some(buffer) => BlitInput {
                    view: buffer.view(),
                    lores,
                    mega: false,
                },
                None => {
                    let s = ctx.state(effective, OP)?;
                    BlitInput {
                        view: s.current_view(),
                        lores,
                        mega: matches!(s.storage, crate::bitmap::Storage::Mega(_)),
                    }
                }
            };
            ctx.blit_into(state, input, src_rect, dst_rect, opacity as u8, smooth)
        })?;

        if let Some(m) = self.mirror(dst) {
            self.stretch_blt(m.id, m.rect(dst_rect), src, src_rect, opacity, smooth)?;
        }
        if drawn {
            self.notify_modified(dst);
        }
        Ok(())
    }

    /// Blits into the current surface of a detached bitmap without touching its mirror.
    /// Returns whether anything was drawn.
    pub(crate) fn blit_into(
        &self,
        dst: &mut BitmapState,
        input: BlitInput<'_>,
        src_rect: IntRect,
        dst_rect: IntRect,
        opacity: u8,
        smooth: bool,
    ) -> TesseraResult<bool> {
        let Some((src_rect, dst_rect)) =
            shrink_rects(src_rect, input.lores, dst_rect, (dst.width, dst.height))
        else {
            return Ok(false);
        };
        let smooth = smooth && !(src_rect.w == dst_rect.w && src_rect.h == dst_rect.h);
        let touches = dst.touches_tainted(dst_rect.normalized());
        let sub_image_fix = self.config.sub_image_fix;

        let mode = dst.mode();
        let target = dst
            .current_surface_mut()
            .ok_or(TesseraError::unsupported("stretch_blt", mode))?;

        if !input.mega {
            let source = BlitSource::new(input.view).with_lores(input.lores.0, input.lores.1);
            if opacity == 255 && !touches {
                let class = classify_scale(source.effective(src_rect), (dst_rect.w, dst_rect.h));
                let mut pass = self.pipeline.begin(BlitTarget::surface(target), class);
                pass.source(source);
                pass.rectangle(src_rect, dst_rect, smooth);
                pass.end();
            } else {
                let mut target = BlitTarget::surface(target);
                composite_rectangle(
                    &mut target,
                    source,
                    src_rect,
                    dst_rect,
                    f32::from(opacity) / 255.0,
                    smooth,
                );
            }
        } else {
            let (src_rect, dst_rect) = source_positive(src_rect, dst_rect);
            let region = scale_rect(src_rect, (input.view.width, input.view.height), input.lores);
            let max = self.max_size() as i32;
            let (upload, smooth) = if region.w > max || region.h > max {
                let (w, h) = (dst_rect.w.unsigned_abs(), dst_rect.h.unsigned_abs());
                tracing::debug!(?region, w, h, "resampling oversized blit source");
                (
                    resample(&input.view, region, w, h, Filter::simple(smooth)),
                    false,
                )
            } else {
                (input.view.crop(region), smooth)
            };
            let upload_rect = IntRect::sized(upload.width as i32, upload.height as i32);
            let source = BlitSource::new(upload.view());

            if opacity == 255 && !touches {
                if upload_rect.w == dst_rect.w && upload_rect.h == dst_rect.h && !sub_image_fix {
                    target.write_region(dst_rect.x, dst_rect.y, &upload.view());
                } else {
                    let class = classify_scale((upload_rect.w, upload_rect.h), (dst_rect.w, dst_rect.h));
                    let mut pass = self.pipeline.begin(BlitTarget::surface(target), class);
                    pass.source(source);
                    pass.rectangle(upload_rect, dst_rect, smooth);
                    pass.end();
                }
            } else {
                let mut target = BlitTarget::surface(target);
                composite_rectangle(
                    &mut target,
                    source,
                    upload_rect,
                    dst_rect,
                    f32::from(opacity) / 255.0,
                    smooth,
                );
            }
        }

        dst.tainted.add(dst_rect.normalized());
        dst.cache.invalidate();
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/blit.rs"]
mod tests;
