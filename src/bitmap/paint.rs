use std::path::Path;

use rayon::prelude::*;

use crate::assets::encode::encode_image;
use crate::bitmap::mirror::Mirror;
use crate::bitmap::{BitmapId, Storage};
use crate::context::GraphicsContext;
use crate::foundation::core::{Color, IntRect};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::blit::resample;
use crate::render::filter::Filter;
use crate::render::surface::{PixelView, Surface, byte_len};

impl GraphicsContext {
    /// Fills `rect` with `color`, replacing the pixels. A fully transparent colour clears.
    pub fn fill_rect(&mut self, id: BitmapId, rect: IntRect, color: Color) -> TesseraResult<()> {
        const OP: &str = "fill_rect";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.fill_rect(m.id, m.rect(rect), color)?;
        }

        let px = color.to_rgba8();
        let st = self.state_mut(id, OP)?;
        if let Some(surface) = st.current_surface_mut() {
            surface.fill_rect(rect, px);
        }
        if px[3] == 0 {
            st.tainted.subtract(rect);
        } else {
            st.tainted.add(rect);
        }
        st.cache.invalidate();
        self.notify_modified(id);
        Ok(())
    }

    /// Fills `rect` with a linear blend from `from` to `to`, left to right or top to bottom.
    pub fn gradient_fill_rect(
        &mut self,
        id: BitmapId,
        rect: IntRect,
        from: Color,
        to: Color,
        vertical: bool,
    ) -> TesseraResult<()> {
        const OP: &str = "gradient_fill_rect";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.gradient_fill_rect(m.id, m.rect(rect), from, to, vertical)?;
        }

        let st = self.state_mut(id, OP)?;
        if let Some(surface) = st.current_surface_mut() {
            fill_gradient(surface, rect, from, to, vertical);
        }
        st.tainted.add(rect);
        st.cache.invalidate();
        self.notify_modified(id);
        Ok(())
    }

    /// Makes `rect` fully transparent.
    pub fn clear_rect(&mut self, id: BitmapId, rect: IntRect) -> TesseraResult<()> {
        self.fill_rect(id, rect, Color::transparent())
    }

    /// Makes the whole bitmap transparent.
    pub fn clear(&mut self, id: BitmapId) -> TesseraResult<()> {
        const OP: &str = "clear";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.clear(m.id)?;
        }

        let st = self.state_mut(id, OP)?;
        if let Some(surface) = st.current_surface_mut() {
            surface.clear();
        }
        st.tainted.clear();
        st.cache.invalidate();
        self.notify_modified(id);
        Ok(())
    }

    /// Whether drawing into `rect` has to blend with existing content.
    pub fn touches_tainted(&self, id: BitmapId, rect: IntRect) -> TesseraResult<bool> {
        Ok(self
            .state(id, "touches_tainted")?
            .touches_tainted(rect.normalized()))
    }

    /// Marks `rect` as possibly non-transparent.
    pub fn taint_area(&mut self, id: BitmapId, rect: IntRect) -> TesseraResult<()> {
        if let Some(m) = self.mirror(id) {
            self.taint_area(m.id, m.rect(rect))?;
        }
        self.state_mut(id, "taint_area")?.tainted.add(rect);
        Ok(())
    }

    /// Reads one pixel; out-of-range coordinates read as transparent.
    ///
    /// With a hires mirror the matching block of the mirror is averaged: colour over opaque
    /// pixels only, alpha over all of them.
    pub fn get_pixel(&mut self, id: BitmapId, x: i32, y: i32) -> TesseraResult<Color> {
        const OP: &str = "get_pixel";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id)
            && let Some(color) = self.average_hires_block(m, x, y)?
        {
            return Ok(color);
        }

        let st = self.state_mut(id, OP)?;
        if x < 0 || y < 0 || x >= st.width as i32 || y >= st.height as i32 {
            return Ok(Color::transparent());
        }
        let Storage::Single(surface) = &st.storage else {
            return Err(TesseraError::unsupported(OP, st.mode()));
        };
        let px = st.cache.pixel(surface.view(), x as u32, y as u32);
        Ok(Color::from_rgba8(px))
    }

    fn average_hires_block(&self, m: Mirror, x: i32, y: i32) -> TesseraResult<Option<Color>> {
        let (bw, bh) = (m.hires.0 / m.lores.0.max(1), m.hires.1 / m.lores.1.max(1));
        if bw == 0 || bh == 0 {
            return Ok(None);
        }
        tracing::warn!(
            hires = ?m.id,
            x,
            y,
            "reading a single pixel of a bitmap with a hires mirror; averaging the hires block"
        );
        let view = self.state(m.id, "get_pixel")?.current_view();
        let (hx, hy) = m.point(x, y);

        let (mut rgb, mut rgb_n) = ([0.0f64; 3], 0u32);
        let (mut alpha, mut alpha_n) = (0.0f64, 0u32);
        for py in hy..hy.saturating_add(bh as i32) {
            for px in hx..hx.saturating_add(bw as i32) {
                if px < 0 || py < 0 {
                    continue;
                }
                let Some(p) = view.pixel(px as u32, py as u32) else {
                    continue;
                };
                if p[3] == 255 {
                    for (acc, c) in rgb.iter_mut().zip(p) {
                        *acc += f64::from(c);
                    }
                    rgb_n += 1;
                }
                alpha += f64::from(p[3]);
                alpha_n += 1;
            }
        }
        let avg = |sum: f64, n: u32| if n == 0 { 0.0 } else { (sum / f64::from(n)) as f32 };
        Ok(Some(Color::new(
            avg(rgb[0], rgb_n),
            avg(rgb[1], rgb_n),
            avg(rgb[2], rgb_n),
            avg(alpha, alpha_n),
        )))
    }

    /// Writes one pixel. The pixel cache is patched, not discarded. With a hires mirror the
    /// whole matching block of the mirror is written.
    pub fn set_pixel(&mut self, id: BitmapId, x: i32, y: i32, color: Color) -> TesseraResult<()> {
        const OP: &str = "set_pixel";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            let (bw, bh) = (m.hires.0 / m.lores.0.max(1), m.hires.1 / m.lores.1.max(1));
            if bw > 0 && bh > 0 {
                tracing::warn!(
                    hires = ?m.id,
                    x,
                    y,
                    "writing a single pixel of a bitmap with a hires mirror; filling the hires block"
                );
                let (hx, hy) = m.point(x, y);
                let block = IntRect::new(hx, hy, bw as i32, bh as i32);
                self.put_block(m.id, block, color)?;
            }
        }
        self.put_block(id, IntRect::new(x, y, 1, 1), color)
    }

    fn put_block(&mut self, id: BitmapId, block: IntRect, color: Color) -> TesseraResult<()> {
        let px = color.to_rgba8();
        let st = self.state_mut(id, "set_pixel")?;
        let Some(clip) = block.intersect(st.rect()) else {
            return Ok(());
        };
        let mode = st.mode();
        let Storage::Single(surface) = &mut st.storage else {
            return Err(TesseraError::unsupported("set_pixel", mode));
        };
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                surface.put_pixel(x as u32, y as u32, px);
                st.cache.patch(x as u32, y as u32, px);
            }
        }
        st.tainted.add(clip);
        self.notify_modified(id);
        Ok(())
    }

    /// Straight RGBA8 copy of the displayed pixels (`width * height * 4` bytes).
    pub fn get_raw(&self, id: BitmapId) -> TesseraResult<Vec<u8>> {
        let st = self.state(id, "get_raw")?;
        if st.hires.is_some() {
            tracing::warn!(
                ?id,
                "reading raw pixels of a bitmap with a hires mirror; using lores pixels"
            );
        }
        Ok(st.current_view().pixels.to_vec())
    }

    /// Replaces the displayed pixels. The buffer must be exactly `width * height * 4` bytes;
    /// a hires mirror is refreshed by nearest-neighbour upscaling.
    pub fn replace_raw(&mut self, id: BitmapId, pixels: &[u8]) -> TesseraResult<()> {
        const OP: &str = "replace_raw";
        let st = self.state(id, OP)?;
        st.ensure_not_mega(OP)?;
        let (w, h) = (st.width, st.height);
        let need = byte_len(w, h);
        if pixels.len() != need {
            return Err(TesseraError::format(format!(
                "replacement data is {} bytes, need {need} for {w}x{h}",
                pixels.len()
            )));
        }

        if let Some(m) = self.mirror(id) {
            tracing::warn!(?id, "replacing raw pixels of a bitmap with a hires mirror; upscaling");
            let view = PixelView::new(w, h, pixels);
            let whole = IntRect::sized(w as i32, h as i32);
            let up = resample(&view, whole, m.hires.0, m.hires.1, Filter::Nearest);
            self.upload_current(m.id, &up.pixels)?;
        }
        self.upload_current(id, pixels)
    }

    fn upload_current(&mut self, id: BitmapId, pixels: &[u8]) -> TesseraResult<()> {
        let st = self.state_mut(id, "replace_raw")?;
        let mode = st.mode();
        let rect = st.rect();
        st.current_surface_mut()
            .ok_or(TesseraError::unsupported("replace_raw", mode))?
            .upload(pixels);
        st.tainted.add(rect);
        st.cache.invalidate();
        self.notify_modified(id);
        Ok(())
    }

    /// Encodes the displayed pixels; the format follows the extension (PNG, JPEG, else BMP).
    #[tracing::instrument(skip(self))]
    pub fn save_to_file(&self, id: BitmapId, path: &Path) -> TesseraResult<()> {
        let st = self.state(id, "save_to_file")?;
        if st.hires.is_some() {
            tracing::warn!(?id, "saving a bitmap with a hires mirror; using lores pixels");
        }
        let view = st.current_view();
        encode_image(path, view.width, view.height, view.pixels)
    }
}

fn fill_gradient(surface: &mut Surface, rect: IntRect, from: Color, to: Color, vertical: bool) {
    let rect = rect.normalized();
    let bounds = IntRect::sized(surface.width() as i32, surface.height() as i32);
    let Some(clip) = rect.intersect(bounds) else {
        return;
    };
    let span = (if vertical { rect.h } else { rect.w }) as f32;
    let lerp = |t: f32| {
        Color::new(
            from.red + (to.red - from.red) * t,
            from.green + (to.green - from.green) * t,
            from.blue + (to.blue - from.blue) * t,
            from.alpha + (to.alpha - from.alpha) * t,
        )
        .to_rgba8()
    };

    let stride = surface.width() as usize * 4;
    let rows = &mut surface.pixels_mut()[clip.y as usize * stride..clip.bottom() as usize * stride];
    rows.par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(i, row)| {
            let y = clip.y + i as i32;
            for x in clip.x..clip.right() {
                let along = if vertical {
                    i64::from(y) - i64::from(rect.y)
                } else {
                    i64::from(x) - i64::from(rect.x)
                };
                let t = (along as f32 + 0.5) / span;
                let o = x as usize * 4;
                row[o..o + 4].copy_from_slice(&lerp(t));
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/paint.rs"]
mod tests;
