use crate::bitmap::{BitmapId, Storage};
use crate::context::GraphicsContext;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::blur::box_blur_rgba8;
use crate::render::hue::{rotate_hue_rgba8, wrap_hue};
use crate::render::radial_blur::{RadialBlurParams, radial_blur_rgba8};
use crate::render::surface::PixelView;

/// Whether an effect can move colour into transparent pixels.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Spread {
    None,
    Whole,
}

impl GraphicsContext {
    /// Rotates the hue of every pixel by `hue` degrees. Multiples of 360 do nothing.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn hue_change(&mut self, id: BitmapId, hue: i32) -> TesseraResult<()> {
        const OP: &str = "hue_change";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.hue_change(m.id, hue)?;
        }
        if hue % 360 == 0 {
            return Ok(());
        }

        let turns = wrap_hue(hue) as f32 / 360.0;
        self.replace_surface(id, OP, Spread::None, |src, dst| {
            dst.copy_from_slice(src.pixels);
            rotate_hue_rgba8(dst, turns);
            Ok(())
        })
    }

    /// 3-tap box blur, horizontal then vertical.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn blur(&mut self, id: BitmapId) -> TesseraResult<()> {
        const OP: &str = "blur";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.blur(m.id)?;
        }

        let (w, h) = {
            let st = self.state(id, OP)?;
            (st.width, st.height)
        };
        let mut aux = self.pool.request(w, h)?;
        let out = self.replace_surface(id, OP, Spread::Whole, |src, dst| {
            box_blur_rgba8(src.pixels, aux.pixels_mut(), dst, w, h, 1)
        });
        self.pool.release(aux);
        out
    }

    /// Averages `divisions` copies of the image rotated about its centre across `angle`
    /// degrees. Both arguments are clamped (`0..=359`, `2..=100`).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn radial_blur(&mut self, id: BitmapId, angle: i32, divisions: i32) -> TesseraResult<()> {
        const OP: &str = "radial_blur";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            self.radial_blur(m.id, angle, divisions)?;
        }

        let params = RadialBlurParams::new(angle, divisions);
        self.replace_surface(id, OP, Spread::Whole, |src, dst| {
            let blurred = radial_blur_rgba8(&src, params);
            dst.copy_from_slice(&blurred.pixels);
            Ok(())
        })
    }

    /// Renders `f(old, new)` into a fresh pooled surface, swaps it in and releases the old one.
    fn replace_surface(
        &mut self,
        id: BitmapId,
        op: &'static str,
        spread: Spread,
        f: impl FnOnce(PixelView<'_>, &mut [u8]) -> TesseraResult<()>,
    ) -> TesseraResult<()> {
        let (w, h) = {
            let st = self.state(id, op)?;
            (st.width, st.height)
        };
        let mut fresh = self.pool.request(w, h)?;

        let st = self.state_mut(id, op)?;
        let mode = st.mode();
        let result = match &mut st.storage {
            Storage::Single(current) => f(current.view(), fresh.pixels_mut()).map(|()| {
                std::mem::swap(current, &mut fresh);
            }),
            _ => Err(TesseraError::unsupported(op, mode)),
        };
        if result.is_ok() {
            if spread == Spread::Whole && !st.tainted.is_empty() {
                let rect = st.rect();
                st.tainted.add(rect);
            }
            st.cache.invalidate();
        }
        // Either the replaced surface or the unused fresh one.
        self.pool.release(fresh);
        result?;
        self.notify_modified(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/effects.rs"]
mod tests;
