use crate::bitmap::BitmapId;
use crate::context::GraphicsContext;
use crate::foundation::core::IntRect;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::scale_round;
use crate::render::blit::scale_rect;

/// A bitmap's hires mirror and the ratio between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Mirror {
    pub(crate) id: BitmapId,
    pub(crate) lores: (u32, u32),
    pub(crate) hires: (u32, u32),
}

impl Mirror {
    pub(crate) fn rect(&self, rect: IntRect) -> IntRect {
        scale_rect(rect, self.hires, self.lores)
    }

    pub(crate) fn point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            scale_round(x, self.hires.0, self.lores.0),
            scale_round(y, self.hires.1, self.lores.1),
        )
    }

    /// Integer size of the hires block covering one lores pixel (at least 1).
    pub(crate) fn block(&self) -> (u32, u32) {
        (
            (self.hires.0 / self.lores.0.max(1)).max(1),
            (self.hires.1 / self.lores.1.max(1)).max(1),
        )
    }
}

impl GraphicsContext {
    pub(crate) fn mirror(&self, id: BitmapId) -> Option<Mirror> {
        let st = self.state(id, "mirror").ok()?;
        let hid = st.hires?;
        let hs = self.state(hid, "mirror").ok()?;
        Some(Mirror {
            id: hid,
            lores: (st.width, st.height),
            hires: (hs.width, hs.height),
        })
    }

    pub(crate) fn link_mirror(&mut self, lores: BitmapId, hires: BitmapId) -> TesseraResult<()> {
        self.state_mut(hires, "set_hires")?.lores = Some(lores);
        self.state_mut(lores, "set_hires")?.hires = Some(hires);
        Ok(())
    }

    /// The bitmap's hires mirror, if it has one.
    pub fn hires(&self, id: BitmapId) -> TesseraResult<Option<BitmapId>> {
        Ok(self.state(id, "hires")?.hires)
    }

    /// The bitmap mirrored by `id`, when `id` is a hires mirror.
    pub fn lores(&self, id: BitmapId) -> TesseraResult<Option<BitmapId>> {
        Ok(self.state(id, "lores")?.lores)
    }

    /// Attaches `hires` as the mirror of `id`. A previous mirror is detached, not disposed.
    pub fn set_hires(&mut self, id: BitmapId, hires: BitmapId) -> TesseraResult<()> {
        if id == hires {
            return Err(TesseraError::precondition("a bitmap cannot mirror itself"));
        }
        let h = self.state(hires, "set_hires")?;
        if h.hires.is_some() {
            return Err(TesseraError::precondition(
                "a hires mirror cannot have its own mirror",
            ));
        }
        if h.lores.is_some_and(|l| l != id) {
            return Err(TesseraError::precondition(
                "bitmap already mirrors another bitmap",
            ));
        }
        let st = self.state(id, "set_hires")?;
        if st.lores.is_some() {
            return Err(TesseraError::precondition(
                "a hires mirror cannot have its own mirror",
            ));
        }
        if let Some(old) = st.hires
            && old != hires
            && let Ok(o) = self.state_mut(old, "set_hires")
        {
            o.lores = None;
        }
        self.link_mirror(id, hires)
    }
}
