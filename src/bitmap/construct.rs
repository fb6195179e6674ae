use crate::assets::decode::decode_image;
use crate::bitmap::{BitmapId, BitmapState, FrameSelect, Storage};
use crate::context::GraphicsContext;
use crate::foundation::error::{StorageCause, TesseraError, TesseraResult};
use crate::foundation::math::scale_extent;
use crate::render::surface::{PixelBuffer, Surface, byte_len};

impl GraphicsContext {
    /// Blank transparent bitmap. With hires enabled a scaled mirror is created alongside.
    pub fn create_bitmap(&mut self, width: i32, height: i32) -> TesseraResult<BitmapId> {
        if width <= 0 || height <= 0 {
            return Err(TesseraError::precondition(format!(
                "failed to create bitmap: invalid size {width}x{height}"
            )));
        }
        let (w, h) = (width as u32, height as u32);

        let hires = match self.config.hires_factor() {
            Some(factor) => {
                let (hw, hh) = (scale_extent(w, factor), scale_extent(h, factor));
                let s = self.request_surface(hw, hh)?;
                Some(self.insert(BitmapState::new(Storage::Single(s), hw, hh)))
            }
            None => None,
        };

        let surface = match self.request_surface(w, h) {
            Ok(s) => s,
            Err(e) => {
                if let Some(h) = hires {
                    self.destroy_quietly(h);
                }
                return Err(e);
            }
        };
        let id = self.insert(BitmapState::new(Storage::Single(surface), w, h));
        if let Some(h) = hires {
            self.link_mirror(id, h)?;
        }
        Ok(id)
    }

    /// Loads an image file through the asset source; GIFs with several frames become animated.
    ///
    /// With hires enabled, `<hires_prefix><path>` is loaded as the mirror when it exists.
    #[tracing::instrument(skip(self))]
    pub fn load_bitmap(&mut self, path: &str) -> TesseraResult<BitmapId> {
        let hires = if self.config.enable_hires && !path.starts_with(&self.config.hires_prefix) {
            let hires_path = format!("{}{}", self.config.hires_prefix, path);
            match self.load_image(&hires_path) {
                Ok(h) => Some(h),
                Err(e) => {
                    tracing::debug!(path = %hires_path, error = %e, "no hires companion");
                    None
                }
            }
        } else {
            None
        };

        let id = match self.load_image(path) {
            Ok(id) => id,
            Err(e) => {
                if let Some(h) = hires {
                    self.destroy_quietly(h);
                }
                return Err(e);
            }
        };
        if let Some(h) = hires {
            self.link_mirror(id, h)?;
        }
        Ok(id)
    }

    fn load_image(&mut self, path: &str) -> TesseraResult<BitmapId> {
        let asset = self.assets.open_read(path)?;
        let decoded = decode_image(&asset.bytes, asset.extension.as_deref())?;
        let (w, h) = (decoded.width, decoded.height);
        if w == 0 || h == 0 {
            return Err(TesseraError::format(format!("image '{path}' is empty")));
        }

        if !decoded.is_animated() {
            let pixels = decoded.frames.into_iter().next().unwrap_or_default();
            let mut state = self.state_from_pixels(w, h, pixels)?;
            state.tainted.add(state.rect());
            return Ok(self.insert(state));
        }

        let max = self.max_size();
        if w > max || h > max {
            return Err(TesseraError::storage(w, h, StorageCause::ExceedsMaxDimension));
        }
        let fps = decoded.fps_hint().unwrap_or(self.config.frame_rate);
        let mut frames: Vec<Surface> = Vec::with_capacity(decoded.frames.len());
        for pixels in &decoded.frames {
            match self.pool.request(w, h) {
                Ok(mut s) => {
                    s.upload(pixels);
                    frames.push(s);
                }
                Err(e) => {
                    for f in frames {
                        self.pool.release(f);
                    }
                    return Err(e);
                }
            }
        }
        tracing::debug!(path, frames = frames.len(), fps, "loaded animation");

        let mut state = BitmapState::new(Storage::Animated(frames), w, h);
        state.timer.fps = fps;
        state.tainted.add(state.rect());
        Ok(self.insert(state))
    }

    /// Single surface holding `pixels`, or a mega-surface when too large for the device.
    fn state_from_pixels(&mut self, w: u32, h: u32, pixels: Vec<u8>) -> TesseraResult<BitmapState> {
        match self.pool.request(w, h) {
            Ok(mut s) => {
                s.upload(&pixels);
                Ok(BitmapState::new(Storage::Single(s), w, h))
            }
            Err(e) if e.is_oversized() => {
                tracing::debug!(w, h, "image exceeds max texture size, keeping it as mega-surface");
                let buf = PixelBuffer::from_pixels(w, h, pixels)
                    .ok_or_else(|| TesseraError::format("pixel buffer size mismatch"))?;
                Ok(BitmapState::new(Storage::Mega(buf), w, h))
            }
            Err(e) => Err(e),
        }
    }

    /// Wraps straight RGBA8 pixels (`width * height * 4` bytes).
    pub fn bitmap_from_pixels(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> TesseraResult<BitmapId> {
        if width == 0 || height == 0 {
            return Err(TesseraError::precondition(format!(
                "failed to create bitmap: invalid size {width}x{height}"
            )));
        }
        if pixels.len() != byte_len(width, height) {
            return Err(TesseraError::format(format!(
                "expected {} bytes for {width}x{height}, got {}",
                byte_len(width, height),
                pixels.len()
            )));
        }
        let mut state = self.state_from_pixels(width, height, pixels)?;
        state.tainted.add(state.rect());
        Ok(self.insert(state))
    }

    /// Takes ownership of an existing surface, with an optional pre-made hires surface.
    pub fn bitmap_from_surface(
        &mut self,
        surface: Surface,
        hires: Option<Surface>,
    ) -> TesseraResult<BitmapId> {
        let (w, h) = (surface.width(), surface.height());
        let mut state = BitmapState::new(Storage::Single(surface), w, h);
        state.tainted.add(state.rect());
        let id = self.insert(state);
        if let Some(hs) = hires {
            let (hw, hh) = (hs.width(), hs.height());
            let mut hstate = BitmapState::new(Storage::Single(hs), hw, hh);
            hstate.tainted.add(hstate.rect());
            let hid = self.insert(hstate);
            self.link_mirror(id, hid)?;
        }
        Ok(id)
    }

    /// Copies `source`; the copy has its own surfaces and a fully tainted region.
    pub fn copy_bitmap(&mut self, source: BitmapId, frames: FrameSelect) -> TesseraResult<BitmapId> {
        let (copies, timer, hires_src, w, h, font) = {
            let src = self.state(source, "copy_bitmap")?;
            src.ensure_not_mega("copy_bitmap")?;
            if frames != FrameSelect::All {
                src.ensure_animated("copy_bitmap")?;
            }
            let chosen: Vec<Vec<u8>> = match (&src.storage, frames) {
                (Storage::Animated(all), FrameSelect::All) => {
                    all.iter().map(|f| f.pixels().to_vec()).collect()
                }
                (Storage::Animated(all), FrameSelect::Index(i)) => {
                    let i = i.min(all.len().saturating_sub(1));
                    all.get(i).map(|f| f.pixels().to_vec()).into_iter().collect()
                }
                _ => vec![src.current_view().pixels.to_vec()],
            };
            (chosen, src.timer, src.hires, src.width, src.height, src.font.clone())
        };

        let hires = match hires_src {
            Some(hsrc) if copies.len() == 1 => Some(self.copy_bitmap(hsrc, FrameSelect::All)?),
            _ => None,
        };

        let mut surfaces = Vec::with_capacity(copies.len());
        for pixels in &copies {
            match self.pool.request(w, h) {
                Ok(mut s) => {
                    s.upload(pixels);
                    surfaces.push(s);
                }
                Err(e) => {
                    for s in surfaces {
                        self.pool.release(s);
                    }
                    if let Some(hid) = hires {
                        self.destroy_quietly(hid);
                    }
                    return Err(e);
                }
            }
        }

        let storage = if surfaces.len() > 1 {
            Storage::Animated(surfaces)
        } else {
            match surfaces.pop() {
                Some(s) => Storage::Single(s),
                None => return Err(TesseraError::precondition("copy_bitmap: no frames to copy")),
            }
        };
        let animated = matches!(storage, Storage::Animated(_));
        let mut state = BitmapState::new(storage, w, h);
        if animated {
            state.timer.fps = timer.fps;
            state.timer.looping = timer.looping;
        }
        state.font = font;
        state.tainted.add(state.rect());
        let id = self.insert(state);

        if let Some(hid) = hires {
            self.link_mirror(id, hid)?;
        }
        Ok(id)
    }

    /// Snapshot of every frame's pixels (one entry for still bitmaps).
    pub fn frames(&self, id: BitmapId) -> TesseraResult<Vec<Vec<u8>>> {
        let st = self.state(id, "frames")?;
        Ok(match &st.storage {
            Storage::Animated(frames) => frames.iter().map(|f| f.pixels().to_vec()).collect(),
            _ => vec![st.current_view().pixels.to_vec()],
        })
    }

    /// Releases the bitmap's storage. Idempotent.
    ///
    /// The hires mirror is disposed along with it, unless an external owner manages the mirror
    /// (see [`assume_external_owner`](Self::assume_external_owner)); it is then only detached.
    /// Disposing a mirror also disposes the bitmap it mirrors.
    pub fn dispose(&mut self, id: BitmapId) -> TesseraResult<()> {
        let Some(state) = self.retire_state(id)? else {
            return Ok(());
        };
        let state = *state;
        let (hires, lores, external) = (state.hires, state.lores, state.external_owner);
        state.release_storage(&mut self.pool);
        self.observers.retire(id);
        tracing::trace!(?id, "bitmap disposed");

        if let Some(h) = hires {
            if external {
                if let Ok(mirror) = self.state_mut(h, "dispose") {
                    mirror.lores = None;
                }
                tracing::trace!(?id, hires = ?h, "hires mirror left to its external owner");
            } else {
                self.dispose(h)?;
                self.free_slot(h);
            }
        }
        if let Some(l) = lores {
            self.dispose(l)?;
        }
        Ok(())
    }

    /// Disposes the bitmap and frees its slot; the handle becomes stale.
    pub fn destroy(&mut self, id: BitmapId) -> TesseraResult<()> {
        self.dispose(id)?;
        self.free_slot(id);
        Ok(())
    }

    /// Hands the hires mirror's lifetime to an external owner: disposing this bitmap then
    /// detaches the mirror instead of disposing it.
    pub fn assume_external_owner(&mut self, id: BitmapId) -> TesseraResult<()> {
        self.state_mut(id, "assume_external_owner")?.external_owner = true;
        Ok(())
    }

    pub fn width(&self, id: BitmapId) -> TesseraResult<u32> {
        Ok(self.state(id, "width")?.width)
    }

    pub fn height(&self, id: BitmapId) -> TesseraResult<u32> {
        Ok(self.state(id, "height")?.height)
    }

    pub fn rect(&self, id: BitmapId) -> TesseraResult<crate::foundation::core::IntRect> {
        Ok(self.state(id, "rect")?.rect())
    }

    pub fn storage_mode(&self, id: BitmapId) -> TesseraResult<crate::foundation::error::StorageMode> {
        Ok(self.state(id, "storage_mode")?.mode())
    }

    fn destroy_quietly(&mut self, id: BitmapId) {
        if let Err(e) = self.destroy(id) {
            tracing::warn!(?id, error = %e, "failed to clean up bitmap");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/construct.rs"]
mod tests;
