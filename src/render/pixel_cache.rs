use crate::foundation::core::Rgba8;
use crate::render::surface::PixelView;

/// Lazily populated host copy of a surface, for cheap repeated pixel reads.
#[derive(Debug, Default)]
pub(crate) struct PixelCache {
    width: u32,
    pixels: Option<Vec<u8>>,
}

impl PixelCache {
    #[cfg(test)]
    pub(crate) fn is_populated(&self) -> bool {
        self.pixels.is_some()
    }

    /// Drops the copy; the next read re-downloads the surface.
    pub(crate) fn invalidate(&mut self) {
        self.pixels = None;
    }

    pub(crate) fn get_or_fill(&mut self, surface: PixelView<'_>) -> &[u8] {
        if self.pixels.is_none() {
            tracing::trace!(
                width = surface.width,
                height = surface.height,
                "populating pixel cache"
            );
            self.width = surface.width;
        }
        self.pixels
            .get_or_insert_with(|| surface.to_buffer().pixels)
            .as_slice()
    }

    pub(crate) fn pixel(&mut self, surface: PixelView<'_>, x: u32, y: u32) -> Rgba8 {
        let width = surface.width;
        let pixels = self.get_or_fill(surface);
        let i = (y as usize * width as usize + x as usize) * 4;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    /// Mirrors a single-pixel write into the copy, if one exists.
    pub(crate) fn patch(&mut self, x: u32, y: u32, px: Rgba8) {
        let width = self.width;
        if let Some(pixels) = self.pixels.as_mut() {
            let i = (y as usize * width as usize + x as usize) * 4;
            if let Some(dst) = pixels.get_mut(i..i + 4) {
                dst.copy_from_slice(&px);
            }
        }
    }

    pub(crate) fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pixel_cache.rs"]
mod tests;
