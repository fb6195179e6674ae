use crate::foundation::core::{IntRect, Rgba8};

/// Render-target identity of a device surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub(crate) u64);

/// Device-side RGBA8 colour buffer (straight alpha) that can be sampled and rendered into.
///
/// Surfaces come from the [`TexturePool`](crate::render::texture_pool::TexturePool) and
/// go back to it when their owner releases them.
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub(crate) fn from_parts(id: SurfaceId, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), byte_len(width, height));
        Self {
            id,
            width,
            height,
            pixels,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn view(&self) -> PixelView<'_> {
        PixelView::new(self.width, self.height, &self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.view().pixel(x, y)
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = pixel_offset(self.width, x, y);
        self.pixels[i..i + 4].copy_from_slice(&px);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Overwrites every pixel of `rect` (clipped to the surface) with `px`.
    pub(crate) fn fill_rect(&mut self, rect: IntRect, px: Rgba8) {
        let Some(r) = rect.intersect(IntRect::sized(self.width as i32, self.height as i32)) else {
            return;
        };
        let stride = self.width as usize * 4;
        for y in r.y..r.bottom() {
            let row = &mut self.pixels[y as usize * stride..(y as usize + 1) * stride];
            for x in r.x..r.right() {
                let i = x as usize * 4;
                row[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    /// Replaces the whole surface content; `pixels` must be exactly `width * height * 4` bytes.
    pub(crate) fn upload(&mut self, pixels: &[u8]) {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        self.pixels.copy_from_slice(pixels);
    }

    /// Writes `src` unscaled at `(x, y)`, clipped to the surface.
    pub(crate) fn write_region(&mut self, x: i32, y: i32, src: &PixelView<'_>) {
        let dst = IntRect::new(x, y, src.width as i32, src.height as i32);
        let Some(r) = dst.intersect(IntRect::sized(self.width as i32, self.height as i32)) else {
            return;
        };
        let stride = self.width as usize * 4;
        let src_stride = src.width as usize * 4;
        let len = r.w as usize * 4;
        for row in 0..r.h {
            let sy = (r.y - y + row) as usize;
            let sx = (r.x - x) as usize;
            let s = sy * src_stride + sx * 4;
            let d = (r.y + row) as usize * stride + r.x as usize * 4;
            self.pixels[d..d + len].copy_from_slice(&src.pixels[s..s + len]);
        }
    }
}

/// Host-side RGBA8 image (straight alpha): mega-surface storage, glyph renders, scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == byte_len(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn view(&self) -> PixelView<'_> {
        PixelView::new(self.width, self.height, &self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.view().pixel(x, y)
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = pixel_offset(self.width, x, y);
        self.pixels[i..i + 4].copy_from_slice(&px);
    }

    /// Copies `rect` (clipped to the buffer) into a new buffer.
    pub(crate) fn crop(&self, rect: IntRect) -> Self {
        self.view().crop(rect)
    }
}

/// Borrowed RGBA8 pixels with their dimensions.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

impl<'a> PixelView<'a> {
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        debug_assert!(pixels.len() >= byte_len(width, height));
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = pixel_offset(self.width, x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Pixel at `(x, y)` with coordinates clamped to the edge.
    pub(crate) fn clamped(&self, x: i32, y: i32) -> Rgba8 {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        let i = pixel_offset(self.width, x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Copies `rect` (clipped to the view) into a new buffer.
    pub(crate) fn crop(&self, rect: IntRect) -> PixelBuffer {
        let Some(r) = rect.intersect(IntRect::sized(self.width as i32, self.height as i32)) else {
            return PixelBuffer::new(0, 0);
        };
        let mut out = PixelBuffer::new(r.w as u32, r.h as u32);
        let src_stride = self.width as usize * 4;
        let dst_stride = r.w as usize * 4;
        for row in 0..r.h as usize {
            let s = (r.y as usize + row) * src_stride + r.x as usize * 4;
            out.pixels[row * dst_stride..(row + 1) * dst_stride]
                .copy_from_slice(&self.pixels[s..s + dst_stride]);
        }
        out
    }

    pub(crate) fn to_buffer(self) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels[..byte_len(self.width, self.height)].to_vec(),
        }
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

fn pixel_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
