pub mod effects;
pub mod font;
pub mod raster;

use crate::foundation::core::Rgba8;
use crate::foundation::error::TesseraResult;
use crate::render::surface::PixelBuffer;

pub use font::{Font, TextAlign};

/// Turns a string into pixels. Implementations must be deterministic for a given font.
pub trait TextRasterizer: Send {
    /// Renders `text` in `color` (straight RGBA8). The result is tightly sized to the layout.
    fn rasterize(
        &mut self,
        font: &Font,
        text: &str,
        color: Rgba8,
        solid: bool,
    ) -> TesseraResult<PixelBuffer>;

    /// Size of the rendered text without effects.
    fn measure(&mut self, font: &Font, text: &str) -> TesseraResult<(u32, u32)>;
}
