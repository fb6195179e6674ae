use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::composite::unpremultiply_in_place;
use crate::render::surface::PixelBuffer;
use crate::text::TextRasterizer;
use crate::text::effects::threshold_alpha;
use crate::text::font::Font;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Clone, Debug)]
struct RegisteredFont {
    family: String,
    bytes: Arc<Vec<u8>>,
}

/// Text rasterizer built on `parley` layout and `vello_cpu` glyph filling.
///
/// Only font bytes are stored; layout contexts are created per call.
#[derive(Clone, Debug, Default)]
pub struct ParleyRasterizer {
    fonts: Vec<RegisteredFont>,
}

impl ParleyRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a font file's bytes and returns its family name.
    pub fn register_font(&mut self, bytes: Vec<u8>) -> TesseraResult<String> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| TesseraError::format("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TesseraError::format("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            bytes: Arc::new(bytes),
        });
        Ok(family)
    }

    pub fn register_font_file(&mut self, path: impl AsRef<Path>) -> TesseraResult<String> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.register_font(bytes)
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    fn font_for(&self, font: &Font) -> TesseraResult<&RegisteredFont> {
        font.names
            .iter()
            .find_map(|name| {
                self.fonts
                    .iter()
                    .find(|f| f.family.eq_ignore_ascii_case(name))
            })
            .or_else(|| self.fonts.first())
            .ok_or_else(|| TesseraError::precondition("no fonts registered with the rasterizer"))
    }

    fn layout(
        &self,
        font: &Font,
        text: &str,
        brush: TextBrushRgba8,
    ) -> TesseraResult<(parley::Layout<TextBrushRgba8>, Arc<Vec<u8>>)> {
        if font.size == 0 {
            return Err(TesseraError::precondition("font size must be > 0"));
        }
        let face = self.font_for(font)?;

        let mut font_ctx = parley::FontContext::default();
        let mut layout_ctx = parley::LayoutContext::<TextBrushRgba8>::new();
        font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);

        let mut builder = layout_ctx.ranged_builder(&mut font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if font.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        if font.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, Arc::clone(&face.bytes)))
    }
}

fn extent(layout: &parley::Layout<TextBrushRgba8>) -> (u32, u32) {
    let w = layout.width().ceil().max(1.0) as u32;
    let h = layout.height().ceil().max(1.0) as u32;
    (w, h)
}

impl TextRasterizer for ParleyRasterizer {
    #[tracing::instrument(skip(self, font), fields(size = font.size))]
    fn rasterize(
        &mut self,
        font: &Font,
        text: &str,
        color: Rgba8,
        solid: bool,
    ) -> TesseraResult<PixelBuffer> {
        let brush = TextBrushRgba8 {
            r: color[0],
            g: color[1],
            b: color[2],
            a: color[3],
        };
        let (layout, bytes) = self.layout(font, text, brush)?;
        let (w, h) = extent(&layout);
        let (w16, h16): (u16, u16) = match (w.try_into(), h.try_into()) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(TesseraError::precondition(format!(
                    "text surface {w}x{h} is too large"
                )));
            }
        };

        let vfont = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&vfont)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let mut pixels = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_in_place(&mut pixels);
        let mut out = PixelBuffer::from_pixels(w, h, pixels)
            .ok_or_else(|| TesseraError::format("glyph pixmap size mismatch"))?;
        if solid {
            threshold_alpha(&mut out);
        }
        Ok(out)
    }

    fn measure(&mut self, font: &Font, text: &str) -> TesseraResult<(u32, u32)> {
        let (layout, _) = self.layout(font, text, TextBrushRgba8::default())?;
        Ok(extent(&layout))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/raster.rs"]
mod tests;
