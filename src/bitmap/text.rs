use crate::bitmap::BitmapId;
use crate::bitmap::blit::BlitInput;
use crate::context::GraphicsContext;
use crate::foundation::core::IntRect;
use crate::foundation::error::TesseraResult;
use crate::foundation::math::scale_round;
use crate::text::effects::{apply_outline, apply_shadow, fixup_text};
use crate::text::{Font, TextAlign};

/// Outline width in lores pixels.
const OUTLINE_SIZE: u32 = 1;

impl GraphicsContext {
    pub fn font(&self, id: BitmapId) -> TesseraResult<Font> {
        Ok(self.state(id, "font")?.font.clone())
    }

    pub fn set_font(&mut self, id: BitmapId, font: Font) -> TesseraResult<()> {
        self.state_mut(id, "set_font")?.font = font;
        Ok(())
    }

    /// Size `text` would take with the bitmap's font, before shadow and outline.
    pub fn text_size(&mut self, id: BitmapId, text: &str) -> TesseraResult<IntRect> {
        const OP: &str = "text_size";
        let st = self.state(id, OP)?;
        st.ensure_single(OP)?;
        let font = st.font.clone();
        let text = text.replace(['\r', '\n'], " ");
        let (w, h) = self.text.measure(&font, &text)?;
        Ok(IntRect::new(0, 0, w as i32, h as i32))
    }

    /// Draws one line of text into `rect`: aligned horizontally, centred vertically, and
    /// squeezed horizontally when wider than the rectangle.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn draw_text(
        &mut self,
        id: BitmapId,
        rect: IntRect,
        text: &str,
        align: TextAlign,
    ) -> TesseraResult<()> {
        const OP: &str = "draw_text";
        self.state(id, OP)?.ensure_single(OP)?;
        if let Some(m) = self.mirror(id) {
            let font = self.state(id, OP)?.font.scaled(m.hires.0, m.lores.0);
            self.state_mut(m.id, OP)?.font = font;
            self.draw_text(m.id, m.rect(rect), text, align)?;
        }

        let Some(text) = fixup_text(text) else {
            return Ok(());
        };
        if rect.w <= 0 || rect.h <= 0 {
            return Ok(());
        }

        let (font, outline_size, bounds) = {
            let st = self.state(id, OP)?;
            let outline = match st.lores.map(|l| self.state(l, OP).map(|s| s.width)) {
                Some(Ok(lores_w)) => {
                    scale_round(OUTLINE_SIZE as i32, st.width, lores_w).max(1) as u32
                }
                _ => OUTLINE_SIZE,
            };
            (st.font.clone(), outline, (st.width as i32, st.height as i32))
        };
        let opacity = font.color.to_rgba8()[3];
        let mut color = font.color.to_rgba8();
        color[3] = 255;

        let solid = self.config.solid_fonts;
        let mut glyphs = self.text.rasterize(&font, &text, color, solid)?;
        let raw_height = glyphs.height as i32;
        if font.shadow {
            glyphs = apply_shadow(&glyphs, color);
        }
        if font.outline {
            glyphs = apply_outline(&glyphs, font.out_color, outline_size);
        }
        let (tw, th) = (glyphs.width as i32, glyphs.height as i32);
        if tw == 0 || th == 0 || opacity == 0 {
            return Ok(());
        }

        let offset = match align {
            TextAlign::Left => 0,
            TextAlign::Center => (rect.w - tw) / 2,
            TextAlign::Right => rect.w - tw,
        };
        let x = rect.x.saturating_add(offset).max(rect.x);
        let y = rect.y.saturating_add((rect.h - raw_height) / 2);

        let squeeze = (rect.w as f32 / tw as f32).min(1.0);
        let w = rect.w.min((tw as f32 * squeeze) as i32).min(bounds.0.saturating_sub(x));
        let h = rect.h.min(th).min(bounds.1.saturating_sub(y));
        let dst = IntRect::new(x, y, w, h);
        let src = IntRect::new(0, 0, (w as f32 / squeeze) as i32, h);
        let smooth = squeeze != 1.0;

        let drawn = self.with_state(id, OP, |ctx, st| {
            ctx.blit_into(st, BlitInput::uploaded(&glyphs), src, dst, opacity, smooth)
        })?;
        if drawn {
            self.notify_modified(id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/text.rs"]
mod tests;
