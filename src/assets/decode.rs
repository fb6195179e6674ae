use std::io::Cursor;

use anyhow::Context;
use image::{AnimationDecoder, ImageDecoder};

use crate::foundation::error::{TesseraError, TesseraResult};

/// Decoded image: one frame for stills, several for animated GIFs. Straight RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Vec<u8>>,
    /// Display time of each frame in milliseconds (zero for stills).
    pub delays_ms: Vec<u32>,
}

impl DecodedImage {
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Frame rate implied by the first frame delay, `None` when the delay is zero.
    pub fn fps_hint(&self) -> Option<f32> {
        match self.delays_ms.first() {
            Some(&d) if d > 0 => Some(1000.0 / d as f32),
            _ => None,
        }
    }
}

pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

/// Decodes `bytes`; `extension` is a format hint for files without a recognisable signature.
pub fn decode_image(bytes: &[u8], extension: Option<&str>) -> TesseraResult<DecodedImage> {
    if is_gif(bytes) {
        return decode_gif(bytes);
    }

    let dyn_img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(guess_err) => {
            let Some(format) = extension.and_then(image::ImageFormat::from_extension) else {
                return Err(TesseraError::format(format!("decode image: {guess_err}")));
            };
            image::load_from_memory_with_format(bytes, format)
                .map_err(|e| TesseraError::format(format!("decode {format:?} image: {e}")))?
        }
    };
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        frames: vec![rgba.into_raw()],
        delays_ms: vec![0],
    })
}

fn decode_gif(bytes: &[u8]) -> TesseraResult<DecodedImage> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| TesseraError::format(format!("open gif: {e}")))?;
    let (width, height) = decoder.dimensions();

    let mut frames = Vec::new();
    let mut delays_ms = Vec::new();
    for (i, frame) in decoder.into_frames().enumerate() {
        match frame {
            Ok(frame) => {
                let (num, den) = frame.delay().numer_denom_ms();
                delays_ms.push(if den == 0 { 0 } else { num / den });
                frames.push(frame.into_buffer().into_raw());
            }
            Err(e) if i > 0 => {
                tracing::warn!(decoded = i, error = %e, "gif truncated, keeping decoded frames");
                break;
            }
            Err(e) => return Err(TesseraError::format(format!("decode gif frame: {e}"))),
        }
    }
    if frames.is_empty() {
        return Err(TesseraError::format("gif has no frames"));
    }

    Ok(DecodedImage {
        width,
        height,
        frames,
        delays_ms,
    })
}

/// Reads only the header of an image to get its dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> TesseraResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("guess image format")?;
    reader
        .into_dimensions()
        .map_err(|e| TesseraError::format(format!("read image header: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
