use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{TesseraError, TesseraResult};

const JPEG_QUALITY: u8 = 90;

/// Output format chosen from a file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    /// `png` and `jpg`/`jpeg` by extension (case-insensitive); anything else is BMP.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Bmp,
        }
    }
}

/// Writes straight RGBA8 pixels to `path`.
pub fn encode_image(path: &Path, width: u32, height: u32, pixels: &[u8]) -> TesseraResult<()> {
    let rgba = image::RgbaImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        TesseraError::format(format!(
            "encode: {} bytes do not match {width}x{height}",
            pixels.len()
        ))
    })?;

    match SaveFormat::from_path(path) {
        SaveFormat::Png => rgba
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?,
        SaveFormat::Bmp => rgba
            .save_with_format(path, image::ImageFormat::Bmp)
            .with_context(|| format!("write bmp '{}'", path.display()))?,
        SaveFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let file = std::fs::File::create(path)
                .with_context(|| format!("create '{}'", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .with_context(|| format!("write jpeg '{}'", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
