use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::filter::SmoothScaling;
use crate::render::texture_pool::PoolConfig;

/// Engine configuration, read once when a [`GraphicsContext`](crate::GraphicsContext) is built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Largest width or height a device surface may have.
    pub max_texture_size: u32,
    /// Create a high-resolution mirror for loaded and blank bitmaps.
    pub enable_hires: bool,
    /// Hires size = lores size times this factor (blank bitmaps).
    pub texture_scaling_factor: f32,
    /// Path prefix under which hires companions of image files are looked up.
    pub hires_prefix: String,
    /// Filter used when a blit enlarges its source.
    pub smooth_scaling: SmoothScaling,
    /// Filter used when a blit shrinks its source.
    pub smooth_scaling_down: SmoothScaling,
    /// Sharpness of the bicubic filter, 0..=100 maps to B-spline..Catmull-Rom-ish.
    pub bicubic_sharpness: i32,
    /// Always crop mega-surface sources through an intermediary surface.
    pub sub_image_fix: bool,
    /// Fallback animation rate in frames per second.
    pub frame_rate: f32,
    /// Threshold glyph coverage instead of anti-aliasing text.
    pub solid_fonts: bool,
    pub pool: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_texture_size: 16384,
            enable_hires: false,
            texture_scaling_factor: 1.0,
            hires_prefix: "Hires/".to_string(),
            smooth_scaling: SmoothScaling::Nearest,
            smooth_scaling_down: SmoothScaling::Nearest,
            bicubic_sharpness: 100,
            sub_image_fix: false,
            frame_rate: 60.0,
            solid_fonts: false,
            pool: PoolConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> TesseraResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| TesseraError::precondition(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> TesseraResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> TesseraResult<()> {
        if self.max_texture_size == 0 {
            return Err(TesseraError::precondition("max_texture_size must be > 0"));
        }
        if !self.texture_scaling_factor.is_finite() || self.texture_scaling_factor <= 0.0 {
            return Err(TesseraError::precondition(
                "texture_scaling_factor must be finite and > 0",
            ));
        }
        if !self.frame_rate.is_finite() || self.frame_rate < 0.0 {
            return Err(TesseraError::precondition(
                "frame_rate must be finite and >= 0",
            ));
        }
        if self.enable_hires && self.hires_prefix.is_empty() {
            return Err(TesseraError::precondition(
                "hires_prefix must be non-empty when enable_hires is set",
            ));
        }
        Ok(())
    }

    /// Scale factor of hires mirrors, if mirrors are enabled.
    pub fn hires_factor(&self) -> Option<f32> {
        self.enable_hires.then_some(self.texture_scaling_factor)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
