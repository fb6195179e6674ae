//! Tessera is a bitmap compositing and texture-management engine for 2D game runtimes.
//!
//! Every bitmap lives in a [`GraphicsContext`] and is addressed by a [`BitmapId`]:
//!
//! - Create bitmaps from files, pixels, surfaces or other bitmaps
//! - Draw with scaled, clipped and alpha-composited blits, fills, text and filters
//! - Play animated bitmaps against an injected [`Clock`]
//! - Keep an optional high-resolution mirror in lockstep with each bitmap
#![forbid(unsafe_code)]

mod bitmap;
mod clock;
mod config;
mod context;
mod foundation;
mod observer;

/// Asset sources and image codecs.
pub mod assets;
/// Surfaces, pooling and the blit pipeline.
pub mod render;
/// Font description and text rasterisation.
pub mod text;

pub use crate::bitmap::{BitmapId, FrameSelect, shrink_rects};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::Config;
pub use crate::context::{GraphicsContext, GraphicsContextBuilder, SharedGraphics};
pub use crate::foundation::core::{Color, IntRect, Rgba8};
pub use crate::foundation::error::{StorageCause, StorageMode, TesseraError, TesseraResult};
pub use crate::observer::{BitmapEvent, ObserverHandle};

pub use crate::assets::source::{AssetSource, DirAssetSource, MemoryAssetSource};
pub use crate::render::blit::{DeviceCaps, ScaleClass, classify_scale};
pub use crate::render::filter::SmoothScaling;
pub use crate::render::surface::{PixelBuffer, Surface};
pub use crate::render::texture_pool::{PoolConfig, PoolStats};
pub use crate::text::raster::ParleyRasterizer;
pub use crate::text::{Font, TextAlign, TextRasterizer};
