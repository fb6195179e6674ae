//! Bitmap façade: storage, tainted region, pixel cache, animation and hires mirror.
//!
//! Bitmaps live in the [`GraphicsContext`](crate::GraphicsContext) arena and are addressed by
//! [`BitmapId`]; every operation is a method on the context.

pub(crate) mod animation;
mod blit;
mod construct;
mod effects;
mod mirror;
mod paint;
mod text;

pub use blit::shrink_rects;

use crate::bitmap::animation::AnimationTimer;
use crate::foundation::core::IntRect;
use crate::foundation::error::{StorageMode, TesseraError, TesseraResult};
use crate::render::pixel_cache::PixelCache;
use crate::render::region::TaintedRegion;
use crate::render::surface::{PixelBuffer, PixelView, Surface};
use crate::render::texture_pool::TexturePool;
use crate::text::Font;

/// Handle to a bitmap. Stale after the bitmap's slot is freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitmapId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Which frames the copy constructor takes from an animated source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameSelect {
    /// Every frame (a still source copies its only surface).
    #[default]
    All,
    /// The frame currently displayed.
    Current,
    /// One frame by index, clamped to the frame list.
    Index(usize),
}

pub(crate) enum Storage {
    Single(Surface),
    Mega(PixelBuffer),
    Animated(Vec<Surface>),
}

pub(crate) struct BitmapState {
    pub(crate) storage: Storage,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) tainted: TaintedRegion,
    pub(crate) cache: PixelCache,
    pub(crate) font: Font,
    pub(crate) timer: AnimationTimer,
    /// High-resolution mirror receiving every mutation.
    pub(crate) hires: Option<BitmapId>,
    /// Set on a mirror: the bitmap it mirrors.
    pub(crate) lores: Option<BitmapId>,
    /// The hires mirror is owned elsewhere; disposal detaches it instead.
    pub(crate) external_owner: bool,
}

impl BitmapState {
    pub(crate) fn new(storage: Storage, width: u32, height: u32) -> Self {
        Self {
            storage,
            width,
            height,
            tainted: TaintedRegion::new(),
            cache: PixelCache::default(),
            font: Font::default(),
            timer: AnimationTimer::default(),
            hires: None,
            lores: None,
            external_owner: false,
        }
    }

    pub(crate) fn mode(&self) -> StorageMode {
        match self.storage {
            Storage::Single(_) => StorageMode::Single,
            Storage::Mega(_) => StorageMode::Mega,
            Storage::Animated(_) => StorageMode::Animated,
        }
    }

    pub(crate) fn rect(&self) -> IntRect {
        IntRect::sized(self.width as i32, self.height as i32)
    }

    pub(crate) fn ensure_not_mega(&self, op: &'static str) -> TesseraResult<()> {
        match self.storage {
            Storage::Mega(_) => Err(TesseraError::unsupported(op, StorageMode::Mega)),
            _ => Ok(()),
        }
    }

    pub(crate) fn ensure_single(&self, op: &'static str) -> TesseraResult<()> {
        match self.storage {
            Storage::Single(_) => Ok(()),
            _ => Err(TesseraError::unsupported(op, self.mode())),
        }
    }

    pub(crate) fn ensure_animated(&self, op: &'static str) -> TesseraResult<()> {
        match self.storage {
            Storage::Animated(_) => Ok(()),
            _ => Err(TesseraError::unsupported(op, self.mode())),
        }
    }

    pub(crate) fn frame_count(&self) -> usize {
        match &self.storage {
            Storage::Animated(frames) => frames.len(),
            _ => 1,
        }
    }

    pub(crate) fn current_index(&self) -> usize {
        match &self.storage {
            Storage::Animated(frames) => self.timer.current_index(frames.len()),
            _ => 0,
        }
    }

    /// Surface currently displayed; `None` for mega-surfaces.
    pub(crate) fn current_surface(&self) -> Option<&Surface> {
        match &self.storage {
            Storage::Single(s) => Some(s),
            Storage::Animated(frames) => frames.get(self.current_index()),
            Storage::Mega(_) => None,
        }
    }

    pub(crate) fn current_surface_mut(&mut self) -> Option<&mut Surface> {
        let i = self.current_index();
        match &mut self.storage {
            Storage::Single(s) => Some(s),
            Storage::Animated(frames) => frames.get_mut(i),
            Storage::Mega(_) => None,
        }
    }

    /// Pixels currently displayed (any storage mode).
    pub(crate) fn current_view(&self) -> PixelView<'_> {
        match &self.storage {
            Storage::Mega(buf) => buf.view(),
            _ => match self.current_surface() {
                Some(s) => s.view(),
                None => PixelView::new(0, 0, &[]),
            },
        }
    }

    /// Whether a region of the current surface may hold non-transparent pixels.
    pub(crate) fn touches_tainted(&self, rect: IntRect) -> bool {
        match self.storage {
            Storage::Animated(_) => true,
            _ => self.tainted.intersects(rect),
        }
    }

    /// Moves a single surface into frame 0 of a fresh animation. No-op for other modes.
    pub(crate) fn make_animated(&mut self, fallback_fps: f32) {
        let storage = std::mem::replace(&mut self.storage, Storage::Animated(Vec::new()));
        self.storage = match storage {
            Storage::Single(first) => {
                let fps = if self.timer.fps > 0.0 {
                    self.timer.fps
                } else {
                    fallback_fps
                };
                self.timer = AnimationTimer {
                    fps,
                    looping: self.timer.looping,
                    ..AnimationTimer::default()
                };
                self.cache.invalidate();
                Storage::Animated(vec![first])
            }
            other => other,
        };
    }

    /// Returns every surface to the pool.
    pub(crate) fn release_storage(self, pool: &mut TexturePool) {
        match self.storage {
            Storage::Single(s) => pool.release(s),
            Storage::Animated(frames) => {
                for f in frames {
                    pool.release(f);
                }
            }
            Storage::Mega(_) => {}
        }
    }
}
