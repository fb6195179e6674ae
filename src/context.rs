use std::sync::{Arc, Mutex, MutexGuard};

use crate::assets::source::{AssetSource, DirAssetSource};
use crate::bitmap::{BitmapId, BitmapState};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::observer::{BitmapEvent, ObserverHandle, ObserverRegistry};
use crate::render::blit::{BlitPipeline, DeviceCaps};
use crate::render::surface::Surface;
use crate::render::texture_pool::{PoolStats, TexturePool};
use crate::text::TextRasterizer;
use crate::text::raster::ParleyRasterizer;

enum Slot {
    Vacant,
    Live(Box<BitmapState>),
    /// Taken out while one of its own operations runs.
    Busy,
    Disposed,
}

struct Entry {
    generation: u32,
    slot: Slot,
}

/// Owner of every bitmap, the texture pool and the device collaborators.
///
/// All bitmap operations take `&mut GraphicsContext`; share one across threads with
/// [`SharedGraphics`].
pub struct GraphicsContext {
    pub(crate) config: Config,
    pub(crate) pipeline: BlitPipeline,
    pub(crate) pool: TexturePool,
    pub(crate) assets: Box<dyn AssetSource>,
    pub(crate) text: Box<dyn TextRasterizer>,
    clock: Box<dyn Clock>,
    pub(crate) observers: ObserverRegistry,
    entries: Vec<Entry>,
    free: Vec<u32>,
}

/// Builder for [`GraphicsContext`]; every collaborator has a default.
pub struct GraphicsContextBuilder {
    config: Config,
    caps: Option<DeviceCaps>,
    assets: Option<Box<dyn AssetSource>>,
    text: Option<Box<dyn TextRasterizer>>,
    clock: Option<Box<dyn Clock>>,
}

impl GraphicsContextBuilder {
    pub fn caps(mut self, caps: DeviceCaps) -> Self {
        self.caps = Some(caps);
        self
    }

    pub fn assets(mut self, assets: impl AssetSource + 'static) -> Self {
        self.assets = Some(Box::new(assets));
        self
    }

    pub fn text_rasterizer(mut self, text: impl TextRasterizer + 'static) -> Self {
        self.text = Some(Box::new(text));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> TesseraResult<GraphicsContext> {
        self.config.validate()?;
        let caps = self
            .caps
            .unwrap_or_else(|| DeviceCaps::from_config(&self.config));
        if caps.max_texture_size == 0 {
            return Err(TesseraError::precondition(
                "device max_texture_size must be > 0",
            ));
        }
        let max_texture_size = caps.max_texture_size.min(self.config.max_texture_size);
        let caps = DeviceCaps {
            max_texture_size,
            ..caps
        };
        tracing::debug!(max_texture_size, native_blit = caps.native_blit, "graphics context");

        Ok(GraphicsContext {
            pipeline: BlitPipeline::new(&self.config, caps),
            pool: TexturePool::new(self.config.pool, max_texture_size),
            assets: self
                .assets
                .unwrap_or_else(|| Box::new(DirAssetSource::new("."))),
            text: self
                .text
                .unwrap_or_else(|| Box::new(ParleyRasterizer::new())),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            observers: ObserverRegistry::default(),
            entries: Vec::new(),
            free: Vec::new(),
            config: self.config,
        })
    }
}

impl GraphicsContext {
    pub fn builder(config: Config) -> GraphicsContextBuilder {
        GraphicsContextBuilder {
            config,
            caps: None,
            assets: None,
            text: None,
            clock: None,
        }
    }

    pub fn new(config: Config) -> TesseraResult<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caps(&self) -> DeviceCaps {
        self.pipeline.caps()
    }

    /// Largest bitmap side backed by a single device surface.
    pub fn max_size(&self) -> u32 {
        self.pool.max_texture_size()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// A blank pooled surface, e.g. to wrap with
    /// [`bitmap_from_surface`](Self::bitmap_from_surface).
    pub fn request_surface(&mut self, width: u32, height: u32) -> TesseraResult<Surface> {
        let mut s = self.pool.request(width, height)?;
        s.clear();
        Ok(s)
    }

    pub fn release_surface(&mut self, surface: Surface) {
        self.pool.release(surface);
    }

    /// Advances every playing animation to the clock's current time. Call once per frame.
    pub fn prepare(&mut self) {
        let now = self.clock.now_secs();
        for entry in &mut self.entries {
            if let Slot::Live(state) = &mut entry.slot
                && matches!(state.storage, crate::bitmap::Storage::Animated(_))
            {
                state.timer.update(now);
            }
        }
    }

    pub fn subscribe(
        &mut self,
        id: BitmapId,
        callback: impl FnMut(BitmapId, BitmapEvent) + Send + 'static,
    ) -> TesseraResult<ObserverHandle> {
        self.state(id, "subscribe")?;
        Ok(self.observers.subscribe(id, Box::new(callback)))
    }

    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    /// True for disposed bitmaps and for handles whose slot was freed.
    pub fn is_disposed(&self, id: BitmapId) -> bool {
        !matches!(
            self.entry(id).map(|e| &e.slot),
            Some(Slot::Live(_) | Slot::Busy)
        )
    }

    /// Number of bitmaps that are not disposed.
    pub fn live_bitmaps(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.slot, Slot::Live(_) | Slot::Busy))
            .count()
    }

    pub(crate) fn insert(&mut self, state: BitmapState) -> BitmapId {
        let slot = Slot::Live(Box::new(state));
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.slot = slot;
            return BitmapId {
                index,
                generation: entry.generation,
            };
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            slot,
        });
        BitmapId {
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: BitmapId) -> Option<&Entry> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
    }

    fn entry_mut(&mut self, id: BitmapId) -> Option<&mut Entry> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
    }

    pub(crate) fn state(&self, id: BitmapId, op: &'static str) -> TesseraResult<&BitmapState> {
        match self.entry(id).map(|e| &e.slot) {
            Some(Slot::Live(state)) => Ok(state),
            Some(Slot::Busy) => Err(busy(op)),
            _ => Err(TesseraError::disposed(op)),
        }
    }

    pub(crate) fn state_mut(
        &mut self,
        id: BitmapId,
        op: &'static str,
    ) -> TesseraResult<&mut BitmapState> {
        match self.entry_mut(id).map(|e| &mut e.slot) {
            Some(Slot::Live(state)) => Ok(state),
            Some(Slot::Busy) => Err(busy(op)),
            _ => Err(TesseraError::disposed(op)),
        }
    }

    /// Runs `f` with the bitmap taken out of the arena, so `f` may use the rest of the context.
    pub(crate) fn with_state<R>(
        &mut self,
        id: BitmapId,
        op: &'static str,
        f: impl FnOnce(&mut Self, &mut BitmapState) -> TesseraResult<R>,
    ) -> TesseraResult<R> {
        let mut state = self.take_state(id, op)?;
        let out = f(self, &mut state);
        if let Some(entry) = self.entry_mut(id) {
            entry.slot = Slot::Live(state);
        }
        out
    }

    fn take_state(&mut self, id: BitmapId, op: &'static str) -> TesseraResult<Box<BitmapState>> {
        let entry = self.entry_mut(id).ok_or(TesseraError::disposed(op))?;
        match std::mem::replace(&mut entry.slot, Slot::Busy) {
            Slot::Live(state) => Ok(state),
            other => {
                let err = if matches!(other, Slot::Busy) {
                    busy(op)
                } else {
                    TesseraError::disposed(op)
                };
                entry.slot = other;
                Err(err)
            }
        }
    }

    /// Marks the slot disposed and hands back its state, if it was live.
    pub(crate) fn retire_state(&mut self, id: BitmapId) -> TesseraResult<Option<Box<BitmapState>>> {
        let Some(entry) = self.entry_mut(id) else {
            return Ok(None);
        };
        match std::mem::replace(&mut entry.slot, Slot::Disposed) {
            Slot::Live(state) => Ok(Some(state)),
            Slot::Busy => {
                entry.slot = Slot::Busy;
                Err(busy("dispose"))
            }
            Slot::Disposed => Ok(None),
            Slot::Vacant => {
                entry.slot = Slot::Vacant;
                Ok(None)
            }
        }
    }

    /// Frees a disposed slot for reuse; the handle becomes stale.
    pub(crate) fn free_slot(&mut self, id: BitmapId) {
        let Some(entry) = self.entry_mut(id) else {
            return;
        };
        if !matches!(entry.slot, Slot::Disposed) {
            return;
        }
        entry.slot = Slot::Vacant;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    pub(crate) fn notify_modified(&mut self, id: BitmapId) {
        self.observers.notify(id, BitmapEvent::Modified);
    }
}

fn busy(op: &'static str) -> TesseraError {
    TesseraError::precondition(format!("{op} re-entered a bitmap that is mid-operation"))
}

/// Process-wide graphics lock: the context behind a mutex.
#[derive(Clone)]
pub struct SharedGraphics {
    inner: Arc<Mutex<GraphicsContext>>,
}

impl SharedGraphics {
    pub fn new(ctx: GraphicsContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ctx)),
        }
    }

    /// Blocks until the lock is held. A poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, GraphicsContext> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut GraphicsContext) -> R) -> R {
        f(&mut self.lock())
    }
}

#[cfg(test)]
#[path = "../tests/unit/context.rs"]
mod tests;
