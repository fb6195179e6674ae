use std::collections::HashMap;

use crate::foundation::error::{StorageCause, TesseraError, TesseraResult};
use crate::render::surface::{Surface, SurfaceId, byte_len};

/// Pool configuration for recycled surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per (w,h) bucket.
    pub max_surfaces_per_bucket: usize,
    /// Upper bound for live plus retained surface bytes. `None` means unbounded.
    pub memory_budget_bytes: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 8,
            memory_budget_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
}

impl SurfaceKey {
    fn byte_len(self) -> usize {
        byte_len(self.w, self.h)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    pub live_bytes: u64,
    pub alloc_surfaces: u64,
    pub alloc_bytes: u64,
    pub recycled: u64,
    pub dropped_on_release: u64,
}

struct Bucket {
    key: SurfaceKey,
    surfaces: Vec<Surface>,
}

/// Bounded recycling allocator for device surfaces.
///
/// Keyed by `(width, height)`. A recycled surface keeps its previous contents; callers that
/// need a blank surface clear it themselves.
pub struct TexturePool {
    opts: PoolConfig,
    max_texture_size: u32,
    next_id: u64,
    stats: PoolStats,

    bucket_idx_by_key: HashMap<SurfaceKey, usize>,
    buckets: Vec<Bucket>,
}

impl TexturePool {
    pub fn new(opts: PoolConfig, max_texture_size: u32) -> Self {
        Self {
            opts,
            max_texture_size,
            next_id: 1,
            stats: PoolStats::default(),
            bucket_idx_by_key: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }

    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    /// Hands out a `width x height` surface, recycled when one is retained.
    pub fn request(&mut self, width: u32, height: u32) -> TesseraResult<Surface> {
        if width == 0
            || height == 0
            || width > self.max_texture_size
            || height > self.max_texture_size
        {
            return Err(TesseraError::storage(
                width,
                height,
                StorageCause::ExceedsMaxDimension,
            ));
        }

        let key = SurfaceKey {
            w: width,
            h: height,
        };
        if let Some(&bi) = self.bucket_idx_by_key.get(&key)
            && let Some(s) = self.buckets[bi].surfaces.pop()
        {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            self.stats.recycled = self.stats.recycled.saturating_add(1);
            self.stats.live_bytes = self.stats.live_bytes.saturating_add(key.byte_len() as u64);
            tracing::trace!(width, height, "recycled pooled surface");
            return Ok(s);
        }

        let bytes = key.byte_len();
        self.make_room(bytes, width, height)?;

        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(bytes).is_err() {
            return Err(TesseraError::storage(
                width,
                height,
                StorageCause::OutOfMemory,
            ));
        }
        pixels.resize(bytes, 0);

        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes as u64);
        self.stats.live_bytes = self.stats.live_bytes.saturating_add(bytes as u64);

        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        Ok(Surface::from_parts(id, width, height, pixels))
    }

    /// Returns a surface to the pool; it is dropped instead when the caps are reached.
    pub fn release(&mut self, surface: Surface) {
        let key = SurfaceKey {
            w: surface.width(),
            h: surface.height(),
        };
        let bytes = key.byte_len();
        self.stats.live_bytes = self.stats.live_bytes.saturating_sub(bytes as u64);

        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match self.bucket_idx_by_key.get(&key).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Bucket {
                    key,
                    surfaces: Vec::new(),
                });
                self.bucket_idx_by_key.insert(key, i);
                i
            }
        };

        let bucket = &mut self.buckets[bi];
        if bucket.surfaces.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.surfaces.push(surface);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drops every retained surface.
    pub fn clear(&mut self) {
        for b in &mut self.buckets {
            b.surfaces.clear();
        }
        self.stats.retained_surfaces = 0;
        self.stats.retained_bytes = 0;
    }

    fn make_room(&mut self, bytes: usize, width: u32, height: u32) -> TesseraResult<()> {
        let Some(budget) = self.opts.memory_budget_bytes else {
            return Ok(());
        };
        let needed = |st: &PoolStats| {
            st.live_bytes
                .saturating_add(st.retained_bytes as u64)
                .saturating_add(bytes as u64)
        };
        if needed(&self.stats) <= budget {
            return Ok(());
        }

        // Evict retained surfaces, largest buckets first.
        let mut order: Vec<usize> = (0..self.buckets.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.buckets[i].key.byte_len()));
        for bi in order {
            let key = self.buckets[bi].key;
            while needed(&self.stats) > budget && self.buckets[bi].surfaces.pop().is_some() {
                self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
                self.stats.retained_bytes =
                    self.stats.retained_bytes.saturating_sub(key.byte_len());
            }
        }
        if needed(&self.stats) > budget {
            tracing::debug!(width, height, budget, "surface request over memory budget");
            return Err(TesseraError::storage(
                width,
                height,
                StorageCause::OutOfMemory,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture_pool.rs"]
mod tests;
