use smallvec::SmallVec;

use crate::foundation::core::IntRect;

/// Above this many rectangles the region collapses into its bounding box.
const MAX_RECTS: usize = 64;

/// Conservative set of pixels that may hold non-zero alpha.
///
/// Stored as non-overlapping, non-empty, normalized rectangles. Any pixel outside the set is
/// guaranteed to be fully transparent; the set may over-approximate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaintedRegion {
    rects: Vec<IntRect>,
}

impl TaintedRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[IntRect] {
        &self.rects
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn add(&mut self, rect: IntRect) {
        let r = rect.normalized();
        if r.is_empty() {
            return;
        }

        let mut pieces: SmallVec<[IntRect; 4]> = SmallVec::new();
        pieces.push(r);
        for existing in &self.rects {
            if !pieces.iter().any(|p| p.intersects(*existing)) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| subtract_rect(p, *existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);

        if self.rects.len() > MAX_RECTS {
            let bounds = self.bounds();
            self.rects.clear();
            if let Some(b) = bounds {
                self.rects.push(b);
            }
        }
    }

    pub fn subtract(&mut self, rect: IntRect) {
        let r = rect.normalized();
        if r.is_empty() || !self.intersects(r) {
            return;
        }
        self.rects = self
            .rects
            .iter()
            .flat_map(|e| subtract_rect(*e, r))
            .collect();
    }

    pub fn intersects(&self, rect: IntRect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    pub fn bounds(&self) -> Option<IntRect> {
        self.rects.iter().copied().reduce(IntRect::union)
    }

    /// Total covered area in pixels.
    pub fn area(&self) -> i64 {
        self.rects.iter().map(|r| r.area()).sum()
    }
}

/// `a` minus `b`, as up to four disjoint pieces (top, bottom, left, right bands).
fn subtract_rect(a: IntRect, b: IntRect) -> SmallVec<[IntRect; 4]> {
    let mut out = SmallVec::new();
    let Some(i) = a.intersect(b) else {
        out.push(a);
        return out;
    };

    let (ax0, ay0, ax1, ay1) = a.edges();
    let (ix0, iy0, ix1, iy1) = i.edges();
    if iy0 > ay0 {
        out.push(IntRect::from_edges(ax0, ay0, ax1, iy0));
    }
    if iy1 < ay1 {
        out.push(IntRect::from_edges(ax0, iy1, ax1, ay1));
    }
    if ix0 > ax0 {
        out.push(IntRect::from_edges(ax0, iy0, ix0, iy1));
    }
    if ix1 < ax1 {
        out.push(IntRect::from_edges(ix1, iy0, ax1, iy1));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/region.rs"]
mod tests;
