/// Integer rectangle in pixel space.
///
/// `w`/`h` may be negative: blits treat a negative extent as a mirrored copy.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl IntRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin.
    pub const fn sized(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Rectangle spanning `x0..x1` by `y0..y1`, saturated to the `i32` range.
    ///
    /// Edges are not reordered: `x1 < x0` yields a negative width.
    pub fn from_edges(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        let x = saturate(x0);
        let y = saturate(y0);
        Self::new(
            x,
            y,
            saturate(x1 - i64::from(x)),
            saturate(y1 - i64::from(y)),
        )
    }

    /// `(left, top, right, bottom)` of the normalized rectangle, without overflow.
    pub fn edges(self) -> (i64, i64, i64, i64) {
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        let (r, b) = (x + i64::from(self.w), y + i64::from(self.h));
        (x.min(r), y.min(b), x.max(r), y.max(b))
    }

    /// Same area with non-negative width and height.
    pub fn normalized(self) -> Self {
        if self.w >= 0 && self.h >= 0 {
            return self;
        }
        let (x0, y0, x1, y1) = self.edges();
        Self::from_edges(x0, y0, x1, y1)
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn area(self) -> i64 {
        i64::from(self.w).abs() * i64::from(self.h).abs()
    }

    /// Overlap of the two normalized rectangles, `None` when they do not overlap.
    pub fn intersect(self, other: Self) -> Option<Self> {
        let (ax0, ay0, ax1, ay1) = self.edges();
        let (bx0, by0, bx1, by1) = other.edges();
        let (x0, y0) = (ax0.max(bx0), ay0.max(by0));
        let (x1, y1) = (ax1.min(bx1), ay1.min(by1));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::from_edges(x0, y0, x1, y1))
    }

    pub fn intersects(self, other: Self) -> bool {
        self.intersect(other).is_some()
    }

    /// Smallest rectangle containing both (normalized) rectangles.
    pub fn union(self, other: Self) -> Self {
        let (ax0, ay0, ax1, ay1) = self.edges();
        let (bx0, by0, bx1, by1) = other.edges();
        Self::from_edges(ax0.min(bx0), ay0.min(by0), ax1.max(bx1), ay1.max(by1))
    }

    pub fn contains_point(self, x: i32, y: i32) -> bool {
        let (x0, y0, x1, y1) = self.edges();
        let (x, y) = (i64::from(x), i64::from(y));
        x >= x0 && x < x1 && y >= y0 && y < y1
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: Self) -> bool {
        let (ax0, ay0, ax1, ay1) = self.edges();
        let (bx0, by0, bx1, by1) = other.edges();
        bx0 >= ax0 && by0 >= ay0 && bx1 <= ax1 && by1 <= ay1
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Straight-alpha colour with each channel in `[0, 255]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

impl Color {
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 255.0)
    }

    pub const fn white() -> Self {
        Self::new(255.0, 255.0, 255.0, 255.0)
    }

    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::new(
            f32::from(px[0]),
            f32::from(px[1]),
            f32::from(px[2]),
            f32::from(px[3]),
        )
    }

    /// Clamped and truncated to bytes.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn ch(v: f32) -> u8 {
            if v.is_nan() { 0 } else { v.clamp(0.0, 255.0) as u8 }
        }
        [ch(self.red), ch(self.green), ch(self.blue), ch(self.alpha)]
    }

    /// Same colour with alpha forced opaque.
    pub fn opaque(self) -> Self {
        Self {
            alpha: 255.0,
            ..self
        }
    }

    /// True when the stored byte alpha would be zero.
    pub fn is_clear(self) -> bool {
        self.to_rgba8()[3] == 0
    }
}

/// Straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
