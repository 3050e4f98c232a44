//! Utility types, used throughout the crate.

use crate::Point;

/// A float which is non-NaN and non-infinite.
// Because of the preconditions invalidating many bitpatterns, this is not Pod.
#[derive(Copy, Clone, PartialEq, PartialOrd, bytemuck::NoUninit, bytemuck::Zeroable, Debug)]
#[repr(transparent)]
pub struct FiniteF32(f32);
impl FiniteF32 {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);
    pub fn new(val: f32) -> Result<Self, FiniteF32Error> {
        if val.is_finite() {
            Ok(Self(val))
        } else {
            Err(FiniteF32Error::NotFinite)
        }
    }
    /// Wrap a literal. The caller guarantees `val` is finite.
    pub(crate) const fn from_const(val: f32) -> Self {
        Self(val)
    }
    /// Like [`FiniteF32::new`], replacing non-finite values with `fallback`.
    #[must_use]
    pub fn new_or(val: f32, fallback: Self) -> Self {
        Self::new(val).unwrap_or(fallback)
    }
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for FiniteF32 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f32> for FiniteF32 {
    type Error = FiniteF32Error;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl From<FiniteF32> for f32 {
    fn from(value: FiniteF32) -> Self {
        value.get()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FiniteF32Error {
    #[error("not finite")]
    NotFinite,
}

// f32 is !Eq, but no component is ever NaN so PartialEq acts like Eq.
impl Eq for FiniteF32 {}
#[allow(clippy::derive_ord_xor_partial_ord)]
impl Ord for FiniteF32 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Never NaN, so never None.
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}
impl std::hash::Hash for FiniteF32 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // -0.0 and 0.0 compare equal, so they must hash equal.
        let normalized = if self.0 == 0.0 { 0.0f32 } else { self.0 };
        state.write_u32(normalized.to_bits());
    }
}

/// Axis-aligned rectangle in world space. `min` is componentwise `<= max`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}
impl Rect {
    /// A zero-area rectangle containing only `point`.
    #[must_use]
    pub fn from_point(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }
    /// The smallest rectangle containing every point. `None` if there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut rect = Self::from_point(points.next()?);
        points.for_each(|point| rect.include(point));
        Some(rect)
    }
    /// Grow to contain `point`.
    pub fn include(&mut self, point: Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
    /// Squared distance from `point` to the nearest point of this rectangle.
    /// Zero if `point` is inside.
    #[must_use]
    pub fn distance_sq(&self, point: Point) -> f32 {
        let dx = (self.min.x - point.x).max(0.0).max(point.x - self.max.x);
        let dy = (self.min.y - point.y).max(0.0).max(point.y - self.max.y);
        dx * dx + dy * dy
    }
}
