//! # Strokes
//!
//! A stroke is a chain of point buckets plus the style it is drawn with.
//! Points are stored in the order they were added, which is both draw order and curve order.

mod reader;
pub use reader::StrokeReader;

use crate::{
    collision::Circle,
    repositories::points::{chain::Chain, PointPool},
    util::Rect,
    Color, Point,
};

pub type StrokeID = crate::SketchID<Stroke>;

/// How a stroke is drawn.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width, in world units.
    pub width: f32,
}
impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5.0,
        }
    }
}

/// An owned, growable stroke.
///
/// Cloning is deep - the clone draws fresh buckets from the same pool and shares nothing with the original.
/// Dropping a stroke returns its buckets to the pool.
pub struct Stroke {
    /// The pool buckets are drawn from. `None` for an unbound stroke, which ignores added points.
    pool: Option<PointPool>,
    chain: Chain,
    style: StrokeStyle,
    /// Bounds of every point in `chain`, None when empty.
    bounds: Option<Rect>,
}
impl Stroke {
    /// Create an empty stroke. No buckets are acquired until the first point is added.
    #[must_use]
    pub fn new(pool: &PointPool, style: StrokeStyle) -> Self {
        let chain = Chain::new(&pool.read());
        Self {
            pool: Some(pool.clone()),
            chain,
            style,
            bounds: None,
        }
    }
    /// Create a stroke with no pool. It stays empty forever.
    #[must_use]
    pub fn unbound(style: StrokeStyle) -> Self {
        Self {
            pool: None,
            chain: Chain::default(),
            style,
            bounds: None,
        }
    }
    #[must_use]
    pub fn style(&self) -> StrokeStyle {
        self.style
    }
    #[must_use]
    pub fn pool(&self) -> Option<&PointPool> {
        self.pool.as_ref()
    }
    /// Append a point. Every point is stored, duplicates included.
    pub fn add_point(&mut self, point: Point) {
        self.extend(std::iter::once(point));
    }
    /// Append many points in order, taking the pool lock once.
    pub fn extend(&mut self, points: impl IntoIterator<Item = Point>) {
        let Some(pool) = &self.pool else {
            return;
        };
        let mut inner = pool.write();
        if self.chain.revalidate(&inner) {
            self.bounds = None;
        }
        for point in points {
            self.chain.append(&mut inner, point);
            match &mut self.bounds {
                Some(bounds) => bounds.include(point),
                None => self.bounds = Some(Rect::from_point(point)),
            }
        }
    }
    /// Release every bucket, leaving an empty stroke with the same style.
    pub fn clear(&mut self) {
        if let Some(pool) = &self.pool {
            let released = self.chain.release(&mut pool.write());
            if released != 0 {
                log::trace!("cleared stroke, released {released} buckets");
            }
        }
        self.bounds = None;
    }
    /// Clear and replace the style, keeping this object for reuse.
    pub fn reinit(&mut self, style: StrokeStyle) {
        self.clear();
        self.style = style;
    }
    /// Release the buckets and the stroke itself.
    pub fn destroy(self) {
        drop(self);
    }
    /// Lock the stroke's points for reading.
    #[must_use]
    pub fn read(&self) -> StrokeReader<'_> {
        match &self.pool {
            Some(pool) => {
                let inner = pool.read();
                if self.chain.is_current(&inner) {
                    StrokeReader::new(Some(inner), &self.chain, self.style, self.bounds)
                } else {
                    StrokeReader::new(None, &self.chain, self.style, None)
                }
            }
            None => StrokeReader::new(None, &self.chain, self.style, None),
        }
    }
    /// Number of points stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The bounding box of every point. None if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.read().bounds()
    }
    /// Does any point of this stroke lie within `circle`?
    #[must_use]
    pub fn collide_circle(&self, circle: Circle) -> bool {
        crate::collision::collide_circle(self, circle)
    }
}
impl Clone for Stroke {
    fn clone(&self) -> Self {
        let Some(pool) = &self.pool else {
            return Self::unbound(self.style);
        };
        let mut inner = pool.write();
        let mut chain = Chain::new(&inner);
        if self.chain.is_current(&inner) {
            let mut cursor = self.chain.head();
            while let Some(id) = cursor {
                // Copy the bucket out, as the reads and appends share the pool.
                let Some(bucket) = inner.bucket(id).copied() else {
                    break;
                };
                for &point in bucket.points() {
                    chain.append(&mut inner, point);
                }
                cursor = bucket.next();
            }
        }
        let bounds = if chain.is_empty() { None } else { self.bounds };
        drop(inner);
        Self {
            pool: Some(pool.clone()),
            chain,
            style: self.style,
            bounds,
        }
    }
}
impl Drop for Stroke {
    fn drop(&mut self) {
        self.clear();
    }
}
impl std::fmt::Debug for Stroke {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reader = self.read();
        f.debug_struct("Stroke")
            .field("style", &self.style)
            .field("len", &reader.len())
            .field("bounds", &reader.bounds())
            .finish_non_exhaustive()
    }
}
