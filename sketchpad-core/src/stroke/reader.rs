use crate::{
    repositories::points::{
        chain::{Buckets, Chain},
        PoolInner,
    },
    util::Rect,
    Point,
};

use super::StrokeStyle;

/// A locked view of a stroke's points, in insertion order.
///
/// Holds a shared lock on the stroke's pool for its lifetime - keep it short, and do not
/// mutate strokes of the same pool while it is alive.
pub struct StrokeReader<'a> {
    /// None for strokes whose points are unreachable (unbound, or pool destroyed).
    guard: Option<parking_lot::RwLockReadGuard<'a, PoolInner>>,
    chain: &'a Chain,
    style: StrokeStyle,
    bounds: Option<Rect>,
}
impl<'a> StrokeReader<'a> {
    pub(super) fn new(
        guard: Option<parking_lot::RwLockReadGuard<'a, PoolInner>>,
        chain: &'a Chain,
        style: StrokeStyle,
        bounds: Option<Rect>,
    ) -> Self {
        Self {
            guard,
            chain,
            style,
            bounds,
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        if self.guard.is_some() {
            self.chain.len()
        } else {
            0
        }
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    #[must_use]
    pub fn style(&self) -> StrokeStyle {
        self.style
    }
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }
    /// Each bucket's points as a contiguous slice, head to tail.
    /// Lets renderers upload whole runs without copying point by point.
    #[must_use]
    pub fn buckets(&self) -> Buckets<'_> {
        match &self.guard {
            Some(guard) => self.chain.buckets(guard),
            None => Buckets::empty(),
        }
    }
    /// Every point, head to tail.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.buckets().flat_map(|points| points.iter().copied())
    }
    /// Every consecutive pair of points, in order. Crosses bucket boundaries.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let mut previous = None;
        self.iter().filter_map(move |point| {
            let segment = previous.map(|start| (start, point));
            previous = Some(point);
            segment
        })
    }
    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.iter().next()
    }
    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.buckets().last()?.last().copied()
    }
    #[must_use]
    pub fn to_vec(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.len());
        self.buckets()
            .for_each(|bucket| points.extend_from_slice(bucket));
        points
    }
}

#[cfg(test)]
mod test {
    use crate::{
        repositories::points::{PointPool, BUCKET_CAPACITY},
        stroke::{Stroke, StrokeStyle},
        Point,
    };

    #[test]
    fn segments_cross_buckets() {
        let pool = PointPool::new(1);
        let mut stroke = Stroke::new(&pool, StrokeStyle::default());
        let count = BUCKET_CAPACITY + 1;
        stroke.extend((0..count).map(|i| Point::new(i as f32, 0.0)));
        let reader = stroke.read();
        assert_eq!(reader.buckets().count(), 2);
        let segments: Vec<_> = reader.segments().collect();
        assert_eq!(segments.len(), count - 1);
        let join = segments[BUCKET_CAPACITY - 1];
        assert_eq!(
            join,
            (
                Point::new((BUCKET_CAPACITY - 1) as f32, 0.0),
                Point::new(BUCKET_CAPACITY as f32, 0.0)
            )
        );
        assert_eq!(reader.first(), Some(Point::new(0.0, 0.0)));
        assert_eq!(reader.last(), Some(Point::new(BUCKET_CAPACITY as f32, 0.0)));
    }
    #[test]
    fn empty_reader() {
        let pool = PointPool::new(1);
        let stroke = Stroke::new(&pool, StrokeStyle::default());
        let reader = stroke.read();
        assert!(reader.is_empty());
        assert_eq!(reader.buckets().count(), 0);
        assert_eq!(reader.segments().count(), 0);
        assert!(reader.last().is_none());
    }
    #[test]
    fn two_readers_share_pool() {
        let pool = PointPool::new(1);
        let mut a = Stroke::new(&pool, StrokeStyle::default());
        let mut b = Stroke::new(&pool, StrokeStyle::default());
        a.add_point(Point::new(1.0, 0.0));
        b.add_point(Point::new(2.0, 0.0));
        let (read_a, read_b) = (a.read(), b.read());
        assert_eq!(read_a.first(), Some(Point::new(1.0, 0.0)));
        assert_eq!(read_b.first(), Some(Point::new(2.0, 0.0)));
    }
}
