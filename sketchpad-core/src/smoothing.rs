//! # Smoothing
//!
//! Mouse samples arrive once per frame, far too sparse to draw as a polyline. Between consecutive
//! samples a Catmull-Rom segment is fitted through the previous two accepted points and the new sample,
//! and sampled at a density proportional to the on-screen zoom so strokes look equally smooth at any zoom.

use crate::{stroke::Stroke, Point};

/// Fraction of the view width between interpolated points.
pub const DEFAULT_MARGIN: f32 = 0.01;
/// Upper limit of points emitted for a single sample.
pub const MAX_STEP_POINTS: usize = 4096;

/// Number of points to emit for a move of `distance` world units.
///
/// `round(distance / spacing) + 1`, always at least one. Spacings that are zero,
/// negative or not finite degrade to a single point.
#[must_use]
pub fn step_count(distance: f32, spacing: f32) -> usize {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return 1;
    }
    let steps = (distance / spacing).round();
    if !(steps >= 0.0) {
        return 1;
    }
    // Saturating float->int cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps as usize;
    steps.min(MAX_STEP_POINTS - 1) + 1
}

/// Catmull-Rom endpoint coefficients of the segment ending at `cur`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Coefficients {
    pub c0: Point,
    pub c1: Point,
    pub c2: Point,
}
impl Coefficients {
    #[must_use]
    pub fn new(prev_prev: Point, prev: Point, cur: Point) -> Self {
        Self {
            c0: prev,
            c1: (cur - prev_prev) * 0.5,
            c2: ((cur - prev * 2.0) + prev_prev) * 0.5,
        }
    }
    /// Evaluate at `t`. `t = 0` is `prev`, `t = 1` is `cur`.
    #[must_use]
    pub fn eval(&self, t: f32) -> Point {
        self.c0 + self.c1 * t + self.c2 * (t * t)
    }
}

/// Points of one segment, at `t = i / (n + 1)` for `i` in `1..=n`.
/// Never yields either endpoint.
#[derive(Clone, Debug)]
pub struct Interpolated {
    coefficients: Coefficients,
    next: usize,
    count: usize,
}
impl Iterator for Interpolated {
    type Item = Point;
    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.count {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let t = self.next as f32 / (self.count + 1) as f32;
        self.next += 1;
        Some(self.coefficients.eval(t))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for Interpolated {}

/// The sliding window of accepted points for the stroke being drawn.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Smoother {
    prev_prev: Point,
    prev: Point,
    margin: f32,
}
impl Smoother {
    /// Start a window at the first point of a stroke. Both previous points are the seed.
    #[must_use]
    pub fn new(seed: Point, margin: f32) -> Self {
        Self {
            prev_prev: seed,
            prev: seed,
            margin,
        }
    }
    pub fn reset(&mut self, seed: Point) {
        self.prev_prev = seed;
        self.prev = seed;
    }
    #[must_use]
    pub fn prev(&self) -> Point {
        self.prev
    }
    #[must_use]
    pub fn prev_prev(&self) -> Point {
        self.prev_prev
    }
    #[must_use]
    pub fn margin(&self) -> f32 {
        self.margin
    }
    /// The points that a move to `cur` would emit, without advancing.
    /// None if `cur` is the previous point.
    #[must_use]
    pub fn interpolate(&self, cur: Point, view_width: f32) -> Option<Interpolated> {
        if cur == self.prev {
            return None;
        }
        let distance = (cur - self.prev).mag();
        Some(Interpolated {
            coefficients: Coefficients::new(self.prev_prev, self.prev, cur),
            next: 1,
            count: step_count(distance, view_width * self.margin),
        })
    }
    /// Emit the segment to `cur` into `stroke` and slide the window forward.
    /// Returns the number of points added, zero if `cur` is the previous point.
    pub fn advance(&mut self, cur: Point, view_width: f32, stroke: &mut Stroke) -> usize {
        let Some(points) = self.interpolate(cur, view_width) else {
            return 0;
        };
        let count = points.len();
        stroke.extend(points);
        self.prev_prev = self.prev;
        self.prev = cur;
        count
    }
}

#[cfg(test)]
mod test {
    use super::{step_count, Coefficients, Smoother, DEFAULT_MARGIN, MAX_STEP_POINTS};
    use crate::{
        repositories::points::PointPool,
        stroke::{Stroke, StrokeStyle},
        Point,
    };

    fn close(a: Point, b: Point) -> bool {
        (a - b).mag() < 1e-4
    }

    #[test]
    fn curve_passes_both_ends() {
        let coefficients = Coefficients::new(
            Point::new(-3.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 2.0),
        );
        assert!(close(coefficients.eval(0.0), Point::new(0.0, 0.0)));
        assert!(close(coefficients.eval(1.0), Point::new(4.0, 2.0)));
    }
    #[test]
    fn open_interval_towards_cur() {
        let smoother = Smoother::new(Point::zero(), DEFAULT_MARGIN);
        let cur = Point::new(10.0, 0.0);
        // Spacing of one unit over a ten unit move.
        let points: Vec<_> = smoother.interpolate(cur, 100.0).unwrap().collect();
        assert_eq!(points.len(), 11);
        assert!(points
            .iter()
            .all(|&point| !close(point, Point::zero()) && !close(point, cur)));
        // Monotonic along this straight line, last one nearest `cur`.
        assert!(points.windows(2).all(|pair| pair[0].x < pair[1].x));
        let last = *points.last().unwrap();
        assert!((cur - last).mag() < (cur - points[0]).mag());
        assert!(close(last, Point::new(10.0 * (11.0 / 12.0) * (23.0 / 24.0), 0.0)));
    }
    #[test]
    fn tiny_move_emits_one() {
        let smoother = Smoother::new(Point::zero(), DEFAULT_MARGIN);
        let points = smoother.interpolate(Point::new(1e-6, 0.0), 1000.0).unwrap();
        assert_eq!(points.len(), 1);
    }
    #[test]
    fn same_point_is_skipped() {
        let pool = PointPool::new(1);
        let mut stroke = Stroke::new(&pool, StrokeStyle::default());
        let mut smoother = Smoother::new(Point::new(2.0, 2.0), DEFAULT_MARGIN);
        let before = smoother;
        assert!(smoother.interpolate(Point::new(2.0, 2.0), 100.0).is_none());
        assert_eq!(smoother.advance(Point::new(2.0, 2.0), 100.0, &mut stroke), 0);
        assert_eq!(smoother, before);
        assert!(stroke.is_empty());
    }
    #[test]
    fn advance_slides_window() {
        let pool = PointPool::new(1);
        let mut stroke = Stroke::new(&pool, StrokeStyle::default());
        let mut smoother = Smoother::new(Point::zero(), DEFAULT_MARGIN);
        let first = smoother.advance(Point::new(5.0, 0.0), 100.0, &mut stroke);
        assert_eq!(smoother.prev_prev(), Point::zero());
        assert_eq!(smoother.prev(), Point::new(5.0, 0.0));
        let second = smoother.advance(Point::new(5.0, 5.0), 100.0, &mut stroke);
        assert_eq!(smoother.prev_prev(), Point::new(5.0, 0.0));
        assert_eq!(smoother.prev(), Point::new(5.0, 5.0));
        assert_eq!(stroke.len(), first + second);
    }
    #[test]
    fn degenerate_view_widths() {
        assert_eq!(step_count(10.0, 0.0), 1);
        assert_eq!(step_count(10.0, -1.0), 1);
        assert_eq!(step_count(10.0, f32::NAN), 1);
        assert_eq!(step_count(10.0, f32::INFINITY), 1);
        assert_eq!(step_count(f32::INFINITY, 1.0), MAX_STEP_POINTS);
        assert_eq!(step_count(1e12, 1e-6), MAX_STEP_POINTS);
        // round(2.5) rounds away from zero.
        assert_eq!(step_count(2.5, 1.0), 4);

        let smoother = Smoother::new(Point::zero(), DEFAULT_MARGIN);
        assert_eq!(
            smoother.interpolate(Point::new(3.0, 0.0), 0.0).unwrap().len(),
            1
        );
    }
}
