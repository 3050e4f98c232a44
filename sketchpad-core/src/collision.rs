//! Point-sampled hit testing of strokes against the eraser.

use crate::{stroke::Stroke, Point};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}
impl Circle {
    #[must_use]
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }
    /// Is `point` inside or exactly on the edge of this circle?
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (point - self.center).mag_sq() <= self.radius * self.radius
    }
}

/// True if any stored point of `stroke` lies at a distance `<= circle.radius` from the center.
///
/// Strokes whose bounds lie entirely outside the circle are rejected without visiting
/// their points. Negative or NaN radii never collide.
#[must_use]
pub fn collide_circle(stroke: &Stroke, circle: Circle) -> bool {
    if circle.radius.is_nan() || circle.radius < 0.0 {
        return false;
    }
    let reader = stroke.read();
    match reader.bounds() {
        Some(bounds) if bounds.distance_sq(circle.center) <= circle.radius * circle.radius => (),
        // Empty, or wholly out of reach.
        _ => return false,
    }
    reader
        .buckets()
        .any(|points| points.iter().any(|&point| circle.contains(point)))
}
