//! # Views
//!
//! The window onto the canvas. World space has +X right and +Y down, like the screen.
//! NDC has +Y up and spans `-1..=1` across the viewport on both axes.

use crate::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The transform cannot be inverted anymore, and has become useless.
    /// Occurs if the width or aspect ratio is zero, negative, or not finite.
    #[error("uninvertable")]
    Uninvertable,
}

/// Smallest factor the zoom target may shrink by in a single frame.
const MIN_ZOOM_FACTOR: f32 = 0.1;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ZoomSettings {
    /// Fraction of the target width removed per unit of scroll per second.
    pub speed: f32,
    /// Rate at which the width approaches its target, per second.
    pub smoothness: f32,
}
impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            speed: 10.0,
            smoothness: 5.0,
        }
    }
}

/// A view centered on a world point, `width` world units across.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct View {
    center: Point,
    width: f32,
    /// The width being eased towards.
    target_width: f32,
    /// Width over height.
    aspect_ratio: f32,
}
impl View {
    #[must_use]
    pub fn new(center: Point, width: f32, aspect_ratio: f32) -> Self {
        Self {
            center,
            width,
            target_width: width,
            aspect_ratio,
        }
    }
    /// A view of one world unit per pixel, centered on the origin.
    #[must_use]
    pub fn for_window(size: [u32; 2]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let [width, height] = size.map(|px| px as f32);
        Self::new(Point::zero(), width, width / height)
    }
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }
    #[must_use]
    pub fn target_width(&self) -> f32 {
        self.target_width
    }
    #[must_use]
    pub fn height(&self) -> f32 {
        self.width / self.aspect_ratio
    }
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }
    /// Jump straight to a width, abandoning any zoom in progress.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.target_width = width;
    }
    /// Apply a frame of scroll. Positive scroll zooms in.
    ///
    /// The target width shrinks by `speed * scroll * dt`, and the width eases towards it.
    pub fn zoom(&mut self, scroll: f32, dt: f32, settings: ZoomSettings) {
        let factor = (1.0 - settings.speed * scroll * dt).max(MIN_ZOOM_FACTOR);
        self.target_width *= factor;
        // Past 1 the ease overshoots and oscillates.
        let ease = (settings.smoothness * dt).clamp(0.0, 1.0);
        self.width += (self.target_width - self.width) * ease;
    }
    /// Move by `direction` views-widths per second. `(0, -1)` is up.
    pub fn pan(&mut self, direction: ultraviolet::Vec2, dt: f32) {
        self.center += direction * (self.width * dt);
    }
    fn half_extent(&self) -> Result<ultraviolet::Vec2, TransformError> {
        let height = self.height();
        if self.width > 0.0 && self.width.is_finite() && height > 0.0 && height.is_finite() {
            Ok(ultraviolet::Vec2::new(self.width, height) * 0.5)
        } else {
            Err(TransformError::Uninvertable)
        }
    }
    /// World to NDC.
    pub fn project(&self, world: Point) -> Result<ultraviolet::Vec2, TransformError> {
        let half = self.half_extent()?;
        let local = world - self.center;
        Ok(ultraviolet::Vec2::new(local.x / half.x, -local.y / half.y))
    }
    /// NDC to world.
    pub fn unproject(&self, ndc: ultraviolet::Vec2) -> Result<Point, TransformError> {
        let half = self.half_extent()?;
        Ok(self.center + ultraviolet::Vec2::new(ndc.x * half.x, -ndc.y * half.y))
    }
    /// Pixel position, 0,0 top left, into world space.
    pub fn unproject_screen(
        &self,
        screen: ultraviolet::Vec2,
        window: [u32; 2],
    ) -> Result<Point, TransformError> {
        #[allow(clippy::cast_precision_loss)]
        let [width, height] = window.map(|px| px as f32);
        if width <= 0.0 || height <= 0.0 {
            return Err(TransformError::Uninvertable);
        }
        let ndc = ultraviolet::Vec2::new(
            2.0 * screen.x / width - 1.0,
            -(2.0 * screen.y / height - 1.0),
        );
        self.unproject(ndc)
    }
    /// World to NDC as a column-major matrix acting on `(x, y, 1)`.
    pub fn matrix(&self) -> Result<ultraviolet::Mat3, TransformError> {
        let half = self.half_extent()?;
        let scale = ultraviolet::Vec2::new(1.0 / half.x, -1.0 / half.y);
        Ok(ultraviolet::Mat3::new(
            ultraviolet::Vec3::new(scale.x, 0.0, 0.0),
            ultraviolet::Vec3::new(0.0, scale.y, 0.0),
            ultraviolet::Vec3::new(-self.center.x * scale.x, -self.center.y * scale.y, 1.0),
        ))
    }
}
