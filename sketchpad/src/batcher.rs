//! CPU-side stroke tessellation. Turns each stroke into one quad per consecutive point pair,
//! ready to be uploaded as a single vertex and index buffer.

use sketchpad_core::{
    canvas::StrokeRenderer,
    stroke::{StrokeID, StrokeReader},
    Point,
};

#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, PartialEq, Debug)]
#[repr(C)]
pub struct StrokeVertex {
    /// World space position.
    pub pos: [f32; 2],
    /// Straight, linear RGBA color.
    pub color: [f32; 4],
}

/// The indices belonging to one stroke.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DrawRange {
    pub stroke: StrokeID,
    pub indices: std::ops::Range<u32>,
}

/// Collects the geometry of every stroke rendered into it.
///
/// Buffers are kept between frames; [`QuadBatcher::clear`] only resets their length.
#[derive(Default)]
pub struct QuadBatcher {
    vertices: Vec<StrokeVertex>,
    indices: Vec<u32>,
    draws: Vec<DrawRange>,
}
impl QuadBatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draws.clear();
    }
    #[must_use]
    pub fn vertices(&self) -> &[StrokeVertex] {
        &self.vertices
    }
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
    #[must_use]
    pub fn draws(&self) -> &[DrawRange] {
        &self.draws
    }
    /// Vertex data as bytes, for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
    /// Allocated capacity of the vertex buffer, in vertices.
    #[must_use]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }
    fn push_quad(&mut self, corners: [Point; 4], color: [f32; 4]) -> bool {
        let Ok(base) = u32::try_from(self.vertices.len()) else {
            return false;
        };
        let Some(last) = base.checked_add(3) else {
            return false;
        };
        self.vertices.extend(corners.map(|corner| StrokeVertex {
            pos: [corner.x, corner.y],
            color,
        }));
        // Two triangles, sharing the 0-2 diagonal.
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, last]);
        true
    }
    /// A square of `half_width` around `at`.
    fn dot(&mut self, at: Point, half_width: f32, color: [f32; 4]) -> bool {
        let (x, y) = (Point::unit_x() * half_width, Point::unit_y() * half_width);
        self.push_quad([at - x - y, at - x + y, at + x + y, at + x - y], color)
    }
    /// A rectangle of `half_width` either side of the segment `from -> to`.
    fn segment(&mut self, from: Point, to: Point, half_width: f32, color: [f32; 4]) -> bool {
        let along = to - from;
        let length = along.mag();
        if length <= f32::EPSILON {
            return self.dot(from, half_width, color);
        }
        let normal = Point::new(-along.y, along.x) * (half_width / length);
        self.push_quad(
            [from + normal, from - normal, to - normal, to + normal],
            color,
        )
    }
}
impl StrokeRenderer for QuadBatcher {
    fn draw(&mut self, id: StrokeID, stroke: &StrokeReader<'_>) {
        let style = stroke.style();
        let color = style.color.as_array();
        let half_width = style.width * 0.5;
        #[allow(clippy::cast_possible_truncation)]
        let start = self.indices.len() as u32;

        let mut fits = true;
        if stroke.len() == 1 {
            if let Some(point) = stroke.first() {
                fits = self.dot(point, half_width, color);
            }
        } else {
            for (from, to) in stroke.segments() {
                if !self.segment(from, to, half_width, color) {
                    fits = false;
                    break;
                }
            }
        }
        if !fits {
            log::warn!("{id} exceeds the vertex index range, truncated");
        }
        #[allow(clippy::cast_possible_truncation)]
        let end = self.indices.len() as u32;
        if end > start {
            self.draws.push(DrawRange {
                stroke: id,
                indices: start..end,
            });
        }
    }
}
