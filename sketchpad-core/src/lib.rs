//! # Sketchpad core
//!
//! A freehand stroke engine: pooled point storage, smoothed stroke building, eraser hit testing,
//! and an undo history built on deep stroke clones.

pub mod canvas;
pub mod collision;
pub mod color;
pub mod commands;
pub mod id;
pub mod repositories;
pub mod smoothing;
pub mod stroke;
pub mod strokes;
pub mod tools;
pub mod util;
pub mod view;

pub use canvas::{Canvas, CanvasOptions};
pub use color::Color;
pub use id::SketchID;
pub use repositories::points::PointPool;
pub use stroke::{Stroke, StrokeID, StrokeStyle};

/// A position in world space.
pub type Point = ultraviolet::Vec2;
