//! # Tools
//!
//! The toolbar's state: which color is selected, whether the eraser is active, and the brush and
//! eraser sizes. Hit-testing the toolbar's buttons is the caller's business - it reports clicks
//! here as [`ToolbarAction`]s.

use crate::{stroke::StrokeStyle, Color};

/// The selectable colors, in toolbar order.
pub const PALETTE: [Color; 8] = [
    Color::from_const([0.0, 0.0, 0.0, 1.0]),
    Color::from_const([1.0, 0.0, 0.0, 1.0]),
    Color::from_const([0.0, 1.0, 0.0, 1.0]),
    Color::from_const([0.0, 0.0, 1.0, 1.0]),
    Color::from_const([1.0, 1.0, 0.0, 1.0]),
    Color::from_const([0.0, 1.0, 1.0, 1.0]),
    Color::from_const([1.0, 0.5, 0.0, 1.0]),
    Color::from_const([1.0, 0.4, 0.7, 1.0]),
];
/// Color of the eraser's button and cursor.
pub const ERASER_COLOR: Color = Color::from_const([1.0, 0.4, 0.7, 1.0]);
/// Alpha of the cursor preview.
pub const PREVIEW_ALPHA: f32 = 0.6;

pub const BRUSH_SIZE: SizeRange = SizeRange {
    default: 5.0,
    step: 2.0,
    min: 1.0,
    max: 50.0,
};
pub const ERASER_SIZE: SizeRange = SizeRange {
    default: 25.0,
    step: 5.0,
    min: 5.0,
    max: 100.0,
};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SizeRange {
    pub default: f32,
    pub step: f32,
    pub min: f32,
    pub max: f32,
}
impl SizeRange {
    fn grow(&self, size: f32) -> f32 {
        (size + self.step).clamp(self.min, self.max)
    }
    fn shrink(&self, size: f32) -> f32 {
        (size - self.step).clamp(self.min, self.max)
    }
}

/// What the pointer does when pressed on the canvas.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Tool {
    /// Draw new strokes in this style.
    Brush(StrokeStyle),
    /// Remove every stroke with a point within `radius` of the cursor.
    Eraser { radius: f32 },
}

/// A click on one of the toolbar's buttons.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ToolbarAction {
    /// Select `PALETTE[index]`, leaving eraser mode.
    Color(usize),
    Eraser,
    /// Grow both brush and eraser.
    Grow,
    /// Shrink both brush and eraser.
    Shrink,
}

/// A circle to draw around the cursor, showing the active tool's extent.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CursorPreview {
    pub radius: f32,
    pub color: Color,
}

#[derive(Clone, Debug)]
pub struct Toolbar {
    /// Index into [`PALETTE`] whose button is marked selected.
    selected: usize,
    color: Color,
    eraser: bool,
    brush_size: f32,
    eraser_size: f32,
}
impl Default for Toolbar {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}
impl Toolbar {
    /// A toolbar drawing with `initial` until a palette color is chosen.
    /// The first palette entry is marked selected.
    #[must_use]
    pub fn new(initial: Color) -> Self {
        Self {
            selected: 0,
            color: initial,
            eraser: false,
            brush_size: BRUSH_SIZE.default,
            eraser_size: ERASER_SIZE.default,
        }
    }
    /// Apply a button click. Returns false if the action referred to no button.
    pub fn apply(&mut self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::Color(index) => {
                let Some(&color) = PALETTE.get(index) else {
                    return false;
                };
                self.selected = index;
                self.color = color;
                self.eraser = false;
            }
            ToolbarAction::Eraser => self.eraser = true,
            ToolbarAction::Grow => {
                self.brush_size = BRUSH_SIZE.grow(self.brush_size);
                self.eraser_size = ERASER_SIZE.grow(self.eraser_size);
            }
            ToolbarAction::Shrink => {
                self.brush_size = BRUSH_SIZE.shrink(self.brush_size);
                self.eraser_size = ERASER_SIZE.shrink(self.eraser_size);
            }
        }
        log::trace!("toolbar {action:?}");
        true
    }
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.eraser
    }
    #[must_use]
    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }
    #[must_use]
    pub fn eraser_size(&self) -> f32 {
        self.eraser_size
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        if self.eraser {
            Tool::Eraser {
                radius: self.eraser_size,
            }
        } else {
            Tool::Brush(StrokeStyle {
                color: self.color,
                width: self.brush_size,
            })
        }
    }
    #[must_use]
    pub fn preview(&self) -> CursorPreview {
        if self.eraser {
            CursorPreview {
                radius: self.eraser_size,
                color: ERASER_COLOR.with_alpha(PREVIEW_ALPHA),
            }
        } else {
            CursorPreview {
                radius: self.brush_size,
                color: self.color.with_alpha(PREVIEW_ALPHA),
            }
        }
    }
}
