//! # Canvas
//!
//! The frame-stepped editing engine. Each [`Canvas::step`] runs strictly in order:
//! 1. Undo, if requested.
//! 2. Begin a stroke on press, or extend the current one with smoothed points while held.
//! 3. Erase every stroke the eraser touches, while held.
//!
//! Rendering happens after, through [`Canvas::render`].

use smallvec::SmallVec;

use crate::{
    collision::Circle,
    commands::{Command, CommandKind, OverflowPolicy, UndoStack},
    repositories::points::PointPool,
    smoothing::Smoother,
    stroke::{Stroke, StrokeID, StrokeReader, StrokeStyle},
    strokes::{CapacityError, StrokeList},
    tools::Tool,
    Point,
};

/// Receives strokes to draw, back to front. Must tolerate empty strokes.
pub trait StrokeRenderer {
    fn draw(&mut self, id: StrokeID, stroke: &StrokeReader<'_>);
}

/// Primary pointer button state for a single frame.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ButtonState {
    /// Down this frame, including the frame it was pressed.
    pub held: bool,
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
}
impl ButtonState {
    pub const UP: Self = Self {
        held: false,
        pressed: false,
        released: false,
    };
    pub const PRESS: Self = Self {
        held: true,
        pressed: true,
        released: false,
    };
    pub const HOLD: Self = Self {
        held: true,
        pressed: false,
        released: false,
    };
    pub const RELEASE: Self = Self {
        held: false,
        pressed: false,
        released: true,
    };
}

/// Everything the canvas needs from the outside world for one frame.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct InputFrame {
    /// Pointer position in world space.
    pub cursor: Point,
    pub button: ButtonState,
    /// Undo was requested this frame.
    pub undo: bool,
    /// The pointer is on the toolbar. No stroke is begun and nothing is erased this frame.
    pub over_ui: bool,
    /// Current view width in world units, which sets the smoothing density.
    pub view_width: f32,
    pub tool: Tool,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CanvasOptions {
    /// Buckets reserved up front by the point pool.
    pub pool_buckets: usize,
    pub max_strokes: usize,
    pub history_depth: usize,
    pub history_overflow: OverflowPolicy,
    /// Fraction of the view width between smoothed points.
    pub interpolation_margin: f32,
}
impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            pool_buckets: crate::repositories::points::DEFAULT_CAPACITY_HINT,
            max_strokes: crate::strokes::DEFAULT_MAX_STROKES,
            history_depth: crate::commands::DEFAULT_DEPTH,
            history_overflow: OverflowPolicy::default(),
            interpolation_margin: crate::smoothing::DEFAULT_MARGIN,
        }
    }
}

/// What a single [`Canvas::step`] did.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct StepReport {
    pub undone: Option<CommandKind>,
    pub began: Option<StrokeID>,
    /// Points appended to strokes, including the first point of a new stroke.
    pub points_added: usize,
    /// Strokes removed by the eraser, in the order they were found.
    pub erased: SmallVec<[StrokeID; 4]>,
}
impl StepReport {
    /// Did anything visible change?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undone.is_none()
            && self.began.is_none()
            && self.points_added == 0
            && self.erased.is_empty()
    }
}

pub struct Canvas {
    strokes: StrokeList,
    history: UndoStack,
    pool: PointPool,
    smoother: Smoother,
    /// The stroke being extended, if the pointer is drawing.
    current: Option<StrokeID>,
    prev_cursor: Option<Point>,
}
impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasOptions::default())
    }
}
impl Canvas {
    #[must_use]
    pub fn new(options: CanvasOptions) -> Self {
        log::debug!("creating canvas with {options:?}");
        Self {
            strokes: StrokeList::new(options.max_strokes),
            history: UndoStack::new(options.history_depth, options.history_overflow),
            pool: PointPool::new(options.pool_buckets),
            smoother: Smoother::new(Point::zero(), options.interpolation_margin),
            current: None,
            prev_cursor: None,
        }
    }
    #[must_use]
    pub fn strokes(&self) -> &StrokeList {
        &self.strokes
    }
    #[must_use]
    pub fn history(&self) -> &UndoStack {
        &self.history
    }
    #[must_use]
    pub fn pool(&self) -> &PointPool {
        &self.pool
    }
    /// The stroke currently being drawn.
    #[must_use]
    pub fn current(&self) -> Option<StrokeID> {
        self.current
    }
    #[must_use]
    pub fn stroke_mut(&mut self, id: StrokeID) -> Option<&mut Stroke> {
        self.strokes.get_mut(id)
    }
    /// Run one frame of input.
    pub fn step(&mut self, frame: &InputFrame) -> StepReport {
        let mut report = StepReport::default();
        if frame.undo {
            report.undone = self.undo();
        }
        match frame.tool {
            Tool::Brush(style) => self.brush(frame, style, &mut report),
            Tool::Eraser { radius } => {
                self.current = None;
                if frame.button.held && !frame.over_ui {
                    self.erase(Circle::new(frame.cursor, radius), &mut report);
                }
            }
        }
        self.prev_cursor = Some(frame.cursor);
        report
    }
    fn brush(&mut self, frame: &InputFrame, style: StrokeStyle, report: &mut StepReport) {
        let button = frame.button;
        if button.pressed {
            if !frame.over_ui {
                match self.begin_stroke(style, frame.cursor) {
                    Ok(id) => {
                        report.began = Some(id);
                        report.points_added += 1;
                    }
                    Err(err) => log::warn!("stroke not started: {err}"),
                }
            }
        } else if (button.held || button.released) && self.prev_cursor != Some(frame.cursor) {
            if let Some(stroke) = self.current.and_then(|id| self.strokes.get_mut(id)) {
                report.points_added += self.smoother.advance(frame.cursor, frame.view_width, stroke);
            }
        }
        if !button.held {
            self.current = None;
        }
    }
    /// Start a stroke at `first`, recording it in the history.
    ///
    /// The stroke becomes the current one, extended by later held frames.
    pub fn begin_stroke(&mut self, style: StrokeStyle, first: Point) -> Result<StrokeID, CapacityError> {
        let id = self.strokes.begin(&self.pool, style)?;
        if let Some(stroke) = self.strokes.get_mut(id) {
            stroke.add_point(first);
        }
        self.smoother.reset(first);
        self.current = Some(id);
        if let Err(err) = self.history.push(Command::Draw { stroke: id }) {
            log::warn!("{id} will not be undoable: {err}");
        }
        Ok(id)
    }
    /// Remove every stroke with a point inside `circle`, recording each removal in the history.
    fn erase(&mut self, circle: Circle, report: &mut StepReport) {
        let mut index = 0;
        while let Some((id, stroke)) = self.strokes.get_index(index) {
            if !stroke.collide_circle(circle) {
                index += 1;
                continue;
            }
            if self.history.accepts() {
                let backup = stroke.clone();
                if let Err(err) = self.history.push(Command::Erase { stroke: id, backup }) {
                    log::warn!("erase of {id} will not be undoable: {err}");
                }
            } else {
                log::warn!("history full, erasing {id} without undo");
            }
            // Later strokes shift down into `index`.
            self.strokes.remove_at(index);
            if self.current == Some(id) {
                self.current = None;
            }
            report.erased.push(id);
        }
    }
    /// Reverse the most recent command. Returns what kind it was, None if nothing was undone.
    pub fn undo(&mut self) -> Option<CommandKind> {
        if matches!(self.history.peek()?, Command::Erase { .. }) && self.strokes.is_full() {
            log::warn!("no room to restore an erased stroke, undo skipped");
            return None;
        }
        let command = self.history.pop()?;
        let kind = command.kind();
        match command {
            Command::Draw { stroke } => {
                if !self.strokes.remove(stroke) {
                    log::debug!("undo draw: {stroke} no longer active");
                }
                if self.current == Some(stroke) {
                    self.current = None;
                }
            }
            Command::Erase { stroke, backup } => {
                if let Err(err) = self.strokes.restore(stroke, backup) {
                    log::warn!("undo erase of {stroke} lost: {err}");
                }
            }
        }
        log::debug!("undid {kind:?}, {} commands left", self.history.len());
        Some(kind)
    }
    /// Hand every active stroke to `renderer`, oldest (backmost) first.
    pub fn render(&self, renderer: &mut impl StrokeRenderer) {
        for (id, stroke) in self.strokes.iter() {
            renderer.draw(id, &stroke.read());
        }
    }
    /// Drop every stroke and command, then free the pool's memory.
    pub fn destroy(self) {
        let Self {
            strokes,
            history,
            pool,
            ..
        } = self;
        drop(strokes);
        drop(history);
        pool.destroy();
    }
}

#[cfg(test)]
mod test {
    use super::{ButtonState, Canvas, CanvasOptions, InputFrame, StrokeRenderer};
    use crate::{
        commands::{CommandKind, OverflowPolicy},
        stroke::{StrokeID, StrokeReader, StrokeStyle},
        tools::Tool,
        Point,
    };

    const BRUSH: Tool = Tool::Brush(StrokeStyle {
        color: crate::Color::BLACK,
        width: 5.0,
    });

    fn frame(cursor: Point, button: ButtonState, tool: Tool) -> InputFrame {
        InputFrame {
            cursor,
            button,
            undo: false,
            over_ui: false,
            view_width: 100.0,
            tool,
        }
    }
    fn undo_frame() -> InputFrame {
        InputFrame {
            undo: true,
            ..frame(Point::zero(), ButtonState::UP, BRUSH)
        }
    }
    /// Press at `from`, drag to `to`, release.
    fn drag(canvas: &mut Canvas, from: Point, to: Point) -> StrokeID {
        let began = canvas.step(&frame(from, ButtonState::PRESS, BRUSH)).began.unwrap();
        canvas.step(&frame((from + to) * 0.5, ButtonState::HOLD, BRUSH));
        canvas.step(&frame(to, ButtonState::RELEASE, BRUSH));
        began
    }
    fn points_of(canvas: &Canvas, id: StrokeID) -> Vec<Point> {
        canvas.strokes().get(id).unwrap().read().to_vec()
    }

    #[test]
    fn draw_extends_while_held() {
        let mut canvas = Canvas::default();
        let report = canvas.step(&frame(Point::zero(), ButtonState::PRESS, BRUSH));
        let id = report.began.unwrap();
        assert_eq!(report.points_added, 1);
        assert_eq!(canvas.current(), Some(id));

        let report = canvas.step(&frame(Point::new(10.0, 0.0), ButtonState::HOLD, BRUSH));
        assert_eq!(report.points_added, 11);
        // Unmoved cursor adds nothing.
        let report = canvas.step(&frame(Point::new(10.0, 0.0), ButtonState::HOLD, BRUSH));
        assert!(report.is_empty());

        let report = canvas.step(&frame(Point::new(20.0, 0.0), ButtonState::RELEASE, BRUSH));
        assert!(report.points_added > 0);
        assert!(canvas.current().is_none());
        let report = canvas.step(&frame(Point::new(30.0, 0.0), ButtonState::UP, BRUSH));
        assert!(report.is_empty());
        assert_eq!(points_of(&canvas, id).len(), 1 + 11 + 11);
    }
    #[test]
    fn undo_draw_round_trip() {
        let mut canvas = Canvas::default();
        drag(&mut canvas, Point::zero(), Point::new(50.0, 50.0));
        assert_eq!(canvas.strokes().len(), 1);
        let report = canvas.step(&undo_frame());
        assert_eq!(report.undone, Some(CommandKind::Draw));
        assert_eq!(canvas.strokes().len(), 0);
        // The slot is kept for reuse, and empty.
        assert_eq!(canvas.strokes().spares(), 1);
        assert_eq!(canvas.pool().usage().in_use(), 0);
        // Nothing left to undo.
        assert_eq!(canvas.step(&undo_frame()).undone, None);
    }
    #[test]
    fn undo_erase_round_trip() {
        let mut canvas = Canvas::default();
        let style = StrokeStyle::default();
        let id = canvas.begin_stroke(style, Point::new(0.0, 0.0)).unwrap();
        canvas
            .stroke_mut(id)
            .unwrap()
            .extend([Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        let expected = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)];

        let eraser = Tool::Eraser { radius: 0.5 };
        let report = canvas.step(&frame(Point::new(1.0, 1.2), ButtonState::PRESS, eraser));
        assert_eq!(report.erased.as_slice(), [id]);
        assert!(canvas.strokes().is_empty());

        let report = canvas.step(&undo_frame());
        assert_eq!(report.undone, Some(CommandKind::Erase));
        assert_eq!(canvas.strokes().len(), 1);
        assert_eq!(points_of(&canvas, id), expected);
        assert_eq!(canvas.strokes().get(id).unwrap().style(), style);
    }
    #[test]
    fn undo_draw_after_restore_removes_its_own_stroke() {
        let mut canvas = Canvas::default();
        let a = drag(&mut canvas, Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        let b = drag(&mut canvas, Point::new(50.0, 0.0), Point::new(50.0, 10.0));
        let eraser = Tool::Eraser { radius: 1.0 };
        let report = canvas.step(&frame(Point::new(0.0, 5.0), ButtonState::PRESS, eraser));
        assert_eq!(report.erased.as_slice(), [a]);

        // A comes back at the end of the list.
        canvas.step(&undo_frame());
        let order: Vec<_> = canvas.strokes().iter().map(|(id, _)| id).collect();
        assert_eq!(order, [b, a]);
        // Undoing B's draw removes B, not the most recent stroke.
        assert_eq!(canvas.step(&undo_frame()).undone, Some(CommandKind::Draw));
        let order: Vec<_> = canvas.strokes().iter().map(|(id, _)| id).collect();
        assert_eq!(order, [a]);
    }
    #[test]
    fn eraser_removes_every_touching_stroke() {
        let mut canvas = Canvas::default();
        let ids: Vec<_> = (0..4)
            .map(|i| {
                let x = i as f32 * 10.0;
                drag(&mut canvas, Point::new(x, -5.0), Point::new(x, 5.0))
            })
            .collect();
        let eraser = Tool::Eraser { radius: 12.0 };
        // Not erasing while the button is up.
        let report = canvas.step(&frame(Point::new(5.0, 0.0), ButtonState::UP, eraser));
        assert!(report.erased.is_empty());

        // Reaches strokes at x = 0 and 10. Removing 0 shifts 10 into its index.
        let report = canvas.step(&frame(Point::new(5.0, 0.0), ButtonState::HOLD, eraser));
        assert_eq!(report.erased.as_slice(), [ids[0], ids[1]]);
        let order: Vec<_> = canvas.strokes().iter().map(|(id, _)| id).collect();
        assert_eq!(order, [ids[2], ids[3]]);
        assert_eq!(canvas.history().len(), 4 + 2);
    }
    #[test]
    fn over_ui_blocks_begin_and_erase() {
        let mut canvas = Canvas::default();
        let report = canvas.step(&InputFrame {
            over_ui: true,
            ..frame(Point::zero(), ButtonState::PRESS, BRUSH)
        });
        assert!(report.began.is_none());
        assert!(canvas.strokes().is_empty());

        canvas.step(&frame(Point::zero(), ButtonState::PRESS, BRUSH));
        let report = canvas.step(&InputFrame {
            over_ui: true,
            ..frame(Point::new(5.0, 0.0), ButtonState::HOLD, BRUSH)
        });
        assert!(report.points_added > 0);
        canvas.step(&frame(Point::new(5.0, 0.0), ButtonState::RELEASE, BRUSH));

        let eraser = Tool::Eraser { radius: 10.0 };
        let report = canvas.step(&InputFrame {
            over_ui: true,
            ..frame(Point::zero(), ButtonState::PRESS, eraser)
        });
        assert!(report.erased.is_empty());
        assert_eq!(canvas.strokes().len(), 1);
    }
    #[test]
    fn full_history_rejects_quietly() {
        let mut canvas = Canvas::new(CanvasOptions {
            history_depth: 1,
            history_overflow: OverflowPolicy::Reject,
            ..CanvasOptions::default()
        });
        let a = drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let b = drag(&mut canvas, Point::new(5.0, 0.0), Point::new(6.0, 0.0));
        assert_eq!(canvas.history().len(), 1);
        // Only A's draw was recorded.
        canvas.step(&undo_frame());
        assert!(canvas.strokes().get(a).is_none());
        assert!(canvas.strokes().get(b).is_some());
        // Erasing with no room skips the backup but still erases.
        let mut canvas = Canvas::new(CanvasOptions {
            history_depth: 1,
            ..CanvasOptions::default()
        });
        let c = drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let eraser = Tool::Eraser { radius: 1.0 };
        let report = canvas.step(&frame(Point::zero(), ButtonState::PRESS, eraser));
        assert_eq!(report.erased.as_slice(), [c]);
        assert_eq!(canvas.history().len(), 1);
    }
    #[test]
    fn drop_oldest_keeps_recent() {
        let mut canvas = Canvas::new(CanvasOptions {
            history_depth: 1,
            history_overflow: OverflowPolicy::DropOldest,
            ..CanvasOptions::default()
        });
        let a = drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let b = drag(&mut canvas, Point::new(5.0, 0.0), Point::new(6.0, 0.0));
        canvas.step(&undo_frame());
        assert!(canvas.strokes().get(a).is_some());
        assert!(canvas.strokes().get(b).is_none());
    }
    #[test]
    fn full_list_rejects_begin() {
        let mut canvas = Canvas::new(CanvasOptions {
            max_strokes: 1,
            ..CanvasOptions::default()
        });
        drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let report = canvas.step(&frame(Point::new(9.0, 9.0), ButtonState::PRESS, BRUSH));
        assert!(report.began.is_none());
        // Holding afterwards doesn't extend the previous stroke.
        let report = canvas.step(&frame(Point::new(19.0, 9.0), ButtonState::HOLD, BRUSH));
        assert_eq!(report.points_added, 0);
        assert_eq!(canvas.strokes().len(), 1);
    }
    #[test]
    fn restore_skipped_when_full() {
        let mut canvas = Canvas::new(CanvasOptions {
            max_strokes: 1,
            history_depth: 2,
            history_overflow: OverflowPolicy::Reject,
            ..CanvasOptions::default()
        });
        let a = drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let eraser = Tool::Eraser { radius: 1.0 };
        canvas.step(&frame(Point::zero(), ButtonState::PRESS, eraser));
        // History is now full, so B's draw goes unrecorded and fills the list.
        let b = drag(&mut canvas, Point::new(9.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(canvas.history().len(), 2);
        assert!(canvas.strokes().is_full());

        assert_eq!(canvas.step(&undo_frame()).undone, None);
        // The erase stays on the stack for later.
        assert_eq!(canvas.history().len(), 2);
        assert!(canvas.strokes().get(a).is_none());
        assert!(canvas.strokes().get(b).is_some());
    }

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<(StrokeID, usize)>,
    }
    impl StrokeRenderer for Recorder {
        fn draw(&mut self, id: StrokeID, stroke: &StrokeReader<'_>) {
            self.drawn.push((id, stroke.len()));
        }
    }
    #[test]
    fn renders_back_to_front() {
        let mut canvas = Canvas::default();
        let a = drag(&mut canvas, Point::zero(), Point::new(1.0, 0.0));
        let b = drag(&mut canvas, Point::new(5.0, 0.0), Point::new(6.0, 0.0));
        let mut recorder = Recorder::default();
        canvas.render(&mut recorder);
        let ids: Vec<_> = recorder.drawn.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, [a, b]);
        assert!(recorder.drawn.iter().all(|&(_, len)| len > 0));
    }
    #[test]
    fn destroy_frees_pool() {
        let mut canvas = Canvas::default();
        drag(&mut canvas, Point::zero(), Point::new(100.0, 0.0));
        let pool = canvas.pool().clone();
        canvas.destroy();
        assert_eq!(pool.usage().regions, 0);
    }
}
