//! # Replay
//!
//! Drives a canvas from a scripted sequence of input frames, standing in for a window's event loop.
//! Scripts are TOML:
//!
//! ```toml
//! window = [1280, 720]
//!
//! [[frame]]
//! cursor = [640.0, 360.0]   # Screen pixels, 0,0 top left
//! button = "press"          # "up", "press", "hold" or "release"
//!
//! [[frame]]
//! cursor = [640.0, 360.0]
//! to = [800.0, 400.0]       # Sweep the cursor linearly...
//! steps = 20                # ...over this many frames
//! button = "hold"
//!
//! [[frame]]
//! toolbar = "eraser"        # Or { color = 3 }, "grow", "shrink"
//! undo = true
//! scroll = 1.0
//! pan = [0.0, -1.0]
//! dt = 0.016
//! ```

use anyhow::Context;
use sketchpad_core::{
    canvas::{ButtonState, InputFrame, StepReport},
    repositories::points::PoolUsage,
    tools::{Toolbar, ToolbarAction},
    view::{View, ZoomSettings},
    Canvas,
};

use crate::{batcher::QuadBatcher, settings::Settings};

/// Built in demo: draws three strokes, erases one, then undoes the erase.
pub const DEMO: &str = r#"
window = [1280, 720]

[[frame]]
cursor = [200.0, 200.0]
button = "press"
[[frame]]
cursor = [200.0, 200.0]
to = [600.0, 300.0]
steps = 30
button = "hold"
[[frame]]
cursor = [620.0, 320.0]
button = "release"

[[frame]]
cursor = [20.0, 120.0]
toolbar = { color = 1 }
button = "press"
[[frame]]
cursor = [300.0, 500.0]
button = "press"
[[frame]]
cursor = [300.0, 500.0]
to = [900.0, 450.0]
steps = 40
button = "hold"
[[frame]]
cursor = [900.0, 450.0]
button = "release"

[[frame]]
cursor = [20.0, 460.0]
toolbar = "grow"
button = "press"
[[frame]]
cursor = [1000.0, 100.0]
button = "press"
[[frame]]
cursor = [1000.0, 100.0]
to = [1100.0, 600.0]
steps = 25
button = "hold"
[[frame]]
cursor = [1100.0, 600.0]
button = "release"

[[frame]]
cursor = [20.0, 420.0]
toolbar = "eraser"
button = "press"
[[frame]]
cursor = [400.0, 250.0]
to = [420.0, 260.0]
steps = 5
button = "hold"
[[frame]]
cursor = [420.0, 260.0]
button = "release"

[[frame]]
undo = true
[[frame]]
scroll = 1.0
steps = 10
[[frame]]
pan = [1.0, 0.0]
steps = 10
"#;

const fn default_window() -> [u32; 2] {
    [1280, 720]
}
const fn default_dt() -> f32 {
    1.0 / 60.0
}
const fn default_steps() -> u32 {
    1
}

#[derive(serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_window")]
    pub window: [u32; 2],
    #[serde(default, rename = "frame")]
    pub frames: Vec<ScriptFrame>,
}
impl Script {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let script: Self = toml::from_str(text)?;
        if script.window.contains(&0) {
            anyhow::bail!("window must be non-empty, got {:?}", script.window);
        }
        Ok(script)
    }
    pub fn demo() -> anyhow::Result<Self> {
        Self::from_toml(DEMO)
    }
}

#[derive(serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    #[default]
    Up,
    Press,
    Hold,
    Release,
}
impl From<Button> for ButtonState {
    fn from(value: Button) -> Self {
        match value {
            Button::Up => Self::UP,
            Button::Press => Self::PRESS,
            Button::Hold => Self::HOLD,
            Button::Release => Self::RELEASE,
        }
    }
}

#[derive(serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarClick {
    Color(usize),
    Eraser,
    Grow,
    Shrink,
}
impl From<ToolbarClick> for ToolbarAction {
    fn from(value: ToolbarClick) -> Self {
        match value {
            ToolbarClick::Color(index) => Self::Color(index),
            ToolbarClick::Eraser => Self::Eraser,
            ToolbarClick::Grow => Self::Grow,
            ToolbarClick::Shrink => Self::Shrink,
        }
    }
}

/// One or more frames of input.
#[derive(serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScriptFrame {
    /// Cursor in screen pixels. Keeps the previous position if absent.
    pub cursor: Option<[f32; 2]>,
    /// Sweep target. The cursor reaches it on the last of `steps` frames.
    pub to: Option<[f32; 2]>,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub button: Button,
    /// A click on a toolbar button. The frame's press is swallowed by the toolbar.
    pub toolbar: Option<ToolbarClick>,
    #[serde(default)]
    pub undo: bool,
    #[serde(default)]
    pub scroll: f32,
    /// Pan direction, in view widths per second.
    #[serde(default)]
    pub pan: [f32; 2],
    #[serde(default = "default_dt")]
    pub dt: f32,
}

/// Totals of a whole replay.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Summary {
    pub frames: usize,
    pub strokes_begun: usize,
    pub points_added: usize,
    pub strokes_erased: usize,
    pub undos: usize,
    pub active_strokes: usize,
    /// Geometry of the final frame.
    pub vertices: usize,
    pub triangles: usize,
    pub pool: Option<PoolUsage>,
}
impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "frames:          {}", self.frames)?;
        writeln!(f, "strokes begun:   {}", self.strokes_begun)?;
        writeln!(f, "points added:    {}", self.points_added)?;
        writeln!(f, "strokes erased:  {}", self.strokes_erased)?;
        writeln!(f, "undos:           {}", self.undos)?;
        writeln!(f, "active strokes:  {}", self.active_strokes)?;
        write!(
            f,
            "last frame:      {} vertices, {} triangles",
            self.vertices, self.triangles
        )?;
        if let Some(pool) = self.pool {
            write!(
                f,
                "\npoint buckets:   {} in use, {} free, {} bytes reserved",
                pool.in_use(),
                pool.free,
                pool.reserved_bytes
            )?;
        }
        Ok(())
    }
}

pub struct Replay {
    canvas: Canvas,
    view: View,
    toolbar: Toolbar,
    zoom: ZoomSettings,
    window: [u32; 2],
    batcher: QuadBatcher,
    cursor: ultraviolet::Vec2,
    summary: Summary,
}
impl Replay {
    #[must_use]
    pub fn new(settings: &Settings, window: [u32; 2]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let center = ultraviolet::Vec2::new(window[0] as f32, window[1] as f32) * 0.5;
        Self {
            canvas: Canvas::new(settings.canvas_options()),
            view: View::for_window(window),
            toolbar: Toolbar::new(settings.default_color()),
            zoom: settings.zoom(),
            window,
            batcher: QuadBatcher::new(),
            cursor: center,
            summary: Summary::default(),
        }
    }
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }
    #[must_use]
    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }
    #[must_use]
    pub fn batcher(&self) -> &QuadBatcher {
        &self.batcher
    }
    /// Run every frame of `script`, then summarize.
    pub fn run(&mut self, script: &Script) -> anyhow::Result<Summary> {
        for (index, frame) in script.frames.iter().enumerate() {
            self.run_frame(frame)
                .with_context(|| format!("script frame #{index}"))?;
        }
        Ok(self.summary())
    }
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            active_strokes: self.canvas.strokes().len(),
            vertices: self.batcher.vertices().len(),
            triangles: self.batcher.indices().len() / 3,
            pool: Some(self.canvas.pool().usage()),
            ..self.summary.clone()
        }
    }
    /// Run one script entry, which may expand into several frames.
    pub fn run_frame(&mut self, frame: &ScriptFrame) -> anyhow::Result<()> {
        let start = frame.cursor.map_or(self.cursor, ultraviolet::Vec2::from);
        let steps = frame.steps.max(1);
        for step in 1..=steps {
            #[allow(clippy::cast_precision_loss)]
            let t = step as f32 / steps as f32;
            let cursor = match frame.to {
                Some(to) => start + (ultraviolet::Vec2::from(to) - start) * t,
                None => start,
            };
            // Only the first frame of a sweep carries one-shot inputs.
            let first = step == 1;
            self.step(
                cursor,
                frame.button.into(),
                first.then_some(frame.toolbar).flatten(),
                first && frame.undo,
                frame.scroll,
                frame.pan.into(),
                frame.dt,
            )?;
        }
        Ok(())
    }
    #[allow(clippy::too_many_arguments)]
    fn step(
        &mut self,
        screen_cursor: ultraviolet::Vec2,
        button: ButtonState,
        toolbar: Option<ToolbarClick>,
        undo: bool,
        scroll: f32,
        pan: ultraviolet::Vec2,
        dt: f32,
    ) -> anyhow::Result<StepReport> {
        #[allow(clippy::cast_precision_loss)]
        let aspect_ratio = self.window[0] as f32 / self.window[1] as f32;
        self.view.set_aspect_ratio(aspect_ratio);
        self.view.pan(pan, dt);
        self.view.zoom(scroll, dt, self.zoom);

        self.cursor = screen_cursor;
        let cursor = self.view.unproject_screen(screen_cursor, self.window)?;
        if let Some(click) = toolbar {
            if !self.toolbar.apply(click.into()) {
                log::warn!("toolbar has no {click:?} button");
            }
        }
        let input = InputFrame {
            cursor,
            button,
            undo,
            over_ui: toolbar.is_some(),
            view_width: self.view.width(),
            tool: self.toolbar.tool(),
        };
        let report = self.canvas.step(&input);
        self.record(&report);

        self.batcher.clear();
        self.canvas.render(&mut self.batcher);
        log::trace!(
            "frame {}: {} vertices in {} draws",
            self.summary.frames,
            self.batcher.vertices().len(),
            self.batcher.draws().len()
        );
        Ok(report)
    }
    fn record(&mut self, report: &StepReport) {
        let summary = &mut self.summary;
        summary.frames += 1;
        if !report.is_empty() {
            log::debug!("frame {}: {report:?}", summary.frames);
        }
        summary.strokes_begun += usize::from(report.began.is_some());
        summary.points_added += report.points_added;
        summary.strokes_erased += report.erased.len();
        summary.undos += usize::from(report.undone.is_some());
    }
}

#[cfg(test)]
mod test {
    use super::{Button, Replay, Script, ScriptFrame, ToolbarClick};
    use crate::settings::Settings;

    #[test]
    fn demo_runs() {
        let script = Script::demo().unwrap();
        let mut replay = Replay::new(&Settings::default(), script.window);
        let summary = replay.run(&script).unwrap();
        assert_eq!(summary.strokes_begun, 3);
        assert_eq!(summary.strokes_erased, 1);
        assert_eq!(summary.undos, 1);
        // The erased stroke came back.
        assert_eq!(summary.active_strokes, 3);
        assert!(summary.vertices > 0);
        assert_eq!(summary.vertices % 4, 0);
        // Toolbar clicks: red, grow, eraser.
        assert!(replay.toolbar().is_eraser());
        assert_eq!(replay.toolbar().brush_size(), 7.0);
        assert!(replay.view().width() < 1280.0);
    }
    #[test]
    fn toolbar_press_does_not_draw() {
        let script = Script::from_toml(
            r#"
            [[frame]]
            cursor = [10.0, 10.0]
            toolbar = { color = 2 }
            button = "press"
            "#,
        )
        .unwrap();
        assert_eq!(script.frames[0].toolbar, Some(ToolbarClick::Color(2)));
        assert_eq!(script.frames[0].button, Button::Press);
        let mut replay = Replay::new(&Settings::default(), script.window);
        let summary = replay.run(&script).unwrap();
        assert_eq!(summary.strokes_begun, 0);
        assert_eq!(replay.toolbar().selected(), 2);
    }
    #[test]
    fn sweep_expands_frames() {
        let mut replay = Replay::new(&Settings::default(), [100, 100]);
        let press = ScriptFrame {
            cursor: Some([0.0, 0.0]),
            to: None,
            steps: 1,
            button: Button::Press,
            toolbar: None,
            undo: false,
            scroll: 0.0,
            pan: [0.0; 2],
            dt: 1.0 / 60.0,
        };
        replay.run_frame(&press).unwrap();
        let sweep = ScriptFrame {
            to: Some([100.0, 0.0]),
            steps: 4,
            button: Button::Hold,
            ..press.clone()
        };
        replay.run_frame(&sweep).unwrap();
        let summary = replay.summary();
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.strokes_begun, 1);
        // One unit spacing over the hundred unit wide view, 25 units per frame.
        assert_eq!(summary.points_added, 1 + 4 * 26);
    }
    #[test]
    fn rejects_unknown_keys() {
        assert!(Script::from_toml("[[frame]]\nclick = true").is_err());
        assert!(Script::from_toml("window = [0, 10]").is_err());
    }
}
