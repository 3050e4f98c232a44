use sketchpad_core::{commands::OverflowPolicy, view::ZoomSettings, CanvasOptions, Color};

const DOCUMENTATION: &str = r#"# Sketchpad settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Every key is optional, missing keys take their default value.
#
# zoom_speed            Fraction of the view width zoomed per scroll step per second.
# zoom_smoothness       How quickly the view eases towards the zoom target, per second.
# default_color         RGB color strokes are drawn with before a palette color is picked.
# max_strokes           Most strokes visible at once. Further strokes are refused.
# history_depth         Most edits that can be undone.
# history_overflow      "reject" stops recording once full, "drop_oldest" forgets the oldest edit.
# interpolation_margin  Spacing between smoothed points, as a fraction of the view width.
# pool_buckets          Point buckets reserved at startup. Each holds 64 points.
"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Copy, Clone, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOverflow {
    #[default]
    Reject,
    DropOldest,
}
impl From<HistoryOverflow> for OverflowPolicy {
    fn from(value: HistoryOverflow) -> Self {
        match value {
            HistoryOverflow::Reject => Self::Reject,
            HistoryOverflow::DropOldest => Self::DropOldest,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("{0} must be finite and positive, got {1}")]
    NotPositive(&'static str, f32),
    #[error("{0} must be at least 1")]
    Zero(&'static str),
    #[error("default_color has a non-finite channel")]
    BadColor,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct Settings {
    pub zoom_speed: f32,
    pub zoom_smoothness: f32,
    pub default_color: [f32; 3],
    pub max_strokes: usize,
    pub history_depth: usize,
    pub history_overflow: HistoryOverflow,
    pub interpolation_margin: f32,
    pub pool_buckets: usize,
}
impl Default for Settings {
    fn default() -> Self {
        let zoom = ZoomSettings::default();
        let canvas = CanvasOptions::default();
        Self {
            zoom_speed: zoom.speed,
            zoom_smoothness: zoom.smoothness,
            default_color: [1.0, 1.0, 1.0],
            max_strokes: canvas.max_strokes,
            history_depth: canvas.history_depth,
            history_overflow: HistoryOverflow::default(),
            interpolation_margin: canvas.interpolation_margin,
            pool_buckets: canvas.pool_buckets,
        }
    }
}
impl Settings {
    pub const FILENAME: &'static str = "settings.toml";
    /// Default location of the settings file, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let mut path = preferences_dir()?;
        path.push(Self::FILENAME);
        Some(path)
    }
    /// Parse and validate settings from TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("zoom_speed", self.zoom_speed),
            ("zoom_smoothness", self.zoom_smoothness),
            ("interpolation_margin", self.interpolation_margin),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SettingsError::NotPositive(name, value));
            }
        }
        for (name, value) in [
            ("max_strokes", self.max_strokes),
            ("history_depth", self.history_depth),
        ] {
            if value == 0 {
                return Err(SettingsError::Zero(name));
            }
        }
        Color::opaque(self.default_color).map_err(|_| SettingsError::BadColor)?;
        Ok(())
    }
    /// Load from `path`, falling back to defaults if it is missing or malformed.
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let settings: anyhow::Result<Self> = try_block::try_block! {
            let text = std::fs::read_to_string(path)?;
            let settings = Self::from_toml(&text)?;
            Ok(settings)
        };
        match settings {
            Ok(settings) => {
                log::debug!("loaded settings from {path:?}");
                settings
            }
            Err(e) => {
                log::warn!("settings at {path:?} unavailable, defaulting: {e:#}");
                Self::default()
            }
        }
    }
    /// Load from the preferences directory, or defaults if unavailable.
    #[must_use]
    pub fn from_preferences() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                log::warn!("no preferences directory, default settings used");
                Self::default()
            }
        }
    }
    /// Write these settings to `path`, prefixed with documentation.
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let mut string = toml::ser::to_string_pretty(self)?;
        // Prefix some documentation.
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(path, string)?;
        Ok(())
    }
    /// Write these settings into the preferences directory.
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);
        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    #[must_use]
    pub fn zoom(&self) -> ZoomSettings {
        ZoomSettings {
            speed: self.zoom_speed,
            smoothness: self.zoom_smoothness,
        }
    }
    #[must_use]
    pub fn canvas_options(&self) -> CanvasOptions {
        CanvasOptions {
            pool_buckets: self.pool_buckets,
            max_strokes: self.max_strokes,
            history_depth: self.history_depth,
            history_overflow: self.history_overflow.into(),
            interpolation_margin: self.interpolation_margin,
        }
    }
    /// The starting brush color. White if the configured one is unusable.
    #[must_use]
    pub fn default_color(&self) -> Color {
        Color::opaque(self.default_color).unwrap_or(Color::WHITE)
    }
}

#[cfg(test)]
mod test {
    use super::{HistoryOverflow, Settings, SettingsError};
    use sketchpad_core::commands::OverflowPolicy;

    #[test]
    fn missing_keys_default() {
        let settings = Settings::from_toml("zoom_speed = 2.5\nhistory_overflow = \"drop_oldest\"").unwrap();
        assert_eq!(settings.zoom_speed, 2.5);
        assert_eq!(settings.history_overflow, HistoryOverflow::DropOldest);
        assert_eq!(
            settings.canvas_options().history_overflow,
            OverflowPolicy::DropOldest
        );
        assert_eq!(settings.zoom_smoothness, Settings::default().zoom_smoothness);
        assert_eq!(settings.max_strokes, 1024);
    }
    #[test]
    fn empty_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }
    #[test]
    fn rejects_bad_values() {
        assert!(Settings::from_toml("zoom_speed = \"fast\"").is_err());
        assert!(Settings::from_toml("history_overflow = \"wrap\"").is_err());
        let settings = Settings {
            interpolation_margin: 0.0,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NotPositive("interpolation_margin", 0.0))
        );
        let settings = Settings {
            history_depth: 0,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::Zero("history_depth")));
    }
    #[test]
    fn missing_file_defaults() {
        let path = std::env::temp_dir().join("sketchpad-settings-that-does-not-exist.toml");
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }
    #[test]
    fn saved_file_loads_back() {
        let path = std::env::temp_dir().join(format!(
            "sketchpad-settings-{}.toml",
            std::process::id()
        ));
        let settings = Settings {
            default_color: [0.25, 0.5, 1.0],
            history_overflow: HistoryOverflow::DropOldest,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Sketchpad settings."));
        assert_eq!(Settings::load_or_default(&path), settings);
        let _ = std::fs::remove_file(&path);
    }
}
