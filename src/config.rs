use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::session::DEFAULT_STATS_INTERVAL_MS;

/// User settings, persisted as JSON. Missing fields take their defaults so
/// older files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub history_enabled: bool,
    pub auto_practice: bool,
    pub auto_save: bool,
    pub clear_session: bool,
    pub show_wpm: bool,
    pub show_accuracy: bool,
    pub disable_paste: bool,
    /// Gates the ctrl+d / ctrl+enter chords that end writing and practice.
    pub shortcuts_enabled: bool,
    pub theme: Theme,
    pub stats_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_enabled: true,
            auto_practice: true,
            auto_save: true,
            clear_session: false,
            show_wpm: true,
            show_accuracy: true,
            disable_paste: true,
            shortcuts_enabled: true,
            theme: Theme::System,
            stats_interval_ms: DEFAULT_STATS_INTERVAL_MS,
        }
    }
}

/// Colour scheme. `System` follows the terminal's background.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    /// Next theme in the order the settings screen cycles through.
    pub fn next(self) -> Self {
        match self {
            Theme::System => Theme::Light,
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
        }
    }

    /// Resolve `System` to light or dark from a `COLORFGBG` value
    /// (`"fg;bg"` or `"fg;default;bg"`). Without a hint, dark wins.
    pub fn resolve(self, colorfgbg: Option<&str>) -> Theme {
        if self != Theme::System {
            return self;
        }

        let background = colorfgbg
            .and_then(|value| value.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());

        match background {
            Some(7) | Some(9..=15) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// The boolean settings, in the order the settings screen lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Toggle {
    #[strum(to_string = "Save practice history")]
    HistoryEnabled,
    #[strum(to_string = "Show summary after writing")]
    AutoPractice,
    #[strum(to_string = "Auto-save note while typing")]
    AutoSave,
    #[strum(to_string = "Clear note when leaving summary")]
    ClearSession,
    #[strum(to_string = "Show live WPM")]
    ShowWpm,
    #[strum(to_string = "Show live accuracy")]
    ShowAccuracy,
    #[strum(to_string = "Block paste while practicing")]
    DisablePaste,
    #[strum(to_string = "Ctrl shortcuts to finish")]
    ShortcutsEnabled,
}

impl Toggle {
    pub const ALL: [Toggle; 8] = [
        Toggle::HistoryEnabled,
        Toggle::AutoPractice,
        Toggle::AutoSave,
        Toggle::ClearSession,
        Toggle::ShowWpm,
        Toggle::ShowAccuracy,
        Toggle::DisablePaste,
        Toggle::ShortcutsEnabled,
    ];
}

impl Settings {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::HistoryEnabled => self.history_enabled,
            Toggle::AutoPractice => self.auto_practice,
            Toggle::AutoSave => self.auto_save,
            Toggle::ClearSession => self.clear_session,
            Toggle::ShowWpm => self.show_wpm,
            Toggle::ShowAccuracy => self.show_accuracy,
            Toggle::DisablePaste => self.disable_paste,
            Toggle::ShortcutsEnabled => self.shortcuts_enabled,
        }
    }

    fn slot(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::HistoryEnabled => &mut self.history_enabled,
            Toggle::AutoPractice => &mut self.auto_practice,
            Toggle::AutoSave => &mut self.auto_save,
            Toggle::ClearSession => &mut self.clear_session,
            Toggle::ShowWpm => &mut self.show_wpm,
            Toggle::ShowAccuracy => &mut self.show_accuracy,
            Toggle::DisablePaste => &mut self.disable_paste,
            Toggle::ShortcutsEnabled => &mut self.shortcuts_enabled,
        }
    }

    pub fn set(&mut self, toggle: Toggle, value: bool) {
        *self.slot(toggle) = value;
    }

    /// Flip a setting and return its new value.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let slot = self.slot(toggle);
        *slot = !*slot;
        *slot
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typenotes_config.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Settings>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}
