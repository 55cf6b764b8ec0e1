//! Game settings
//!
//! Passed by value into the engine at construction. Persisted as JSON next
//! to the word list and record log.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create settings directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Run length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Play until health runs out
    #[default]
    Endless,
    Thirty,
    Sixty,
    OneTwenty,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Endless => "Endless",
            GameMode::Thirty => "30s",
            GameMode::Sixty => "60s",
            GameMode::OneTwenty => "120s",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "endless" | "0" => Some(GameMode::Endless),
            "30" | "30s" | "thirty" => Some(GameMode::Thirty),
            "60" | "60s" | "sixty" => Some(GameMode::Sixty),
            "120" | "120s" | "onetwenty" => Some(GameMode::OneTwenty),
            _ => None,
        }
    }

    /// Time limit in seconds, `None` for endless runs
    pub fn duration(&self) -> Option<f32> {
        match self {
            GameMode::Endless => None,
            GameMode::Thirty => Some(30.0),
            GameMode::Sixty => Some(60.0),
            GameMode::OneTwenty => Some(120.0),
        }
    }

    /// Numeric code stored in the record log's `Mode` column
    pub fn code(&self) -> u32 {
        match self {
            GameMode::Endless => 0,
            GameMode::Thirty => 30,
            GameMode::Sixty => 60,
            GameMode::OneTwenty => 120,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(GameMode::Endless),
            30 => Some(GameMode::Thirty),
            60 => Some(GameMode::Sixty),
            120 => Some(GameMode::OneTwenty),
            _ => None,
        }
    }
}

/// RGB triple for a word on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl WordColor {
    pub const WHITE: WordColor = WordColor { r: 255, g: 255, b: 255 };
    pub const YELLOW: WordColor = WordColor { r: 255, g: 255, b: 0 };
    pub const RED: WordColor = WordColor { r: 255, g: 0, b: 0 };
}

/// Life-progress breakpoints of the white -> yellow -> red gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    /// Below this a word is pure white
    pub white: f32,
    /// Below this a word fades white to yellow, above it yellow to red
    pub yellow: f32,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            white: 0.33,
            yellow: 0.66,
        }
    }
}

impl ColorThresholds {
    /// Color for a life progress in `[0, 1]`
    pub fn color_for(&self, progress: f32) -> WordColor {
        let progress = progress.clamp(0.0, 1.0);

        if progress < self.white {
            return WordColor::WHITE;
        }

        if progress < self.yellow {
            let t = (progress - self.white) / (self.yellow - self.white);
            return WordColor {
                r: 255,
                g: 255,
                b: channel(1.0 - t),
            };
        }

        let span = 1.0 - self.yellow;
        let t = if span > 0.0 {
            (progress - self.yellow) / span
        } else {
            1.0
        };
        WordColor {
            r: 255,
            g: channel(1.0 - t),
            b: 0,
        }
    }
}

/// Scale a unit value to a color channel, truncating like an integer cast
fn channel(unit: f32) -> u8 {
    (255.0 * unit.clamp(0.0, 1.0)) as u8
}

/// Tunable gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Teleport ===
    /// Seconds between teleports at the start of a run
    pub base_teleport_interval: f32,
    /// Floor for the teleport interval
    pub min_teleport_interval: f32,
    /// Interval reduction per in-game second
    pub teleport_interval_decrease: f32,
    /// Fraction of the area width covered by one teleport
    pub teleport_step_ratio: f32,

    // === Spawn ===
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,
    /// Reduction of both spawn bounds per in-game second
    pub spawn_interval_decrease: f32,
    /// Floor for the lower spawn bound
    pub min_spawn_interval: f32,
    pub max_concurrent_words: usize,

    // === Health ===
    pub max_health: f32,
    pub health_gain: f32,
    pub health_loss: f32,
    pub health_cap: f32,

    // === Effects ===
    /// Seconds the red border stays lit after a wrong submit
    pub border_flash_duration: f32,
    pub min_combo_display: u32,
    pub colors: ColorThresholds,

    // === Play area ===
    pub game_area_height: u32,
    pub mode: GameMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_teleport_interval: 1.5,
            min_teleport_interval: 0.3,
            teleport_interval_decrease: 0.005,
            teleport_step_ratio: 0.15,

            spawn_interval_min: 2.0,
            spawn_interval_max: 4.0,
            spawn_interval_decrease: 0.01,
            min_spawn_interval: 0.8,
            max_concurrent_words: 8,

            max_health: 100.0,
            health_gain: 8.0,
            health_loss: 15.0,
            health_cap: 100.0,

            border_flash_duration: 0.3,
            min_combo_display: 5,
            colors: ColorThresholds::default(),

            game_area_height: 15,
            mode: GameMode::Endless,
        }
    }
}

impl Settings {
    /// Default settings with a different run length
    pub fn with_mode(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Copy with every value forced into a playable range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut s = self.clone();

        for (value, default) in [
            (&mut s.base_teleport_interval, defaults.base_teleport_interval),
            (&mut s.min_teleport_interval, defaults.min_teleport_interval),
            (&mut s.teleport_interval_decrease, defaults.teleport_interval_decrease),
            (&mut s.teleport_step_ratio, defaults.teleport_step_ratio),
            (&mut s.spawn_interval_min, defaults.spawn_interval_min),
            (&mut s.spawn_interval_max, defaults.spawn_interval_max),
            (&mut s.spawn_interval_decrease, defaults.spawn_interval_decrease),
            (&mut s.min_spawn_interval, defaults.min_spawn_interval),
            (&mut s.max_health, defaults.max_health),
            (&mut s.health_gain, defaults.health_gain),
            (&mut s.health_loss, defaults.health_loss),
            (&mut s.health_cap, defaults.health_cap),
            (&mut s.border_flash_duration, defaults.border_flash_duration),
            (&mut s.colors.white, defaults.colors.white),
            (&mut s.colors.yellow, defaults.colors.yellow),
        ] {
            if !value.is_finite() {
                *value = default;
            }
        }

        if !(s.min_teleport_interval > 0.0) {
            s.min_teleport_interval = defaults.min_teleport_interval;
        }
        if !(s.base_teleport_interval >= s.min_teleport_interval) {
            s.base_teleport_interval = s.min_teleport_interval;
        }
        s.teleport_interval_decrease = s.teleport_interval_decrease.max(0.0);
        if !(s.teleport_step_ratio > 0.0 && s.teleport_step_ratio <= 1.0) {
            s.teleport_step_ratio = defaults.teleport_step_ratio;
        }

        if !(s.min_spawn_interval > 0.0) {
            s.min_spawn_interval = defaults.min_spawn_interval;
        }
        s.spawn_interval_min = s.spawn_interval_min.max(s.min_spawn_interval);
        s.spawn_interval_max = s.spawn_interval_max.max(s.spawn_interval_min);
        s.spawn_interval_decrease = s.spawn_interval_decrease.max(0.0);
        s.max_concurrent_words = s.max_concurrent_words.max(1);

        s.health_cap = s.health_cap.clamp(1.0, 100.0);
        s.max_health = s.max_health.clamp(1.0, s.health_cap);
        s.health_gain = s.health_gain.max(0.0);
        s.health_loss = s.health_loss.max(0.0);
        s.border_flash_duration = s.border_flash_duration.max(0.0);

        let white = s.colors.white.clamp(0.0, 1.0);
        let yellow = s.colors.yellow.clamp(0.0, 1.0);
        if white < yellow {
            s.colors = ColorThresholds { white, yellow };
        } else {
            s.colors = defaults.colors;
        }

        s.game_area_height = s.game_area_height.max(1);
        s
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Read settings, falling back to defaults. A missing file is created
    /// with the default values so players have something to edit.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No settings at {}, writing defaults", path.display());
                let settings = Self::default();
                if let Err(e) = settings.save(path) {
                    log::warn!("{e}");
                }
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating the parent directory
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
