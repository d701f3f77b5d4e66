//! Configuration file support for redactor.
//!
//! Settings are stored as JSON in the user's config directory. Every field
//! has a default, so a partial file only overrides what it names, and a
//! missing file means "use the defaults". Command line flags override the
//! loaded values in `main.rs`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::{BatchOptions, DEFAULT_TICK_MS};
use crate::keybindings::KeyBindings;
use crate::model::Color;
use crate::undo::UndoConfig;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Hotkeys and their debounce delays
    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_app_name() -> String {
    "redactor".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Fill colour of redaction rectangles, as `#RRGGBB`
    #[serde(default = "default_rectangle_color")]
    pub rectangle_color: Color,

    /// Longest wait for input on each render tick, in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Folder rendered images are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path of the batch metadata file
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    /// Maximum undo snapshots kept per image (unbounded when absent)
    #[serde(default)]
    pub max_history: Option<usize>,

    /// Filter repeated hotkeys typed on stdin
    #[serde(default = "default_debounce")]
    pub debounce: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_rectangle_color() -> Color {
    Color::BLACK
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_images")
}

fn default_json_path() -> PathBuf {
    PathBuf::from("output.json")
}

fn default_debounce() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            rectangle_color: default_rectangle_color(),
            tick_ms: default_tick_ms(),
            output_dir: default_output_dir(),
            json_path: default_json_path(),
            max_history: None,
            debounce: default_debounce(),
            log_level: LogLevel::default(),
        }
    }
}

impl UserPreferences {
    /// Tick interval as a duration.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Undo settings derived from these preferences.
    pub fn undo_config(&self) -> UndoConfig {
        UndoConfig {
            max_history: self.max_history,
        }
    }

    /// Batch options derived from these preferences.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            tick: self.tick(),
            undo: self.undo_config(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        if let Some((a, b)) = config.keybindings.key_conflict() {
            return Err(ConfigError::KeyConflict {
                first: a.name(),
                second: b.name(),
            });
        }

        Ok(config)
    }

    /// Get the default config filename.
    pub fn default_filename() -> &'static str {
        "redactor-config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("redactor").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("redactor")
                    .join(Self::default_filename())
            })
        }
    }

    /// Read configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the configuration the application should run with, together with
    /// the file it was read from.
    ///
    /// An explicit path must exist and parse. Without one, the default path is
    /// tried and the defaults are used when no file is there. This usually runs
    /// before the logger exists, so the caller reports the source.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.exists()),
        };

        match source {
            Some(path) => Ok((Self::load_from(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Write the default configuration to `explicit`, or to the default path.
    ///
    /// Any existing file is replaced without being read, so a corrupt or
    /// outdated file can always be reset.
    pub fn init(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config = Self::default();
        match explicit {
            Some(path) => {
                config.save_to(path)?;
                Ok(path.to_path_buf())
            }
            None => config.save_to_default_path(),
        }
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path and return that path.
    pub fn save_to_default_path(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Two actions are bound to the same key
    #[error("Actions '{first}' and '{second}' are bound to the same key")]
    KeyConflict {
        first: &'static str,
        second: &'static str,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Neither a config nor a home directory could be determined
    #[error("Could not determine config directory")]
    NoConfigDir,
}
