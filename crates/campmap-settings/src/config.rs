//! Configuration for the map editor
//!
//! Supports JSON and TOML files, chosen by extension, stored under the
//! platform config directory by default.
//!
//! Configuration is organized into logical sections:
//! - Grid settings (snap on/off, spacing)
//! - Transform constraints (minimum/maximum size, angle snap, aspect lock)
//! - Appearance (ghost and lock opacity, icon sizing, lock border dash)
//! - History (undo depth)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Grid snapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Snap resize deltas to the grid
    pub enabled: bool,
    /// Grid spacing in map units
    pub size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 10.0,
        }
    }
}

/// Constraints applied by the transform handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Smallest width a resize may produce
    pub min_width: f64,
    /// Smallest height a resize may produce
    pub min_height: f64,
    /// Optional largest width
    #[serde(default)]
    pub max_width: Option<f64>,
    /// Optional largest height
    #[serde(default)]
    pub max_height: Option<f64>,
    /// Rotation increment used while the snap modifier is held, in degrees
    pub angle_snap_degrees: f64,
    /// Keep the aspect ratio while resizing (the modifier key inverts this)
    pub preserve_aspect_ratio: bool,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            min_width: 10.0,
            min_height: 10.0,
            max_width: None,
            max_height: None,
            angle_snap_degrees: 15.0,
            preserve_aspect_ratio: false,
        }
    }
}

/// How modules are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceSettings {
    /// Opacity of hidden modules
    pub ghost_opacity: f64,
    /// Opacity of locked modules
    pub locked_opacity: f64,
    /// Opacity of the lock badge drawn over locked modules
    pub lock_badge_opacity: f64,
    /// Icons are not drawn when the smaller side is below this
    pub icon_min_size: f64,
    /// Icon size as a fraction of the smaller side
    pub icon_scale: f64,
    /// Dash pattern of the locked border
    pub lock_dash: Vec<f64>,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            ghost_opacity: 0.3,
            locked_opacity: 0.85,
            lock_badge_opacity: 0.6,
            icon_min_size: 16.0,
            icon_scale: 0.5,
            lock_dash: vec![5.0, 5.0],
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum number of undoable commands kept
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EditorSettings {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub transform: TransformSettings,
    #[serde(default)]
    pub appearance: AppearanceSettings,
    #[serde(default)]
    pub history: HistorySettings,
}

impl EditorSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/campmap/editor.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("campmap").join("editor.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("No config directory, using default editor settings: {}", e);
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Failed to load editor settings from {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let settings: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.grid.size.is_finite() && self.grid.size > 0.0) {
            return Err(SettingsError::invalid("grid.size", "must be > 0"));
        }

        let t = &self.transform;
        if !(t.min_width.is_finite() && t.min_width > 0.0) {
            return Err(SettingsError::invalid("transform.min_width", "must be > 0"));
        }
        if !(t.min_height.is_finite() && t.min_height > 0.0) {
            return Err(SettingsError::invalid("transform.min_height", "must be > 0"));
        }
        if let Some(max) = t.max_width {
            if max.is_nan() || max < t.min_width {
                return Err(SettingsError::invalid(
                    "transform.max_width",
                    "must be >= min_width",
                ));
            }
        }
        if let Some(max) = t.max_height {
            if max.is_nan() || max < t.min_height {
                return Err(SettingsError::invalid(
                    "transform.max_height",
                    "must be >= min_height",
                ));
            }
        }
        if !(t.angle_snap_degrees > 0.0 && t.angle_snap_degrees <= 180.0) {
            return Err(SettingsError::invalid(
                "transform.angle_snap_degrees",
                "must be in (0, 180]",
            ));
        }

        let a = &self.appearance;
        for (key, value) in [
            ("appearance.ghost_opacity", a.ghost_opacity),
            ("appearance.locked_opacity", a.locked_opacity),
            ("appearance.lock_badge_opacity", a.lock_badge_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::invalid(key, "must be within 0..=1"));
            }
        }
        if !(a.icon_min_size >= 0.0) {
            return Err(SettingsError::invalid("appearance.icon_min_size", "must be >= 0"));
        }
        if !(a.icon_scale > 0.0 && a.icon_scale <= 1.0) {
            return Err(SettingsError::invalid("appearance.icon_scale", "must be in (0, 1]"));
        }

        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}
