//! Campmap Settings Crate
//!
//! Handles editor configuration and settings persistence.

pub mod config;
pub mod error;

pub use config::{
    AppearanceSettings, EditorSettings, GridSettings, HistorySettings, TransformSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
