//! User-facing configuration, loaded from an optional JSON file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::search::DEFAULT_SEARCH_DEPTH;
use crate::models::session::Mode;
use crate::models::strategy::Tier;

/// Board palette. Presentation only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Side the human plays in AI mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    #[default]
    White,
    Black,
}

impl From<PlayerColor> for shakmaty::Color {
    fn from(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => shakmaty::Color::White,
            PlayerColor::Black => shakmaty::Color::Black,
        }
    }
}

/// Bounds of the strong tier's artificial thinking delay, in milliseconds.
/// The delay is drawn from `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThinkWindow {
    pub min: u64,
    pub max: u64,
}

impl ThinkWindow {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl Default for ThinkWindow {
    fn default() -> Self {
        Self::from_millis(1000, 2000)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub tier: Tier,
    pub theme: Theme,
    pub player_color: PlayerColor,
    /// Lookahead of the balanced tier, in plies
    pub search_depth: u8,
    pub engine_think_ms: ThinkWindow,
    /// How long a notification stays visible
    pub notification_ms: u64,
    /// Fixed seed for reproducible AI choices
    pub rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            tier: Tier::default(),
            theme: Theme::default(),
            player_color: PlayerColor::default(),
            search_depth: DEFAULT_SEARCH_DEPTH,
            engine_think_ms: ThinkWindow::default(),
            notification_ms: 3000,
            rng_seed: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text).context("invalid settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Load settings from `path` if it exists, otherwise use the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine_think_ms.min > self.engine_think_ms.max {
            bail!(
                "engine_think_ms.min ({}) exceeds engine_think_ms.max ({})",
                self.engine_think_ms.min,
                self.engine_think_ms.max
            );
        }
        if self.search_depth == 0 {
            bail!("search_depth must be at least 1");
        }
        Ok(())
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    /// JSON schema of the settings file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Settings)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.mode, Mode::Ai);
        assert_eq!(settings.tier, Tier::Random);
        assert_eq!(settings.search_depth, 2);
        assert_eq!(settings.engine_think_ms, ThinkWindow::from_millis(1000, 2000));
        assert_eq!(settings.notification_duration(), Duration::from_millis(3000));
        assert_eq!(settings.rng_seed, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "mode": "remote_peer", "tier": "balanced", "theme": "dark" }"#)
            .unwrap();
        assert_eq!(settings.mode, Mode::RemotePeer);
        assert_eq!(settings.tier, Tier::Balanced);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.search_depth, 2);
        assert_eq!(settings.notification_ms, 3000);
    }

    #[test]
    fn test_invalid_think_window_rejected() {
        let err = Settings::from_json(r#"{ "engine_think_ms": { "min": 500, "max": 100 } }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("exceeds"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(Settings::from_json("{ mode: ").is_err());
        assert!(Settings::from_json(r#"{ "tier": "grandmaster" }"#).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_or_default("/nonexistent/chess-duel/settings.json").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = Settings::json_schema();
        let properties = schema.get("properties").unwrap();
        assert!(properties.get("engine_think_ms").is_some());
        assert!(properties.get("rng_seed").is_some());
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
