//! Overlay configuration: trigger button, edge-joint marker and marquee style.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::engine::DashedStroke;
use crate::error::{OverlayError, OverlayResult};
use crate::event::PointerButton;
use crate::keys::EDGE_JOINT_MARKER;

/// Environment variable that overrides the edge-joint marker.
pub const MARKER_ENV: &str = "GRAPH_MARQUEE_EDGE_JOINT_MARKER";

/// Straight (non-premultiplied) RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaColor {
    /// Build from 8-bit channels and a float alpha, the way CSS `rgba()` reads.
    pub fn from_css(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Channels as 8-bit values (rounded).
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    fn validate(&self) -> OverlayResult<()> {
        for (component, value) in [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OverlayError::InvalidColor { component, value });
            }
        }
        Ok(())
    }
}

/// Visual style of the marquee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectStyle {
    #[serde(default = "default_stroke_color")]
    pub stroke_color: RgbaColor,
    #[serde(default = "default_fill_color")]
    pub fill_color: RgbaColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Dash and gap length in canvas units.
    #[serde(default = "default_dash_length")]
    pub dash_length: f32,
}

fn default_stroke_color() -> RgbaColor {
    RgbaColor::from_css(78, 146, 237, 0.75)
}

fn default_fill_color() -> RgbaColor {
    RgbaColor::from_css(151, 194, 252, 0.45)
}

fn default_stroke_width() -> f32 {
    1.0
}

fn default_dash_length() -> f32 {
    5.0
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            stroke_color: default_stroke_color(),
            fill_color: default_fill_color(),
            stroke_width: default_stroke_width(),
            dash_length: default_dash_length(),
        }
    }
}

impl RectStyle {
    pub fn stroke(&self) -> DashedStroke {
        DashedStroke {
            color: self.stroke_color,
            width: self.stroke_width,
            dash_length: self.dash_length,
            gap_length: self.dash_length,
        }
    }
}

/// Configuration for a [`DragSelectOverlay`](crate::DragSelectOverlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Button that drives both the marquee and joint removal.
    #[serde(default = "default_trigger_button")]
    pub trigger_button: PointerButton,

    /// Substring identifying edge-joint node keys.
    #[serde(default = "default_marker")]
    pub edge_joint_marker: String,

    /// Pick radius for hover tracking, in canvas units.
    #[serde(default = "default_hover_radius")]
    pub hover_radius: f32,

    #[serde(default)]
    pub style: RectStyle,
}

fn default_trigger_button() -> PointerButton {
    PointerButton::Secondary
}

fn default_marker() -> String {
    EDGE_JOINT_MARKER.to_string()
}

fn default_hover_radius() -> f32 {
    8.0
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            trigger_button: default_trigger_button(),
            edge_joint_marker: default_marker(),
            hover_radius: default_hover_radius(),
            style: RectStyle::default(),
        }
    }
}

impl OverlayConfig {
    /// Load from the platform config file (if present) with environment overrides.
    pub fn load() -> OverlayResult<Self> {
        let config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> OverlayResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OverlayError::config_load(path, e.to_string()))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| OverlayError::config_load(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> OverlayResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Location of `config.json` in the platform config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "graph-marquee", "graph-marquee")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Apply `GRAPH_MARQUEE_EDGE_JOINT_MARKER` if set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(MARKER_ENV) {
            Ok(marker) if !marker.is_empty() => Self {
                edge_joint_marker: marker,
                ..self
            },
            _ => self,
        }
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if self.edge_joint_marker.is_empty() {
            return Err(OverlayError::Config(
                "edge_joint_marker must not be empty".to_string(),
            ));
        }
        if !(self.hover_radius.is_finite() && self.hover_radius >= 0.0) {
            return Err(OverlayError::Config(format!(
                "Invalid hover_radius: {}",
                self.hover_radius
            )));
        }
        if self.style.dash_length.is_nan() || self.style.dash_length <= 0.0 {
            return Err(OverlayError::Config(format!(
                "Invalid dash_length: {}",
                self.style.dash_length
            )));
        }
        self.style.stroke_color.validate()?;
        self.style.fill_color.validate()
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "trigger_button" => Some(self.trigger_button.label().to_string()),
            "edge_joint_marker" => Some(self.edge_joint_marker.clone()),
            "hover_radius" => Some(self.hover_radius.to_string()),
            "dash_length" => Some(self.style.dash_length.to_string()),
            "stroke_width" => Some(self.style.stroke_width.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OverlayResult<()> {
        let parse_f32 = |value: &str| {
            value
                .parse::<f32>()
                .map_err(|_| OverlayError::Config(format!("Invalid number: {}", value)))
        };
        match key {
            "trigger_button" => {
                self.trigger_button = match value {
                    "primary" => PointerButton::Primary,
                    "secondary" => PointerButton::Secondary,
                    "middle" => PointerButton::Middle,
                    "extra" => PointerButton::Extra,
                    _ => {
                        return Err(OverlayError::Config(format!(
                            "Unknown button: {}",
                            value
                        )))
                    }
                };
            }
            "edge_joint_marker" => self.edge_joint_marker = value.to_string(),
            "hover_radius" => self.hover_radius = parse_f32(value)?,
            "dash_length" => self.style.dash_length = parse_f32(value)?,
            "stroke_width" => self.style.stroke_width = parse_f32(value)?,
            _ => {
                return Err(OverlayError::Config(format!(
                    "Unknown config key: {}",
                    key
                )));
            }
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_marquee() {
        let config = OverlayConfig::default();
        assert_eq!(config.trigger_button, PointerButton::Secondary);
        assert_eq!(config.edge_joint_marker, "edgeJoint");
        assert_eq!(config.style.stroke_color.to_rgba8(), [78, 146, 237, 191]);
        assert_eq!(config.style.fill_color.to_rgba8(), [151, 194, 252, 115]);
        assert_eq!(config.style.dash_length, 5.0);
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{ "edge_joint_marker": "bend" }"#).unwrap();
        assert_eq!(config.edge_joint_marker, "bend");
        assert_eq!(config.trigger_button, PointerButton::Secondary);
        assert_eq!(config.style.dash_length, 5.0);
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = OverlayConfig::default();
        config.set("hover_radius", "12").unwrap();
        config.save_to(&path).unwrap();

        let loaded = OverlayConfig::from_path(&path).unwrap();
        assert_eq!(loaded.hover_radius, 12.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = OverlayConfig::default();
        assert!(config.set("hover_radius", "far").is_err());
        assert!(config.set("trigger_button", "thumb").is_err());
        assert!(config.set("nope", "1").is_err());
        assert!(config.set("edge_joint_marker", "").is_err());

        config.edge_joint_marker = "edgeJoint".to_string();
        config.style.fill_color.a = 1.5;
        assert!(matches!(
            config.validate(),
            Err(OverlayError::InvalidColor { component: "a", .. })
        ));
    }

    #[test]
    fn broken_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match OverlayConfig::from_path(&path) {
            Err(OverlayError::ConfigLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
