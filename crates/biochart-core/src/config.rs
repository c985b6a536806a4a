//! Display configuration shared by loaders and renderers

use crate::channel::Channel;
use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level chart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Channels in stacking order
    pub channels: Vec<ChannelConfig>,
    /// Global display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Per-channel display attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_y_min")]
    pub y_axis_min: f64,
    #[serde(default = "default_y_max")]
    pub y_axis_max: f64,
}

/// Global display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub grid_visible: bool,
    /// Redraw rate in frames per second for interactive front ends
    pub refresh_rate: u32,
    /// Horizontal pixels per second
    pub time_scale: f64,
}

fn default_color() -> String {
    crate::channel::DEFAULT_CHANNEL_COLOR.to_string()
}

fn default_scale() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn default_y_min() -> f64 {
    -1.0
}

fn default_y_max() -> f64 {
    1.0
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            grid_visible: true,
            refresh_rate: 30,
            time_scale: 1.0,
        }
    }
}

impl ChannelConfig {
    /// Create an entry with default display attributes
    pub fn new(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            scale: default_scale(),
            visible: default_visible(),
            y_axis_min: default_y_min(),
            y_axis_max: default_y_max(),
        }
    }

    /// Empty channel carrying these display attributes
    pub fn to_channel(&self) -> Channel {
        let mut channel = Channel::new(self.id.clone(), self.name.clone());
        self.apply_to(&mut channel);
        channel
    }

    /// Copy display attributes onto an existing channel, leaving its data alone
    pub fn apply_to(&self, channel: &mut Channel) {
        channel.color = self.color.clone();
        channel.scale = self.scale;
        channel.visible = self.visible;
        channel.set_y_range(self.y_axis_min, self.y_axis_max);
    }
}

impl Default for ChartConfig {
    /// Four-channel bedside layout
    fn default() -> Self {
        Self {
            channels: vec![
                ChannelConfig::new("1", "ECG", "#FF0000"),
                ChannelConfig::new("2", "Blood Pressure", "#00FF00"),
                ChannelConfig::new("3", "SpO2", "#0000FF"),
                ChannelConfig::new("4", "Respiration", "#FFFF00"),
            ],
            display: DisplayConfig::default(),
        }
    }
}

impl ChartConfig {
    /// Channel IDs in stacking order
    pub fn ordered_ids(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.id.clone()).collect()
    }

    pub fn channel(&self, id: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Configured display name for an ID
    pub fn channel_name(&self, id: &str) -> Option<&str> {
        self.channel(id).map(|c| c.name.as_str())
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load a configuration file, falling back to the default layout on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("using default configuration, failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = ChartConfig::default();
        assert_eq!(config.ordered_ids(), vec!["1", "2", "3", "4"]);
        assert_eq!(config.channel_name("3"), Some("SpO2"));
        assert_eq!(config.channel_name("9"), None);
        assert!(config.display.grid_visible);
        assert_eq!(config.display.refresh_rate, 30);
    }

    #[test]
    fn test_json_serialization() {
        let config = ChartConfig::default();
        let json = config.to_json().unwrap();
        assert!(json.contains("Blood Pressure"));

        let deserialized = ChartConfig::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let json = r#"{ "channels": [ { "id": "ecg", "name": "Lead II", "y_axis_max": 2.5 } ] }"#;
        let config = ChartConfig::from_json(json).unwrap();

        let channel = config.channels[0].to_channel();
        assert_eq!(channel.color, "#FF0000");
        assert!(channel.visible);
        assert_eq!((channel.y_axis_min, channel.y_axis_max), (-1.0, 2.5));
        assert_eq!(config.display, DisplayConfig::default());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(ChartConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = ChartConfig::load_or_default("/nonexistent/biochart/config.json");
        assert_eq!(config, ChartConfig::default());
    }
}
