//! Startup configuration for the teleop node.
//!
//! Loaded once before the publish loop starts and treated as read-only
//! afterwards. A missing config file degrades to defaults so the node stays
//! usable on a fresh machine; a present but malformed file is a startup
//! error, since silently ignoring a broken config hides typos in scale
//! factors and topic names.

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Names of the two output channels.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TopicConfig {
    /// Velocity command channel
    pub twist: String,
    /// Joystick passthrough channel
    pub joy: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            twist: "cmd_vel".to_string(),
            joy: "spacenav/joy".to_string(),
        }
    }
}

/// Scale factors applied on top of the hardware normalization.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ScalingConfig {
    pub linear: f64,
    pub rotation: f64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            linear: 10.0,
            rotation: 10.0,
        }
    }
}

/// MQTT broker endpoint, `host` or `host:port`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MqttServerConfig {
    pub url: String,
    pub user: String,
    pub pw: String,
}

impl Default for MqttServerConfig {
    fn default() -> Self {
        Self {
            url: "localhost:1883".to_string(),
            user: String::new(),
            pw: String::new(),
        }
    }
}

/// Optional override for which HID device to claim. Left empty, the backend
/// scans for the known 3Dconnexion ids.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

/// Complete startup configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TeleopConfig {
    pub topics: TopicConfig,
    pub scaling: ScalingConfig,
    pub mqtt: MqttServerConfig,
    pub device: DeviceConfig,
}

impl TeleopConfig {
    /// Default on-disk location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spacenav-teleop").join("config.toml"))
    }

    /// Loads the configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using default configuration",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        debug!("Configuration: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = TeleopConfig::default();
        assert_eq!(config.topics.twist, "cmd_vel");
        assert_eq!(config.topics.joy, "spacenav/joy");
        assert_eq!(config.scaling.linear, 10.0);
        assert_eq!(config.scaling.rotation, 10.0);
        assert_eq!(config.mqtt.url, "localhost:1883");
        assert_eq!(config.device.vendor_id, None);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let raw = r#"
            [scaling]
            linear = 2.5

            [topics]
            twist = "robot/cmd_vel"
        "#;
        let config: TeleopConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.scaling.linear, 2.5);
        assert_eq!(config.scaling.rotation, 10.0);
        assert_eq!(config.topics.twist, "robot/cmd_vel");
        assert_eq!(config.topics.joy, "spacenav/joy");
        assert_eq!(config.mqtt, MqttServerConfig::default());
    }

    #[test]
    fn device_override_parses_hex_ids() {
        let raw = r#"
            [device]
            vendor_id = 0x256f
            product_id = 0xc635
        "#;
        let config: TeleopConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.device.vendor_id, Some(0x256f));
        assert_eq!(config.device.product_id, Some(0xc635));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = TeleopConfig::load_from(Path::new("/nonexistent/teleop.toml")).unwrap();
        assert_eq!(config, TeleopConfig::default());
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(toml::from_str::<TeleopConfig>("topics = 3").is_err());
    }
}
