// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Felicity Card.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result};
use felicity_types::CardConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Every problem found in a configuration, reported together
#[derive(Error, Debug)]
#[error("Invalid configuration: {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);

/// Application configuration for the `felicity` binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Card configuration as the dashboard would hold it
    #[serde(default)]
    pub card: CardConfig,

    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Home Assistant connection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    /// Defaults to `HA_BASE_URL`, then `http://localhost:8123`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Long-lived access token, defaults to `HA_TOKEN`
    #[serde(default)]
    pub token: Option<String>,
}

/// SVG output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Vertical gauge size; horizontal bars use it rotated
    #[serde(default = "default_gauge_width")]
    pub gauge_width: u32,
    #[serde(default = "default_gauge_height")]
    pub gauge_height: u32,

    #[serde(default = "default_diagram_width")]
    pub diagram_width: u32,
    #[serde(default = "default_diagram_height")]
    pub diagram_height: u32,
}

// Default value functions for serde
fn default_output_dir() -> PathBuf {
    PathBuf::from("felicity-out")
}

fn default_gauge_width() -> u32 {
    80
}

fn default_gauge_height() -> u32 {
    200
}

fn default_diagram_width() -> u32 {
    400
}

fn default_diagram_height() -> u32 {
    300
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            gauge_width: default_gauge_width(),
            gauge_height: default_gauge_height(),
            diagram_width: default_diagram_width(),
            diagram_height: default_diagram_height(),
        }
    }
}

impl RenderConfig {
    pub fn gauge_size(&self) -> (u32, u32) {
        (self.gauge_width, self.gauge_height)
    }

    pub fn diagram_size(&self) -> (u32, u32) {
        (self.diagram_width, self.diagram_height)
    }
}

impl AppConfig {
    /// Load configuration from an explicit file, HA addon options or a config file
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!("✅ Loaded configuration from {}", path.display());
            config.validate()?;
            return Ok(config);
        }

        Self::load_from(&[
            PathBuf::from(ADDON_OPTIONS_PATH),
            PathBuf::from("config.toml"),
            PathBuf::from("config.json"),
        ])
    }

    /// First readable candidate wins; defaults with environment overrides when none exists
    pub fn load_from(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            if path.exists() {
                let config = Self::from_file(path)?;
                info!("✅ Loaded configuration from {}", path.display());
                config.validate()?;
                return Ok(config);
            }
        }

        warn!("No configuration file found, using defaults with environment overrides");
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
    }

    /// Load from environment variables (development/testing)
    fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("HA_BASE_URL") {
            config.home_assistant.base_url = Some(url);
        }
        if let Ok(token) = std::env::var("HA_TOKEN") {
            config.home_assistant.token = Some(token);
        }
        if let Ok(device_id) = std::env::var("FELICITY_DEVICE_ID")
            && !device_id.is_empty()
        {
            config.card.device_id = Some(device_id);
        }

        config
    }

    /// Validate configuration, collecting every error
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Some(device_id) = &self.card.device_id
            && (device_id.is_empty()
                || !device_id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        {
            errors.push(format!("card.device_id '{device_id}' is not a device id"));
        }

        for (key, spec) in &self.card.overrides {
            let source = spec.normalize();
            if !is_entity_id(&source.source_id) {
                errors.push(format!(
                    "override '{key}' points at '{}', expected <domain>.<object_id>",
                    source.source_id
                ));
            }
        }

        for row in &self.card.entities {
            if !is_entity_id(&row.source_id) {
                errors.push(format!("entity row '{}' is not an entity id", row.source_id));
            }
        }

        for row in &self.card.econ_rules {
            if !is_entity_id(&row.source_id) {
                errors.push(format!(
                    "economic rule '{}' is not an entity id",
                    row.source_id
                ));
            }
        }

        if self.card.currency.trim().is_empty() {
            errors.push("card.currency must not be empty".to_owned());
        }

        if let Some(url) = &self.home_assistant.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            errors.push(format!("home_assistant.base_url '{url}' must be http(s)"));
        }

        let render = &self.render;
        for (name, value) in [
            ("gauge_width", render.gauge_width),
            ("gauge_height", render.gauge_height),
            ("diagram_width", render.diagram_width),
            ("diagram_height", render.diagram_height),
        ] {
            if value < 20 {
                errors.push(format!("render.{name} must be at least 20 px (got {value})"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(errors))
        }
    }
}

fn is_entity_id(source_id: &str) -> bool {
    source_id
        .split_once('.')
        .is_some_and(|(domain, object)| !domain.is_empty() && !object.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use felicity_types::{InverterModel, OverrideSpec};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.render.gauge_size(), (80, 200));
        assert_eq!(config.card.currency, "€");
    }

    #[test]
    fn test_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.toml",
            r#"
[card]
name = "Garage inverter"
device_id = "a1b2c3"
inverter_model = "trex-50"

[card.overrides]
current_price = "sensor.spot_price"
ac_output_active_power = { source_id = "sensor.home_energy", mode = "energy_to_power" }

[home_assistant]
base_url = "http://homeassistant.local:8123"

[render]
output_dir = "/tmp/felicity"
"#,
        );

        let config = AppConfig::load_from(&[path]).unwrap();
        assert_eq!(config.card.device_id.as_deref(), Some("a1b2c3"));
        assert_eq!(config.card.inverter_model, InverterModel::Trex50);
        assert_eq!(config.card.overrides.len(), 2);
        assert!(
            config.card.normalized_overrides()["ac_output_active_power"].is_energy_to_power()
        );
        assert_eq!(config.render.output_dir, PathBuf::from("/tmp/felicity"));
        assert_eq!(config.render.diagram_size(), (400, 300));
    }

    #[test]
    fn test_addon_options_take_precedence() {
        let dir = TempDir::new().unwrap();
        let options = write_file(
            &dir,
            "options.json",
            r#"{"card": {
                "device_id": "from_options",
                "overrides": {"grid_mode": {"sourceId": "select.grid_mode"}}
            }}"#,
        );
        let toml = write_file(&dir, "config.toml", "[card]\ndevice_id = \"from_toml\"\n");

        let config = AppConfig::load_from(&[options, toml]).unwrap();
        assert_eq!(config.card.device_id.as_deref(), Some("from_options"));
        assert_eq!(
            config.card.overrides["grid_mode"],
            OverrideSpec::Detailed(felicity_types::SourceOverride::new("select.grid_mode"))
        );
    }

    #[test]
    fn test_missing_candidates_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&[dir.path().join("nope.toml")]).unwrap();
        assert_eq!(config.render.gauge_height, 200);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.json", "{ not json");
        assert!(AppConfig::load_from(&[path]).is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = AppConfig::default();
        config.card.device_id = Some("bad id!".to_owned());
        config.card = config
            .card
            .with_override("battery_power", OverrideSpec::Source("battery_power".to_owned()));
        config.home_assistant.base_url = Some("homeassistant.local".to_owned());
        config.render.gauge_width = 5;

        let err = config.validate().unwrap_err();
        assert_eq!(err.0.len(), 4);
        assert!(err.to_string().contains("battery_power"));
    }
}
