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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============= Inverter Model =============

/// Supported Felicity inverter models
/// Models differ in how some economic-rule registers must be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InverterModel {
    /// T-REX 10K single battery inverter
    #[default]
    #[serde(rename = "trex-10")]
    Trex10,
    /// T-REX 50K dual battery inverter (power registers in kW)
    #[serde(rename = "trex-50")]
    Trex50,
}

impl InverterModel {
    /// Get human-readable name for the inverter model
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Trex10 => "T-REX 10K",
            Self::Trex50 => "T-REX 50K",
        }
    }

    /// Get config string value (kebab-case)
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::Trex10 => "trex-10",
            Self::Trex50 => "trex-50",
        }
    }

    /// List all supported inverter models
    pub fn all() -> &'static [InverterModel] {
        &[Self::Trex10, Self::Trex50]
    }
}

impl fmt::Display for InverterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for InverterModel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trex-10" => Ok(Self::Trex10),
            "trex-50" => Ok(Self::Trex50),
            _ => Err(anyhow::anyhow!(
                "Unknown inverter model: '{}'. Supported models: {}",
                s,
                Self::all()
                    .iter()
                    .map(InverterModel::to_config_value)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// ============= Overrides =============

/// How the raw value of an overridden entity is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationMode {
    /// Entity is a cumulative energy counter; report instantaneous power instead
    EnergyToPower,
    /// Any mode string this version does not understand; treated as no mode
    #[serde(other)]
    Unknown,
}

/// Normalized binding from a metric key to a concrete entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOverride {
    #[serde(alias = "sourceId", alias = "entity")]
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DerivationMode>,
}

impl SourceOverride {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: DerivationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn is_energy_to_power(&self) -> bool {
        self.mode == Some(DerivationMode::EnergyToPower)
    }
}

/// Override as written in card configuration: either a bare entity id or a full object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideSpec {
    Source(String),
    Detailed(SourceOverride),
}

impl OverrideSpec {
    /// Normalize the bare-string shorthand to `{ source_id }`
    pub fn normalize(&self) -> SourceOverride {
        match self {
            Self::Source(source_id) => SourceOverride::new(source_id.clone()),
            Self::Detailed(detailed) => detailed.clone(),
        }
    }
}

// ============= Card Configuration =============

/// Extra entity row shown in the advanced section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRow {
    #[serde(alias = "sourceId", alias = "entity")]
    pub source_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Economic rule shown in the economic-mode section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconRuleRow {
    #[serde(alias = "sourceId", alias = "entity")]
    pub source_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Per-card configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, OverrideSpec>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub entities: Vec<EntityRow>,
    #[serde(default)]
    pub econ_rules: Vec<EconRuleRow>,
    #[serde(default)]
    pub inverter_model: InverterModel,
}

// Default value functions for serde
fn default_currency() -> String {
    "€".to_owned()
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            name: None,
            device_id: None,
            overrides: BTreeMap::new(),
            currency: default_currency(),
            advanced: false,
            entities: Vec::new(),
            econ_rules: Vec::new(),
            inverter_model: InverterModel::default(),
        }
    }
}

impl CardConfig {
    /// All overrides with the string shorthand expanded
    pub fn normalized_overrides(&self) -> BTreeMap<String, SourceOverride> {
        self.overrides
            .iter()
            .map(|(key, spec)| (key.clone(), spec.normalize()))
            .collect()
    }

    /// Builder-style helper used by tests and the CLI
    pub fn with_override(mut self, key: impl Into<String>, spec: OverrideSpec) -> Self {
        self.overrides.insert(key.into(), spec);
        self
    }
}
