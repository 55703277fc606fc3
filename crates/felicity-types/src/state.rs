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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current record of one entity in the state store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Raw state text (e.g. "1520", "unavailable", "Self Use Mode")
    #[serde(alias = "state")]
    pub value: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_owned(), value.into());
        self
    }

    pub fn with_unit(self, unit: &str) -> Self {
        self.with_attribute("unit_of_measurement", unit)
    }

    /// Declared unit of measurement, if any
    pub fn unit(&self) -> Option<&str> {
        self.attributes
            .get("unit_of_measurement")
            .and_then(Value::as_str)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(Value::as_str)
    }

    /// Options list of select entities
    pub fn options(&self) -> Vec<&str> {
        self.attributes
            .get("options")
            .and_then(Value::as_array)
            .map(|options| options.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
