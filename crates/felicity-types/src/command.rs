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
use serde_json::Value;
use std::fmt;

/// User-entered write request, exists only while the user interaction lasts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCommand {
    /// Entity picked from the device's entity list, used to find the device name segment
    pub target_source_prefix: String,
    /// Register key, e.g. `econ_rule_1_soc`
    pub register_key: String,
    /// Raw text typed by the user
    pub value: String,
}

impl WriteCommand {
    pub fn new(
        target_source_prefix: impl Into<String>,
        register_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target_source_prefix: target_source_prefix.into(),
            register_key: register_key.into(),
            value: value.into(),
        }
    }
}

/// Kind of write, decides the service and payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    /// `select.select_option` with `{ option }`
    SelectOption,
    /// `number.set_value` with `{ value }`
    SetValue,
}

impl WriteAction {
    pub fn domain(self) -> &'static str {
        match self {
            Self::SelectOption => "select",
            Self::SetValue => "number",
        }
    }

    pub fn service(self) -> &'static str {
        match self {
            Self::SelectOption => "select_option",
            Self::SetValue => "set_value",
        }
    }
}

/// Fully composed service invocation handed to the command dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub action: String,
    pub payload: Value,
}

impl ServiceCall {
    /// Service name in `domain.action` form
    pub fn service_name(&self) -> String {
        format!("{}.{}", self.domain, self.action)
    }

    /// Target entity carried in the payload
    pub fn entity_id(&self) -> Option<&str> {
        self.payload.get("entity_id").and_then(Value::as_str)
    }
}

/// Transient result of the last write, shown to the user until it expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteStatus {
    Success { entity_id: String },
    Failed { reason: String },
    MissingField,
    /// Register not applicable to this inverter model; nothing was written
    Skipped { register_key: String },
}

impl WriteStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::MissingField)
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { entity_id } => write!(f, "Written to {entity_id}"),
            Self::Failed { reason } => write!(f, "Write failed: {reason}"),
            Self::MissingField => f.write_str("Please fill in target, key and value"),
            Self::Skipped { register_key } => {
                write!(f, "{register_key} is not used by this inverter model")
            }
        }
    }
}
