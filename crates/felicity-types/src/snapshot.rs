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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::battery::{BatteryBand, BatteryState};
use crate::flow::{FlowEdge, FlowState};
use crate::pricing::{PriceRange, ThresholdLevel};

// ============= Dashboard Snapshot =============

/// Output of one refresh pass; everything the renderer needs and nothing more
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub taken_at: DateTime<Utc>,
    pub title: Option<String>,
    pub currency: String,
    pub flows: Vec<FlowReading>,
    pub battery: BatteryReading,
    pub price: PriceReading,
    pub power_limit: PowerLimitReading,
    /// `off`, `from_grid` or `to_grid`
    pub grid_mode: Option<String>,
    pub econ_rules: Vec<EconRuleSummary>,
    /// Extra entity rows from the card configuration
    pub entities: Vec<EntityReading>,
    pub advanced: bool,
}

impl DashboardSnapshot {
    pub fn flow(&self, edge: FlowEdge) -> Option<&FlowReading> {
        self.flows.iter().find(|flow| flow.edge == edge)
    }
}

/// One flow edge as displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReading {
    pub edge: FlowEdge,
    /// Signed power in W; `None` when the metric has no data
    pub power_w: Option<f64>,
    /// Display text, e.g. "1.52 kW" or "340 W"
    pub formatted: String,
    /// Rounded absolute value used for activity thresholding
    pub magnitude: String,
    pub state: FlowState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// State of charge in %, `None` when unknown
    pub soc: Option<f64>,
    pub power_w: Option<f64>,
    pub state: BatteryState,
    pub band: BatteryBand,
    pub voltage_v: Option<f64>,
    pub current_a: Option<f64>,
    /// SOC below which discharge stops
    pub discharge_protection: Option<f64>,
    pub charge_max_level: Option<f64>,
    pub discharge_min_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceReading {
    pub range: PriceRange,
    /// NaN when unknown
    pub current: f64,
    pub level: ThresholdLevel,
    /// `None` when the range is invalid
    pub threshold: Option<f64>,
    pub curve: Option<[f64; 10]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLimitReading {
    /// Configured level 1-10, NaN when unknown
    pub configured_level: f64,
    /// Level currently enforced by the inverter, if reported
    pub safe_level: Option<f64>,
}

/// Configured extra entity as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReading {
    pub source_id: String,
    pub name: String,
    /// Raw state, `None` when the entity is missing
    pub value: Option<String>,
    pub unit: Option<String>,
}

/// Decoded economic-mode rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconRuleSummary {
    pub name: String,
    pub enabled: String,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub start_date: Option<String>,
    pub stop_date: Option<String>,
    /// Short weekday names, Sunday first
    pub days: Vec<String>,
    pub voltage_v: Option<f64>,
    pub soc: Option<f64>,
    pub power_w: Option<f64>,
}
