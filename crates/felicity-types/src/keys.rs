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

//! Metric keys consumed by the dashboard.
//!
//! A metric key names a semantic quantity. It is resolved to a concrete entity either through
//! a per-card override or by suffix match against the bound device's entities
//! (`sensor.<device>_<key>`).

// ============= Power Flows =============

pub const PV_INPUT_POWER: &str = "pv_input_power";
pub const PV2_INPUT_POWER: &str = "pv2_input_power";
pub const PV3_INPUT_POWER: &str = "pv3_input_power";
/// Sum of all PV strings; computed when the device has no entity of its own
pub const PV_TOTAL_POWER: &str = "pv_total_power";
/// Positive = import from grid, negative = export
pub const GRID_POWER: &str = "ac_input_power";
/// Positive = charging, negative = discharging
pub const BATTERY_POWER: &str = "battery_power";
pub const HOME_POWER: &str = "ac_output_active_power";
pub const BACKUP_POWER: &str = "backup_load_power";
pub const GENERATOR_POWER: &str = "generator_power";

// ============= Battery =============

pub const BATTERY_CAPACITY: &str = "battery_capacity";
pub const BATTERY_VOLTAGE: &str = "battery_voltage";
pub const BATTERY_CURRENT: &str = "battery_current";
pub const BAT1_SOC: &str = "bat1_soc";
pub const BAT2_SOC: &str = "bat2_soc";
pub const BAT1_VOLTAGE: &str = "bat1_voltage";
pub const BAT2_VOLTAGE: &str = "bat2_voltage";
pub const BATTERY_DISCHARGE_PROTECTION: &str = "battery_discharge_depth_ongrid_bms";
pub const BATTERY_CHARGE_MAX_LEVEL: &str = "battery_charge_max_level";
pub const BATTERY_DISCHARGE_MIN_LEVEL: &str = "battery_discharge_min_level";

// ============= Pricing =============

pub const CURRENT_PRICE: &str = "current_price";
pub const TODAY_MIN_PRICE: &str = "today_min_price";
pub const TODAY_AVG_PRICE: &str = "today_avg_price";
pub const TODAY_MAX_PRICE: &str = "today_max_price";
pub const PRICE_THRESHOLD_LEVEL: &str = "price_threshold_level";
pub const GRID_MODE: &str = "grid_mode";

// ============= Power Limit =============

pub const POWER_LEVEL: &str = "power_level";
pub const SAFE_POWER_LEVEL: &str = "safe_power_level";

// ============= Economic Rules =============

/// Build the metric key of one economic rule register, e.g. `econ_rule_2_soc`
pub fn econ_rule_key(rule: u8, field: &str) -> String {
    format!("econ_rule_{rule}_{field}")
}
