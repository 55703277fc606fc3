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

use felicity_types::{BatteryBand, BatteryState};

const BAND_THRESHOLDS: [f64; 10] = [5.0, 15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0, 95.0];

/// Charging above zero, discharging below, idle for zero or unknown
pub fn battery_state(power: Option<f64>) -> BatteryState {
    match power {
        Some(p) if p > 0.0 => BatteryState::Charging,
        Some(p) if p < 0.0 => BatteryState::Discharging,
        _ => BatteryState::Idle,
    }
}

/// Icon band for a state of charge in %, clamped to 0..=100. Unknown SOC is empty.
pub fn battery_band(soc: f64) -> BatteryBand {
    if soc.is_nan() {
        return BatteryBand::EMPTY;
    }
    let soc = soc.clamp(0.0, 100.0);
    let passed = BAND_THRESHOLDS.iter().filter(|&&t| soc >= t).count();
    BatteryBand::new(passed as u8)
}
