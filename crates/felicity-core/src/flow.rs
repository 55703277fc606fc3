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

use felicity_types::{BatteryState, FlowEdge, FlowState};

/// Power magnitude (W) at or below which an edge is shown idle
pub const DEADBAND_W: f64 = 50.0;

/// Activity and direction of one flow edge.
///
/// Battery direction follows `battery_hint` when it says charging or
/// discharging and falls back to the power sign otherwise.
pub fn classify(edge: FlowEdge, power: f64, battery_hint: Option<BatteryState>) -> FlowState {
    if !power.is_finite() || power.abs() <= DEADBAND_W {
        return FlowState::INACTIVE;
    }

    if edge == FlowEdge::Battery {
        match battery_hint {
            Some(BatteryState::Charging) => return FlowState::forward(),
            Some(BatteryState::Discharging) => return FlowState::reverse(),
            Some(BatteryState::Idle) | None => {}
        }
    }

    if edge.is_bidirectional() && power < 0.0 {
        FlowState::reverse()
    } else {
        FlowState::forward()
    }
}
