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
use std::fmt;

/// Battery activity derived from battery power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BatteryState {
    Charging,
    Discharging,
    #[default]
    Idle,
}

impl BatteryState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete state-of-charge band used to pick the battery icon.
///
/// Band `n` means the SOC has passed `n` of the thresholds 5, 15, 25 … 95,
/// so band 0 is an empty battery and band 10 a full one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatteryBand(u8);

impl BatteryBand {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(10);

    /// Construct from a raw band index, saturating at `FULL`
    pub fn new(index: u8) -> Self {
        Self(index.min(Self::FULL.0))
    }

    pub fn index(self) -> u8 {
        self.0
    }
}
