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

/// One link of the energy flow diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEdge {
    /// pv -> inverter
    Pv,
    /// grid <-> inverter (forward = import)
    Grid,
    /// inverter <-> battery (forward = charging)
    Battery,
    /// inverter -> home load
    Home,
    /// inverter -> backup load
    Backup,
    /// generator <-> inverter (forward = generator feeding the inverter)
    Generator,
}

impl FlowEdge {
    /// Edges in diagram order
    pub fn all() -> &'static [FlowEdge] {
        &[
            Self::Pv,
            Self::Grid,
            Self::Battery,
            Self::Home,
            Self::Backup,
            Self::Generator,
        ]
    }

    /// Whether the sign of the driving power carries direction
    pub fn is_bidirectional(self) -> bool {
        matches!(self, Self::Grid | Self::Battery | Self::Generator)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pv => "PV",
            Self::Grid => "Grid",
            Self::Battery => "Battery",
            Self::Home => "Home",
            Self::Backup => "Backup",
            Self::Generator => "Generator",
        }
    }
}

impl fmt::Display for FlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Forward,
    Reverse,
}

/// Activity of one edge for a single refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowState {
    pub active: bool,
    /// `None` while inactive
    pub direction: Option<FlowDirection>,
}

impl FlowState {
    pub const INACTIVE: Self = Self {
        active: false,
        direction: None,
    };

    pub fn forward() -> Self {
        Self {
            active: true,
            direction: Some(FlowDirection::Forward),
        }
    }

    pub fn reverse() -> Self {
        Self {
            active: true,
            direction: Some(FlowDirection::Reverse),
        }
    }
}
