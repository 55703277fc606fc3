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

pub mod battery;
pub mod command;
pub mod config;
pub mod flow;
pub mod keys;
pub mod pricing;
pub mod snapshot;
pub mod state;

// Re-export common types for convenience
pub use battery::{BatteryBand, BatteryState};
pub use command::{ServiceCall, WriteAction, WriteCommand, WriteStatus};
pub use config::{
    CardConfig, DerivationMode, EconRuleRow, EntityRow, InverterModel, OverrideSpec,
    SourceOverride,
};
pub use flow::{FlowDirection, FlowEdge, FlowState};
pub use pricing::{PriceRange, ThresholdLevel};
pub use snapshot::{
    BatteryReading, DashboardSnapshot, EconRuleSummary, EntityReading, FlowReading,
    PowerLimitReading, PriceReading,
};
pub use state::EntityRecord;
