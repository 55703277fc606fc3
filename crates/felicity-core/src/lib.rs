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

//! Derived-telemetry engine of the Felicity card.
//!
//! Everything here is synchronous and pure apart from the energy cache and the
//! device entity index, both owned by a single [`Widget`].

pub mod battery;
pub mod combined;
pub mod command;
pub mod energy;
pub mod errors;
pub mod flow;
pub mod pricing;
pub mod reader;
pub mod resolver;
pub mod traits;
pub mod widget;

pub use battery::{battery_band, battery_state};
pub use command::{ComposedWrite, compose, compose_for_model};
pub use energy::{EnergyCache, EnergyCacheEntry};
pub use errors::{ComposeError, DispatchError};
pub use flow::{DEADBAND_W, classify};
pub use pricing::{threshold_at, threshold_curve};
pub use reader::{ValueReader, format_power};
pub use resolver::{DeviceEntityIndex, KeyResolver};
pub use traits::{CommandDispatcher, DeviceRegistry, StateStore};
pub use widget::{STATUS_CLEAR_DELAY, Widget};
