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

//! Home Assistant REST adapter for the card's state store, device registry and
//! command dispatcher.

pub mod client;
pub mod dispatcher;
pub mod errors;
pub mod registry;
pub mod store;
pub mod types;

pub use client::HomeAssistantClient;
pub use dispatcher::HaCommandDispatcher;
pub use errors::{HaError, HaResult};
pub use registry::HaDeviceRegistry;
pub use store::HaStateSnapshot;
pub use types::HaEntityState;
