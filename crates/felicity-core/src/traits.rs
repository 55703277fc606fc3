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

use async_trait::async_trait;
use felicity_types::EntityRecord;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::errors::DispatchError;

/// Read access to the host's entity states.
///
/// The host refreshes the store on its own schedule; the engine only ever
/// reads a consistent snapshot during one refresh pass.
pub trait StateStore {
    fn get(&self, source_id: &str) -> Option<&EntityRecord>;
}

impl StateStore for HashMap<String, EntityRecord> {
    fn get(&self, source_id: &str) -> Option<&EntityRecord> {
        HashMap::get(self, source_id)
    }
}

impl StateStore for BTreeMap<String, EntityRecord> {
    fn get(&self, source_id: &str) -> Option<&EntityRecord> {
        BTreeMap::get(self, source_id)
    }
}

/// Device to entity lookup
pub trait DeviceRegistry {
    /// Source identifiers owned by the device, `None` when the device is unknown
    fn entities(&self, device_id: &str) -> Option<Vec<String>>;
}

impl DeviceRegistry for HashMap<String, Vec<String>> {
    fn entities(&self, device_id: &str) -> Option<Vec<String>> {
        HashMap::get(self, device_id).cloned()
    }
}

/// Write path back to the device
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn invoke(&self, domain: &str, action: &str, payload: Value)
    -> Result<(), DispatchError>;

    /// Get dispatcher name for logging
    fn name(&self) -> &str;
}
