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

use felicity_core::DeviceRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::client::HomeAssistantClient;
use crate::errors::HaResult;

/// Device registry backed by Home Assistant.
///
/// Lookups are synchronous, so device entity lists are loaded ahead of time
/// with [`HaDeviceRegistry::load`] and served from the cache.
#[derive(Debug)]
pub struct HaDeviceRegistry {
    client: HomeAssistantClient,
    cache: RwLock<HashMap<String, Vec<String>>>,
}

impl HaDeviceRegistry {
    pub fn new(client: HomeAssistantClient) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch and cache the entity list of `device_id`, returns the entity count
    pub async fn load(&self, device_id: &str) -> HaResult<usize> {
        let entities = match self.client.device_entities(device_id).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!("⚠️ [HA DEVICE] Failed to load device {}: {}", device_id, e);
                return Err(e);
            }
        };
        let count = entities.len();
        if count == 0 {
            warn!("⚠️ [HA DEVICE] Device {} has no entities", device_id);
        } else {
            info!("🔗 [HA DEVICE] Loaded {} entities for {}", count, device_id);
        }
        self.cache.write().insert(device_id.to_owned(), entities);
        Ok(count)
    }
}

impl DeviceRegistry for HaDeviceRegistry {
    fn entities(&self, device_id: &str) -> Option<Vec<String>> {
        self.cache.read().get(device_id).cloned()
    }
}
