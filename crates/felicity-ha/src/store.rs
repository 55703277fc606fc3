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

use chrono::{DateTime, Utc};
use felicity_core::StateStore;
use felicity_types::EntityRecord;
use std::collections::HashMap;
use tracing::debug;

use crate::client::HomeAssistantClient;
use crate::errors::HaResult;
use crate::types::HaEntityState;

/// Entity states fetched from Home Assistant at one instant
#[derive(Debug, Clone)]
pub struct HaStateSnapshot {
    states: HashMap<String, EntityRecord>,
    fetched_at: DateTime<Utc>,
}

impl HaStateSnapshot {
    pub fn from_states(states: impl IntoIterator<Item = HaEntityState>) -> Self {
        Self {
            states: states.into_iter().map(HaEntityState::into_record).collect(),
            fetched_at: Utc::now(),
        }
    }

    /// Every entity known to Home Assistant
    pub async fn fetch_all(client: &HomeAssistantClient) -> HaResult<Self> {
        let snapshot = Self::from_states(client.get_all_states().await?);
        debug!("📥 [HA SNAPSHOT] {} entities", snapshot.len());
        Ok(snapshot)
    }

    /// Fetch time in epoch milliseconds, the clock energy derivation runs on
    pub fn fetched_at_ms(&self) -> i64 {
        self.fetched_at.timestamp_millis()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateStore for HaStateSnapshot {
    fn get(&self, source_id: &str) -> Option<&EntityRecord> {
        self.states.get(source_id)
    }
}
