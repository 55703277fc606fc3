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

use std::collections::HashMap;
use tracing::trace;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Last cumulative sample seen for one metric key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyCacheEntry {
    pub value: f64,
    pub timestamp_ms: i64,
}

/// Rolling derivative of cumulative energy counters, in kWh -> W.
///
/// Entries are created on first sight of a key and overwritten on every
/// later sample. Nothing survives an unbind.
#[derive(Debug, Clone, Default)]
pub struct EnergyCache {
    entries: HashMap<String, EnergyCacheEntry>,
}

impl EnergyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantaneous power from the previous sample of `key` to this one.
    ///
    /// Returns 0 on the first sample and whenever no time has elapsed.
    pub fn derive(&mut self, key: &str, value: f64, now_ms: i64) -> f64 {
        let current = EnergyCacheEntry {
            value,
            timestamp_ms: now_ms,
        };

        let Some(previous) = self.entries.insert(key.to_owned(), current) else {
            trace!("[ENERGY] Warm-up sample for '{}': {}", key, value);
            return 0.0;
        };

        let delta_hours = (now_ms - previous.timestamp_ms) as f64 / MS_PER_HOUR;
        if delta_hours <= 0.0 {
            return 0.0;
        }

        ((value - previous.value) / delta_hours * 1000.0).round()
    }

    pub fn get(&self, key: &str) -> Option<&EnergyCacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
