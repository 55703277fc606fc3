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

use felicity_types::SourceOverride;
use std::collections::BTreeMap;
use tracing::trace;

/// Sorted, de-duplicated entity ids of the bound device.
///
/// Rebuilt from the registry whenever the binding changes, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEntityIndex {
    entities: Vec<String>,
}

impl DeviceEntityIndex {
    pub fn new(entities: impl IntoIterator<Item = String>) -> Self {
        let mut entities: Vec<String> = entities.into_iter().collect();
        entities.sort();
        entities.dedup();
        Self { entities }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First entity whose id ends with `_<key>`
    pub fn find_suffix(&self, key: &str) -> Option<&str> {
        let suffix = format!("_{key}");
        self.entities
            .iter()
            .find(|id| id.ends_with(&suffix))
            .map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Maps metric keys to source identifiers. Overrides always win.
#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    overrides: BTreeMap<String, SourceOverride>,
    index: DeviceEntityIndex,
}

impl KeyResolver {
    pub fn new(overrides: BTreeMap<String, SourceOverride>, index: DeviceEntityIndex) -> Self {
        Self { overrides, index }
    }

    pub fn resolve(&self, key: &str) -> Option<&str> {
        if let Some(source) = self.overrides.get(key) {
            return Some(source.source_id.as_str());
        }

        let found = self.index.find_suffix(key);
        if found.is_none() {
            trace!("[RESOLVER] No source for '{}'", key);
        }
        found
    }

    pub fn override_for(&self, key: &str) -> Option<&SourceOverride> {
        self.overrides.get(key)
    }

    pub fn index(&self) -> &DeviceEntityIndex {
        &self.index
    }

    pub fn set_index(&mut self, index: DeviceEntityIndex) {
        self.index = index;
    }

    pub fn clear(&mut self) {
        self.index = DeviceEntityIndex::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felicity_types::{CardConfig, OverrideSpec};

    fn device_index() -> DeviceEntityIndex {
        DeviceEntityIndex::new(vec![
            "sensor.felicity_pv_input_power".to_owned(),
            "sensor.felicity_battery_power".to_owned(),
            "sensor.felicity_battery_power".to_owned(),
            "sensor.aaa_battery_power".to_owned(),
        ])
    }

    #[test]
    fn test_index_is_sorted_and_deduplicated() {
        let index = device_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.as_slice()[0], "sensor.aaa_battery_power");
    }

    #[test]
    fn test_override_wins_over_device_match() {
        let config = CardConfig::default().with_override(
            "battery_power",
            OverrideSpec::Source("sensor.my_battery".to_owned()),
        );
        let resolver = KeyResolver::new(config.normalized_overrides(), device_index());

        assert_eq!(resolver.resolve("battery_power"), Some("sensor.my_battery"));
    }

    #[test]
    fn test_suffix_match_takes_earliest_sorted_entry() {
        let resolver = KeyResolver::new(BTreeMap::new(), device_index());

        assert_eq!(
            resolver.resolve("battery_power"),
            Some("sensor.aaa_battery_power")
        );
        assert_eq!(
            resolver.resolve("pv_input_power"),
            Some("sensor.felicity_pv_input_power")
        );
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        let resolver = KeyResolver::new(BTreeMap::new(), device_index());
        assert_eq!(resolver.resolve("Battery_Power"), None);
    }

    #[test]
    fn test_miss_yields_none() {
        let resolver = KeyResolver::default();
        assert_eq!(resolver.resolve("grid_mode"), None);
    }

    #[test]
    fn test_suffix_requires_separator() {
        // partial word: "battery_power" ends with "ry_power" but not "_ry_power"
        let resolver = KeyResolver::new(BTreeMap::new(), device_index());
        assert_eq!(resolver.resolve("ry_power"), None);
    }
}
