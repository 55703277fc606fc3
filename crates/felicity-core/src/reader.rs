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

use felicity_types::EntityRecord;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::energy::EnergyCache;
use crate::resolver::KeyResolver;
use crate::traits::StateStore;

/// Reads metric keys for one refresh pass.
///
/// `None` means there is no source or no record. `Some(NaN)` means the record
/// exists but its state is not numeric; consumers treat both as "no data".
///
/// Numeric reads are memoized for the lifetime of the reader, so an energy
/// counter advances the derivation cache at most once per pass.
pub struct ValueReader<'a> {
    resolver: &'a KeyResolver,
    store: &'a dyn StateStore,
    cache: &'a mut EnergyCache,
    now_ms: i64,
    seen: HashMap<String, Option<f64>>,
}

impl std::fmt::Debug for ValueReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueReader")
            .field("resolver", &self.resolver)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

impl<'a> ValueReader<'a> {
    pub fn new(
        resolver: &'a KeyResolver,
        store: &'a dyn StateStore,
        cache: &'a mut EnergyCache,
        now_ms: i64,
    ) -> Self {
        Self {
            resolver,
            store,
            cache,
            now_ms,
            seen: HashMap::new(),
        }
    }

    pub fn record(&self, key: &str) -> Option<&'a EntityRecord> {
        let source_id = self.resolver.resolve(key)?;
        let record = self.store.get(source_id);
        if record.is_none() {
            debug!("[READER] '{}' resolved to {} but it has no state", key, source_id);
        }
        record
    }

    /// Record by source id, bypassing key resolution
    pub fn store_record(&self, source_id: &str) -> Option<&'a EntityRecord> {
        self.store.get(source_id)
    }

    /// Raw textual state
    pub fn read_text(&self, key: &str) -> Option<&'a str> {
        self.record(key).map(|record| record.value.as_str())
    }

    /// Numeric value of `key`, derived from an energy counter when the override asks for it
    pub fn read(&mut self, key: &str) -> Option<f64> {
        if let Some(value) = self.seen.get(key) {
            return *value;
        }
        let value = self.read_uncached(key);
        self.seen.insert(key.to_owned(), value);
        value
    }

    fn read_uncached(&mut self, key: &str) -> Option<f64> {
        let record = self.record(key)?;
        let value = parse_number(&record.value);

        let energy_mode = self
            .resolver
            .override_for(key)
            .is_some_and(|source| source.is_energy_to_power());
        let energy_unit = record
            .unit()
            .is_some_and(|unit| unit.to_lowercase().contains("wh"));

        if energy_mode && energy_unit {
            if value.is_nan() {
                trace!("[READER] Energy counter '{}' is not numeric", key);
                return Some(f64::NAN);
            }
            return Some(self.cache.derive(key, value, self.now_ms));
        }

        Some(value)
    }

    /// Display text with kW scaling
    pub fn read_formatted_power(&mut self, key: &str) -> String {
        format_power(self.read(key))
    }

    /// Absolute value rounded to an integer string, used for activity thresholds
    pub fn read_magnitude(&mut self, key: &str) -> String {
        format_magnitude(self.read(key))
    }
}

/// Number coercion of a raw state; anything unparsable or infinite is NaN
pub fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// `1.52 kW` from 1000 W upwards, whole watts below. Unknown values show as `0 W`.
pub fn format_power(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.abs() >= 1000.0 {
                format!("{:.2} kW", v / 1000.0)
            } else {
                format!("{v:.0} W")
            }
        }
        _ => "0 W".to_owned(),
    }
}

pub fn format_magnitude(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.0}", v.abs().round()),
        _ => "0".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DeviceEntityIndex;
    use felicity_types::{CardConfig, DerivationMode, OverrideSpec, SourceOverride};
    use std::collections::HashMap;

    const T0: i64 = 1_700_000_000_000;

    fn store() -> HashMap<String, EntityRecord> {
        let mut store = HashMap::new();
        store.insert(
            "sensor.felicity_battery_power".to_owned(),
            EntityRecord::new("-1520").with_unit("W"),
        );
        store.insert(
            "sensor.felicity_grid_mode".to_owned(),
            EntityRecord::new("to_grid"),
        );
        store.insert(
            "sensor.felicity_ac_input_power".to_owned(),
            EntityRecord::new("unavailable"),
        );
        store.insert(
            "sensor.home_energy".to_owned(),
            EntityRecord::new("10").with_unit("kWh"),
        );
        store
    }

    fn resolver() -> KeyResolver {
        let config = CardConfig::default().with_override(
            "ac_output_active_power",
            OverrideSpec::Detailed(
                SourceOverride::new("sensor.home_energy").with_mode(DerivationMode::EnergyToPower),
            ),
        );
        KeyResolver::new(
            config.normalized_overrides(),
            DeviceEntityIndex::new(store().into_keys()),
        )
    }

    #[test]
    fn test_read_numeric_and_text() {
        let resolver = resolver();
        let store = store();
        let mut cache = EnergyCache::new();
        let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0);

        assert_eq!(reader.read("battery_power"), Some(-1520.0));
        assert_eq!(reader.read_text("grid_mode"), Some("to_grid"));
        assert_eq!(reader.read("pv_input_power"), None);
        assert!(reader.read("ac_input_power").is_some_and(f64::is_nan));
    }

    #[test]
    fn test_energy_override_derives_power() {
        let resolver = resolver();
        let mut store = store();
        let mut cache = EnergyCache::new();

        {
            let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0);
            assert_eq!(reader.read("ac_output_active_power"), Some(0.0));
        }

        store.insert(
            "sensor.home_energy".to_owned(),
            EntityRecord::new("10.5").with_unit("kWh"),
        );
        let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0 + 1_800_000);
        assert_eq!(reader.read("ac_output_active_power"), Some(1000.0));
    }

    #[test]
    fn test_energy_mode_ignored_for_power_units() {
        let mut store = store();
        store.insert(
            "sensor.home_energy".to_owned(),
            EntityRecord::new("640").with_unit("W"),
        );
        let resolver = resolver();
        let mut cache = EnergyCache::new();
        let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0);

        assert_eq!(reader.read("ac_output_active_power"), Some(640.0));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_formatted_accessors() {
        let resolver = resolver();
        let store = store();
        let mut cache = EnergyCache::new();
        let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0);

        assert_eq!(reader.read_formatted_power("battery_power"), "-1.52 kW");
        assert_eq!(reader.read_magnitude("battery_power"), "1520");

        // "unavailable"
        assert_eq!(reader.read_formatted_power("ac_input_power"), "0 W");
        assert_eq!(reader.read_magnitude("ac_input_power"), "0");

        // no source at all
        assert_eq!(reader.read_formatted_power("pv_input_power"), "0 W");
        assert_eq!(reader.read_magnitude("pv_input_power"), "0");
    }

    #[test]
    fn test_energy_key_derives_once_per_pass() {
        let resolver = resolver();
        let mut store = store();
        let mut cache = EnergyCache::new();
        ValueReader::new(&resolver, &store, &mut cache, T0).read("ac_output_active_power");

        store.insert(
            "sensor.home_energy".to_owned(),
            EntityRecord::new("10.5").with_unit("kWh"),
        );
        let mut reader = ValueReader::new(&resolver, &store, &mut cache, T0 + 1_800_000);
        assert_eq!(reader.read("ac_output_active_power"), Some(1000.0));
        assert_eq!(reader.read_formatted_power("ac_output_active_power"), "1.00 kW");
        assert_eq!(reader.read_magnitude("ac_output_active_power"), "1000");
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert!((parse_number(" 42.5 ") - 42.5).abs() < f64::EPSILON);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("-infinity").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("unknown").is_nan());
    }

    #[test]
    fn test_format_power() {
        assert_eq!(format_power(Some(340.4)), "340 W");
        assert_eq!(format_power(Some(1520.0)), "1.52 kW");
        assert_eq!(format_power(Some(-1520.0)), "-1.52 kW");
        assert_eq!(format_power(Some(f64::NAN)), "0 W");
        assert_eq!(format_power(None), "0 W");
    }

    #[test]
    fn test_format_magnitude() {
        assert_eq!(format_magnitude(Some(-49.6)), "50");
        assert_eq!(format_magnitude(Some(12.2)), "12");
        assert_eq!(format_magnitude(None), "0");
    }
}
