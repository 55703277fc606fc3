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
use felicity_types::{
    BatteryReading, CardConfig, DashboardSnapshot, EconRuleSummary, EntityReading, FlowEdge,
    FlowReading, PowerLimitReading, PriceRange, PriceReading, ThresholdLevel, WriteCommand,
    WriteStatus, keys,
};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::battery::{battery_band, battery_state};
use crate::combined;
use crate::command::{self, ComposedWrite};
use crate::energy::EnergyCache;
use crate::errors::ComposeError;
use crate::flow::classify;
use crate::pricing::{threshold_at, threshold_curve};
use crate::reader::{ValueReader, format_magnitude, format_power};
use crate::resolver::{DeviceEntityIndex, KeyResolver};
use crate::traits::{CommandDispatcher, DeviceRegistry, StateStore};

/// How long a write status stays visible
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// One live card instance.
///
/// Owns the only state that outlives a refresh: the energy cache, the device
/// entity index and the last write status.
#[derive(Debug)]
pub struct Widget {
    config: CardConfig,
    resolver: KeyResolver,
    energy: EnergyCache,
    status: Option<(WriteStatus, Instant)>,
}

impl Widget {
    pub fn bind(config: CardConfig, registry: &dyn DeviceRegistry) -> Self {
        let index = build_index(&config, registry);
        info!(
            "🔗 [WIDGET] Bound to device {:?} ({} entities, {} overrides)",
            config.device_id,
            index.len(),
            config.overrides.len()
        );

        Self {
            resolver: KeyResolver::new(config.normalized_overrides(), index),
            config,
            energy: EnergyCache::new(),
            status: None,
        }
    }

    /// Recompute the device entity index after the binding or the registry changed
    pub fn rebind_index(&mut self, registry: &dyn DeviceRegistry) {
        let index = build_index(&self.config, registry);
        debug!("🔗 [WIDGET] Rebuilt entity index: {} entities", index.len());
        self.resolver.set_index(index);
    }

    pub fn unbind(&mut self) {
        self.energy.clear();
        self.resolver.clear();
        self.status = None;
        debug!("🔗 [WIDGET] Unbound");
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    pub fn energy_cache(&self) -> &EnergyCache {
        &self.energy
    }

    /// Sorted entity ids offered as write targets
    pub fn write_targets(&self) -> &[String] {
        self.resolver.index().as_slice()
    }

    /// One refresh pass over the current state store
    pub fn refresh(&mut self, store: &dyn StateStore, now_ms: i64) -> DashboardSnapshot {
        let mut reader = ValueReader::new(&self.resolver, store, &mut self.energy, now_ms);

        let battery_power = reader.read(keys::BATTERY_POWER);
        let state = battery_state(battery_power);

        let pv_power = combined::pv_total_power(&mut reader);
        let mut flows = vec![FlowReading {
            edge: FlowEdge::Pv,
            power_w: pv_power,
            formatted: format_power(pv_power),
            magnitude: format_magnitude(pv_power),
            state: classify(FlowEdge::Pv, pv_power.unwrap_or(f64::NAN), Some(state)),
        }];
        for (edge, key) in [
            (FlowEdge::Grid, keys::GRID_POWER),
            (FlowEdge::Battery, keys::BATTERY_POWER),
            (FlowEdge::Home, keys::HOME_POWER),
            (FlowEdge::Backup, keys::BACKUP_POWER),
            (FlowEdge::Generator, keys::GENERATOR_POWER),
        ] {
            let power_w = reader.read(key);
            flows.push(FlowReading {
                edge,
                power_w,
                formatted: reader.read_formatted_power(key),
                magnitude: reader.read_magnitude(key),
                state: classify(edge, power_w.unwrap_or(f64::NAN), Some(state)),
            });
        }

        let soc = combined::representative_soc(&mut reader);
        let battery = BatteryReading {
            soc,
            power_w: battery_power,
            state,
            band: battery_band(soc.unwrap_or(f64::NAN)),
            voltage_v: combined::representative_voltage(&mut reader),
            current_a: finite(reader.read(keys::BATTERY_CURRENT)),
            discharge_protection: finite(reader.read(keys::BATTERY_DISCHARGE_PROTECTION)),
            charge_max_level: finite(reader.read(keys::BATTERY_CHARGE_MAX_LEVEL)),
            discharge_min_level: finite(reader.read(keys::BATTERY_DISCHARGE_MIN_LEVEL)),
        };

        let price = read_price(&mut reader);

        let power_limit = PowerLimitReading {
            configured_level: reader.read(keys::POWER_LEVEL).unwrap_or(f64::NAN),
            safe_level: finite(reader.read(keys::SAFE_POWER_LEVEL)),
        };

        let grid_mode = reader.read_text(keys::GRID_MODE).map(str::to_owned);
        let econ_rules = read_econ_rules(&self.config, &mut reader);
        let entities = self
            .config
            .entities
            .iter()
            .map(|row| {
                let record = store.get(&row.source_id);
                EntityReading {
                    source_id: row.source_id.clone(),
                    name: row
                        .name
                        .clone()
                        .or_else(|| record.and_then(|r| r.friendly_name()).map(str::to_owned))
                        .unwrap_or_else(|| row.source_id.clone()),
                    value: record.map(|r| r.value.clone()),
                    unit: row
                        .unit
                        .clone()
                        .or_else(|| record.and_then(|r| r.unit()).map(str::to_owned)),
                }
            })
            .collect();

        DashboardSnapshot {
            taken_at: DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_default(),
            title: self.config.name.clone(),
            currency: self.config.currency.clone(),
            flows,
            battery,
            price,
            power_limit,
            grid_mode,
            econ_rules,
            entities,
            advanced: self.config.advanced,
        }
    }

    /// Compose and dispatch a write, recording the outcome as the current status
    pub async fn write(
        &mut self,
        dispatcher: &dyn CommandDispatcher,
        command: &WriteCommand,
    ) -> WriteStatus {
        let status = match self.compose(command) {
            Err(ComposeError::MissingField) => {
                debug!("✏️ [WIDGET] Write rejected: missing field");
                WriteStatus::MissingField
            }
            Err(e @ ComposeError::ReadOnlySource(_)) => {
                error!("❌ [WIDGET] Write rejected: {}", e);
                WriteStatus::Failed {
                    reason: e.to_string(),
                }
            }
            Ok(ComposedWrite::Skipped { register_key }) => WriteStatus::Skipped { register_key },
            Ok(ComposedWrite::Call(call)) => {
                let entity_id = call.entity_id().unwrap_or_default().to_owned();
                info!(
                    "✏️ [WIDGET] {} → {} via {}",
                    call.service_name(),
                    entity_id,
                    dispatcher.name()
                );
                match dispatcher
                    .invoke(&call.domain, &call.action, call.payload.clone())
                    .await
                {
                    Ok(()) => WriteStatus::Success { entity_id },
                    Err(e) => {
                        error!("❌ [WIDGET] Write to {} failed: {}", entity_id, e);
                        WriteStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };

        self.status = Some((status.clone(), Instant::now()));
        status
    }

    /// Last write status, `None` once it is older than [`STATUS_CLEAR_DELAY`]
    pub fn status(&self, now: Instant) -> Option<&WriteStatus> {
        self.status
            .as_ref()
            .filter(|(_, set_at)| now.saturating_duration_since(*set_at) < STATUS_CLEAR_DELAY)
            .map(|(status, _)| status)
    }

    fn compose(&self, command: &WriteCommand) -> Result<ComposedWrite, ComposeError> {
        command::validate(
            &command.target_source_prefix,
            &command.register_key,
            &command.value,
        )?;

        if let Some(source) = self.resolver.override_for(command.register_key.trim()) {
            if command::writable_action(&source.source_id).is_none() {
                debug!(
                    "✏️ [WIDGET] Override {} for {} is read-only, using device addressing",
                    source.source_id, command.register_key
                );
                return command::compose_for_model(
                    self.config.inverter_model,
                    &command.target_source_prefix,
                    &command.register_key,
                    &command.value,
                );
            }
            return command::compose_for_source(
                &source.source_id,
                &command.register_key,
                &command.value,
            )
            .map(ComposedWrite::Call);
        }

        command::compose_for_model(
            self.config.inverter_model,
            &command.target_source_prefix,
            &command.register_key,
            &command.value,
        )
    }
}

fn build_index(config: &CardConfig, registry: &dyn DeviceRegistry) -> DeviceEntityIndex {
    let Some(device_id) = config.device_id.as_deref() else {
        return DeviceEntityIndex::empty();
    };

    match registry.entities(device_id) {
        Some(entities) => DeviceEntityIndex::new(entities),
        None => {
            debug!("🔗 [WIDGET] Device {} not found in registry", device_id);
            DeviceEntityIndex::empty()
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn read_price(reader: &mut ValueReader<'_>) -> PriceReading {
    let mut read = |key: &str| reader.read(key).unwrap_or(f64::NAN);
    let range = PriceRange::new(
        read(keys::TODAY_MIN_PRICE),
        read(keys::TODAY_AVG_PRICE),
        read(keys::TODAY_MAX_PRICE),
    );
    let current = read(keys::CURRENT_PRICE);
    let level = ThresholdLevel::from_reading(finite(Some(read(keys::PRICE_THRESHOLD_LEVEL))));

    let (threshold, curve) = if range.is_valid() {
        (Some(threshold_at(level, &range)), Some(threshold_curve(&range)))
    } else {
        debug!(
            "💶 [PRICE] No valid price range (min={}, avg={}, max={})",
            range.min, range.avg, range.max
        );
        (None, None)
    };

    PriceReading {
        range,
        current,
        level,
        threshold,
        curve,
    }
}

fn read_econ_rules(config: &CardConfig, reader: &mut ValueReader<'_>) -> Vec<EconRuleSummary> {
    config
        .econ_rules
        .iter()
        .filter_map(|row| {
            let name = row.name.clone().unwrap_or_else(|| row.source_id.clone());
            let record = reader.store_record(&row.source_id);

            if let Some(summary) =
                record.and_then(|record| combined::summary_from_attributes(record, &name))
            {
                return Some(summary);
            }
            if let Some(rule) = combined::rule_number(&row.source_id) {
                return Some(combined::decode_rule_registers(reader, rule, &name));
            }

            debug!("📋 [WIDGET] Cannot decode economic rule {}", row.source_id);
            None
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DispatchError;
    use async_trait::async_trait;
    use felicity_types::{
        BatteryState, EconRuleRow, EntityRecord, EntityRow, FlowState, InverterModel, OverrideSpec,
    };
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    const DEVICE: &str = "dev-1";
    const T0: i64 = 1_700_000_000_000;

    #[derive(Debug, Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<(String, String, Value)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl CommandDispatcher for RecordingDispatcher {
        async fn invoke(
            &self,
            domain: &str,
            action: &str,
            payload: Value,
        ) -> Result<(), DispatchError> {
            self.calls
                .lock()
                .push((domain.to_owned(), action.to_owned(), payload));
            match &self.fail_with {
                Some(reason) => Err(DispatchError::Rejected {
                    service: format!("{domain}.{action}"),
                    reason: reason.clone(),
                }),
                None => Ok(()),
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn sensors(entries: &[(&str, &str)]) -> HashMap<String, EntityRecord> {
        entries
            .iter()
            .map(|(key, value)| (format!("sensor.felicity_{key}"), EntityRecord::new(*value)))
            .collect()
    }

    fn registry_for(store: &HashMap<String, EntityRecord>) -> HashMap<String, Vec<String>> {
        HashMap::from([(DEVICE.to_owned(), store.keys().cloned().collect())])
    }

    fn no_devices() -> HashMap<String, Vec<String>> {
        HashMap::new()
    }

    fn config() -> CardConfig {
        CardConfig {
            device_id: Some(DEVICE.to_owned()),
            ..CardConfig::default()
        }
    }

    #[test]
    fn test_refresh_classifies_flows() {
        let store = sensors(&[
            ("pv_input_power", "2100"),
            ("pv2_input_power", "400"),
            ("ac_input_power", "-900"),
            ("battery_power", "30"),
            ("ac_output_active_power", "640"),
            ("battery_capacity", "63"),
        ]);
        let mut widget = Widget::bind(config(), &registry_for(&store));
        let snapshot = widget.refresh(&store, T0);

        let pv = snapshot.flow(FlowEdge::Pv).unwrap();
        assert_eq!(pv.power_w, Some(2500.0));
        assert_eq!(pv.formatted, "2.50 kW");
        assert_eq!(pv.state, FlowState::forward());

        assert_eq!(
            snapshot.flow(FlowEdge::Grid).unwrap().state,
            FlowState::reverse()
        );
        assert_eq!(
            snapshot.flow(FlowEdge::Battery).unwrap().state,
            FlowState::INACTIVE
        );
        assert_eq!(snapshot.flow(FlowEdge::Home).unwrap().formatted, "640 W");
        assert_eq!(
            snapshot.flow(FlowEdge::Generator).unwrap().state,
            FlowState::INACTIVE
        );

        assert_eq!(snapshot.battery.state, BatteryState::Charging);
        assert_eq!(snapshot.battery.soc, Some(63.0));
        assert_eq!(snapshot.battery.band.index(), 6);
        assert_eq!(snapshot.currency, "€");
    }

    #[test]
    fn test_refresh_without_price_data() {
        let store = sensors(&[("today_min_price", "0.4"), ("today_max_price", "0.4")]);
        let mut widget = Widget::bind(config(), &registry_for(&store));
        let snapshot = widget.refresh(&store, T0);

        assert!(snapshot.price.threshold.is_none());
        assert!(snapshot.price.curve.is_none());
        assert_eq!(snapshot.price.level, ThresholdLevel::DEFAULT);
        assert!(snapshot.power_limit.configured_level.is_nan());
    }

    #[test]
    fn test_energy_override_across_refreshes() {
        let mut store = HashMap::from([(
            "sensor.backup_energy".to_owned(),
            EntityRecord::new("3.0").with_unit("kWh"),
        )]);
        let config = config().with_override(
            keys::BACKUP_POWER,
            OverrideSpec::Detailed(
                felicity_types::SourceOverride::new("sensor.backup_energy")
                    .with_mode(felicity_types::DerivationMode::EnergyToPower),
            ),
        );
        let mut widget = Widget::bind(config, &no_devices());

        let first = widget.refresh(&store, T0);
        assert_eq!(first.flow(FlowEdge::Backup).unwrap().power_w, Some(0.0));

        store.insert(
            "sensor.backup_energy".to_owned(),
            EntityRecord::new("3.25").with_unit("kWh"),
        );
        let second = widget.refresh(&store, T0 + 900_000);
        let backup = second.flow(FlowEdge::Backup).unwrap();
        assert_eq!(backup.power_w, Some(1000.0));
        assert_eq!(backup.formatted, "1.00 kW");
        assert!(backup.state.active);

        widget.unbind();
        assert!(widget.energy_cache().is_empty());
        assert!(widget.write_targets().is_empty());
    }

    #[test]
    fn test_rebind_index() {
        let store = sensors(&[("battery_power", "-400")]);
        let mut widget = Widget::bind(config(), &no_devices());
        assert!(widget.write_targets().is_empty());

        widget.rebind_index(&registry_for(&store));
        assert_eq!(widget.write_targets(), ["sensor.felicity_battery_power"]);
        let snapshot = widget.refresh(&store, T0);
        assert_eq!(snapshot.battery.state, BatteryState::Discharging);
    }

    #[test]
    fn test_configured_rows() {
        let mut store = sensors(&[("econ_rule_2_enable", "2"), ("econ_rule_2_soc", "20")]);
        store.insert(
            "sensor.outdoor".to_owned(),
            EntityRecord::new("11.5")
                .with_unit("°C")
                .with_attribute("friendly_name", "Outdoor"),
        );
        let config = CardConfig {
            entities: vec![
                EntityRow {
                    source_id: "sensor.outdoor".to_owned(),
                    name: None,
                    unit: None,
                },
                EntityRow {
                    source_id: "sensor.missing".to_owned(),
                    name: Some("Missing".to_owned()),
                    unit: Some("W".to_owned()),
                },
            ],
            econ_rules: vec![EconRuleRow {
                source_id: "sensor.felicity_econ_rule_2".to_owned(),
                name: Some("Evening".to_owned()),
            }],
            ..config()
        };
        let mut widget = Widget::bind(config, &registry_for(&store));
        let snapshot = widget.refresh(&store, T0);

        assert_eq!(snapshot.entities[0].name, "Outdoor");
        assert_eq!(snapshot.entities[0].value.as_deref(), Some("11.5"));
        assert_eq!(snapshot.entities[0].unit.as_deref(), Some("°C"));
        assert_eq!(snapshot.entities[1].value, None);

        assert_eq!(snapshot.econ_rules.len(), 1);
        assert_eq!(snapshot.econ_rules[0].name, "Evening");
        assert_eq!(snapshot.econ_rules[0].enabled, "Discharge");
        assert_eq!(snapshot.econ_rules[0].soc, Some(20.0));
    }

    #[tokio::test]
    async fn test_write_success_and_expiry() {
        let store = sensors(&[("battery_power", "0")]);
        let mut widget = Widget::bind(config(), &registry_for(&store));
        let dispatcher = RecordingDispatcher::default();

        let command = WriteCommand::new("sensor.felicity_battery_power", "econ_rule_1_soc", "85");
        let status = widget.write(&dispatcher, &command).await;

        assert_eq!(
            status,
            WriteStatus::Success {
                entity_id: "number.felicity_econ_rule_1_soc".to_owned()
            }
        );
        let calls = dispatcher.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "number");
        assert_eq!(calls[0].1, "set_value");
        assert_eq!(calls[0].2["value"], json!(85.0));
        drop(calls);

        let now = Instant::now();
        assert!(widget.status(now).is_some());
        assert!(widget.status(now + STATUS_CLEAR_DELAY).is_none());
    }

    #[tokio::test]
    async fn test_write_missing_field_never_dispatches() {
        let mut widget = Widget::bind(config(), &no_devices());
        let dispatcher = RecordingDispatcher::default();

        let status = widget
            .write(&dispatcher, &WriteCommand::new("", "econ_rule_1_soc", "85"))
            .await;

        assert_eq!(status, WriteStatus::MissingField);
        assert!(dispatcher.calls.lock().is_empty());
        assert!(status.is_error());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut widget = Widget::bind(config(), &no_devices());
        let dispatcher = RecordingDispatcher {
            fail_with: Some("entity not found".to_owned()),
            ..RecordingDispatcher::default()
        };

        let status = widget
            .write(
                &dispatcher,
                &WriteCommand::new("sensor.felicity_x", "econ_rule_1_enable", "Charge"),
            )
            .await;

        let WriteStatus::Failed { reason } = &status else {
            panic!("expected failure, got {status:?}");
        };
        assert!(reason.contains("entity not found"));
        assert_eq!(widget.status(Instant::now()), Some(&status));
    }

    #[tokio::test]
    async fn test_write_through_override_and_model() {
        let config = CardConfig {
            inverter_model: InverterModel::Trex50,
            ..config()
        }
        .with_override(
            "econ_rule_1_soc",
            OverrideSpec::Source("number.rule_one_soc".to_owned()),
        );
        let mut widget = Widget::bind(config, &no_devices());
        let dispatcher = RecordingDispatcher::default();

        let status = widget
            .write(
                &dispatcher,
                &WriteCommand::new("sensor.felicity_x", "econ_rule_1_soc", "40"),
            )
            .await;
        assert_eq!(
            status,
            WriteStatus::Success {
                entity_id: "number.rule_one_soc".to_owned()
            }
        );

        let status = widget
            .write(
                &dispatcher,
                &WriteCommand::new("sensor.felicity_x", "econ_rule_1_start_day", "0309"),
            )
            .await;
        assert!(matches!(status, WriteStatus::Skipped { .. }));
        assert_eq!(dispatcher.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_read_only_override_falls_back_to_device_addressing() {
        let config = config().with_override(
            "econ_rule_1_soc",
            OverrideSpec::Source("sensor.felicity_econ_rule_1_soc".to_owned()),
        );
        let mut widget = Widget::bind(config, &no_devices());
        let dispatcher = RecordingDispatcher::default();

        let status = widget
            .write(
                &dispatcher,
                &WriteCommand::new("sensor.felicity_battery_power", "econ_rule_1_soc", "40"),
            )
            .await;

        assert_eq!(
            status,
            WriteStatus::Success {
                entity_id: "number.felicity_econ_rule_1_soc".to_owned()
            }
        );
        let calls = dispatcher.calls.lock();
        assert_eq!(calls[0].0, "number");
        assert_eq!(calls[0].1, "set_value");
    }
}
