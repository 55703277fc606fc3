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

use felicity_types::{
    EconRuleSummary, EntityRecord,
    keys::{
        self, BAT1_SOC, BAT1_VOLTAGE, BAT2_SOC, BAT2_VOLTAGE, BATTERY_CAPACITY, BATTERY_VOLTAGE,
        PV2_INPUT_POWER, PV3_INPUT_POWER, PV_INPUT_POWER, PV_TOTAL_POWER,
    },
};
use serde_json::Value;
use tracing::debug;

use crate::reader::ValueReader;

const ENABLE_LABELS: [&str; 3] = ["Disabled", "Charge", "Discharge"];
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

// ============= PV =============

/// Total PV power. A real `pv_total_power` entity wins, otherwise the strings are summed
/// with missing or unreadable strings counted as 0.
pub fn pv_total_power(reader: &mut ValueReader<'_>) -> Option<f64> {
    if reader.record(PV_TOTAL_POWER).is_some() {
        return reader.read(PV_TOTAL_POWER);
    }

    let strings: Vec<f64> = [PV_INPUT_POWER, PV2_INPUT_POWER, PV3_INPUT_POWER]
        .into_iter()
        .filter_map(|key| reader.read(key))
        .collect();

    if strings.is_empty() {
        return None;
    }
    Some(strings.into_iter().filter(|v| !v.is_nan()).sum())
}

// ============= Battery =============

/// Representative SOC: `battery_capacity`, else the lower of the two packs of a
/// dual-battery inverter, else whichever pack reports
pub fn representative_soc(reader: &mut ValueReader<'_>) -> Option<f64> {
    if let Some(soc) = known(reader.read(BATTERY_CAPACITY)) {
        return Some(soc);
    }

    match (known(reader.read(BAT1_SOC)), known(reader.read(BAT2_SOC))) {
        (Some(bat1), Some(bat2)) => {
            debug!(
                "🔋 [BATTERY] Dual battery SOC: bat1={:.1}%, bat2={:.1}% → using {:.1}%",
                bat1,
                bat2,
                bat1.min(bat2)
            );
            Some(bat1.min(bat2))
        }
        (Some(soc), None) | (None, Some(soc)) => Some(soc),
        (None, None) => None,
    }
}

pub fn representative_voltage(reader: &mut ValueReader<'_>) -> Option<f64> {
    [BATTERY_VOLTAGE, BAT1_VOLTAGE, BAT2_VOLTAGE]
        .into_iter()
        .find_map(|key| known(reader.read(key)))
}

fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ============= Economic rules =============

/// `Disabled`, `Charge`, `Discharge` or `Unknown(n)`
pub fn decode_enable(raw: i64) -> String {
    usize::try_from(raw)
        .ok()
        .and_then(|index| ENABLE_LABELS.get(index))
        .map_or_else(|| format!("Unknown({raw})"), |label| (*label).to_owned())
}

/// `hour << 8 | minute` as `HH:MM`
pub fn decode_packed_time(raw: i64) -> String {
    format!("{:02}:{:02}", (raw >> 8) & 0xFF, raw & 0xFF)
}

/// `month << 8 | day` as `MM-DD`
pub fn decode_packed_date(raw: i64) -> String {
    format!("{:02}-{:02}", (raw >> 8) & 0xFF, raw & 0xFF)
}

/// Weekday bitmask, bit 0 is Sunday
pub fn decode_week(mask: i64) -> Vec<String> {
    WEEKDAYS
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, day)| (*day).to_owned())
        .collect()
}

/// Rule number from an id such as `sensor.felicity_econ_rule_2`
pub fn rule_number(source_id: &str) -> Option<u8> {
    let (_, tail) = source_id.rsplit_once("econ_rule_")?;
    tail.parse().ok()
}

/// Decode one rule from its individual register entities.
///
/// Select, time and date entities may already report text; such values are kept as-is.
pub fn decode_rule_registers(
    reader: &mut ValueReader<'_>,
    rule: u8,
    name: &str,
) -> EconRuleSummary {
    let mut packed = |field: &str, decode: fn(i64) -> String| -> Option<String> {
        let key = keys::econ_rule_key(rule, field);
        match reader.read(&key) {
            Some(v) if v.is_finite() => Some(decode(v as i64)),
            Some(_) => reader.read_text(&key).map(str::to_owned),
            None => None,
        }
    };

    let enabled = packed("enable", decode_enable).unwrap_or_else(|| "Unknown".to_owned());
    let start_time = packed("start_time", decode_packed_time);
    let stop_time = packed("stop_time", decode_packed_time);
    let start_date = packed("start_day", decode_packed_date);
    let stop_date = packed("stop_day", decode_packed_date);

    let days = known(reader.read(&keys::econ_rule_key(rule, "effective_week")))
        .map(|mask| decode_week(mask as i64))
        .unwrap_or_default();
    let voltage_v = known(reader.read(&keys::econ_rule_key(rule, "voltage"))).filter(|v| *v != 0.0);
    let soc = known(reader.read(&keys::econ_rule_key(rule, "soc")));
    let power_w = known(reader.read(&keys::econ_rule_key(rule, "power")));

    EconRuleSummary {
        name: name.to_owned(),
        enabled,
        start_time,
        stop_time,
        start_date,
        stop_date,
        days,
        voltage_v,
        soc,
        power_w,
    }
}

/// Summary from a combined rule sensor whose attributes carry the decoded fields
pub fn summary_from_attributes(record: &EntityRecord, name: &str) -> Option<EconRuleSummary> {
    let attrs = &record.attributes;
    let enabled = attrs.get("enabled")?.as_str()?.to_owned();

    let text = |field: &str| attrs.get(field).and_then(Value::as_str).map(str::to_owned);
    let number = |field: &str| attrs.get(field).and_then(Value::as_f64);

    let days = attrs
        .get("days")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Some(EconRuleSummary {
        name: name.to_owned(),
        enabled,
        start_time: text("start_time"),
        stop_time: text("stop_time"),
        start_date: text("start_date"),
        stop_date: text("stop_date"),
        days,
        voltage_v: number("voltage_v").filter(|v| *v != 0.0),
        soc: number("soc_value").or_else(|| number("soc")),
        power_w: number("power_w"),
    })
}
