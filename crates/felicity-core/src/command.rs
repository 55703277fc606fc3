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

use felicity_types::{InverterModel, ServiceCall, WriteAction};
use serde_json::json;
use tracing::debug;

use crate::errors::ComposeError;

/// Joins the segments of a register key inside an entity object id
pub const KEY_SEGMENT_SEPARATOR: char = '_';

/// Result of composing a write for a concrete inverter model
#[derive(Debug, Clone, PartialEq)]
pub enum ComposedWrite {
    Call(ServiceCall),
    /// Register has no meaning on this model; nothing to send
    Skipped { register_key: String },
}

/// Selection writes for enable/mode registers, numeric writes for the rest
pub fn write_action(register_key: &str) -> WriteAction {
    if register_key.contains("enable") || register_key.contains("mode") {
        WriteAction::SelectOption
    } else {
        WriteAction::SetValue
    }
}

/// Device name segment of an entity id: `sensor.felicity_battery_power` -> `felicity`
pub fn device_segment(target_source: &str) -> &str {
    let object_id = target_source
        .split_once('.')
        .map_or(target_source, |(_, object_id)| object_id);
    object_id.split('_').next().unwrap_or(object_id)
}

/// Build the service call for a user-entered write.
///
/// The target entity is `<domain>.<device segment>_<register key>`.
pub fn compose(
    target_source: &str,
    register_key: &str,
    raw_value: &str,
) -> Result<ServiceCall, ComposeError> {
    validate(target_source, register_key, raw_value)?;

    let action = write_action(register_key);
    let key = register_key
        .trim()
        .replace('_', &KEY_SEGMENT_SEPARATOR.to_string());
    let entity_id = format!(
        "{}.{}{}{}",
        action.domain(),
        device_segment(target_source.trim()),
        KEY_SEGMENT_SEPARATOR,
        key
    );

    Ok(service_call(action, entity_id, raw_value))
}

/// Write action implied by an entity's domain, `None` for read-only domains
pub fn writable_action(source_id: &str) -> Option<WriteAction> {
    match source_id.trim().split_once('.').map(|(domain, _)| domain) {
        Some("select" | "input_select") => Some(WriteAction::SelectOption),
        Some("number" | "input_number") => Some(WriteAction::SetValue),
        _ => None,
    }
}

/// Build the service call for a register bound through an override.
///
/// Only select and number entities accept writes; anything else is
/// [`ComposeError::ReadOnlySource`].
pub fn compose_for_source(
    source_id: &str,
    register_key: &str,
    raw_value: &str,
) -> Result<ServiceCall, ComposeError> {
    validate(source_id, register_key, raw_value)?;

    let source_id = source_id.trim();
    let action = writable_action(source_id)
        .ok_or_else(|| ComposeError::ReadOnlySource(source_id.to_owned()))?;
    let domain = source_id
        .split_once('.')
        .map_or(action.domain(), |(domain, _)| domain);

    let mut call = service_call(action, source_id.to_owned(), raw_value);
    call.domain = domain.to_owned();
    Ok(call)
}

/// [`compose`] with the register remapping some inverter models need
pub fn compose_for_model(
    model: InverterModel,
    target_source: &str,
    register_key: &str,
    raw_value: &str,
) -> Result<ComposedWrite, ComposeError> {
    validate(target_source, register_key, raw_value)?;

    match model_register(model, register_key, raw_value) {
        Some((key, value)) => Ok(ComposedWrite::Call(compose(target_source, &key, &value)?)),
        None => {
            debug!(
                "[COMPOSER] Ignoring {} on {} (not applicable)",
                register_key,
                model.display_name()
            );
            Ok(ComposedWrite::Skipped {
                register_key: register_key.to_owned(),
            })
        }
    }
}

/// Register and value actually written on `model`, `None` when the write is dropped
pub fn model_register(
    model: InverterModel,
    register_key: &str,
    raw_value: &str,
) -> Option<(String, String)> {
    match (model, register_key) {
        (InverterModel::Trex50, "econ_rule_1_start_day" | "econ_rule_1_stop_day") => None,
        (InverterModel::Trex50, "econ_rule_1_power") => {
            let kw = (parse_float_lenient(raw_value) / 1000.0).round_ties_even();
            Some((register_key.to_owned(), format!("{kw:.0}")))
        }
        (InverterModel::Trex50, "econ_rule_1_enable") => {
            let value = raw_value.trim();
            let charge = value == "1" || value.eq_ignore_ascii_case("charge");
            Some((
                "econ_rule_1_grid_charge_enable".to_owned(),
                if charge { "1" } else { "0" }.to_owned(),
            ))
        }
        _ => Some((register_key.to_owned(), raw_value.to_owned())),
    }
}

/// Leading-number parse: `"42.5 W"` is 42.5, garbage is 0
pub fn parse_float_lenient(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_start;
        if mantissa_digits > 0 {
            end = fraction_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text.get(..end)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn validate(target: &str, register_key: &str, raw_value: &str) -> Result<(), ComposeError> {
    if target.trim().is_empty() || register_key.trim().is_empty() || raw_value.trim().is_empty() {
        return Err(ComposeError::MissingField);
    }
    Ok(())
}

fn service_call(action: WriteAction, entity_id: String, raw_value: &str) -> ServiceCall {
    let payload = match action {
        WriteAction::SelectOption => json!({ "entity_id": entity_id, "option": raw_value }),
        WriteAction::SetValue => {
            json!({ "entity_id": entity_id, "value": parse_float_lenient(raw_value) })
        }
    };

    ServiceCall {
        domain: action.domain().to_owned(),
        action: action.service().to_owned(),
        payload,
    }
}
