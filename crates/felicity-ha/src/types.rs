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
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entity state as returned by `/api/states`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaEntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub last_changed: String,
    #[serde(default)]
    pub last_updated: String,
}

impl HaEntityState {
    pub fn into_record(self) -> (String, EntityRecord) {
        (
            self.entity_id,
            EntityRecord {
                value: self.state,
                attributes: self.attributes,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_record_keeps_unit() {
        let state: HaEntityState = serde_json::from_value(json!({
            "entity_id": "sensor.felicity_battery_power",
            "state": "-812",
            "attributes": {"unit_of_measurement": "W", "friendly_name": "Battery Power"},
            "last_changed": "2025-10-02T10:00:00Z",
            "last_updated": "2025-10-02T10:00:00Z"
        }))
        .unwrap();

        let (id, record) = state.into_record();
        assert_eq!(id, "sensor.felicity_battery_power");
        assert_eq!(record.value, "-812");
        assert_eq!(record.unit(), Some("W"));
        assert_eq!(record.friendly_name(), Some("Battery Power"));
    }
}
