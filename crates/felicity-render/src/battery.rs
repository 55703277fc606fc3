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

use felicity_types::BatteryReading;

use crate::canvas::{
    CHEAP, Canvas, EXPENSIVE, LABEL, MUTED, Rgb, Stroke, THRESHOLD_LINE, TRACK, TextAnchor,
};
use crate::{GaugeOutcome, draw_no_data};

/// Room above and below the bar for the voltage and current annotations
const ANNOTATION_BAND: f64 = 22.0;
const SETPOINT: Rgb = Rgb(33, 150, 243);

/// Vertical 0-100 % bar. The fill turns red at or below the discharge protection level.
pub fn draw_battery_gauge(canvas: &mut dyn Canvas, battery: &BatteryReading) -> GaugeOutcome {
    canvas.clear();
    let (w, h) = canvas.size();

    let Some(soc) = battery.soc.filter(|soc| soc.is_finite()) else {
        return draw_no_data(canvas);
    };
    let soc = soc.clamp(0.0, 100.0);

    let top = ANNOTATION_BAND;
    let bottom = h - ANNOTATION_BAND;
    let y_for = |percent: f64| bottom - percent.clamp(0.0, 100.0) / 100.0 * (bottom - top);

    let bar_x = w * 0.3;
    let bar_w = w * 0.4;
    let level = y_for(soc);
    let protected = battery.discharge_protection.filter(|p| p.is_finite());
    let fill = if protected.is_some_and(|p| soc <= p) {
        EXPENSIVE
    } else {
        CHEAP
    };

    canvas.fill_rect(bar_x, top, bar_w, level - top, TRACK);
    canvas.fill_rect(bar_x, level, bar_w, bottom - level, fill);
    canvas.fill_text(
        &format!("{soc:.0}%"),
        (bar_x + bar_w / 2.0, (level + bottom) / 2.0),
        TextAnchor::Middle,
        LABEL,
        12.0,
    );

    if let Some(protection) = protected {
        let y = y_for(protection);
        canvas.stroke_line(
            (bar_x - 6.0, y),
            (bar_x + bar_w + 6.0, y),
            Stroke::solid(THRESHOLD_LINE, 2.0),
        );
    }

    for setpoint in [battery.charge_max_level, battery.discharge_min_level]
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
    {
        let y = y_for(setpoint);
        canvas.stroke_line((bar_x, y), (bar_x + bar_w, y), Stroke::dashed(SETPOINT, 1.0));
    }

    if let Some(voltage) = battery.voltage_v {
        canvas.fill_text(
            &format!("{voltage:.1} V"),
            (w / 2.0, ANNOTATION_BAND / 2.0),
            TextAnchor::Middle,
            MUTED,
            11.0,
        );
    }
    if let Some(current) = battery.current_a {
        canvas.fill_text(
            &format!("{current:.1} A"),
            (w / 2.0, h - ANNOTATION_BAND / 2.0),
            TextAnchor::Middle,
            MUTED,
            11.0,
        );
    }

    GaugeOutcome::Drawn
}
