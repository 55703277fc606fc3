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

use felicity_types::PowerLimitReading;

use crate::canvas::{CURRENT_LINE, Canvas, MUTED, Stroke, THRESHOLD_LINE, TRACK, TextAnchor};
use crate::{GaugeOutcome, draw_no_data};

const PAD: f64 = 10.0;
const LEVELS: f64 = 10.0;

/// Horizontal 0-10 level bar with the enforced level overlaid when it is below the configured one
pub fn draw_power_limit_gauge(canvas: &mut dyn Canvas, limit: &PowerLimitReading) -> GaugeOutcome {
    canvas.clear();
    let (w, h) = canvas.size();

    if !limit.configured_level.is_finite() {
        return draw_no_data(canvas);
    }

    let left = PAD;
    let right = w - PAD;
    let x_for = |level: f64| left + level.clamp(0.0, LEVELS) / LEVELS * (right - left);
    let bar_top = h * 0.3;
    let bar_h = h * 0.35;

    canvas.fill_rect(left, bar_top, right - left, bar_h, TRACK);
    canvas.fill_rect(
        left,
        bar_top,
        x_for(limit.configured_level) - left,
        bar_h,
        CURRENT_LINE,
    );

    if let Some(safe) = limit
        .safe_level
        .filter(|safe| safe.is_finite() && *safe < limit.configured_level)
    {
        canvas.fill_rect(left, bar_top, x_for(safe) - left, bar_h, THRESHOLD_LINE);
    }

    let tick_top = bar_top + bar_h;
    for tick in 0..=10 {
        let x = x_for(f64::from(tick));
        canvas.stroke_line((x, tick_top), (x, tick_top + 4.0), Stroke::solid(MUTED, 1.0));
    }

    canvas.fill_text(
        &format!("{:.0} / 10", limit.configured_level),
        (w / 2.0, bar_top / 2.0),
        TextAnchor::Middle,
        MUTED,
        11.0,
    );

    GaugeOutcome::Drawn
}
