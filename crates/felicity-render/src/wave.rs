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

use felicity_types::PriceReading;
use std::f64::consts::TAU;

use crate::GaugeOutcome;
use crate::canvas::{AXIS, CHEAP, Canvas, EXPENSIVE, PRICE_MARKER, Stroke};

const SEGMENTS: u32 = 100;
const EDGE: f64 = 5.0;
const MARKER_INSET: f64 = 45.0;

/// Sine wave shifted by the threshold level: the higher the level, the more of
/// the wave sits below the axis.
///
/// Above-axis segments are red and below-axis segments green, swapped when
/// the inverter exports (`grid_mode == "to_grid"`). The current price is a
/// dashed marker placed relative to the threshold.
pub fn draw_threshold_wave(
    canvas: &mut dyn Canvas,
    price: &PriceReading,
    grid_mode: Option<&str>,
) -> GaugeOutcome {
    canvas.clear();
    let (w, h) = canvas.size();
    let mid = h / 2.0;

    let amplitude = (h - 10.0) / 2.0;
    let fraction_below = 1.0 - f64::from(price.level.get()) / 10.0;
    let offset = (0.5 - fraction_below) * 2.0 * amplitude;

    let (above, below) = if grid_mode == Some("to_grid") {
        (CHEAP, EXPENSIVE)
    } else {
        (EXPENSIVE, CHEAP)
    };

    canvas.stroke_line((0.0, mid), (w, mid), Stroke::dashed(AXIS, 0.5));

    let point = |i: u32| {
        let t = f64::from(i) / f64::from(SEGMENTS);
        let y = mid + (t * TAU).sin() * amplitude + offset;
        (t * w, y.clamp(EDGE, h - EDGE))
    };

    let mut previous = point(0);
    for i in 1..=SEGMENTS {
        let current = point(i);
        let color = if current.1 < mid { above } else { below };
        canvas.stroke_line(previous, current, Stroke::solid(color, 1.0));
        previous = current;
    }

    if let Some(threshold) = price.threshold
        && price.current.is_finite()
    {
        let diff = (price.current - threshold) * (amplitude / 10.0);
        let y = (mid + offset - diff).clamp(EDGE, h - EDGE);
        canvas.stroke_line(
            (MARKER_INSET, y),
            (w - MARKER_INSET, y),
            Stroke::dashed(PRICE_MARKER, 2.0),
        );
    }

    GaugeOutcome::Drawn
}
