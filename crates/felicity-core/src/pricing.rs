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

use felicity_types::{PriceRange, ThresholdLevel};

/// Price threshold for a level, piecewise-linear through min, avg and max.
///
/// Levels 1-5 run from `min` to `avg`, levels 6-10 from `avg` to `max`.
/// Callers check [`PriceRange::is_valid`] first.
pub fn threshold_at(level: ThresholdLevel, range: &PriceRange) -> f64 {
    let level = f64::from(level.get());
    if level <= 5.0 {
        let ratio = (level - 1.0) / 4.0;
        range.min + (range.avg - range.min) * ratio
    } else {
        let ratio = (level - 5.0) / 5.0;
        range.avg + (range.max - range.avg) * ratio
    }
}

/// Thresholds for levels 1 through 10
pub fn threshold_curve(range: &PriceRange) -> [f64; 10] {
    let mut curve = [0.0; 10];
    for (slot, level) in curve.iter_mut().zip(ThresholdLevel::all()) {
        *slot = threshold_at(level, range);
    }
    curve
}
