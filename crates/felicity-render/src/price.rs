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

use felicity_types::{PriceRange, PriceReading};

use crate::canvas::{
    AVG_LINE, CHEAP, CURRENT_LINE, Canvas, EXPENSIVE, MUTED, Stroke, THRESHOLD_LINE, TextAnchor,
};
use crate::{GaugeOutcome, draw_no_data};

const PAD: f64 = 10.0;
const LABEL_SIZE: f64 = 11.0;
const TICK_LEN: f64 = 6.0;

/// Linear price to pixel mapping of the vertical price bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    range: PriceRange,
    top: f64,
    bottom: f64,
}

impl PriceScale {
    /// Scale for a canvas of `height` px, `None` for an invalid range
    pub fn new(range: PriceRange, height: f64) -> Option<Self> {
        range.is_valid().then_some(Self {
            range,
            top: PAD,
            bottom: height - PAD,
        })
    }

    /// y of `price`; min maps to the bottom edge, max to the top edge
    pub fn y_for(&self, price: f64) -> f64 {
        self.bottom - (price - self.range.min) / self.range.span() * (self.bottom - self.top)
    }
}

/// Vertical price bar split at the threshold, with avg, threshold and current lines.
///
/// When the level curve is known, one tick per threshold level is drawn left of the bar.
pub fn draw_price_gauge(canvas: &mut dyn Canvas, price: &PriceReading) -> GaugeOutcome {
    canvas.clear();
    let (w, h) = canvas.size();

    let (Some(scale), Some(threshold)) = (PriceScale::new(price.range, h), price.threshold) else {
        return draw_no_data(canvas);
    };

    let bar_x = w * 0.3;
    let bar_w = w * 0.25;
    let split = scale.y_for(threshold.clamp(price.range.min, price.range.max));

    canvas.fill_rect(bar_x, scale.top, bar_w, split - scale.top, EXPENSIVE);
    canvas.fill_rect(bar_x, split, bar_w, scale.bottom - split, CHEAP);

    for level_price in price.curve.iter().flatten() {
        let y = scale.y_for(*level_price).clamp(scale.top, scale.bottom);
        canvas.stroke_line((bar_x - TICK_LEN, y), (bar_x, y), Stroke::solid(MUTED, 1.0));
    }

    let mut reference = |value: f64, color| {
        let y = scale.y_for(value).clamp(scale.top, scale.bottom);
        canvas.stroke_line((PAD, y), (w - PAD, y), Stroke::dashed(color, 1.0));
        canvas.fill_text(
            &format!("{value:.2}"),
            (w - PAD, y - 6.0),
            TextAnchor::End,
            color,
            LABEL_SIZE,
        );
    };

    reference(price.range.avg, AVG_LINE);
    reference(threshold, THRESHOLD_LINE);
    if price.current.is_finite() {
        reference(price.current, CURRENT_LINE);
    }

    GaugeOutcome::Drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::CommandLog;
    use felicity_types::ThresholdLevel;

    fn reading(min: f64, avg: f64, max: f64, current: f64, threshold: Option<f64>) -> PriceReading {
        PriceReading {
            range: PriceRange::new(min, avg, max),
            current,
            level: ThresholdLevel::DEFAULT,
            threshold,
            curve: None,
        }
    }

    #[test]
    fn test_scale_edges() {
        let scale = PriceScale::new(PriceRange::new(0.1, 0.2, 0.4), 200.0).unwrap();
        assert!((scale.y_for(0.1) - 190.0).abs() < 1e-9);
        assert!((scale.y_for(0.4) - 10.0).abs() < 1e-9);
        assert!(PriceScale::new(PriceRange::new(0.4, 0.4, 0.4), 200.0).is_none());
    }

    #[test]
    fn test_split_at_threshold() {
        let mut log = CommandLog::new(100.0, 200.0);
        let outcome = draw_price_gauge(&mut log, &reading(0.1, 0.2, 0.4, 0.3, Some(0.15)));

        assert_eq!(outcome, GaugeOutcome::Drawn);
        let cheap = log.rects(CHEAP);
        assert_eq!(cheap.len(), 1);
        assert!((cheap[0].1 - 160.0).abs() < 1e-9);
        assert!((cheap[0].3 - 30.0).abs() < 1e-9);
        assert_eq!(log.texts(), vec!["0.20", "0.15", "0.30"]);
        assert!(
            log.lines(THRESHOLD_LINE)
                .iter()
                .all(|(_, _, stroke)| stroke.dash.is_some())
        );
    }

    #[test]
    fn test_level_ticks_follow_curve() {
        let curve = [0.1, 0.125, 0.15, 0.175, 0.2, 0.24, 0.28, 0.32, 0.36, 0.4];
        let price = PriceReading {
            curve: Some(curve),
            ..reading(0.1, 0.2, 0.4, 0.3, Some(0.15))
        };
        let mut log = CommandLog::new(100.0, 200.0);
        draw_price_gauge(&mut log, &price);

        let ticks = log.lines(MUTED);
        assert_eq!(ticks.len(), 10);
        assert!((ticks[0].0.1 - 190.0).abs() < 1e-9);
        assert!((ticks[4].0.1 - 130.0).abs() < 1e-9);
        assert!((ticks[9].0.1 - 10.0).abs() < 1e-9);
        assert!(ticks.iter().all(|(from, to, _)| to.0 - from.0 > 0.0));

        let mut bare = CommandLog::new(100.0, 200.0);
        draw_price_gauge(&mut bare, &reading(0.1, 0.2, 0.4, 0.3, Some(0.15)));
        assert!(bare.lines(MUTED).is_empty());
    }

    #[test]
    fn test_unknown_current_price_skips_its_line() {
        let mut log = CommandLog::new(100.0, 200.0);
        draw_price_gauge(&mut log, &reading(0.1, 0.2, 0.4, f64::NAN, Some(0.15)));
        assert_eq!(log.texts().len(), 2);
        assert!(log.lines(CURRENT_LINE).is_empty());
    }

    #[test]
    fn test_degenerate_range_shows_placeholder() {
        let mut log = CommandLog::new(100.0, 200.0);
        let outcome = draw_price_gauge(&mut log, &reading(0.4, 0.4, 0.4, 0.4, None));

        assert_eq!(outcome, GaugeOutcome::NoData);
        assert_eq!(log.texts(), vec!["No data"]);
        assert!(log.rects(CHEAP).is_empty());
    }

    #[test]
    fn test_redraw_is_identical() {
        let price = reading(0.1, 0.2, 0.4, 0.25, Some(0.3));
        let mut first = CommandLog::new(80.0, 160.0);
        let mut second = CommandLog::new(80.0, 160.0);
        draw_price_gauge(&mut first, &price);
        draw_price_gauge(&mut second, &price);
        draw_price_gauge(&mut second, &price);
        assert_eq!(first, second);
    }
}
