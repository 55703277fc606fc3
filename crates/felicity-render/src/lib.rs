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

//! Gauge, wave and flow diagram drawing.
//!
//! Every drawing clears its canvas and redraws from scratch, so the same
//! inputs always produce the same command sequence.

pub mod battery;
pub mod canvas;
pub mod flow;
pub mod log;
pub mod power_limit;
pub mod price;
pub mod svg;
pub mod wave;

use felicity_types::DashboardSnapshot;

pub use battery::draw_battery_gauge;
pub use canvas::{Canvas, Rgb, Stroke, TextAnchor};
pub use flow::draw_flow_diagram;
pub use log::{CommandLog, DrawCommand};
pub use power_limit::draw_power_limit_gauge;
pub use price::{PriceScale, draw_price_gauge};
pub use svg::{RenderError, SvgCanvas, render_svg};
pub use wave::draw_threshold_wave;

/// Whether a drawing showed data or its placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeOutcome {
    Drawn,
    NoData,
}

/// One rendered drawing of the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPanel {
    pub name: &'static str,
    pub svg: String,
}

/// Render every panel of a snapshot to SVG
pub fn render_dashboard(
    snapshot: &DashboardSnapshot,
    gauge_size: (u32, u32),
    diagram_size: (u32, u32),
) -> Result<Vec<RenderedPanel>, RenderError> {
    let (bar_w, bar_h) = gauge_size;
    Ok(vec![
        RenderedPanel {
            name: "flow",
            svg: render_svg(diagram_size, |canvas| {
                draw_flow_diagram(canvas, snapshot);
            })?,
        },
        RenderedPanel {
            name: "price",
            svg: render_svg(gauge_size, |canvas| {
                draw_price_gauge(canvas, &snapshot.price);
            })?,
        },
        RenderedPanel {
            name: "battery",
            svg: render_svg(gauge_size, |canvas| {
                draw_battery_gauge(canvas, &snapshot.battery);
            })?,
        },
        RenderedPanel {
            name: "power_limit",
            // horizontal bar
            svg: render_svg((bar_h, bar_w), |canvas| {
                draw_power_limit_gauge(canvas, &snapshot.power_limit);
            })?,
        },
        RenderedPanel {
            name: "threshold_wave",
            svg: render_svg((bar_h, bar_w), |canvas| {
                draw_threshold_wave(canvas, &snapshot.price, snapshot.grid_mode.as_deref());
            })?,
        },
    ])
}

/// Centered "No data" text on a cleared canvas
pub(crate) fn draw_no_data(canvas: &mut dyn Canvas) -> GaugeOutcome {
    let (w, h) = canvas.size();
    canvas.fill_text(
        "No data",
        (w / 2.0, h / 2.0),
        TextAnchor::Middle,
        crate::canvas::MUTED,
        12.0,
    );
    GaugeOutcome::NoData
}
