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

use felicity_types::{DashboardSnapshot, FlowDirection, FlowEdge, FlowReading};

use crate::GaugeOutcome;
use crate::canvas::{Canvas, LABEL, MUTED, Rgb, Stroke, TRACK, TextAnchor};

const NODE: f64 = 44.0;
const ARROW: f64 = 7.0;
/// Active edges grow from 2 px by 1 px per 2 kW, up to 5 px
const EDGE_MIN_WIDTH: f64 = 2.0;
const EDGE_MAX_WIDTH: f64 = 5.0;
const INVERTER: Rgb = Rgb(120, 144, 156);

/// Node positions as fractions of the canvas
fn anchor(node: Node) -> (f64, f64) {
    match node {
        Node::Inverter => (0.5, 0.5),
        Node::Pv => (0.5, 0.12),
        Node::Grid => (0.12, 0.5),
        Node::Battery => (0.5, 0.88),
        Node::Home => (0.88, 0.5),
        Node::Backup => (0.88, 0.85),
        Node::Generator => (0.12, 0.15),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Inverter,
    Pv,
    Grid,
    Battery,
    Home,
    Backup,
    Generator,
}

/// Forward end points of an edge
fn endpoints(edge: FlowEdge) -> (Node, Node) {
    match edge {
        FlowEdge::Pv => (Node::Pv, Node::Inverter),
        FlowEdge::Grid => (Node::Grid, Node::Inverter),
        FlowEdge::Battery => (Node::Inverter, Node::Battery),
        FlowEdge::Home => (Node::Inverter, Node::Home),
        FlowEdge::Backup => (Node::Inverter, Node::Backup),
        FlowEdge::Generator => (Node::Generator, Node::Inverter),
    }
}

fn edge_color(edge: FlowEdge) -> Rgb {
    match edge {
        FlowEdge::Pv => Rgb(255, 193, 7),
        FlowEdge::Grid => Rgb(33, 150, 243),
        FlowEdge::Battery => Rgb(76, 175, 80),
        FlowEdge::Home => Rgb(171, 71, 188),
        FlowEdge::Backup => Rgb(0, 188, 212),
        FlowEdge::Generator => Rgb(255, 112, 67),
    }
}

/// Energy flow diagram: every edge as a line between its nodes, active edges
/// coloured with an arrow in the flow direction, idle edges dimmed.
pub fn draw_flow_diagram(canvas: &mut dyn Canvas, snapshot: &DashboardSnapshot) -> GaugeOutcome {
    canvas.clear();
    let (w, h) = canvas.size();
    let at = |node: Node| {
        let (fx, fy) = anchor(node);
        (fx * w, fy * h)
    };

    for flow in &snapshot.flows {
        let (from, to) = endpoints(flow.edge);
        draw_edge(canvas, flow, at(from), at(to));
    }

    let inverter = at(Node::Inverter);
    canvas.fill_rect(
        inverter.0 - NODE / 2.0,
        inverter.1 - NODE / 2.0,
        NODE,
        NODE,
        INVERTER,
    );
    canvas.fill_text("Inverter", inverter, TextAnchor::Middle, LABEL, 10.0);

    for flow in &snapshot.flows {
        let (from, to) = endpoints(flow.edge);
        let node = if from == Node::Inverter { to } else { from };
        let (x, y) = at(node);
        let color = if flow.state.active {
            edge_color(flow.edge)
        } else {
            TRACK
        };
        canvas.fill_rect(x - NODE / 2.0, y - NODE / 2.0, NODE, NODE, color);
        canvas.fill_text(flow.edge.label(), (x, y - 6.0), TextAnchor::Middle, LABEL, 10.0);
        canvas.fill_text(&flow.formatted, (x, y + 8.0), TextAnchor::Middle, LABEL, 10.0);
    }

    if snapshot.flows.iter().any(|flow| flow.edge == FlowEdge::Battery)
        && let Some(soc) = snapshot.battery.soc
    {
        let (x, y) = at(Node::Battery);
        canvas.fill_text(
            &format!("{soc:.0}% · {}", snapshot.battery.state),
            (x, y + NODE / 2.0 + 10.0),
            TextAnchor::Middle,
            MUTED,
            10.0,
        );
    }

    GaugeOutcome::Drawn
}

fn draw_edge(canvas: &mut dyn Canvas, flow: &FlowReading, from: (f64, f64), to: (f64, f64)) {
    if !flow.state.active {
        canvas.stroke_line(from, to, Stroke::solid(TRACK, 1.0));
        return;
    }

    let color = edge_color(flow.edge);
    canvas.stroke_line(from, to, Stroke::solid(color, edge_width(&flow.magnitude)));

    let (tail, head) = match flow.state.direction {
        Some(FlowDirection::Reverse) => (to, from),
        _ => (from, to),
    };
    let (dx, dy) = (head.0 - tail.0, head.1 - tail.1);
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);
    let tip = (
        (tail.0 + head.0) / 2.0 + ux * ARROW,
        (tail.1 + head.1) / 2.0 + uy * ARROW,
    );
    let base = (tip.0 - ux * ARROW * 2.0, tip.1 - uy * ARROW * 2.0);
    canvas.fill_polygon(
        &[
            tip,
            (base.0 - uy * ARROW, base.1 + ux * ARROW),
            (base.0 + uy * ARROW, base.1 - ux * ARROW),
        ],
        color,
    );
}

/// Stroke width from the rounded power magnitude text
fn edge_width(magnitude: &str) -> f64 {
    let watts = magnitude.parse::<f64>().unwrap_or(0.0);
    (EDGE_MIN_WIDTH + watts / 2000.0).min(EDGE_MAX_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{CommandLog, DrawCommand};
    use felicity_types::{
        BatteryBand, BatteryReading, BatteryState, FlowState, PowerLimitReading, PriceRange,
        PriceReading, ThresholdLevel,
    };

    fn flow(edge: FlowEdge, power: f64, state: FlowState) -> FlowReading {
        FlowReading {
            edge,
            power_w: Some(power),
            formatted: format!("{power:.0} W"),
            magnitude: format!("{:.0}", power.abs()),
            state,
        }
    }

    fn snapshot(flows: Vec<FlowReading>) -> DashboardSnapshot {
        DashboardSnapshot {
            taken_at: Default::default(),
            title: None,
            currency: "€".to_owned(),
            flows,
            battery: BatteryReading {
                soc: Some(64.0),
                power_w: Some(-600.0),
                state: BatteryState::Discharging,
                band: BatteryBand::new(6),
                voltage_v: None,
                current_a: None,
                discharge_protection: None,
                charge_max_level: None,
                discharge_min_level: None,
            },
            price: PriceReading {
                range: PriceRange::new(f64::NAN, f64::NAN, f64::NAN),
                current: f64::NAN,
                level: ThresholdLevel::DEFAULT,
                threshold: None,
                curve: None,
            },
            power_limit: PowerLimitReading {
                configured_level: f64::NAN,
                safe_level: None,
            },
            grid_mode: None,
            econ_rules: Vec::new(),
            entities: Vec::new(),
            advanced: false,
        }
    }

    #[test]
    fn test_active_edges_get_arrows() {
        let snapshot = snapshot(vec![
            flow(FlowEdge::Pv, 1800.0, FlowState::forward()),
            flow(FlowEdge::Grid, 10.0, FlowState::INACTIVE),
            flow(FlowEdge::Battery, -600.0, FlowState::reverse()),
        ]);
        let mut log = CommandLog::new(400.0, 300.0);
        draw_flow_diagram(&mut log, &snapshot);

        assert_eq!(log.polygons(), 2);
        assert_eq!(log.lines(TRACK).len(), 1);
        assert!(log.texts().contains(&"1800 W"));
        assert!(log.texts().contains(&"64% · Discharging"));
    }

    #[test]
    fn test_reverse_arrow_points_to_inverter() {
        let snapshot = snapshot(vec![flow(FlowEdge::Battery, -600.0, FlowState::reverse())]);
        let mut log = CommandLog::new(400.0, 300.0);
        draw_flow_diagram(&mut log, &snapshot);

        let tip = log
            .commands()
            .iter()
            .find_map(|command| match command {
                DrawCommand::Polygon { points, .. } => Some(points[0]),
                _ => None,
            })
            .unwrap();
        // battery sits below the inverter; discharging flows upwards
        let midpoint = 0.69 * 300.0;
        assert!(tip.1 < midpoint);
    }

    #[test]
    fn test_edge_width_scales_with_magnitude() {
        let snapshot = snapshot(vec![
            flow(FlowEdge::Pv, 4000.0, FlowState::forward()),
            flow(FlowEdge::Home, 100.0, FlowState::forward()),
            flow(FlowEdge::Grid, -20000.0, FlowState::reverse()),
        ]);
        let mut log = CommandLog::new(400.0, 300.0);
        draw_flow_diagram(&mut log, &snapshot);

        let width = |edge| log.lines(edge_color(edge))[0].2.width;
        assert!((width(FlowEdge::Pv) - 4.0).abs() < 1e-9);
        assert!((width(FlowEdge::Home) - 2.05).abs() < 1e-9);
        assert!((width(FlowEdge::Grid) - EDGE_MAX_WIDTH).abs() < 1e-9);
        assert!((edge_width("") - EDGE_MIN_WIDTH).abs() < 1e-9);
    }
}
