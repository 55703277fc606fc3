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

use crate::canvas::{Canvas, Rgb, Stroke, TextAnchor};

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    Text {
        text: String,
        at: (f64, f64),
        anchor: TextAnchor,
        color: Rgb,
        size: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        color: Rgb,
    },
}

/// Canvas that records calls instead of drawing them.
///
/// `clear` drops everything recorded so far, matching a real pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLog {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl CommandLog {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// All text drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Rectangles filled with `color`, as `(x, y, width, height)`
    pub fn rects(&self, color: Rgb) -> Vec<(f64, f64, f64, f64)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    color: c,
                } if *c == color => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }

    /// Lines stroked with `color`
    pub fn lines(&self, color: Rgb) -> Vec<(&(f64, f64), &(f64, f64), &Stroke)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Line { from, to, stroke } if stroke.color == color => {
                    Some((from, to, stroke))
                }
                _ => None,
            })
            .collect()
    }

    pub fn polygons(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Polygon { .. }))
            .count()
    }
}

impl Canvas for CommandLog {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn fill_text(&mut self, text: &str, at: (f64, f64), anchor: TextAnchor, color: Rgb, size: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            at,
            anchor,
            color,
            size,
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }
}
