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

/// Plain RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const CHEAP: Rgb = Rgb(76, 175, 80);
pub const EXPENSIVE: Rgb = Rgb(244, 67, 54);
pub const TRACK: Rgb = Rgb(58, 58, 58);
pub const MUTED: Rgb = Rgb(153, 153, 153);
pub const LABEL: Rgb = Rgb(255, 255, 255);
pub const AVG_LINE: Rgb = Rgb(224, 224, 224);
pub const THRESHOLD_LINE: Rgb = Rgb(255, 152, 0);
pub const CURRENT_LINE: Rgb = Rgb(33, 150, 243);
pub const PRICE_MARKER: Rgb = Rgb(207, 115, 10);
pub const AXIS: Rgb = Rgb(42, 103, 201);

/// Line style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    /// `[on, off]` lengths in px, solid when `None`
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Some([6.0, 4.0]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Minimal 2-D drawing surface.
///
/// Coordinates are pixels with the origin top-left. Drawing never fails from
/// the caller's point of view; backends keep their own error state.
pub trait Canvas {
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke);

    fn fill_text(&mut self, text: &str, at: (f64, f64), anchor: TextAnchor, color: Rgb, size: f64);

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb);
}
