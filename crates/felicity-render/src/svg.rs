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

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::canvas::{Canvas, Rgb, Stroke, TextAnchor};

const BACKGROUND: RGBColor = RGBColor(26, 26, 26);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("SVG backend error: {0}")]
    Backend(String),
}

/// [`Canvas`] drawing into an SVG string through plotters.
///
/// The first backend error is kept and reported by [`SvgCanvas::finish`].
pub struct SvgCanvas<'a> {
    area: DrawingArea<SVGBackend<'a>, Shift>,
    size: (f64, f64),
    error: Option<String>,
}

impl fmt::Debug for SvgCanvas<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgCanvas")
            .field("size", &self.size)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<'a> SvgCanvas<'a> {
    pub fn new(buffer: &'a mut String, size: (u32, u32)) -> Self {
        Self {
            area: SVGBackend::with_string(buffer, size).into_drawing_area(),
            size: (f64::from(size.0), f64::from(size.1)),
            error: None,
        }
    }

    /// Flush the drawing into the buffer
    pub fn finish(self) -> Result<(), RenderError> {
        let presented = self.area.present();
        if let Some(error) = self.error {
            return Err(RenderError::Backend(error));
        }
        presented.map_err(|e| RenderError::Backend(e.to_string()))
    }

    fn keep<E: fmt::Display>(&mut self, result: Result<(), E>) {
        if let Err(e) = result
            && self.error.is_none()
        {
            warn!("🖼️ [SVG] Drawing failed: {}", e);
            self.error = Some(e.to_string());
        }
    }

    fn segment(&mut self, from: (f64, f64), to: (f64, f64), style: ShapeStyle) {
        let result = self
            .area
            .draw(&PathElement::new(vec![px2(from), px2(to)], style));
        self.keep(result);
    }
}

impl Canvas for SvgCanvas<'_> {
    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn clear(&mut self) {
        let result = self.area.fill(&BACKGROUND);
        self.keep(result);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        let result = self.area.draw(&Rectangle::new(
            [px2((x, y)), px2((x + width, y + height))],
            rgb(color).filled(),
        ));
        self.keep(result);
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        let style = rgb(stroke.color).stroke_width(stroke.width.round().max(1.0) as u32);

        let Some([on, off]) = stroke.dash.filter(|[on, off]| *on > 0.0 && *off >= 0.0) else {
            self.segment(from, to, style);
            return;
        };

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = dx.hypot(dy);
        if length <= f64::EPSILON {
            return;
        }
        let (ux, uy) = (dx / length, dy / length);
        let mut start = 0.0;
        while start < length {
            let end = (start + on).min(length);
            self.segment(
                (from.0 + ux * start, from.1 + uy * start),
                (from.0 + ux * end, from.1 + uy * end),
                style,
            );
            start = end + off;
        }
    }

    fn fill_text(&mut self, text: &str, at: (f64, f64), anchor: TextAnchor, color: Rgb, size: f64) {
        let h_pos = match anchor {
            TextAnchor::Start => HPos::Left,
            TextAnchor::Middle => HPos::Center,
            TextAnchor::End => HPos::Right,
        };
        let color = rgb(color);
        let style = TextStyle::from(("sans-serif", size).into_font())
            .color(&color)
            .pos(Pos::new(h_pos, VPos::Center));

        let result = self
            .area
            .draw(&Text::new(text.to_owned(), px2(at), style));
        self.keep(result);
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        let points: Vec<(i32, i32)> = points.iter().copied().map(px2).collect();
        let result = self.area.draw(&Polygon::new(points, rgb(color).filled()));
        self.keep(result);
    }
}

/// Draw into a fresh SVG document of `size` pixels
pub fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String, RenderError>
where
    F: FnOnce(&mut dyn Canvas),
{
    let mut svg_data = String::new();
    {
        let mut canvas = SvgCanvas::new(&mut svg_data, size);
        draw(&mut canvas);
        canvas.finish()?;
    } // canvas is dropped here, releasing the borrow on svg_data

    Ok(svg_data)
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn px2((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}
