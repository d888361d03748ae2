//! Radial bar geometry.
//!
//! Angles are in degrees with 0° at 12 o'clock, increasing clockwise, in
//! screen coordinates (y grows downwards). Points are relative to the
//! centre of the polar plot.

use std::f64::consts::PI;
use std::fmt::Write;

/// Default curve flattening tolerance, in pixels.
pub const DEFAULT_TOLERANCE: f64 = 0.25;

/// Point at `radius` along the direction `angle` (degrees).
pub fn polar_point(angle: f64, radius: f64) -> (f64, f64) {
    let theta = angle * PI / 180.0;
    (radius * theta.sin(), -radius * theta.cos())
}

/// An annular sector: one stacked segment of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialBar {
    /// Angle of the middle of the sector.
    pub center_angle: f64,
    /// Angular width of the sector.
    pub span: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl RadialBar {
    pub fn new(center_angle: f64, span: f64, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            center_angle,
            span,
            inner_radius: inner_radius.min(outer_radius),
            outer_radius: inner_radius.max(outer_radius),
        }
    }

    pub fn start_angle(&self) -> f64 {
        self.center_angle - self.span / 2.0
    }

    pub fn end_angle(&self) -> f64 {
        self.center_angle + self.span / 2.0
    }

    /// Zero thickness or zero span: nothing to fill.
    pub fn is_empty(&self) -> bool {
        self.outer_radius - self.inner_radius <= 0.0 || self.span <= 0.0
    }

    /// Polygon approximating the sector: inner arc clockwise from the start
    /// angle, radial edge out, outer arc back, closing radial edge implied.
    pub fn outline(&self, tolerance: f64) -> Vec<(f64, f64)> {
        let mut points = arc_points(self.inner_radius, self.start_angle(), self.end_angle(), tolerance);
        if self.inner_radius <= 0.0 {
            points = vec![(0.0, 0.0)];
        }
        points.extend(arc_points(self.outer_radius, self.end_angle(), self.start_angle(), tolerance));
        points
    }

    /// SVG path data of the sector.
    pub fn path_data(&self) -> String {
        let (start, end) = (self.start_angle(), self.end_angle());
        let mid = self.center_angle;
        let mut d = String::new();

        if self.inner_radius > 0.0 {
            let p = polar_point(start, self.inner_radius);
            let _ = write!(d, "M{},{}", fmt(p.0), fmt(p.1));
            arc_to(&mut d, self.inner_radius, mid, 1);
            arc_to(&mut d, self.inner_radius, end, 1);
        } else {
            d.push_str("M0,0");
        }
        let p = polar_point(end, self.outer_radius);
        let _ = write!(d, "L{},{}", fmt(p.0), fmt(p.1));
        arc_to(&mut d, self.outer_radius, mid, 0);
        arc_to(&mut d, self.outer_radius, start, 0);
        d.push('Z');
        d
    }
}

// Arcs are emitted in two halves so a full-circle sector still draws.
fn arc_to(d: &mut String, radius: f64, to_angle: f64, sweep: u8) {
    let p = polar_point(to_angle, radius);
    let r = fmt(radius);
    let _ = write!(d, "A{},{} 0 0 {} {},{}", r, r, sweep, fmt(p.0), fmt(p.1));
}

fn fmt(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Points along an arc from `from` to `to` (degrees), endpoints included,
/// with chords deviating at most `tolerance` from the true circle.
pub fn arc_points(radius: f64, from: f64, to: f64, tolerance: f64) -> Vec<(f64, f64)> {
    if radius <= 0.0 {
        return vec![(0.0, 0.0)];
    }
    let sweep = (to - from).abs().to_radians();
    let tolerance = tolerance.max(1e-6).min(radius);
    let max_step = 2.0 * (1.0 - tolerance / radius).acos();
    let segments = if max_step > 0.0 {
        ((sweep / max_step).ceil() as usize).max(1)
    } else {
        1
    };
    (0..=segments)
        .map(|i| polar_point(from + (to - from) * i as f64 / segments as f64, radius))
        .collect()
}
