use crate::error::RenderError;
use crate::ir::{PanelScales, PolarFrame, RenderData, ScaleSystem};
use crate::options::VisualOptions;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let positive = 10f64.powf(-power) / factor;
        i1 = (start * positive).round();
        i2 = (stop * positive).round();
        if i1 / positive < start {
            i1 += 1.0;
        }
        if i2 / positive > stop {
            i2 -= 1.0;
        }
        inc = -positive;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Tick step for `count` ticks over [start, stop]. Negative values encode
/// the reciprocal of a sub-unit step (-10 means 0.1).
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    tick_spec(start, stop, count).2
}

/// Round tick values spanning [start, stop], roughly `count` of them.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    (0..n)
        .map(|i| {
            let k = if reverse { i2 - i as f64 } else { i1 + i as f64 };
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect()
}

/// Continuous linear scale with optional output rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    /// Same range with outputs rounded to whole pixels.
    pub fn range_round(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self.round = true;
        self
    }

    /// Extend the domain to round values so that roughly `count` ticks fit.
    pub fn nice(mut self, count: usize) -> Self {
        let (d0, d1) = self.domain;
        if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
            return self;
        }
        let (mut start, mut stop) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };

        let mut prestep = f64::NAN;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if step == prestep {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = step;
        }

        self.domain = if d0 <= d1 { (start, stop) } else { (stop, start) };
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        // a collapsed domain maps everything to the middle of the range
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        let out = r0 * (1.0 - t) + r1 * t;
        if self.round {
            out.round()
        } else {
            out
        }
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count as f64)
    }
}

/// Categorical scale splitting a continuous range into equal bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
        }
    }

    pub fn padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self
    }

    pub fn padding_outer(mut self, padding: f64) -> Self {
        self.padding_outer = padding.max(0.0);
        self
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Distance between the starts of two neighbouring bands.
    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (start, stop) = self.range;
        (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    /// Start of the i-th band.
    pub fn band_start(&self, index: usize) -> f64 {
        let n = self.domain.len() as f64;
        let (start, stop) = self.range;
        let step = self.step();
        let offset = (stop - start - step * (n - self.padding_inner)) * self.align;
        start + offset + step * index as f64
    }

    pub fn band_center(&self, index: usize) -> f64 {
        self.band_start(index) + self.bandwidth() / 2.0
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.domain.iter().position(|d| d == key)
    }
}

/// Usable plot area of a cell and the polar frame centred in it.
pub fn polar_frame(cell: &crate::layout::Cell, options: &VisualOptions) -> PolarFrame {
    let plot_width = cell.width - options.margin_left - options.margin_right;
    let plot_height = cell.height - options.margin_top - options.margin_bottom;
    let inner_radius = options.inner_diameter / 2.0;
    let outer_radius = (plot_width.min(plot_height) / 2.0 - inner_radius).max(inner_radius);
    PolarFrame {
        center: (
            cell.x + options.margin_left + plot_width / 2.0,
            cell.y + options.margin_top + plot_height / 2.0,
        ),
        inner_radius,
        outer_radius,
        plot_width,
        plot_height,
    }
}

/// Build the radial and angular scales of every series.
pub fn build_scales(data: &RenderData, options: &VisualOptions) -> Result<ScaleSystem, RenderError> {
    let n_stacks = data.stacks_domain.len();
    let mut panels = Vec::with_capacity(data.series.len());

    for series in &data.series {
        let frame = polar_frame(&series.cell, options);

        if options.stacks_padding * n_stacks as f64 > frame.plot_width {
            return Err(RenderError::PaddingTooLarge {
                padding: options.stacks_padding,
                categories: n_stacks,
                available: frame.plot_width,
            });
        }

        let domain = if options.use_same_scale {
            data.shared_domain
        } else {
            series.local_domain
        };
        let radial = LinearScale::new(domain, (0.0, 1.0))
            .nice(4)
            .range_round((frame.inner_radius, frame.outer_radius));

        // pixel padding as a fraction of one category's share of the width;
        // half of it outside keeps band centres at (i + 0.5) * 360 / n
        let padding = if n_stacks == 0 {
            0.0
        } else {
            options.stacks_padding / (frame.plot_width / n_stacks as f64)
        };
        let angular = BandScale::new(data.stacks_domain.clone(), (0.0, 360.0))
            .padding_inner(padding)
            .padding_outer(padding / 2.0);

        log::debug!(
            "series '{}': radial domain {:?} -> {:?}, band {:.3} deg",
            series.key,
            radial.domain(),
            radial.range(),
            angular.bandwidth()
        );
        panels.push(PanelScales { frame, radial, angular });
    }

    Ok(ScaleSystem { panels })
}
