// Colour parsing and the ordinal colour scale keyed to measure names

use crate::options::{ColorScaleSpec, Interpolator};
use plotters::style::RGBColor;

const SPECTRAL: [(u8, u8, u8); 11] = [
    (0x9e, 0x01, 0x42),
    (0xd5, 0x3e, 0x4f),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xe6, 0xf5, 0x98),
    (0xab, 0xdd, 0xa4),
    (0x66, 0xc2, 0xa5),
    (0x32, 0x88, 0xbd),
    (0x5e, 0x4f, 0xa2),
];

const CATEGORY10: [(u8, u8, u8); 10] = [
    (0x1f, 0x77, 0xb4),
    (0xff, 0x7f, 0x0e),
    (0x2c, 0xa0, 0x2c),
    (0xd6, 0x27, 0x28),
    (0x94, 0x67, 0xbd),
    (0x8c, 0x56, 0x4b),
    (0xe3, 0x77, 0xc2),
    (0x7f, 0x7f, 0x7f),
    (0xbc, 0xbd, 0x22),
    (0x17, 0xbe, 0xcf),
];

/// Colour for values outside the scale's domain.
pub const UNKNOWN_COLOR: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// Parse a colour string (#RGB, #RRGGBB or a CSS name)
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(165, 42, 42)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(169, 169, 169)),
        "lightgray" | "lightgrey" => Some(RGBColor(211, 211, 211)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

pub fn to_hex(color: &RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Sample the Spectral ramp at `t` in [0, 1] by linear interpolation between stops.
pub fn interpolate_spectral(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let last = SPECTRAL.len() - 1;
    let position = t * last as f64;
    let i = (position.floor() as usize).min(last - 1);
    let f = position - i as f64;
    let (a, b) = (SPECTRAL[i], SPECTRAL[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Ordinal colour scale: one colour per domain value.
#[derive(Debug, Clone)]
pub struct ColorScale {
    domain: Vec<String>,
    colors: Vec<RGBColor>,
}

impl ColorScale {
    /// Assign colours to `domain` in order, then apply user pinned colours.
    pub fn build(spec: &ColorScaleSpec, domain: &[String]) -> Self {
        let n = domain.len();
        let mut colors: Vec<RGBColor> = (0..n)
            .map(|i| match spec.interpolator {
                Interpolator::Spectral => {
                    let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
                    interpolate_spectral(t)
                }
                Interpolator::Category10 => {
                    let (r, g, b) = CATEGORY10[i % CATEGORY10.len()];
                    RGBColor(r, g, b)
                }
            })
            .collect();

        for user in &spec.user_scale_values {
            match (domain.iter().position(|d| *d == user.domain), parse_color(&user.range)) {
                (Some(i), Some(color)) => colors[i] = color,
                (None, _) => log::debug!("colour for '{}' ignored: not in the domain", user.domain),
                (_, None) => log::warn!("colour '{}' for '{}' is not a valid colour", user.range, user.domain),
            }
        }

        Self {
            domain: domain.to_vec(),
            colors,
        }
    }

    pub fn color(&self, key: &str) -> RGBColor {
        self.domain
            .iter()
            .position(|d| d == key)
            .map(|i| self.colors[i])
            .unwrap_or(UNKNOWN_COLOR)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, RGBColor)> + '_ {
        self.domain.iter().map(String::as_str).zip(self.colors.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UserColor;

    fn domain(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ccc"), Some(RGBColor(204, 204, 204)));
        assert_eq!(parse_color("#FFFFFF"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color("LightGray"), Some(RGBColor(211, 211, 211)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&RGBColor(158, 1, 66)), "#9e0142");
    }

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(interpolate_spectral(0.0), RGBColor(0x9e, 0x01, 0x42));
        assert_eq!(interpolate_spectral(1.0), RGBColor(0x5e, 0x4f, 0xa2));
        assert_eq!(interpolate_spectral(0.5), RGBColor(0xff, 0xff, 0xbf));
    }

    #[test]
    fn test_scale_spreads_spectral_over_domain() {
        let scale = ColorScale::build(&ColorScaleSpec::default(), &domain(&["a", "b", "c"]));
        assert_eq!(scale.color("a"), interpolate_spectral(0.0));
        assert_eq!(scale.color("b"), interpolate_spectral(0.5));
        assert_eq!(scale.color("c"), interpolate_spectral(1.0));
        assert_eq!(scale.color("z"), UNKNOWN_COLOR);
    }

    #[test]
    fn test_single_value_takes_middle_of_ramp() {
        let scale = ColorScale::build(&ColorScaleSpec::default(), &domain(&["only"]));
        assert_eq!(scale.color("only"), interpolate_spectral(0.5));
    }

    #[test]
    fn test_category10_wraps() {
        let spec = ColorScaleSpec {
            interpolator: Interpolator::Category10,
            ..ColorScaleSpec::default()
        };
        let keys: Vec<String> = (0..11).map(|i| format!("k{}", i)).collect();
        let scale = ColorScale::build(&spec, &keys);
        assert_eq!(scale.color("k0"), scale.color("k10"));
    }

    #[test]
    fn test_user_colors_override() {
        let spec = ColorScaleSpec {
            user_scale_values: vec![
                UserColor { domain: "b".into(), range: "#00ff00".into() },
                UserColor { domain: "missing".into(), range: "#000".into() },
            ],
            ..ColorScaleSpec::default()
        };
        let scale = ColorScale::build(&spec, &domain(&["a", "b"]));
        assert_eq!(scale.color("b"), RGBColor(0, 255, 0));
        assert_eq!(scale.entries().count(), 2);
    }
}
