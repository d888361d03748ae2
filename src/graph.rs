use crate::error::RenderError;
use crate::geometry::DEFAULT_TOLERANCE;
use crate::ir::{DrawCommand, LegendScene, SceneGraph};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Stroke of outlines, grid circles and axis lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: RGBColor,
    pub width: u32,
}

/// Horizontal alignment of a label relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Vertical alignment of a label relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub size: f64,
    pub color: RGBColor,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
}

/// Fonts and decoration colours shared by every sub-chart
#[derive(Debug, Clone)]
pub struct ChartStyles {
    pub font_family: String,
    pub label_size: f64,
    pub title_size: f64,
    pub text_color: RGBColor,
    pub grid_color: RGBColor,
    pub axis_color: RGBColor,
    pub border_color: RGBColor,
    pub legend_swatch: f64,
}

impl Default for ChartStyles {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            label_size: 10.0,
            title_size: 12.0,
            text_color: RGBColor(0x33, 0x33, 0x33),
            grid_color: RGBColor(0xdd, 0xdd, 0xdd),
            axis_color: RGBColor(0x99, 0x99, 0x99),
            border_color: RGBColor(0xcc, 0xcc, 0xcc),
            legend_swatch: 12.0,
        }
    }
}

impl ChartStyles {
    pub fn label(&self, anchor: TextAnchor, baseline: Baseline) -> LabelStyle {
        LabelStyle {
            size: self.label_size,
            color: self.text_color,
            anchor,
            baseline,
        }
    }

    pub fn title(&self, anchor: TextAnchor, baseline: Baseline) -> LabelStyle {
        LabelStyle {
            size: self.title_size,
            ..self.label(anchor, baseline)
        }
    }
}

fn px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

fn drawing_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn text_style<'a>(font_family: &'a str, style: &LabelStyle) -> TextStyle<'a> {
    let h = match style.anchor {
        TextAnchor::Start => HPos::Left,
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    };
    let v = match style.baseline {
        Baseline::Top => VPos::Top,
        Baseline::Middle => VPos::Center,
        Baseline::Bottom => VPos::Bottom,
    };
    (font_family, style.size)
        .into_font()
        .color(&style.color)
        .pos(Pos::new(h, v))
}

/// Execute a scene on any plotters surface, in panel order.
pub fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &SceneGraph,
) -> Result<(), RenderError> {
    root.fill(&scene.background).map_err(drawing_error)?;

    for panel in &scene.panels {
        for command in &panel.commands {
            draw_command(root, command, &scene.font_family)?;
        }
    }

    if let Some(legend) = &scene.legend {
        draw_legend(root, legend, &scene.font_family)?;
    }

    root.present().map_err(drawing_error)?;
    Ok(())
}

fn draw_command<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    command: &DrawCommand,
    font_family: &str,
) -> Result<(), RenderError> {
    match command {
        DrawCommand::DrawRect { tl, br, stroke } => {
            root.draw(&Rectangle::new(
                [px(*tl), px(*br)],
                stroke.color.stroke_width(stroke.width),
            ))
            .map_err(drawing_error)?;
        }
        DrawCommand::DrawCircle { center, radius, stroke } => {
            if *radius > 0.0 {
                root.draw(&Circle::new(
                    px(*center),
                    radius.round() as u32,
                    stroke.color.stroke_width(stroke.width),
                ))
                .map_err(drawing_error)?;
            }
        }
        DrawCommand::DrawLine { points, stroke } => {
            let points: Vec<(i32, i32)> = points.iter().map(|p| px(*p)).collect();
            root.draw(&PathElement::new(points, stroke.color.stroke_width(stroke.width)))
                .map_err(drawing_error)?;
        }
        DrawCommand::DrawSector { center, bar, fill, .. } => {
            if bar.is_empty() {
                return Ok(());
            }
            let points: Vec<(i32, i32)> = bar
                .outline(DEFAULT_TOLERANCE)
                .into_iter()
                .map(|(x, y)| px((center.0 + x, center.1 + y)))
                .collect();
            root.draw(&Polygon::new(points, fill.filled()))
                .map_err(drawing_error)?;
        }
        DrawCommand::DrawText { text, pos, style } => {
            if !text.is_empty() {
                root.draw(&Text::new(text.clone(), px(*pos), text_style(font_family, style)))
                    .map_err(drawing_error)?;
            }
        }
    }
    Ok(())
}

/// Greedy word wrap to at most `max_width` pixels, estimating glyph width
/// from the font size.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let max_chars = ((max_width / (font_size * 0.6)).floor() as usize).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn draw_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    legend: &LegendScene,
    font_family: &str,
) -> Result<(), RenderError> {
    let (x, mut y) = legend.origin;
    let title = LabelStyle {
        size: legend.title_size,
        color: legend.text_color,
        anchor: TextAnchor::Start,
        baseline: Baseline::Top,
    };
    let label = LabelStyle { size: legend.label_size, ..title };

    root.draw(&Text::new(legend.title.clone(), px((x, y)), text_style(font_family, &title)))
        .map_err(drawing_error)?;
    y += legend.title_size * 1.6;

    let swatch = legend.swatch;
    let text_width = legend.width - swatch - 6.0;
    for entry in &legend.entries {
        let top = y;
        root.draw(&Rectangle::new(
            [px((x, y)), px((x + swatch, y + swatch))],
            entry.color.filled(),
        ))
        .map_err(drawing_error)?;
        for line in wrap_text(&entry.label, text_width, legend.label_size) {
            root.draw(&Text::new(line, px((x + swatch + 6.0, y)), text_style(font_family, &label)))
                .map_err(drawing_error)?;
            y += legend.label_size * 1.3;
        }
        y = y.max(top + swatch) + 4.0;
    }
    Ok(())
}

/// Bytes needed for an RGB bitmap of the given size
pub fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Encode an RGB buffer as PNG
pub fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder.write_image(buffer, width, height, image::ColorType::Rgb8)?;
    }
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RadialBar;
    use crate::ir::{LegendEntry, PanelScene};

    fn scene(commands: Vec<DrawCommand>) -> SceneGraph {
        SceneGraph {
            width: 100,
            height: 100,
            background: RGBColor(255, 255, 255),
            font_family: "sans-serif".to_string(),
            panels: vec![PanelScene { row: 0, col: 0, commands }],
            legend: None,
        }
    }

    fn render_svg(scene: &SceneGraph) -> String {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
            draw_scene(&root, scene).unwrap();
        }
        svg
    }

    fn text_contents(svg: &str) -> Vec<String> {
        svg.split("</text>")
            .filter_map(|chunk| chunk.rfind('>').map(|i| chunk[i + 1..].trim().to_string()))
            .collect()
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("short", 200.0, 10.0), vec!["short"]);
        // 35px at size 10 fits 5 characters
        assert_eq!(wrap_text("aa bb cc", 35.0, 10.0), vec!["aa bb", "cc"]);
        assert_eq!(wrap_text("", 30.0, 10.0), vec![""]);
    }

    #[test]
    fn test_sector_is_drawn_as_polygon() {
        let svg = render_svg(&scene(vec![DrawCommand::DrawSector {
            center: (50.0, 50.0),
            bar: RadialBar::new(90.0, 60.0, 10.0, 40.0),
            fill: RGBColor(0x9e, 0x01, 0x42),
            legend: "v".to_string(),
        }]));
        assert!(svg.contains("<polygon"));
        assert!(svg.to_lowercase().contains("#9e0142"));
    }

    #[test]
    fn test_empty_sector_is_skipped() {
        let svg = render_svg(&scene(vec![DrawCommand::DrawSector {
            center: (50.0, 50.0),
            bar: RadialBar::new(90.0, 60.0, 10.0, 10.0),
            fill: RGBColor(0x9e, 0x01, 0x42),
            legend: "v".to_string(),
        }]));
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn test_grid_and_text_commands() {
        let stroke = LineStyle { color: RGBColor(0xdd, 0xdd, 0xdd), width: 1 };
        let svg = render_svg(&scene(vec![
            DrawCommand::DrawCircle { center: (50.0, 50.0), radius: 20.0, stroke },
            DrawCommand::DrawLine { points: vec![(50.0, 50.0), (50.0, 10.0)], stroke },
            DrawCommand::DrawText {
                text: "A".to_string(),
                pos: (50.0, 5.0),
                style: ChartStyles::default().label(TextAnchor::Middle, Baseline::Bottom),
            },
        ]));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<polyline"));
        assert!(text_contents(&svg).contains(&"A".to_string()));
    }

    #[test]
    fn test_legend_lists_entries() {
        let mut scene = scene(Vec::new());
        scene.width = 300;
        scene.legend = Some(LegendScene {
            origin: (100.0, 10.0),
            width: 200.0,
            title: "Colors".to_string(),
            title_size: 12.0,
            label_size: 10.0,
            text_color: RGBColor(0, 0, 0),
            swatch: 12.0,
            entries: vec![
                LegendEntry { label: "gdp".to_string(), color: RGBColor(1, 2, 3) },
                LegendEntry { label: "population".to_string(), color: RGBColor(4, 5, 6) },
            ],
        });
        let svg = render_svg(&scene);
        assert!(text_contents(&svg).contains(&"Colors".to_string()));
        assert!(text_contents(&svg).contains(&"gdp".to_string()));
        assert!(text_contents(&svg).contains(&"population".to_string()));
    }

    #[test]
    fn test_rgb_buffer_len_does_not_wrap() {
        assert_eq!(rgb_buffer_len(4, 3), 36);
        assert_eq!(rgb_buffer_len(50_000, 50_000) as u64, 7_500_000_000);
    }

    #[test]
    fn test_encode_png_signature() {
        let buffer = vec![255u8; rgb_buffer_len(4, 3)];
        let png = encode_png(&buffer, 4, 3).unwrap();
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}
