use crate::geometry::{polar_point, RadialBar};
use crate::graph::{Baseline, ChartStyles, LineStyle, TextAnchor};
use crate::ir::{DrawCommand, LegendEntry, LegendScene, PanelScales, PanelScene, RenderData, ScaleSystem, SceneGraph, SeriesData};
use crate::mapping::Mapping;
use crate::options::VisualOptions;
use crate::palette::{parse_color, ColorScale};
use plotters::style::RGBColor;

/// Gap between the outer ring and the category labels, in pixels.
const LABEL_OFFSET: f64 = 6.0;

/// Compile every series into draw commands, in grid order.
pub fn compile_geometry(
    data: &RenderData,
    scales: &ScaleSystem,
    options: &VisualOptions,
    mapping: &Mapping,
    styles: &ChartStyles,
    colors: &ColorScale,
) -> SceneGraph {
    let panels = data
        .series
        .iter()
        .zip(&scales.panels)
        .map(|(series, panel_scales)| {
            let mut commands = Vec::new();

            if options.show_grid {
                let cell = &series.cell;
                commands.push(DrawCommand::DrawRect {
                    tl: (cell.x, cell.y),
                    br: (cell.x + cell.width, cell.y + cell.height),
                    stroke: LineStyle { color: styles.border_color, width: 1 },
                });
            }

            commands.extend(sectors(series, panel_scales, colors));

            if options.show_grid {
                commands.extend(radial_axis(panel_scales, styles));
                commands.extend(category_labels(panel_scales, styles));
                if series.index == 0 || options.repeat_axes_labels {
                    let cell = &series.cell;
                    commands.push(DrawCommand::DrawText {
                        text: mapping.stacks.clone(),
                        pos: (cell.x + cell.width - options.margin_right, cell.y + cell.height - 4.0),
                        style: styles.label(TextAnchor::End, Baseline::Bottom),
                    });
                }
            }

            if options.show_series_labels {
                if let Some(label) = &series.label {
                    commands.push(DrawCommand::DrawText {
                        text: label.clone(),
                        pos: (series.cell.x + 4.0, series.cell.y + 4.0),
                        style: styles.title(TextAnchor::Start, Baseline::Top),
                    });
                }
            }

            PanelScene {
                row: series.cell.row,
                col: series.cell.col,
                commands,
            }
        })
        .collect();

    let legend = options.show_legend.then(|| {
        legend(
            colors,
            (options.width, options.margin_top),
            options.legend_width,
            styles,
        )
    });

    let (width, height) = options.artboard_size();
    SceneGraph {
        width,
        height,
        background: parse_color(&options.background).unwrap_or(RGBColor(255, 255, 255)),
        font_family: styles.font_family.clone(),
        panels,
        legend,
    }
}

/// One annular sector per non-empty (category, measure) interval.
fn sectors(series: &SeriesData, scales: &PanelScales, colors: &ColorScale) -> Vec<DrawCommand> {
    let span = scales.angular.bandwidth();
    let mut commands = Vec::new();
    for layer in &series.layers {
        let fill = colors.color(&layer.key);
        for (i, &(baseline, top)) in layer.intervals.iter().enumerate() {
            if top <= baseline {
                continue;
            }
            let bar = RadialBar::new(
                scales.angular.band_center(i),
                span,
                scales.radial.apply(baseline),
                scales.radial.apply(top),
            );
            commands.push(DrawCommand::DrawSector {
                center: scales.frame.center,
                bar,
                fill,
                legend: layer.key.clone(),
            });
        }
    }
    commands
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Concentric circles at the radial ticks and a labelled axis at 12 o'clock.
fn radial_axis(scales: &PanelScales, styles: &ChartStyles) -> Vec<DrawCommand> {
    let (cx, cy) = scales.frame.center;
    let grid = LineStyle { color: styles.grid_color, width: 1 };
    let mut commands = Vec::new();

    let ticks = scales.radial.ticks(4);
    for &tick in &ticks {
        commands.push(DrawCommand::DrawCircle {
            center: (cx, cy),
            radius: scales.radial.apply(tick),
            stroke: grid,
        });
    }

    let (r0, r1) = scales.radial.range();
    commands.push(DrawCommand::DrawLine {
        points: vec![(cx, cy - r0), (cx, cy - r1)],
        stroke: LineStyle { color: styles.axis_color, width: 1 },
    });
    for &tick in &ticks {
        commands.push(DrawCommand::DrawText {
            text: format_tick(tick),
            pos: (cx - 3.0, cy - scales.radial.apply(tick)),
            style: styles.label(TextAnchor::End, Baseline::Middle),
        });
    }
    commands
}

/// Label alignment pointing away from the centre at `angle`.
fn label_alignment(angle: f64) -> (TextAnchor, Baseline) {
    let (x, y) = polar_point(angle, 1.0);
    let anchor = if x > 0.1 {
        TextAnchor::Start
    } else if x < -0.1 {
        TextAnchor::End
    } else {
        TextAnchor::Middle
    };
    let baseline = if y < -0.1 {
        Baseline::Bottom
    } else if y > 0.1 {
        Baseline::Top
    } else {
        Baseline::Middle
    };
    (anchor, baseline)
}

/// Category names just outside the outer ring, centred on their slot.
fn category_labels(scales: &PanelScales, styles: &ChartStyles) -> Vec<DrawCommand> {
    let (cx, cy) = scales.frame.center;
    let radius = scales.frame.outer_radius + LABEL_OFFSET;
    scales
        .angular
        .domain()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let angle = scales.angular.band_center(i);
            let (x, y) = polar_point(angle, radius);
            let (anchor, baseline) = label_alignment(angle);
            DrawCommand::DrawText {
                text: name.clone(),
                pos: (cx + x, cy + y),
                style: styles.label(anchor, baseline),
            }
        })
        .collect()
}

/// Colour key for the measures, placed at `origin` and `width` pixels wide.
pub fn legend(colors: &ColorScale, origin: (f64, f64), width: f64, styles: &ChartStyles) -> LegendScene {
    LegendScene {
        origin,
        width,
        title: "Colors".to_string(),
        title_size: styles.title_size,
        label_size: styles.label_size,
        text_color: styles.text_color,
        swatch: styles.legend_swatch,
        entries: colors
            .entries()
            .map(|(label, color)| LegendEntry {
                label: label.to_string(),
                color,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataTypes, Datum};
    use crate::mapping::{MappedRecord, MeasureMapping};
    use crate::options::ColorScaleSpec;
    use crate::scale::build_scales;
    use crate::transform::apply_transformations;
    use approx::assert_relative_eq;

    fn record(series: &str, stacks: &str, bars: &str, size: f64) -> MappedRecord {
        MappedRecord {
            series: Some(Datum::Text(series.to_string())),
            stacks: Datum::Text(stacks.to_string()),
            bars: bars.to_string(),
            size,
        }
    }

    fn mapping() -> Mapping {
        Mapping {
            stacks: "cat".to_string(),
            bars: vec![MeasureMapping { column: "v".to_string(), aggregation: None }],
            series: Some("grp".to_string()),
        }
    }

    fn compile(records: Vec<MappedRecord>, options: &VisualOptions) -> SceneGraph {
        let data = apply_transformations(records, options, &mapping(), &DataTypes::new()).unwrap();
        let scales = build_scales(&data, options).unwrap();
        let colors = ColorScale::build(&options.color_scale, &data.bars_domain);
        compile_geometry(&data, &scales, options, &mapping(), &ChartStyles::default(), &colors)
    }

    fn example() -> Vec<MappedRecord> {
        vec![
            record("x", "A", "v", 3.0),
            record("x", "B", "v", 2.0),
            record("y", "A", "v", 3.0),
        ]
    }

    fn sectors_of(panel: &PanelScene) -> Vec<RadialBar> {
        panel
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawSector { bar, .. } => Some(*bar),
                _ => None,
            })
            .collect()
    }

    fn texts_of(panel: &PanelScene) -> Vec<String> {
        panel
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_sector_per_non_empty_interval() {
        let scene = compile(example(), &VisualOptions::default());
        assert_eq!(scene.panels.len(), 2);
        assert_eq!(sectors_of(&scene.panels[0]).len(), 2);
        // y has no B value
        assert_eq!(sectors_of(&scene.panels[1]).len(), 1);
    }

    #[test]
    fn test_sectors_centred_on_slots() {
        let scene = compile(example(), &VisualOptions::default());
        let bars = sectors_of(&scene.panels[0]);
        assert_relative_eq!(bars[0].center_angle, 90.0, epsilon = 1e-9);
        assert_relative_eq!(bars[1].center_angle, 270.0, epsilon = 1e-9);
        assert!(bars[0].span < 180.0);
        assert_eq!(bars[0].inner_radius, 0.0);
    }

    #[test]
    fn test_shared_scale_gives_same_radius_for_same_value() {
        let scene = compile(example(), &VisualOptions::default());
        let x = sectors_of(&scene.panels[0]);
        let y = sectors_of(&scene.panels[1]);
        assert_eq!(x[0].outer_radius, y[0].outer_radius);
    }

    #[test]
    fn test_decorations_follow_options() {
        let scene = compile(example(), &VisualOptions::default());
        let first = texts_of(&scene.panels[0]);
        assert!(first.contains(&"x".to_string()));
        assert!(first.contains(&"A".to_string()));
        assert!(first.contains(&"cat".to_string()));
        // the axis title appears once unless repeated
        assert!(!texts_of(&scene.panels[1]).contains(&"cat".to_string()));

        let repeated = VisualOptions { repeat_axes_labels: true, ..VisualOptions::default() };
        let scene = compile(example(), &repeated);
        assert!(texts_of(&scene.panels[1]).contains(&"cat".to_string()));

        let bare = VisualOptions {
            show_grid: false,
            show_series_labels: false,
            ..VisualOptions::default()
        };
        let scene = compile(example(), &bare);
        assert!(scene.panels.iter().all(|p| texts_of(p).is_empty()));
        assert!(scene.panels.iter().all(|p| p
            .commands
            .iter()
            .all(|c| matches!(c, DrawCommand::DrawSector { .. }))));
    }

    #[test]
    fn test_legend_when_shown() {
        let scene = compile(example(), &VisualOptions::default());
        assert!(scene.legend.is_none());
        assert_eq!(scene.width, 805);

        let options = VisualOptions { show_legend: true, ..VisualOptions::default() };
        let scene = compile(example(), &options);
        let legend = scene.legend.unwrap();
        assert_eq!(legend.origin, (805.0, 20.0));
        assert_eq!(legend.entries.len(), 1);
        assert_eq!(legend.entries[0].label, "v");
        assert_eq!(scene.width, 1005);
    }

    #[test]
    fn test_legend_uses_scale_colours() {
        let colors = ColorScale::build(&ColorScaleSpec::default(), &["a".to_string(), "b".to_string()]);
        let legend = legend(&colors, (0.0, 0.0), 100.0, &ChartStyles::default());
        assert_eq!(legend.title, "Colors");
        assert_eq!(legend.entries[1].color, colors.color("b"));
    }

    #[test]
    fn test_label_alignment() {
        assert_eq!(label_alignment(0.0), (TextAnchor::Middle, Baseline::Bottom));
        assert_eq!(label_alignment(90.0), (TextAnchor::Start, Baseline::Middle));
        assert_eq!(label_alignment(180.0), (TextAnchor::Middle, Baseline::Top));
        assert_eq!(label_alignment(270.0), (TextAnchor::End, Baseline::Middle));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.30000000000000004), "0.3");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(1000.0), "1000");
    }
}
