// Runtime executor: mapped records in, chart on a drawing surface out

use crate::compiler;
use crate::data::{infer_types, DataTypes, PlotData};
use crate::dimensions;
use crate::error::RenderError;
use crate::graph::{self, ChartStyles};
use crate::ir::SceneGraph;
use crate::mapping::{map_data, MappedRecord, Mapping};
use crate::options::VisualOptions;
use crate::palette::ColorScale;
use crate::scale;
use crate::transform;
use crate::OutputFormat;
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Run the transformation, scaling and compilation phases.
pub fn build_scene(
    records: Vec<MappedRecord>,
    options: &VisualOptions,
    mapping: &Mapping,
    data_types: &DataTypes,
    styles: &ChartStyles,
) -> Result<SceneGraph, RenderError> {
    // 1. Transform (validate, group, stack)
    let render_data = transform::apply_transformations(records, options, mapping, data_types)?;

    // 2. Scale
    let scales = scale::build_scales(&render_data, options)?;

    // 3. Compile
    let colors = ColorScale::build(&options.color_scale, &render_data.bars_domain);
    let scene = compiler::compile_geometry(&render_data, &scales, options, mapping, styles, &colors);
    log::debug!(
        "compiled {} panels, {} draw commands",
        scene.panels.len(),
        scene.panels.iter().map(|p| p.commands.len()).sum::<usize>()
    );
    Ok(scene)
}

/// Draw the chart for `records` onto `root`. On error the surface is left
/// half drawn and should be discarded.
pub fn render<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    records: Vec<MappedRecord>,
    options: &VisualOptions,
    mapping: &Mapping,
    data_types: &DataTypes,
    styles: &ChartStyles,
) -> Result<(), RenderError> {
    let scene = build_scene(records, options, mapping, data_types, styles)?;
    graph::draw_scene(root, &scene)
}

/// Render to an SVG document sized to the artboard.
pub fn render_to_svg(
    records: Vec<MappedRecord>,
    options: &VisualOptions,
    mapping: &Mapping,
    data_types: &DataTypes,
    styles: &ChartStyles,
) -> Result<String, RenderError> {
    let size = options.artboard_size();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        render(&root, records, options, mapping, data_types, styles)?;
    }
    Ok(svg)
}

/// Render to PNG bytes sized to the artboard.
pub fn render_to_png(
    records: Vec<MappedRecord>,
    options: &VisualOptions,
    mapping: &Mapping,
    data_types: &DataTypes,
    styles: &ChartStyles,
) -> Result<Vec<u8>, RenderError> {
    let (width, height) = options.artboard_size();
    let mut buffer = vec![0u8; graph::rgb_buffer_len(width, height)];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        render(&root, records, options, mapping, data_types, styles)?;
    }
    graph::encode_png(&buffer, width, height)
}

/// Full pipeline from a raw table: infer types, validate and map, render.
pub fn render_chart(
    data: &PlotData,
    mapping: &Mapping,
    options: &VisualOptions,
    styles: &ChartStyles,
    format: &OutputFormat,
) -> Result<Vec<u8>> {
    let data_types = infer_types(data);
    let dimensions = dimensions::dimensions();
    mapping.validate(data, &data_types, &dimensions)?;

    let records = map_data(data, mapping, &data_types, &dimensions).context("Failed to map data")?;

    let bytes = match format {
        OutputFormat::Svg => render_to_svg(records, options, mapping, &data_types, styles)?.into_bytes(),
        OutputFormat::Png => render_to_png(records, options, mapping, &data_types, styles)?,
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::read_csv_from_str;
    use crate::parser::parse_mapping;

    fn table(csv: &str) -> PlotData {
        PlotData::from_csv(read_csv_from_str(csv).unwrap())
    }

    fn text_contents(svg: &str) -> Vec<String> {
        svg.split("</text>")
            .filter_map(|chunk| chunk.rfind('>').map(|i| chunk[i + 1..].trim().to_string()))
            .collect()
    }

    fn mapping(text: &str) -> Mapping {
        parse_mapping(text).unwrap().1
    }

    #[test]
    fn test_render_chart_svg() {
        let data = table("cat,grp,v\nA,x,1\nA,x,2\nB,x,2\nA,y,3\n");
        let bytes = render_chart(
            &data,
            &mapping("stacks: cat; bars: v; series: grp"),
            &VisualOptions::default(),
            &ChartStyles::default(),
            &OutputFormat::Svg,
        )
        .unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polygon"));
        assert!(text_contents(&svg).contains(&"x".to_string()));
    }

    #[test]
    fn test_render_chart_png_without_text() {
        let data = table("cat,v,w\nA,1,2\nB,2,1\nC,3,0\n");
        let options = VisualOptions {
            show_grid: false,
            show_series_labels: false,
            width: 200.0,
            height: 150.0,
            ..VisualOptions::default()
        };
        let bytes = render_chart(
            &data,
            &mapping("stacks: cat; bars: v, w"),
            &options,
            &ChartStyles::default(),
            &OutputFormat::Png,
        )
        .unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_render_chart_rejects_negative_values() {
        let data = table("cat,v\nA,1\nB,-4\n");
        let err = render_chart(
            &data,
            &mapping("stacks: cat; bars: v"),
            &VisualOptions::default(),
            &ChartStyles::default(),
            &OutputFormat::Svg,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_render_chart_rejects_large_padding() {
        let rows: String = (0..40).map(|i| format!("c{},1\n", i)).collect();
        let data = table(&format!("cat,v\n{}", rows));
        let options = VisualOptions {
            width: 300.0 + 60.0,
            stacks_padding: 10.0,
            ..VisualOptions::default()
        };
        let err = render_to_svg(
            map_data(&data, &mapping("stacks: cat; bars: v"), &infer_types(&data), &dimensions::dimensions()).unwrap(),
            &options,
            &mapping("stacks: cat; bars: v"),
            &infer_types(&data),
            &ChartStyles::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::PaddingTooLarge { .. }));
        assert!(err.to_string().starts_with("Padding is too high"));
    }

    #[test]
    fn test_render_chart_unknown_column() {
        let data = table("cat,v\nA,1\n");
        let result = render_chart(
            &data,
            &mapping("stacks: category; bars: v"),
            &VisualOptions::default(),
            &ChartStyles::default(),
            &OutputFormat::Svg,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_render_onto_caller_surface() {
        let records = vec![MappedRecord {
            series: None,
            stacks: crate::data::Datum::Text("A".into()),
            bars: "v".into(),
            size: 1.0,
        }];
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (400, 300)).into_drawing_area();
            render(
                &root,
                records,
                &VisualOptions { width: 400.0, height: 300.0, ..VisualOptions::default() },
                &mapping("stacks: cat; bars: v"),
                &DataTypes::new(),
                &ChartStyles::default(),
            )
            .unwrap();
        }
        assert!(svg.contains("<polygon"));
    }
}
