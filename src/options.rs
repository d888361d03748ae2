use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Ordering of the measures stacked within one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StacksOrder {
    Earliest,
    Ascending,
    Descending,
    #[serde(rename = "Inside out")]
    InsideOut,
    #[default]
    None,
    Reverse,
}

impl StacksOrder {
    pub const ALL: [StacksOrder; 6] = [
        StacksOrder::Earliest,
        StacksOrder::Ascending,
        StacksOrder::Descending,
        StacksOrder::InsideOut,
        StacksOrder::None,
        StacksOrder::Reverse,
    ];
}

/// Ordering of the categories around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortXAxisBy {
    #[serde(rename = "Total value (descending)")]
    TotalDescending,
    #[serde(rename = "Total value (ascending)")]
    TotalAscending,
    #[default]
    Name,
    Original,
}

impl SortXAxisBy {
    pub const ALL: [SortXAxisBy; 4] = [
        SortXAxisBy::TotalDescending,
        SortXAxisBy::TotalAscending,
        SortXAxisBy::Name,
        SortXAxisBy::Original,
    ];
}

/// Ordering of the small multiples in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortSeriesBy {
    #[default]
    ValueDescending,
    ValueAscending,
    Name,
    None,
}

impl SortSeriesBy {
    pub const ALL: [SortSeriesBy; 4] = [
        SortSeriesBy::ValueDescending,
        SortSeriesBy::ValueAscending,
        SortSeriesBy::Name,
        SortSeriesBy::None,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScaleType {
    #[default]
    Ordinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolator {
    #[default]
    #[serde(rename = "interpolateSpectral")]
    Spectral,
    #[serde(rename = "schemeCategory10")]
    Category10,
}

/// A user pinned colour for one domain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserColor {
    pub domain: String,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorScaleSpec {
    pub scale_type: ColorScaleType,
    pub interpolator: Interpolator,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_scale_values: Vec<UserColor>,
}

/// Resolved visual configuration of one render. Missing fields take their
/// defaults when deserialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualOptions {
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub show_legend: bool,
    pub legend_width: f64,
    pub inner_diameter: f64,
    pub stacks_padding: f64,
    pub stacks_order: StacksOrder,
    #[serde(rename = "SortXAxisBy")]
    pub sort_x_axis_by: SortXAxisBy,
    pub use_same_scale: bool,
    pub columns_number: usize,
    pub sort_series_by: SortSeriesBy,
    pub show_series_labels: bool,
    pub repeat_axes_labels: bool,
    pub show_grid: bool,
    pub color_scale: ColorScaleSpec,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            width: 805.0,
            height: 600.0,
            background: "#FFFFFF".to_string(),
            margin_top: 20.0,
            margin_right: 10.0,
            margin_bottom: 20.0,
            margin_left: 50.0,
            show_legend: false,
            legend_width: 200.0,
            inner_diameter: 0.0,
            stacks_padding: 1.0,
            stacks_order: StacksOrder::None,
            sort_x_axis_by: SortXAxisBy::Name,
            use_same_scale: true,
            columns_number: 0,
            sort_series_by: SortSeriesBy::ValueDescending,
            show_series_labels: true,
            repeat_axes_labels: false,
            show_grid: true,
            color_scale: ColorScaleSpec::default(),
        }
    }
}

impl VisualOptions {
    /// Deserialise host options and validate them.
    pub fn from_json(value: &Value) -> Result<Self> {
        let options: VisualOptions =
            serde_json::from_value(value.clone()).context("Failed to parse visual options")?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.width.is_finite()) || !(self.height > 0.0 && self.height.is_finite()) {
            bail!("Artboard size must be positive (got {}x{})", self.width, self.height);
        }
        let non_negative = [
            ("marginTop", self.margin_top),
            ("marginRight", self.margin_right),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
            ("legendWidth", self.legend_width),
            ("innerDiameter", self.inner_diameter),
            ("stacksPadding", self.stacks_padding),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                bail!("Option '{}' must be a non-negative number (got {})", name, value);
            }
        }
        if crate::palette::parse_color(&self.background).is_none() {
            bail!("Option 'background' is not a colour: '{}'", self.background);
        }
        Ok(())
    }

    /// Total drawing size, including the legend column when shown.
    pub fn artboard_size(&self) -> (u32, u32) {
        let width = if self.show_legend {
            self.width + self.legend_width
        } else {
            self.width
        };
        (width.round() as u32, self.height.round() as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKind {
    Number,
    Boolean,
    Text,
    Color,
    ColorScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionGroup {
    Artboard,
    Chart,
    Series,
    Colors,
}

/// Declarative description of one option, for a host settings panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub label: &'static str,
    pub default: Value,
    pub group: OptionGroup,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<&'static str>,
}

fn values_of<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

/// The option schema. Defaults are read from `VisualOptions::default()`.
pub fn visual_option_schema() -> Vec<OptionSpec> {
    let defaults = serde_json::to_value(VisualOptions::default()).unwrap_or(Value::Null);
    let spec = |id: &'static str, kind: OptionKind, label: &'static str, group: OptionGroup| OptionSpec {
        id,
        kind,
        label,
        default: defaults.get(id).cloned().unwrap_or(Value::Null),
        group,
        options: Vec::new(),
        disabled: None,
        dimension: None,
    };

    vec![
        spec("width", OptionKind::Number, "Width", OptionGroup::Artboard),
        spec("height", OptionKind::Number, "Height", OptionGroup::Artboard),
        spec("background", OptionKind::Color, "Background", OptionGroup::Artboard),
        spec("marginTop", OptionKind::Number, "Margin (top)", OptionGroup::Artboard),
        spec("marginRight", OptionKind::Number, "Margin (right)", OptionGroup::Artboard),
        spec("marginBottom", OptionKind::Number, "Margin (bottom)", OptionGroup::Artboard),
        spec("marginLeft", OptionKind::Number, "Margin (left)", OptionGroup::Artboard),
        spec("showLegend", OptionKind::Boolean, "Show legend", OptionGroup::Artboard),
        OptionSpec {
            disabled: Some(json!({ "showLegend": false })),
            ..spec("legendWidth", OptionKind::Number, "Legend width", OptionGroup::Artboard)
        },
        spec("innerDiameter", OptionKind::Number, "Inner diameter", OptionGroup::Chart),
        spec("stacksPadding", OptionKind::Number, "Padding", OptionGroup::Chart),
        OptionSpec {
            options: values_of(&StacksOrder::ALL),
            ..spec("stacksOrder", OptionKind::Text, "Sort bars by", OptionGroup::Chart)
        },
        OptionSpec {
            options: values_of(&SortXAxisBy::ALL),
            ..spec("SortXAxisBy", OptionKind::Text, "Sort X axis by", OptionGroup::Chart)
        },
        spec("useSameScale", OptionKind::Boolean, "Use same scale", OptionGroup::Series),
        spec("columnsNumber", OptionKind::Number, "Number of columns", OptionGroup::Series),
        OptionSpec {
            options: values_of(&SortSeriesBy::ALL),
            ..spec("sortSeriesBy", OptionKind::Text, "Sort series by", OptionGroup::Series)
        },
        spec("showSeriesLabels", OptionKind::Boolean, "Show series titles", OptionGroup::Series),
        spec("repeatAxesLabels", OptionKind::Boolean, "Repeat axis labels for each series", OptionGroup::Series),
        spec("showGrid", OptionKind::Boolean, "Show series grid", OptionGroup::Series),
        OptionSpec {
            dimension: Some("bars"),
            ..spec("colorScale", OptionKind::ColorScale, "Color scale", OptionGroup::Colors)
        },
    ]
}
