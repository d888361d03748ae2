use crate::geometry::RadialBar;
use crate::graph::{LabelStyle, LineStyle};
use crate::layout::Cell;
use crate::scale::{BandScale, LinearScale};
use crate::stack::StackLayer;
use plotters::style::RGBColor;

// =============================================================================
// Phase 1: Transformation
// =============================================================================

/// Records grouped, ordered and stacked, ready for scaling.
#[derive(Debug, Clone)]
pub struct RenderData {
    pub series: Vec<SeriesData>,
    pub layout: GridLayout,
    /// Category keys around the circle, in display order.
    pub stacks_domain: Vec<String>,
    /// Measure names in first-seen order; also the stacking key order.
    pub bars_domain: Vec<String>,
    /// [0, max category sum over every series]
    pub shared_domain: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    pub nrow: usize,
    pub ncol: usize,
}

/// One small multiple.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub index: usize,
    pub key: String,
    pub label: Option<String>,
    pub total_size: f64,
    pub cell: Cell,
    /// [0, max category sum within this series]
    pub local_domain: (f64, f64),
    /// One layer per measure, in `bars_domain` order, with one interval per category.
    pub layers: Vec<StackLayer>,
}

// =============================================================================
// Phase 2: Scaling
// =============================================================================

#[derive(Debug, Clone)]
pub struct ScaleSystem {
    // One entry per series, same order as RenderData.series
    pub panels: Vec<PanelScales>,
}

#[derive(Debug, Clone)]
pub struct PanelScales {
    pub frame: PolarFrame,
    pub radial: LinearScale,
    pub angular: BandScale,
}

/// Where a series' polar plot sits on the artboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarFrame {
    pub center: (f64, f64),
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub plot_width: f64,
    pub plot_height: f64,
}

// =============================================================================
// Phase 3: Compilation (Scene Graph)
// =============================================================================

/// Everything the backend needs to draw, in artboard pixels.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub font_family: String,
    pub panels: Vec<PanelScene>,
    pub legend: Option<LegendScene>,
}

#[derive(Debug, Clone)]
pub struct PanelScene {
    pub row: usize,
    pub col: usize,
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    DrawRect {
        // Top-Left, Bottom-Right
        tl: (f64, f64),
        br: (f64, f64),
        stroke: LineStyle,
    },
    DrawCircle {
        center: (f64, f64),
        radius: f64,
        stroke: LineStyle,
    },
    DrawLine {
        points: Vec<(f64, f64)>,
        stroke: LineStyle,
    },
    DrawSector {
        center: (f64, f64),
        bar: RadialBar,
        fill: RGBColor,
        legend: String,
    },
    DrawText {
        text: String,
        pos: (f64, f64),
        style: LabelStyle,
    },
}

#[derive(Debug, Clone)]
pub struct LegendScene {
    pub origin: (f64, f64),
    pub width: f64,
    pub title: String,
    pub title_size: f64,
    pub label_size: f64,
    pub text_color: RGBColor,
    pub swatch: f64,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
}
