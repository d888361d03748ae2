// Library exports for radial-columnchart

pub mod aggregate;
pub mod csv_reader;
pub mod data;
pub mod dimensions;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod metadata;
pub mod options;
pub mod palette;
pub mod parser;
pub mod runtime;

// Rendering pipeline
pub mod compiler;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod scale;
pub mod stack;
pub mod transform;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    #[default]
    Svg,
}
