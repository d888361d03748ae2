use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use radial_columnchart::csv_reader;
use radial_columnchart::data::PlotData;
use radial_columnchart::dimensions::dimensions;
use radial_columnchart::graph::ChartStyles;
use radial_columnchart::metadata::METADATA;
use radial_columnchart::options::{visual_option_schema, VisualOptions};
use radial_columnchart::parser;
use radial_columnchart::runtime;
use radial_columnchart::OutputFormat;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "radial-columnchart")]
#[command(about = "Render radial stacked column charts from tabular data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a chart from CSV (stdin or --input) to SVG or PNG
    Render(RenderArgs),
    /// Print the chart metadata, dimensions and option schema as JSON
    Schema,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Mapping expression (e.g., 'stacks: country; bars: gdp(sum), population; series: year')
    #[arg(short, long)]
    mapping: String,

    /// Input file; `.json` files hold an array of objects, anything else is CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON file with visual options
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "svg")]
    format: OutputFormat,

    /// Override the artboard width
    #[arg(long)]
    width: Option<f64>,

    /// Override the artboard height
    #[arg(long)]
    height: Option<f64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_data(input: Option<&PathBuf>) -> Result<PlotData> {
    match input {
        Some(path) if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse JSON input")?;
            PlotData::from_json(&value)
        }
        Some(path) => Ok(PlotData::from_csv(csv_reader::read_csv_from_path(path)?)),
        None => Ok(PlotData::from_csv(
            csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?,
        )),
    }
}

fn read_options(args: &RenderArgs) -> Result<VisualOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse options JSON")?;
            VisualOptions::from_json(&value)?
        }
        None => VisualOptions::default(),
    };
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    options.validate()?;
    Ok(options)
}

fn render(args: RenderArgs) -> Result<()> {
    // Parse the mapping expression
    let mapping = match parser::parse_mapping(&args.mapping) {
        Ok((remaining, mapping)) => {
            if !remaining.trim().is_empty() {
                eprintln!("Warning: unparsed input: '{}'", remaining);
            }
            mapping
        }
        Err(e) => {
            eprintln!("Parse error: {:?}", e);
            std::process::exit(1);
        }
    };

    let options = read_options(&args)?;
    let data = read_data(args.input.as_ref())?;

    let bytes = runtime::render_chart(&data, &mapping, &options, &ChartStyles::default(), &args.format)
        .context("Failed to render chart")?;

    match &args.output {
        Some(path) => fs::write(path, &bytes)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

fn schema() -> Result<()> {
    let schema = serde_json::json!({
        "metadata": METADATA,
        "dimensions": dimensions(),
        "options": visual_option_schema(),
    });
    let text = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Render(args) => render(args),
        Command::Schema => schema(),
    }
}
