use crate::aggregate::{aggregate, Aggregated, Aggregation};
use crate::data::{DataType, DataTypes, Datum, PlotData};
use crate::dimensions::{self, Dimension};
use anyhow::{anyhow, bail, Context, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One measure column feeding the `bars` dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureMapping {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

/// Assignment of source columns to the chart dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub stacks: String,
    pub bars: Vec<MeasureMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

/// A chart-ready record: one measure of one (series, stacks) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedRecord {
    pub series: Option<Datum>,
    pub stacks: Datum,
    pub bars: String,
    pub size: f64,
}

impl MappedRecord {
    pub fn series_key(&self) -> String {
        self.series.as_ref().map(Datum::key).unwrap_or_default()
    }
}

impl Mapping {
    /// Columns mapped to a dimension id.
    pub fn columns_for(&self, dimension_id: &str) -> Vec<&str> {
        match dimension_id {
            "stacks" => vec![self.stacks.as_str()],
            "bars" => self.bars.iter().map(|m| m.column.as_str()).collect(),
            "series" => self.series.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Check the mapping against the dimension constraints and the table.
    pub fn validate(&self, data: &PlotData, data_types: &DataTypes, dimensions: &[Dimension]) -> Result<()> {
        for dimension in dimensions {
            let columns: Vec<&str> = self
                .columns_for(dimension.id)
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect();

            if dimension.required && columns.is_empty() {
                bail!("Dimension '{}' ({}) is required", dimension.id, dimension.name);
            }
            if !dimension.multiple && columns.len() > 1 {
                bail!("Dimension '{}' accepts a single column", dimension.id);
            }
            let mut seen = IndexSet::new();
            if let Some(column) = columns.iter().find(|c| !seen.insert(**c)) {
                bail!("Column '{}' mapped twice to dimension '{}'", column, dimension.id);
            }

            for column in columns {
                data.column_index(column)
                    .with_context(|| format!("Invalid mapping for dimension '{}'", dimension.id))?;
                let kind = column_type(data_types, column)?.kind();
                if !dimension.valid_types.contains(&kind) {
                    bail!(
                        "Column '{}' is of type {:?}, which dimension '{}' does not accept",
                        column,
                        kind,
                        dimension.id
                    );
                }
            }
        }
        Ok(())
    }
}

fn column_type<'a>(data_types: &'a DataTypes, column: &str) -> Result<&'a DataType> {
    data_types
        .get(column)
        .or_else(|| {
            data_types
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, t)| t)
        })
        .ok_or_else(|| anyhow!("No data type known for column '{}'", column))
}

struct Group {
    series: Option<Datum>,
    stacks: Datum,
    rows: Vec<usize>,
}

struct Measure<'a> {
    name: &'a str,
    index: usize,
    data_type: &'a DataType,
    aggregation: Aggregation,
}

/// Group rows by series then by the canonical stacks value and aggregate
/// every mapped measure, emitting one record per (series, stacks, measure).
/// Groups keep first-seen order.
pub fn map_data(
    data: &PlotData,
    mapping: &Mapping,
    data_types: &DataTypes,
    dimensions: &[Dimension],
) -> Result<Vec<MappedRecord>> {
    let stacks_index = data.column_index(&mapping.stacks)?;
    let stacks_type = column_type(data_types, &mapping.stacks)?;
    let series_column = match &mapping.series {
        Some(column) => Some((data.column_index(column)?, column_type(data_types, column)?)),
        None => None,
    };

    let bars_default = dimensions::find(dimensions, "bars").and_then(|d| d.aggregation_default);
    let measures = mapping
        .bars
        .iter()
        .map(|m| {
            let data_type = column_type(data_types, &m.column)?;
            let aggregation = m
                .aggregation
                .or_else(|| bars_default.map(|d| d.for_kind(data_type.kind())))
                .unwrap_or(Aggregation::Sum);
            Ok(Measure {
                name: &m.column,
                index: data.column_index(&m.column)?,
                data_type,
                aggregation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut groups: IndexMap<String, IndexMap<String, Group>> = IndexMap::new();
    for row in 0..data.rows.len() {
        let series = match series_column {
            Some((index, data_type)) => Some(Datum::parse(data.cell(row, index), data_type)?),
            None => None,
        };
        let stacks = Datum::parse(data.cell(row, stacks_index), stacks_type)
            .with_context(|| format!("Row {}: invalid value for '{}'", row + 1, mapping.stacks))?;

        let series_key = series.as_ref().map(Datum::key).unwrap_or_default();
        let stacks_key = stacks.key();
        groups
            .entry(series_key)
            .or_default()
            .entry(stacks_key)
            .or_insert_with(|| Group {
                series,
                stacks,
                rows: Vec::new(),
            })
            .rows
            .push(row);
    }

    let mut records = Vec::new();
    for group in groups.values().flat_map(|g| g.values()) {
        for measure in &measures {
            let values = group
                .rows
                .iter()
                .map(|&row| data.cell(row, measure.index))
                .filter(|cell| !cell.trim().is_empty())
                .map(|cell| Datum::parse(cell, measure.data_type))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid value in column '{}'", measure.name))?;

            // A numeric reduction over empty cells draws nothing
            let size = match aggregate(measure.aggregation, &values) {
                Aggregated::Number(n) if n.is_nan() => 0.0,
                aggregated => aggregated.as_number().ok_or_else(|| {
                    anyhow!(
                        "Aggregation '{}' of column '{}' gives no numeric value for '{}'",
                        measure.aggregation.name(),
                        measure.name,
                        group.stacks
                    )
                })?,
            };

            records.push(MappedRecord {
                series: group.series.clone(),
                stacks: group.stacks.clone(),
                bars: measure.name.to_string(),
                size,
            });
        }
    }

    log::debug!("mapped {} rows into {} records", data.rows.len(), records.len());
    Ok(records)
}
