use crate::data::{DataTypes, DateFormat, Datum};
use crate::error::RenderError;
use crate::ir::{GridLayout, RenderData, SeriesData};
use crate::layout;
use crate::mapping::{MappedRecord, Mapping};
use crate::options::{SortSeriesBy, SortXAxisBy, VisualOptions};
use crate::stack;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Main entry point: validate, normalise, group and stack the mapped records.
pub fn apply_transformations(
    mut records: Vec<MappedRecord>,
    options: &VisualOptions,
    mapping: &Mapping,
    data_types: &DataTypes,
) -> Result<RenderData, RenderError> {
    // 1. Reject negative sizes
    validate_records(&records)?;

    // 2. Date categories are compared by their formatted text
    if let Some(format) = data_types.get(&mapping.stacks).and_then(|t| t.date_format()) {
        normalize_dates(&mut records, format);
    }

    // 3. Series, in display order
    let groups = group_series(&records, options.sort_series_by);

    // 4. Domains shared by every series
    let stacks_domain = stacks_domain(&records, options.sort_x_axis_by);
    let bars_domain = bars_domain(&records);
    let shared_max = groups
        .iter()
        .map(|g| max_category_sum(&g.records))
        .fold(0.0, f64::max);

    // 5. Grid
    let (nrow, ncol, cells) = layout::grid(
        groups.len(),
        (options.width, options.height),
        options.columns_number,
    );
    log::debug!(
        "{} series on a {}x{} grid, {} categories, {} measures",
        groups.len(),
        nrow,
        ncol,
        stacks_domain.len(),
        bars_domain.len()
    );

    // 6. Stack every series over the global domains
    let series = groups
        .into_iter()
        .zip(cells)
        .enumerate()
        .map(|(index, (group, cell))| {
            let values = stack_values(&group.records, &stacks_domain, &bars_domain);
            SeriesData {
                index,
                key: group.key,
                label: group.label,
                total_size: group.total_size,
                cell,
                local_domain: (0.0, max_category_sum(&group.records)),
                layers: stack::stack(&bars_domain, &values, options.stacks_order),
            }
        })
        .collect();

    Ok(RenderData {
        series,
        layout: GridLayout { nrow, ncol },
        stacks_domain,
        bars_domain,
        shared_domain: (0.0, shared_max),
    })
}

/// Fail on the first record with a negative size.
pub fn validate_records(records: &[MappedRecord]) -> Result<(), RenderError> {
    match records.iter().find(|r| r.size < 0.0) {
        Some(r) => Err(RenderError::NegativeValue {
            series: r.series.as_ref().map(Datum::to_string),
            stacks: r.stacks.to_string(),
            bars: r.bars.clone(),
            size: r.size,
        }),
        None => Ok(()),
    }
}

/// Rewrite every `stacks` value as text in `format`, so that a parsed date
/// and the same date still held as text fall into one category.
pub fn normalize_dates(records: &mut [MappedRecord], format: DateFormat) {
    for record in records.iter_mut() {
        let formatted = match &record.stacks {
            Datum::Date(value) => Some(format.format(value)),
            Datum::Text(raw) => match format.parse(raw) {
                Some(value) => Some(format.format(&value)),
                None => {
                    log::warn!("category '{}' is not a {:?} date, left unchanged", raw, format);
                    None
                }
            },
            Datum::Number(_) => None,
        };
        if let Some(text) = formatted {
            record.stacks = Datum::Text(text);
        }
    }
}

/// Category key of a record's `stacks` value.
pub fn category_key(record: &MappedRecord) -> String {
    record.stacks.to_string()
}

/// Records sharing one `series` value.
#[derive(Debug, Clone)]
pub struct SeriesGroup {
    pub key: String,
    pub label: Option<String>,
    pub value: Option<Datum>,
    pub total_size: f64,
    pub records: Vec<MappedRecord>,
}

/// Group records by series in first-seen order, then sort the groups.
pub fn group_series(records: &[MappedRecord], order: SortSeriesBy) -> Vec<SeriesGroup> {
    let mut groups: IndexMap<String, SeriesGroup> = IndexMap::new();
    for record in records {
        let group = groups.entry(record.series_key()).or_insert_with(|| SeriesGroup {
            key: record.series_key(),
            label: record.series.as_ref().map(Datum::to_string),
            value: record.series.clone(),
            total_size: 0.0,
            records: Vec::new(),
        });
        group.total_size += record.size;
        group.records.push(record.clone());
    }

    let mut groups: Vec<SeriesGroup> = groups.into_values().collect();
    match order {
        SortSeriesBy::ValueDescending => groups.sort_by(|a, b| b.total_size.total_cmp(&a.total_size)),
        SortSeriesBy::ValueAscending => groups.sort_by(|a, b| a.total_size.total_cmp(&b.total_size)),
        SortSeriesBy::Name => groups.sort_by(|a, b| match (&a.value, &b.value) {
            (Some(x), Some(y)) => x.ascending(y),
            _ => Ordering::Equal,
        }),
        SortSeriesBy::None => {}
    }
    groups
}

/// Distinct categories across the whole dataset, ordered for display.
pub fn stacks_domain(records: &[MappedRecord], sort: SortXAxisBy) -> Vec<String> {
    let mut categories: IndexMap<String, (Datum, f64)> = IndexMap::new();
    for record in records {
        let entry = categories
            .entry(category_key(record))
            .or_insert_with(|| (record.stacks.clone(), 0.0));
        entry.1 += record.size;
    }

    let mut entries: Vec<(String, (Datum, f64))> = categories.into_iter().collect();
    match sort {
        SortXAxisBy::TotalDescending => entries.sort_by(|a, b| (b.1).1.total_cmp(&(a.1).1)),
        SortXAxisBy::TotalAscending => entries.sort_by(|a, b| (a.1).1.total_cmp(&(b.1).1)),
        SortXAxisBy::Name => entries.sort_by(|a, b| (a.1).0.ascending(&(b.1).0)),
        SortXAxisBy::Original => {}
    }
    entries.into_iter().map(|(key, _)| key).collect()
}

/// Distinct measure names in first-seen order.
pub fn bars_domain(records: &[MappedRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        if !names.contains(&record.bars) {
            names.push(record.bars.clone());
        }
    }
    names
}

/// Largest per-category sum of sizes.
pub fn max_category_sum(records: &[MappedRecord]) -> f64 {
    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for record in records {
        *sums.entry(category_key(record)).or_insert(0.0) += record.size;
    }
    sums.values().copied().fold(0.0, f64::max)
}

/// `values[category][measure]` for one series; absent pairs are zero.
fn stack_values(records: &[MappedRecord], stacks: &[String], bars: &[String]) -> Vec<Vec<f64>> {
    let mut values = vec![vec![0.0; bars.len()]; stacks.len()];
    for record in records {
        let key = category_key(record);
        if let (Some(i), Some(j)) = (
            stacks.iter().position(|s| *s == key),
            bars.iter().position(|b| *b == record.bars),
        ) {
            values[i][j] += record.size;
        }
    }
    values
}
