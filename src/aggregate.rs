use crate::data::Datum;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Reductions a measure column can be summarised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregation {
    Sum,
    Mean,
    Median,
    Max,
    Min,
    Count,
    CountDistinct,
    Csv,
    CsvDistinct,
}

impl Aggregation {
    pub const ALL: [Aggregation; 9] = [
        Aggregation::Sum,
        Aggregation::Mean,
        Aggregation::Median,
        Aggregation::Max,
        Aggregation::Min,
        Aggregation::Count,
        Aggregation::CountDistinct,
        Aggregation::Csv,
        Aggregation::CsvDistinct,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "countDistinct",
            Aggregation::Csv => "csv",
            Aggregation::CsvDistinct => "csvDistinct",
        }
    }

    pub fn from_name(name: &str) -> Option<Aggregation> {
        Aggregation::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Result of an aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregated {
    Number(f64),
    Text(String),
}

impl Aggregated {
    /// Numeric view; joined text only counts when it reads as a single number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Aggregated::Number(n) if !n.is_nan() => Some(*n),
            Aggregated::Number(_) => None,
            Aggregated::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// Reduce a group of values. Numeric reductions skip non-numeric values;
/// reductions with no input yield NaN except `sum` and the counts.
pub fn aggregate(kind: Aggregation, values: &[Datum]) -> Aggregated {
    let numbers = || values.iter().filter_map(Datum::as_number).filter(|n| !n.is_nan());

    match kind {
        Aggregation::Sum => Aggregated::Number(numbers().sum()),
        Aggregation::Mean => {
            let (total, count) = numbers().fold((0.0, 0usize), |(t, c), n| (t + n, c + 1));
            Aggregated::Number(if count == 0 { f64::NAN } else { total / count as f64 })
        }
        Aggregation::Median => {
            let mut sorted: Vec<f64> = numbers().collect();
            sorted.sort_by(|a, b| a.total_cmp(b));
            Aggregated::Number(median(&sorted))
        }
        Aggregation::Max => Aggregated::Number(numbers().fold(f64::NAN, f64::max)),
        Aggregation::Min => Aggregated::Number(numbers().fold(f64::NAN, f64::min)),
        Aggregation::Count => Aggregated::Number(values.len() as f64),
        Aggregation::CountDistinct => {
            let distinct: IndexSet<String> = values.iter().map(Datum::key).collect();
            Aggregated::Number(distinct.len() as f64)
        }
        Aggregation::Csv => Aggregated::Text(
            values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","),
        ),
        Aggregation::CsvDistinct => {
            let distinct: IndexSet<String> = values.iter().map(|v| v.to_string()).collect();
            Aggregated::Text(distinct.into_iter().collect::<Vec<_>>().join(","))
        }
    }
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
