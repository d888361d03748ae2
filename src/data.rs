use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone)]
pub struct PlotData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PlotData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        Self {
            headers: csv.headers,
            rows: csv.rows,
        }
    }

    /// Create PlotData from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => "".to_string(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Position of a column, matching exactly first and then ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
            .ok_or_else(|| {
                anyhow!(
                    "Column '{}' not found. Available columns: {}",
                    name,
                    self.headers.join(", ")
                )
            })
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Coarse value kind used by dimension constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Number,
    String,
    Date,
}

/// Input date formats a date column can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[serde(rename = "YYYY-MM")]
    YearMonth,
    #[serde(rename = "MM/YYYY")]
    MonthYear,
    #[serde(rename = "YYYY")]
    Year,
    #[serde(rename = "YYYY-MM-DD HH:mm")]
    DateTimeMinutes,
    #[serde(rename = "ISO")]
    Iso,
}

impl DateFormat {
    pub const ALL: [DateFormat; 8] = [
        DateFormat::YearMonthDay,
        DateFormat::DayMonthYear,
        DateFormat::MonthDayYear,
        DateFormat::YearMonth,
        DateFormat::MonthYear,
        DateFormat::Year,
        DateFormat::DateTimeMinutes,
        DateFormat::Iso,
    ];

    /// strftime pattern used to print values of this format.
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::YearMonthDay => "%Y-%m-%d",
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::YearMonth => "%Y-%m",
            DateFormat::MonthYear => "%m/%Y",
            DateFormat::Year => "%Y",
            DateFormat::DateTimeMinutes => "%Y-%m-%d %H:%M",
            DateFormat::Iso => "%Y-%m-%dT%H:%M:%S",
        }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        let date = match self {
            DateFormat::YearMonthDay | DateFormat::DayMonthYear | DateFormat::MonthDayYear => {
                NaiveDate::parse_from_str(raw, self.pattern()).ok()
            }
            DateFormat::YearMonth => NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok(),
            DateFormat::MonthYear => NaiveDate::parse_from_str(&format!("01/{}", raw), "%d/%m/%Y").ok(),
            DateFormat::Year => {
                if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                raw.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            }
            DateFormat::DateTimeMinutes => {
                return NaiveDateTime::parse_from_str(raw, self.pattern()).ok();
            }
            DateFormat::Iso => {
                return NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.naive_utc()));
            }
        };
        date.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn format(&self, value: &NaiveDateTime) -> String {
        value.format(self.pattern()).to_string()
    }
}

/// Declared type of a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataType {
    Number,
    String,
    Date {
        #[serde(rename = "dateFormat")]
        date_format: DateFormat,
    },
}

impl DataType {
    pub fn kind(&self) -> DataKind {
        match self {
            DataType::Number => DataKind::Number,
            DataType::String => DataKind::String,
            DataType::Date { .. } => DataKind::Date,
        }
    }

    pub fn date_format(&self) -> Option<DateFormat> {
        match self {
            DataType::Date { date_format } => Some(*date_format),
            _ => None,
        }
    }
}

/// Column name to declared type, in column order.
pub type DataTypes = IndexMap<String, DataType>;

/// Infer a type per column: numbers first, then the first date format that
/// reads every non-empty cell, otherwise text.
pub fn infer_types(data: &PlotData) -> DataTypes {
    let mut types = DataTypes::new();
    for (idx, header) in data.headers.iter().enumerate() {
        let cells: Vec<&str> = (0..data.rows.len())
            .map(|row| data.cell(row, idx).trim())
            .filter(|c| !c.is_empty())
            .collect();

        let data_type = if cells.is_empty() {
            DataType::String
        } else if cells.iter().all(|c| c.parse::<f64>().is_ok()) {
            DataType::Number
        } else if let Some(date_format) = DateFormat::ALL
            .iter()
            .find(|f| cells.iter().all(|c| f.parse(c).is_some()))
        {
            DataType::Date { date_format: *date_format }
        } else {
            DataType::String
        };
        log::debug!("inferred column '{}' as {:?}", header, data_type);
        types.insert(header.clone(), data_type);
    }
    types
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl Datum {
    /// Read a raw cell under its declared type. Dates that do not match the
    /// declared format are kept as text.
    pub fn parse(raw: &str, data_type: &DataType) -> Result<Datum> {
        match data_type {
            DataType::Number => raw
                .trim()
                .parse::<f64>()
                .map(Datum::Number)
                .with_context(|| format!("Cannot read '{}' as a number", raw)),
            DataType::String => Ok(Datum::Text(raw.to_string())),
            DataType::Date { date_format } => Ok(match date_format.parse(raw) {
                Some(value) => Datum::Date(value),
                None => {
                    log::warn!("'{}' does not match date format {:?}, keeping it as text", raw, date_format);
                    Datum::Text(raw.to_string())
                }
            }),
        }
    }

    /// Canonical string used to compare values for grouping.
    pub fn key(&self) -> String {
        match self {
            Datum::Number(n) => n.to_string(),
            Datum::Text(s) => s.clone(),
            Datum::Date(d) => d.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Natural ascending order: numbers numerically, dates chronologically,
    /// text lexicographically. Mixed kinds fall back to their keys.
    pub fn ascending(&self, other: &Datum) -> Ordering {
        match (self, other) {
            (Datum::Number(a), Datum::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Datum::Date(a), Datum::Date(b)) => a.cmp(b),
            (Datum::Text(a), Datum::Text(b)) => a.cmp(b),
            _ => self.key().cmp(&other.key()),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{}", n),
            Datum::Text(s) => f.write_str(s),
            Datum::Date(d) if d.num_seconds_from_midnight() == 0 => write!(f, "{}", d.format("%Y-%m-%d")),
            Datum::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Datum::Number(n) => serializer.serialize_f64(*n),
            _ => serializer.collect_str(self),
        }
    }
}
