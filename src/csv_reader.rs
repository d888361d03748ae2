use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::io::{self, Read};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv(io::stdin())
}

pub fn read_csv_from_path(path: &Path) -> Result<CsvData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file '{}'", path.display()))?;
    read_csv(file)
}

pub fn read_csv_from_str(input: &str) -> Result<CsvData> {
    read_csv(input.as_bytes())
}

fn read_csv<R: Read>(source: R) -> Result<CsvData> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(anyhow!("CSV must contain at least one data row"));
    }

    log::debug!("read {} CSV rows", rows.len());
    Ok(CsvData { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_from_str() {
        let data = read_csv_from_str("cat, v\nA,3\nB,1\n").unwrap();
        assert_eq!(data.headers, vec!["cat", "v"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1], vec!["B", "1"]);
    }

    #[test]
    fn test_read_csv_requires_rows() {
        let err = read_csv_from_str("cat,v\n").unwrap_err();
        assert!(err.to_string().contains("at least one data row"));
    }

    #[test]
    fn test_read_csv_ragged_rows_fail() {
        assert!(read_csv_from_str("cat,v\nA,3,extra\n").is_err());
    }
}
