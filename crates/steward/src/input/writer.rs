//! Serializing a dataset back to delimited text or JSON records.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::dataset::{Cell, Dataset};
use crate::error::{Result, StewardError};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    /// Array of row objects keyed by column name.
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => OutputFormat::Tsv,
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(StewardError::Config(format!(
                "unsupported output format '{}'",
                other
            ))),
        }
    }
}

/// Render a dataset in the given format.
pub fn to_bytes(dataset: &Dataset, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => delimited(dataset, b','),
        OutputFormat::Tsv => delimited(dataset, b'\t'),
        OutputFormat::Json => {
            let records: Vec<IndexMap<&str, &Cell>> = (0..dataset.row_count())
                .map(|row| {
                    dataset
                        .columns()
                        .iter()
                        .map(|c| (c.name.as_str(), &c.values[row]))
                        .collect()
                })
                .collect();
            Ok(serde_json::to_vec_pretty(&records)?)
        }
    }
}

/// Write a dataset to a file.
pub fn write_dataset(dataset: &Dataset, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(dataset, format)?;
    fs::write(path, bytes).map_err(|e| StewardError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), ?format, "wrote dataset");
    Ok(())
}

fn delimited(dataset: &Dataset, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(dataset.headers())?;
    for row in 0..dataset.row_count() {
        writer.write_record(dataset.row(row).iter().map(|cell| cell.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| StewardError::Config(format!("failed to flush output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Column, Parser};

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            Column::from_strs("name", &["Alice", "Bob, Jr."]),
            Column::new("score", vec![Cell::Number(3.0), Cell::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_output_quotes_delimiters() {
        let bytes = to_bytes(&sample(), OutputFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,score\nAlice,3\n\"Bob, Jr.\",\n");
    }

    #[test]
    fn test_json_output_is_row_records() {
        let bytes = to_bytes(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["name"], "Alice");
        assert_eq!(value[0]["score"], 3.0);
        assert!(value[1]["score"].is_null());
    }

    #[test]
    fn test_csv_reparses_to_same_text() {
        let original = Parser::new().parse_bytes(b"a,b\nx,1\ny,2\n").unwrap();
        let bytes = to_bytes(&original, OutputFormat::Csv).unwrap();
        let reparsed = Parser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.TSV")), OutputFormat::Tsv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
    }
}
