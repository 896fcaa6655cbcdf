//! In-memory tabular data: cells, columns and datasets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StewardError};
use crate::profile::parse_number;

/// Tokens that parse to [`Cell::Null`], compared case-insensitively.
pub const DEFAULT_NULL_TOKENS: &[&str] = &["na", "n/a", "null", "none", "nil", "nan"];

/// A single scalar value.
///
/// Parsed files only produce `Null` and `Text`; `Number` appears when a
/// transformation writes a computed value (a fill statistic, a category
/// code) back into the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Parse a raw field, mapping null tokens to `Null`.
    pub fn parse(raw: &str, null_tokens: &[String]) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && null_tokens.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            Cell::Null
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// An empty or whitespace-only text cell.
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }

    /// Neither null nor blank.
    pub fn is_populated(&self) -> bool {
        !self.is_null() && !self.is_blank()
    }

    /// Null or blank: the cells a fill targets.
    pub fn is_missing(&self) -> bool {
        !self.is_populated()
    }

    /// Numeric view of the cell, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s),
            Cell::Null => None,
        }
    }

    /// Text view of a populated cell, trimmed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Cell::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counts and duplicate detection.
    pub(crate) fn key(&self) -> String {
        match self {
            Cell::Null => "\u{0}".to_string(),
            Cell::Number(n) => format!("n:{}", format_number(*n)),
            Cell::Text(s) => format!("t:{}", s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let rounded = (n * 1e6).round() / 1e6;
        format!("{}", rounded)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a column from string literals; handy in tests and demos.
    pub fn from_strs(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|v| Cell::text(*v)).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Populated values as trimmed text.
    pub fn populated_text(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().filter_map(Cell::as_text)
    }
}

/// An ordered set of equally long columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Create a dataset, checking that every column has the same length and
    /// that column names are unique.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    /// Like [`Dataset::from_columns`] with an explicit row count, which a
    /// dataset keeps even when every column has been dropped.
    pub fn with_row_count(columns: Vec<Column>, row_count: usize) -> Result<Self> {
        for (index, column) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(StewardError::Parse {
                    row: column.len().min(row_count),
                    column: index,
                    message: format!(
                        "column '{}' has {} values, expected {}",
                        column.name,
                        column.len(),
                        row_count
                    ),
                });
            }
            if columns[..index].iter().any(|c| c.name == column.name) {
                return Err(StewardError::Parse {
                    row: 0,
                    column: index,
                    message: format!("duplicate column name '{}'", column.name),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Create a dataset from a header and row-major cells. Short rows are
    /// padded with nulls; long rows are truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(StewardError::EmptyData("No columns found".to_string()));
        }
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.values.push(cells.next().unwrap_or(Cell::Null));
            }
        }
        Self::from_columns(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a specific cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.columns.get(col).and_then(|c| c.values.get(row))
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns
            .iter()
            .filter_map(|c| c.values.get(index))
            .collect()
    }

    /// Approximate in-memory size of the cell payload in bytes.
    pub fn estimated_size_bytes(&self) -> u64 {
        self.columns
            .iter()
            .flat_map(|c| c.values.iter())
            .map(|cell| match cell {
                Cell::Null => 1,
                Cell::Number(_) => 8,
                Cell::Text(s) => s.len() as u64,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        DEFAULT_NULL_TOKENS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_null_tokens() {
        let tokens = tokens();
        assert_eq!(Cell::parse("NA", &tokens), Cell::Null);
        assert_eq!(Cell::parse(" null ", &tokens), Cell::Null);
        assert_eq!(Cell::parse("N/A", &tokens), Cell::Null);
        assert_eq!(Cell::parse("", &tokens), Cell::text(""));
        assert_eq!(Cell::parse("0", &tokens), Cell::text("0"));
    }

    #[test]
    fn test_cell_classification() {
        assert!(Cell::Null.is_missing());
        assert!(Cell::text("  ").is_blank());
        assert!(Cell::text("  ").is_missing());
        assert!(Cell::text("x").is_populated());
        assert!(Cell::Number(0.0).is_populated());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Cell::text(" 42 ").as_f64(), Some(42.0));
        assert_eq!(Cell::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(Cell::text("abc").as_f64(), None);
        assert_eq!(Cell::text("inf").as_f64(), None);
        assert_eq!(Cell::Null.as_f64(), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let dataset = Dataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::text("1")], vec![Cell::text("2"), Cell::text("3")]],
        )
        .unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.get(0, 1), Some(&Cell::Null));
        assert_eq!(dataset.get(1, 1), Some(&Cell::text("3")));
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let result = Dataset::from_columns(vec![
            Column::from_strs("a", &["1", "2"]),
            Column::from_strs("b", &["1"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let result = Dataset::from_columns(vec![
            Column::from_strs("a", &["1"]),
            Column::from_strs("a", &["2"]),
        ]);
        assert!(result.is_err());
    }
}
