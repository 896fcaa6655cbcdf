//! Application report types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::recommend::Action;

/// Terminal state of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnOutcome {
    Applied,
    /// Keep, rejected or absent decision.
    Skipped,
    /// The action could not be applied; the column is unchanged.
    Failed,
}

/// What happened to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub column: String,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub outcome: ColumnOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub cells_changed: usize,
    /// Category value → code, for categorize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_book: Option<IndexMap<String, usize>>,
    /// Rows whose value the reference could not resolve, for enrich.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unenriched_rows: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_column: Option<String>,
}

impl ColumnReport {
    pub(crate) fn new(column: &str, action: Action, value: Option<String>) -> Self {
        Self {
            column: column.to_string(),
            action,
            value,
            outcome: ColumnOutcome::Skipped,
            reason: None,
            cells_changed: 0,
            code_book: None,
            unenriched_rows: Vec::new(),
            derived_column: None,
        }
    }

    pub(crate) fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.outcome = ColumnOutcome::Skipped;
        self.reason = Some(reason.into());
        self
    }

    pub(crate) fn failed(mut self, reason: impl Into<String>) -> Self {
        self.outcome = ColumnOutcome::Failed;
        self.reason = Some(reason.into());
        self
    }

    pub(crate) fn applied(mut self, cells_changed: usize) -> Self {
        self.outcome = ColumnOutcome::Applied;
        self.cells_changed = cells_changed;
        self
    }
}

/// Result of applying decisions to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// One entry per original column, in column order.
    pub columns: Vec<ColumnReport>,
    pub dropped_columns: Vec<String>,
    pub added_columns: Vec<String>,
}

impl ApplicationReport {
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn count(&self, outcome: ColumnOutcome) -> usize {
        self.columns.iter().filter(|c| c.outcome == outcome).count()
    }

    pub fn cells_changed(&self) -> usize {
        self.columns.iter().map(|c| c.cells_changed).sum()
    }
}
