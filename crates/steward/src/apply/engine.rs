//! Applies merged decisions to a dataset.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::operations::{self, Enriched, MaskMode, Transformed};
use super::report::{ApplicationReport, ColumnOutcome, ColumnReport};
use crate::error::{ApplyConflict, Result, StewardError};
use crate::input::{Column, Dataset};
use crate::merge::{Decision, DecisionStatus};
use crate::recognize::Recognizer;
use crate::recommend::{Action, ReferenceLookup};

/// Apply engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Distinct values that get their own categorize code.
    pub max_categories: usize,
    /// Written for values beyond `max_categories`.
    pub other_label: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            max_categories: 50,
            other_label: super::generalize::OTHER_BUCKET.to_string(),
        }
    }
}

/// What one column turned into.
enum ColumnResult {
    Kept(Column),
    Replaced(Column),
    Dropped,
    Enriched { original: Column, derived: Column },
}

/// Turns decisions into a transformed dataset and a report.
///
/// Columns are independent: each is transformed on the rayon pool and a
/// failure leaves only that column untouched.
pub struct ApplyEngine {
    recognizer: Arc<dyn Recognizer>,
    reference: Arc<dyn ReferenceLookup>,
    config: ApplyConfig,
}

impl ApplyEngine {
    pub fn new(recognizer: Arc<dyn Recognizer>, reference: Arc<dyn ReferenceLookup>) -> Self {
        Self::with_config(recognizer, reference, ApplyConfig::default())
    }

    pub fn with_config(
        recognizer: Arc<dyn Recognizer>,
        reference: Arc<dyn ReferenceLookup>,
        config: ApplyConfig,
    ) -> Self {
        Self {
            recognizer,
            reference,
            config,
        }
    }

    pub fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Apply at most one decision per column.
    ///
    /// Columns without a decision are kept. A decision naming an unknown
    /// column, or two decisions for one column, is an input error.
    pub fn apply(&self, dataset: &Dataset, decisions: &[Decision]) -> Result<(Dataset, ApplicationReport)> {
        let mut by_column: HashMap<&str, &Decision> = HashMap::new();
        for decision in decisions {
            if !dataset.has_column(&decision.column) {
                return Err(StewardError::UnknownColumn(decision.column.clone()));
            }
            if by_column.insert(decision.column.as_str(), decision).is_some() {
                return Err(StewardError::InvalidFeedback {
                    column: decision.column.clone(),
                    message: "more than one decision for this column".to_string(),
                });
            }
        }

        let existing: HashSet<&str> = dataset.headers().into_iter().collect();
        let results: Vec<(ColumnResult, ColumnReport)> = dataset
            .columns()
            .par_iter()
            .map(|column| self.apply_column(column, by_column.get(column.name.as_str()).copied(), &existing))
            .collect();

        let mut columns = Vec::with_capacity(results.len());
        let mut derived_columns = Vec::new();
        let mut reports = Vec::with_capacity(results.len());
        let mut dropped_columns = Vec::new();

        for (result, report) in results {
            if report.outcome == ColumnOutcome::Failed {
                tracing::warn!(
                    column = report.column.as_str(),
                    action = report.action.as_str(),
                    reason = report.reason.as_deref().unwrap_or(""),
                    "decision not applied"
                );
            }
            match result {
                ColumnResult::Kept(column) | ColumnResult::Replaced(column) => columns.push(column),
                ColumnResult::Dropped => dropped_columns.push(report.column.clone()),
                ColumnResult::Enriched { original, derived } => {
                    columns.push(original);
                    derived_columns.push(derived);
                }
            }
            reports.push(report);
        }

        let added_columns: Vec<String> = derived_columns.iter().map(|c| c.name.clone()).collect();
        columns.extend(derived_columns);
        let output = Dataset::with_row_count(columns, dataset.row_count())?;

        let report = ApplicationReport {
            rows_before: dataset.row_count(),
            rows_after: output.row_count(),
            columns_before: dataset.column_count(),
            columns_after: output.column_count(),
            columns: reports,
            dropped_columns,
            added_columns,
        };
        tracing::info!(
            applied = report.count(ColumnOutcome::Applied),
            skipped = report.count(ColumnOutcome::Skipped),
            failed = report.count(ColumnOutcome::Failed),
            cells_changed = report.cells_changed(),
            "decisions applied"
        );
        Ok((output, report))
    }

    fn apply_column(
        &self,
        column: &Column,
        decision: Option<&Decision>,
        existing: &HashSet<&str>,
    ) -> (ColumnResult, ColumnReport) {
        let Some(decision) = decision else {
            let report = ColumnReport::new(&column.name, Action::Keep, None).skipped("no decision");
            return (ColumnResult::Kept(column.clone()), report);
        };

        let report = ColumnReport::new(&column.name, decision.action, decision.value.clone());
        if decision.status == DecisionStatus::Rejected {
            return (ColumnResult::Kept(column.clone()), report.skipped("decision rejected"));
        }

        let value = decision.value.as_deref();
        let transformed = match decision.action {
            Action::Keep => {
                return (ColumnResult::Kept(column.clone()), report.skipped("keep"));
            }
            Action::Drop => {
                return (ColumnResult::Dropped, report.applied(column.len()));
            }
            Action::Enrich => return self.enrich(column, existing, report),
            Action::Mask => MaskMode::parse(value)
                .map(|mode| operations::mask(column, self.recognizer.as_ref(), mode)),
            Action::Generalize => operations::generalize(column, value),
            Action::Fill => operations::fill(column, value),
            Action::Categorize => Ok(operations::categorize(
                column,
                self.config.max_categories,
                &self.config.other_label,
            )),
        };

        match transformed {
            Ok(Transformed {
                values,
                cells_changed,
                code_book,
            }) => {
                let mut report = report.applied(cells_changed);
                report.code_book = code_book;
                (ColumnResult::Replaced(Column::new(column.name.clone(), values)), report)
            }
            Err(conflict) => failed(column, report, conflict),
        }
    }

    fn enrich(
        &self,
        column: &Column,
        existing: &HashSet<&str>,
        report: ColumnReport,
    ) -> (ColumnResult, ColumnReport) {
        let name = operations::derived_name(&column.name, self.reference.as_ref());
        if existing.contains(name.as_str()) {
            return failed(column, report, ApplyConflict::ColumnExists(name));
        }

        let Enriched {
            column: derived,
            unenriched_rows,
        } = operations::enrich(column, self.reference.as_ref());
        let resolved = derived.values.iter().filter(|c| c.is_populated()).count();

        let mut report = report.applied(resolved);
        report.derived_column = Some(derived.name.clone());
        report.unenriched_rows = unenriched_rows;
        let result = ColumnResult::Enriched {
            original: column.clone(),
            derived,
        };
        (result, report)
    }
}

fn failed(column: &Column, report: ColumnReport, conflict: ApplyConflict) -> (ColumnResult, ColumnReport) {
    (ColumnResult::Kept(column.clone()), report.failed(conflict.to_string()))
}
