//! Column transformations, one per action.
//!
//! Every function reads a column and returns new cells; the input is never
//! modified. Missing cells are left alone except by fill.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::generalize::GeneralizeStrategy;
use crate::error::ApplyConflict;
use crate::input::{Cell, Column};
use crate::profile::{NumericSummary, mode, parse_number};
use crate::recognize::{EntityHit, Recognizer, catalog, resolve_overlaps};
use crate::recommend::ReferenceLookup;

/// A cell that is exactly one redaction token, e.g. `<IDENTIFIER>`.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[A-Z0-9_]+>$").unwrap());

/// Token used when no entity label is known.
pub const REDACTED_TOKEN: &str = "<REDACTED>";

/// Category for labels missing from the catalogue.
const UNCATEGORIZED: &str = "uncategorized";

/// New cells for a column plus what changed.
#[derive(Debug, Clone)]
pub(crate) struct Transformed {
    pub values: Vec<Cell>,
    pub cells_changed: usize,
    pub code_book: Option<IndexMap<String, usize>>,
}

impl Transformed {
    fn new(original: &[Cell], values: Vec<Cell>) -> Self {
        let cells_changed = original.iter().zip(&values).filter(|(a, b)| a != b).count();
        Self {
            values,
            cells_changed,
            code_book: None,
        }
    }
}

/// Redaction token for an entity label: its GDPR category in upper case.
pub fn redaction_token(label: &str) -> String {
    let category = catalog::lookup(label).map_or(UNCATEGORIZED, |info| info.gdpr_category);
    format!("<{}>", category.to_ascii_uppercase())
}

// =============================================================================
// MASK
// =============================================================================

/// Mask mode chosen by the decision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaskMode {
    /// Replace detected spans only.
    Partial,
    /// Replace every populated cell.
    Full,
}

impl MaskMode {
    pub fn parse(value: Option<&str>) -> Result<Self, ApplyConflict> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("partial") => Ok(MaskMode::Partial),
            Some("full") => Ok(MaskMode::Full),
            Some(other) => Err(ApplyConflict::UnsupportedValue {
                action: "mask".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

pub(crate) fn mask(column: &Column, recognizer: &dyn Recognizer, mode: MaskMode) -> Transformed {
    let targets: Vec<(usize, String)> = column
        .values
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_populated())
        .map(|(i, cell)| (i, cell.to_string()))
        .filter(|(_, text)| !TOKEN_RE.is_match(text.trim()))
        .collect();
    let texts: Vec<String> = targets.iter().map(|(_, t)| t.clone()).collect();

    let hits = match recognizer.analyze_column(&column.name, &texts) {
        Ok(hits) => Some(hits),
        Err(e) => {
            tracing::warn!(
                column = column.name.as_str(),
                error = %e,
                "recognizer unavailable; masking whole cells"
            );
            None
        }
    };

    let mut values = column.values.clone();
    match (mode, hits) {
        (MaskMode::Partial, Some(hits)) => {
            for ((index, text), value_hits) in targets.iter().zip(hits) {
                let kept = resolve_overlaps(value_hits, text.len());
                if !kept.is_empty() {
                    values[*index] = Cell::Text(redact_spans(text, &kept));
                }
            }
        }
        (_, hits) => {
            let token = hits
                .as_deref()
                .and_then(dominant_label)
                .map(|label| redaction_token(&label))
                .or_else(|| existing_token(&column.values))
                .unwrap_or_else(|| REDACTED_TOKEN.to_string());
            for (index, _) in &targets {
                values[*index] = Cell::Text(token.clone());
            }
        }
    }
    Transformed::new(&column.values, values)
}

/// Replace each hit's span with its token; span-less hits cover the value.
fn redact_spans(text: &str, hits: &[EntityHit]) -> String {
    let boundaries_ok = hits.iter().all(|h| {
        h.span
            .is_none_or(|s| text.is_char_boundary(s.start) && text.is_char_boundary(s.end))
    });
    if !boundaries_ok || hits.iter().any(|h| h.span.is_none()) {
        return hits
            .first()
            .map_or_else(|| REDACTED_TOKEN.to_string(), |h| redaction_token(&h.label));
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for hit in hits {
        if let Some(span) = hit.span {
            out.push_str(&text[cursor..span.start]);
            out.push_str(&redaction_token(&hit.label));
            cursor = span.end;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

/// Most frequent label across values, ties by first appearance.
fn dominant_label(hits: &[Vec<EntityHit>]) -> Option<String> {
    let labels: Vec<String> = hits
        .iter()
        .flat_map(|value_hits| value_hits.iter().map(|h| h.label.clone()))
        .collect();
    mode(&labels).map(|(label, _)| label.to_string())
}

fn existing_token(values: &[Cell]) -> Option<String> {
    values.iter().find_map(|cell| match cell {
        Cell::Text(s) if TOKEN_RE.is_match(s.trim()) => Some(s.trim().to_string()),
        _ => None,
    })
}

// =============================================================================
// GENERALIZE
// =============================================================================

pub(crate) fn generalize(column: &Column, value: Option<&str>) -> Result<Transformed, ApplyConflict> {
    let populated: Vec<String> = column.populated_text().collect();
    if populated.is_empty() {
        return Ok(Transformed::new(&column.values, column.values.clone()));
    }

    let strategy = match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => v.parse::<GeneralizeStrategy>().map_err(|_| ApplyConflict::UnsupportedValue {
            action: "generalize".to_string(),
            value: v.to_string(),
        })?,
        None => GeneralizeStrategy::from_buckets(populated.iter().map(String::as_str))
            .or_else(|| GeneralizeStrategy::infer(populated.iter().map(String::as_str)))
            .ok_or(ApplyConflict::NoStrategy)?,
    };

    let values = column
        .values
        .iter()
        .map(|cell| match cell.as_text() {
            Some(text) if strategy.is_bucket(&text) => cell.clone(),
            Some(text) => Cell::Text(strategy.bucket_or_other(&text)),
            None => cell.clone(),
        })
        .collect();
    Ok(Transformed::new(&column.values, values))
}

// =============================================================================
// FILL
// =============================================================================

const STATISTICS: &[&str] = &["mean", "median", "min", "max", "mode"];

/// Whether more than half of the populated cells are numbers.
fn numeric_values(column: &Column) -> (Vec<f64>, bool) {
    let populated = column.values.iter().filter(|c| c.is_populated()).count();
    let numbers: Vec<f64> = column.values.iter().filter_map(Cell::as_f64).collect();
    let is_numeric = populated > 0 && numbers.len() * 2 > populated;
    (numbers, is_numeric)
}

/// The cell a fill writes into missing slots.
pub(crate) fn fill_value(column: &Column, value: Option<&str>) -> Result<Cell, ApplyConflict> {
    let (numbers, is_numeric) = numeric_values(column);
    let requested = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(if is_numeric { "median" } else { "mode" });
    let statistic = requested.to_ascii_lowercase();

    if !STATISTICS.contains(&statistic.as_str()) {
        if is_numeric && parse_number(requested).is_none() {
            return Err(ApplyConflict::LiteralType(requested.to_string()));
        }
        return Ok(Cell::text(requested));
    }

    if statistic == "mode" {
        let texts: Vec<String> = column.populated_text().collect();
        return mode(&texts)
            .map(|(v, _)| Cell::text(v))
            .ok_or(ApplyConflict::NoValues(statistic));
    }
    if !is_numeric {
        return Err(ApplyConflict::NonNumericStatistic { statistic });
    }
    let summary = NumericSummary::from_values(&numbers).ok_or(ApplyConflict::NoValues(statistic.clone()))?;
    let n = match statistic.as_str() {
        "mean" => summary.mean,
        "median" => summary.median,
        "min" => summary.min,
        _ => summary.max,
    };
    Ok(Cell::Number(n))
}

pub(crate) fn fill(column: &Column, value: Option<&str>) -> Result<Transformed, ApplyConflict> {
    let replacement = fill_value(column, value)?;
    let values = column
        .values
        .iter()
        .map(|cell| if cell.is_missing() { replacement.clone() } else { cell.clone() })
        .collect();
    Ok(Transformed::new(&column.values, values))
}

// =============================================================================
// CATEGORIZE
// =============================================================================

pub(crate) fn categorize(column: &Column, max_categories: usize, other_label: &str) -> Transformed {
    let texts: Vec<String> = column
        .populated_text()
        .filter(|t| t != other_label)
        .collect();

    let mut code_book: IndexMap<String, usize> = IndexMap::new();
    for (value, _) in crate::profile::value_counts(&texts).into_iter().take(max_categories) {
        let code = code_book.len();
        code_book.insert(value.to_string(), code);
    }

    let values = column
        .values
        .iter()
        .map(|cell| match cell.as_text() {
            Some(text) => match code_book.get(&text) {
                Some(code) => Cell::Number(*code as f64),
                None => Cell::text(other_label),
            },
            None => cell.clone(),
        })
        .collect();

    let mut transformed = Transformed::new(&column.values, values);
    transformed.code_book = Some(code_book);
    transformed
}

// =============================================================================
// ENRICH
// =============================================================================

/// Derived column and the rows the reference could not resolve.
pub(crate) struct Enriched {
    pub column: Column,
    pub unenriched_rows: Vec<usize>,
}

pub(crate) fn enrich(column: &Column, reference: &dyn ReferenceLookup) -> Enriched {
    let mut cache: HashMap<String, Option<String>> = HashMap::new();
    let mut unenriched_rows = Vec::new();

    let values = column
        .values
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let Some(text) = cell.as_text() else {
                return Cell::Null;
            };
            let resolved = cache
                .entry(text)
                .or_insert_with_key(|key| reference.lookup(key))
                .clone();
            match resolved {
                Some(derived) => Cell::Text(derived),
                None => {
                    unenriched_rows.push(row);
                    Cell::Null
                }
            }
        })
        .collect();

    Enriched {
        column: Column::new(derived_name(&column.name, reference), values),
        unenriched_rows,
    }
}

pub(crate) fn derived_name(column: &str, reference: &dyn ReferenceLookup) -> String {
    format!("{}_{}", column, reference.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognizerError;
    use crate::recognize::PatternRecognizer;
    use crate::recommend::CountryReference;

    struct Broken;

    impl Recognizer for Broken {
        fn analyze(&self, _: &str, _: &str) -> Result<Vec<EntityHit>, RecognizerError> {
            Err(RecognizerError::Unavailable("offline".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn texts(values: &[Cell]) -> Vec<String> {
        values.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_partial_mask_replaces_spans() {
        let column = Column::new(
            "notes",
            vec![
                Cell::text("write to a@x.com today"),
                Cell::text("no email"),
                Cell::Null,
            ],
        );
        let out = mask(&column, &PatternRecognizer::new(), MaskMode::Partial);
        assert_eq!(
            texts(&out.values),
            vec!["write to <IDENTIFIER> today", "no email", ""]
        );
        assert_eq!(out.cells_changed, 1);

        let again = mask(&Column::new("notes", out.values.clone()), &PatternRecognizer::new(), MaskMode::Partial);
        assert_eq!(again.cells_changed, 0);
    }

    #[test]
    fn test_full_mask_uses_dominant_label() {
        let column = Column::from_strs("email", &["a@x.com", "b@x.com", "", "oops"]);
        let out = mask(&column, &PatternRecognizer::new(), MaskMode::Full);
        assert_eq!(
            texts(&out.values),
            vec!["<IDENTIFIER>", "<IDENTIFIER>", "", "<IDENTIFIER>"]
        );

        let again = mask(&Column::new("email", out.values.clone()), &PatternRecognizer::new(), MaskMode::Full);
        assert_eq!(again.cells_changed, 0);
    }

    #[test]
    fn test_tokens_name_the_gdpr_category() {
        assert_eq!(redaction_token("EMAIL_ADDRESS"), "<IDENTIFIER>");
        assert_eq!(redaction_token("PHONE_NUMBER"), "<CONTACT>");
        assert_eq!(redaction_token("MEDICAL_CONDITION"), "<HEALTH>");
        assert_eq!(redaction_token("SPACESHIP_ID"), "<UNCATEGORIZED>");
    }

    #[test]
    fn test_mask_without_recognizer_redacts_everything() {
        let column = Column::from_strs("secret", &["x", "y"]);
        let out = mask(&column, &Broken, MaskMode::Partial);
        assert_eq!(texts(&out.values), vec!["<REDACTED>", "<REDACTED>"]);
    }

    #[test]
    fn test_generalize_auto_and_explicit() {
        let column = Column::new(
            "age",
            vec![Cell::text("34"), Cell::Null, Cell::text("51"), Cell::text("n/a?")],
        );
        let out = generalize(&column, None).unwrap();
        assert_eq!(texts(&out.values), vec!["30-39", "", "50-59", "other"]);

        let again = generalize(&Column::new("age", out.values.clone()), None).unwrap();
        assert_eq!(again.cells_changed, 0);

        let out = generalize(&column, Some("5")).unwrap();
        assert_eq!(texts(&out.values)[0], "30-34");

        let dates = Column::from_strs("dob", &["1985-03-12", "1992-11-30"]);
        let out = generalize(&dates, Some("decade")).unwrap();
        assert_eq!(texts(&out.values), vec!["1980s", "1990s"]);

        assert!(matches!(
            generalize(&column, Some("fortnight")),
            Err(ApplyConflict::UnsupportedValue { .. })
        ));
        assert_eq!(
            generalize(&Column::from_strs("x", &["lorem", "ipsum"]), None).unwrap_err(),
            ApplyConflict::NoStrategy
        );
    }

    #[test]
    fn test_generalize_extreme_numbers_to_other() {
        let column = Column::from_strs("age", &["34", "-1e300", "1e300"]);
        let out = generalize(&column, None).unwrap();
        assert_eq!(texts(&out.values), vec!["30-39", "other", "other"]);
    }

    #[test]
    fn test_fill_statistics() {
        let column = Column::new(
            "score",
            vec![Cell::text("1"), Cell::Null, Cell::text("3"), Cell::text(" ")],
        );
        let out = fill(&column, Some("mean")).unwrap();
        assert_eq!(texts(&out.values), vec!["1", "2", "3", "2"]);
        assert_eq!(out.cells_changed, 2);

        assert_eq!(fill_value(&column, None).unwrap(), Cell::Number(2.0));
        assert_eq!(fill_value(&column, Some("max")).unwrap(), Cell::Number(3.0));
        assert_eq!(fill_value(&column, Some("7")).unwrap(), Cell::text("7"));
        assert_eq!(
            fill_value(&column, Some("unknown")).unwrap_err(),
            ApplyConflict::LiteralType("unknown".into())
        );
    }

    #[test]
    fn test_fill_text_column() {
        let column = Column::new(
            "city",
            vec![Cell::text("Rabat"), Cell::Null, Cell::text("Fes"), Cell::text("Rabat")],
        );
        assert_eq!(fill_value(&column, None).unwrap(), Cell::text("Rabat"));
        assert_eq!(
            fill_value(&column, Some("mean")).unwrap_err(),
            ApplyConflict::NonNumericStatistic {
                statistic: "mean".into()
            }
        );
        let empty = Column::new("blank", vec![Cell::Null]);
        assert_eq!(
            fill_value(&empty, Some("mode")).unwrap_err(),
            ApplyConflict::NoValues("mode".into())
        );
    }

    #[test]
    fn test_categorize_codes_and_overflow() {
        let column = Column::new(
            "colour",
            vec![
                Cell::text("blue"),
                Cell::text("red"),
                Cell::text("red"),
                Cell::Null,
                Cell::text("green"),
            ],
        );
        let out = categorize(&column, 2, "other");
        assert_eq!(texts(&out.values), vec!["1", "0", "0", "", "other"]);
        let book = out.code_book.as_ref().unwrap();
        assert_eq!(book["red"], 0);
        assert_eq!(book["blue"], 1);
        assert!(!book.contains_key("green"));

        let again = categorize(&Column::new("colour", out.values.clone()), 2, "other");
        assert_eq!(again.cells_changed, 0);
    }

    #[test]
    fn test_enrich_reports_unresolved_rows() {
        let column = Column::new(
            "country",
            vec![Cell::text("Morocco"), Cell::text("Atlantis"), Cell::Null, Cell::text("morocco")],
        );
        let out = enrich(&column, &CountryReference);
        assert_eq!(out.column.name, "country_iso_code");
        assert_eq!(texts(&out.column.values), vec!["MA", "", "", "MA"]);
        assert_eq!(out.unenriched_rows, vec![1]);
    }
}
