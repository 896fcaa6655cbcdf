//! Per-column profiling and dataset-level duplicate statistics.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::stats::{FormatIssue, NumericSummary, TextSummary, format_issues, value_counts};
use super::types::{DataType, InferenceThresholds, declared_type, infer_type, parse_number};
use crate::input::{Column, Dataset};
use crate::recognize::{HeaderMatch, HeaderMatcher, Recognizer, catalog};

/// Profiler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Most values sent to the recognizer per column.
    pub entity_sample_limit: usize,
    /// Share of values a type must validate to be inferred.
    pub type_match_ratio: f64,
    /// Upper bound on distinct values for a categorical column.
    pub categorical_max_unique: usize,
    /// Upper bound on distinct/populated for a categorical column.
    pub categorical_max_ratio: f64,
    /// Number of category counts kept for low-cardinality columns.
    pub top_categories: usize,
    /// Jaro-Winkler threshold for header synonym matches.
    pub header_match_threshold: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            entity_sample_limit: 200,
            type_match_ratio: 0.6,
            categorical_max_unique: 20,
            categorical_max_ratio: 0.5,
            top_categories: 5,
            header_match_threshold: 0.92,
        }
    }
}

/// One entity label and how many sampled values carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCount {
    pub label: String,
    pub count: usize,
}

/// Entity signal for a column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Label → number of sampled values with at least one hit.
    pub distribution: IndexMap<String, usize>,
    /// Three most frequent labels, ties by label.
    pub top: Vec<EntityCount>,
    /// Number of values sent to the recognizer.
    pub sample_size: usize,
    /// False when the recognizer failed and the distribution is empty.
    pub recognizer_available: bool,
    /// Entity suggested by the header name alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_match: Option<HeaderMatch>,
}

impl EntityProfile {
    /// Most frequent label, if any.
    pub fn dominant(&self) -> Option<&EntityCount> {
        self.top.first()
    }

    /// Share of sampled values carrying the dominant label.
    pub fn dominant_share(&self) -> f64 {
        match (self.dominant(), self.sample_size) {
            (Some(top), n) if n > 0 => top.count as f64 / n as f64,
            _ => 0.0,
        }
    }
}

/// A distinct value and its frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Everything measured about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub position: usize,
    pub row_count: usize,
    /// Populated cells: neither null nor blank.
    pub non_null_count: usize,
    pub null_count: usize,
    pub empty_string_count: usize,
    pub unique_count: usize,
    /// Populated cells repeating an earlier value.
    pub duplicate_count: usize,
    pub data_type: DataType,
    /// Whether the type came from the header rather than the values.
    pub type_declared: bool,
    pub invalid_count: usize,
    pub invalid_percentage: f64,
    pub completeness_percentage: f64,
    /// Distinct / populated.
    pub uniqueness_ratio: f64,
    pub entities: EntityProfile,
    /// Most frequent values for categorical columns.
    pub top_categories: Vec<CategoryCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSummary>,
    pub format_issues: Vec<FormatIssue>,
}

impl ColumnProfile {
    /// Null plus blank cells.
    pub fn missing_count(&self) -> usize {
        self.null_count + self.empty_string_count
    }

    pub fn missing_ratio(&self) -> f64 {
        if self.row_count == 0 {
            0.0
        } else {
            self.missing_count() as f64 / self.row_count as f64
        }
    }

    /// Whether most populated values are numbers.
    pub fn is_numeric(&self) -> bool {
        self.data_type == DataType::Numeric
            || self
                .numeric
                .as_ref()
                .is_some_and(|n| n.count * 2 > self.non_null_count)
    }
}

/// Exact duplicate rows across the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateStats {
    pub row_count: usize,
    pub unique_rows: usize,
    pub duplicate_rows: usize,
    pub duplicate_percentage: f64,
}

impl DuplicateStats {
    pub fn compute(dataset: &Dataset) -> Self {
        let row_count = dataset.row_count();
        let unique_rows = (0..row_count)
            .map(|i| dataset.row(i).iter().map(|c| c.key()).collect::<Vec<_>>())
            .collect::<HashSet<_>>()
            .len();
        let duplicate_rows = row_count - unique_rows;
        let duplicate_percentage = if row_count == 0 {
            0.0
        } else {
            duplicate_rows as f64 / row_count as f64 * 100.0
        };
        Self {
            row_count,
            unique_rows,
            duplicate_rows,
            duplicate_percentage,
        }
    }
}

/// Profiles of every column plus dataset-level duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub duplicates: DuplicateStats,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Computes column profiles. Pure apart from calls into the recognizer.
pub struct Profiler {
    config: ProfileConfig,
    recognizer: Arc<dyn Recognizer>,
    header_matcher: HeaderMatcher,
}

impl Profiler {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        Self::with_config(recognizer, ProfileConfig::default())
    }

    pub fn with_config(recognizer: Arc<dyn Recognizer>, config: ProfileConfig) -> Self {
        let header_matcher = HeaderMatcher::with_threshold(config.header_match_threshold);
        Self {
            config,
            recognizer,
            header_matcher,
        }
    }

    /// Profile every column in parallel; output keeps column order.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        let columns: Vec<ColumnProfile> = dataset
            .columns()
            .par_iter()
            .enumerate()
            .map(|(position, column)| self.profile_column(column, position))
            .collect();

        tracing::debug!(
            rows = dataset.row_count(),
            columns = columns.len(),
            recognizer = self.recognizer.name(),
            "profiled dataset"
        );

        DatasetProfile {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            duplicates: DuplicateStats::compute(dataset),
            columns,
        }
    }

    /// Profile one column.
    pub fn profile_column(&self, column: &Column, position: usize) -> ColumnProfile {
        let row_count = column.len();
        let null_count = column.values.iter().filter(|c| c.is_null()).count();
        let empty_string_count = column.values.iter().filter(|c| c.is_blank()).count();
        let raw: Vec<String> = column
            .values
            .iter()
            .filter(|c| c.is_populated())
            .map(|c| c.to_string())
            .collect();
        let values: Vec<String> = raw.iter().map(|v| v.trim().to_string()).collect();
        let non_null_count = values.len();

        let counts = value_counts(&values);
        let unique_count = counts.len();
        let uniqueness_ratio = ratio(unique_count, non_null_count);

        let thresholds = InferenceThresholds {
            match_ratio: self.config.type_match_ratio,
            categorical_max_unique: self.config.categorical_max_unique,
            categorical_max_ratio: self.config.categorical_max_ratio,
        };
        let declared = declared_type(&column.name);
        let data_type = match declared {
            Some(t) if non_null_count > 0 => t,
            _ => infer_type(&values, unique_count, thresholds),
        };
        let invalid_count = values.iter().filter(|v| !data_type.validate(v)).count();
        let invalid_percentage = (ratio(invalid_count, non_null_count) * 100.0).clamp(0.0, 100.0);

        let numbers: Vec<f64> = values.iter().filter_map(|v| parse_number(v)).collect();
        let numeric = NumericSummary::from_values(&numbers);
        let text = TextSummary::from_values(&values);

        let low_cardinality = unique_count <= self.config.categorical_max_unique;
        let top_categories = if data_type == DataType::Categorical || low_cardinality {
            counts
                .iter()
                .take(self.config.top_categories)
                .map(|(value, count)| CategoryCount {
                    value: value.to_string(),
                    count: *count,
                })
                .collect()
        } else {
            Vec::new()
        };

        let raw_refs: Vec<&str> = raw.iter().map(String::as_str).collect();
        let numeric_issues = numeric
            .as_ref()
            .filter(|_| data_type == DataType::Numeric)
            .map(|summary| (summary, numbers.as_slice()));
        let format_issues = format_issues(&raw_refs, numeric_issues);

        ColumnProfile {
            name: column.name.clone(),
            position,
            row_count,
            non_null_count,
            null_count,
            empty_string_count,
            unique_count,
            duplicate_count: non_null_count - unique_count,
            data_type,
            type_declared: declared.is_some() && non_null_count > 0,
            invalid_count,
            invalid_percentage,
            completeness_percentage: ratio(non_null_count, row_count) * 100.0,
            uniqueness_ratio,
            entities: self.entity_profile(&column.name, &values),
            top_categories,
            numeric,
            text,
            format_issues,
        }
    }

    fn entity_profile(&self, column: &str, values: &[String]) -> EntityProfile {
        let sample = strided_sample(values, self.config.entity_sample_limit);
        let header_match = self.header_matcher.match_header(column);

        let hits = match self.recognizer.analyze_column(column, &sample) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    column,
                    error = %e,
                    "recognizer unavailable; entity distribution left empty"
                );
                return EntityProfile {
                    distribution: IndexMap::new(),
                    top: Vec::new(),
                    sample_size: 0,
                    recognizer_available: false,
                    header_match,
                };
            }
        };

        let mut distribution: IndexMap<String, usize> = IndexMap::new();
        for value_hits in &hits {
            let mut seen: Vec<&str> = Vec::new();
            for hit in value_hits {
                let label = catalog::canonical_label(&hit.label);
                if !seen.contains(&label) {
                    seen.push(label);
                    *distribution.entry(label.to_string()).or_insert(0) += 1;
                }
            }
        }

        let mut top: Vec<EntityCount> = distribution
            .iter()
            .map(|(label, count)| EntityCount {
                label: label.clone(),
                count: *count,
            })
            .collect();
        top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        top.truncate(3);

        EntityProfile {
            distribution,
            top,
            sample_size: sample.len(),
            recognizer_available: true,
            header_match,
        }
    }
}

/// Evenly strided sample of at most `limit` values, order preserved.
pub fn strided_sample(values: &[String], limit: usize) -> Vec<String> {
    if values.len() <= limit {
        return values.to_vec();
    }
    (0..limit)
        .map(|i| values[i * values.len() / limit].clone())
        .collect()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognizerError;
    use crate::input::Cell;
    use crate::recognize::{EntityHit, PatternRecognizer};

    fn profiler() -> Profiler {
        Profiler::new(Arc::new(PatternRecognizer::new()))
    }

    struct BrokenRecognizer;

    impl Recognizer for BrokenRecognizer {
        fn analyze(&self, _: &str, _: &str) -> Result<Vec<EntityHit>, RecognizerError> {
            Err(RecognizerError::Unavailable("model not loaded".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_email_column_counts() {
        let column = Column::from_strs("email", &["a@x.com", "", "b@x.com", "not-an-email"]);
        let p = profiler().profile_column(&column, 0);

        assert_eq!(p.row_count, 4);
        assert_eq!(p.non_null_count, 3);
        assert_eq!(p.empty_string_count, 1);
        assert_eq!(p.null_count, 0);
        assert_eq!(p.data_type, DataType::Email);
        assert!(p.type_declared);
        assert_eq!(p.invalid_count, 1);
        assert!((p.completeness_percentage - 75.0).abs() < 1e-9);
        assert_eq!(p.entities.distribution.get("EMAIL_ADDRESS"), Some(&2));
        assert_eq!(p.entities.dominant().unwrap().label, "EMAIL_ADDRESS");
    }

    #[test]
    fn test_blank_cells_are_not_populated() {
        let column = Column::from_strs("notes", &["", "", "x"]);
        let p = profiler().profile_column(&column, 0);
        assert_eq!(p.non_null_count, 1);
        assert_eq!(p.empty_string_count, 2);
        assert_eq!(p.null_count, 0);
        assert_eq!(p.non_null_count + p.null_count + p.empty_string_count, p.row_count);
        assert!((p.completeness_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_column() {
        let column = Column::new("notes", vec![Cell::Null, Cell::Null]);
        let p = profiler().profile_column(&column, 0);
        assert_eq!(p.completeness_percentage, 0.0);
        assert_eq!(p.data_type, DataType::Empty);
        assert_eq!(p.invalid_count, 0);
        assert_eq!(p.uniqueness_ratio, 0.0);
    }

    #[test]
    fn test_numeric_column() {
        let column = Column::from_strs("score", &["10", "20", "30", "20"]);
        let p = profiler().profile_column(&column, 0);
        assert_eq!(p.data_type, DataType::Numeric);
        assert_eq!(p.unique_count, 3);
        assert_eq!(p.duplicate_count, 1);
        assert!(p.is_numeric());
        assert!((p.numeric.as_ref().unwrap().mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_recognizer_failure_degrades() {
        let profiler = Profiler::new(Arc::new(BrokenRecognizer));
        let column = Column::from_strs("email", &["a@x.com"]);
        let p = profiler.profile_column(&column, 0);
        assert!(!p.entities.recognizer_available);
        assert!(p.entities.distribution.is_empty());
        assert_eq!(p.non_null_count, 1);
    }

    #[test]
    fn test_duplicate_stats() {
        let ids = ["1", "2", "3", "4", "5", "6", "7", "8", "1", "2"];
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "a", "b"];
        let dataset = Dataset::from_columns(vec![
            Column::from_strs("id", &ids),
            Column::from_strs("name", &names),
        ])
        .unwrap();
        let stats = DuplicateStats::compute(&dataset);
        assert_eq!(stats.unique_rows, 8);
        assert_eq!(stats.duplicate_rows, 2);
        assert!((stats.duplicate_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_strided_sample() {
        let values: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let sample = strided_sample(&values, 5);
        assert_eq!(sample, vec!["0", "2", "4", "6", "8"]);
        assert_eq!(strided_sample(&values, 20).len(), 10);
    }

    #[test]
    fn test_profile_keeps_column_order() {
        let dataset = Dataset::from_columns(vec![
            Column::from_strs("b", &["1"]),
            Column::from_strs("a", &["x"]),
        ])
        .unwrap();
        let profile = profiler().profile(&dataset);
        let names: Vec<_> = profile.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(profile.columns[1].position, 1);
    }
}
