//! Descriptive statistics and format checks for a single column.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// STREAMING STATISTICS
// =============================================================================
// Welford's online algorithm for mean and variance in a single pass.

#[derive(Debug, Clone)]
struct StreamingStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl StreamingStats {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Sample standard deviation.
    fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }
}

/// Summary of the numeric values in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
}

impl NumericSummary {
    /// Summarize a set of values; `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut stats = StreamingStats::new();
        for &v in values {
            stats.add(v);
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            median: percentile(&sorted, 0.5),
            std_dev: stats.std_dev(),
            q1: percentile(&sorted, 0.25),
            q3: percentile(&sorted, 0.75),
        })
    }

    /// Values outside 1.5 × IQR of the quartiles.
    pub fn outlier_count(&self, values: &[f64]) -> usize {
        let iqr = self.q3 - self.q1;
        if iqr <= 0.0 {
            return 0;
        }
        let (low, high) = (self.q1 - 1.5 * iqr, self.q3 + 1.5 * iqr);
        values.iter().filter(|&&v| v < low || v > high).count()
    }
}

/// Linear-interpolated percentile of sorted values.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Summary of the text values in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    /// Most frequent value; ties go to the first seen.
    pub most_common: Option<String>,
    pub most_common_count: usize,
}

impl TextSummary {
    pub fn from_values(values: &[String]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let lengths: Vec<usize> = values.iter().map(|v| v.chars().count()).collect();
        let (most_common, most_common_count) = mode(values)
            .map(|(v, c)| (Some(v.to_string()), c))
            .unwrap_or((None, 0));

        Some(Self {
            min_length: lengths.iter().copied().min().unwrap_or(0),
            max_length: lengths.iter().copied().max().unwrap_or(0),
            mean_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
            most_common,
            most_common_count,
        })
    }
}

/// Most frequent value and its count; ties go to the first seen.
pub fn mode(values: &[String]) -> Option<(&str, usize)> {
    let counts = value_counts(values);
    counts.into_iter().next()
}

/// Distinct values with counts, most frequent first, ties by first appearance.
pub fn value_counts(values: &[String]) -> Vec<(&str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        let entry = counts.entry(value.as_str()).or_insert_with(|| {
            order.push(value.as_str());
            0
        });
        *entry += 1;
    }
    let mut ranked: Vec<(usize, &str, usize)> = order
        .into_iter()
        .enumerate()
        .map(|(first_seen, v)| (first_seen, v, counts[v]))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(_, v, c)| (v, c)).collect()
}

// =============================================================================
// FORMAT ISSUES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatIssueKind {
    /// Leading, trailing or repeated inner whitespace.
    ExcessWhitespace,
    /// Characters outside ASCII in an otherwise ASCII column.
    NonAscii,
    /// Mixed letter case among values that are otherwise equal.
    InconsistentCase,
    /// Numeric values outside 1.5 × IQR.
    Outliers,
}

/// A formatting problem found while profiling, with a fix hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatIssue {
    pub kind: FormatIssueKind,
    pub count: usize,
    pub suggestion: String,
}

/// Look for formatting issues among raw populated values.
pub(crate) fn format_issues(raw: &[&str], numeric: Option<(&NumericSummary, &[f64])>) -> Vec<FormatIssue> {
    let mut issues = Vec::new();

    let whitespace = raw
        .iter()
        .filter(|v| v.trim() != **v || v.contains("  "))
        .count();
    if whitespace > 0 {
        issues.push(FormatIssue {
            kind: FormatIssueKind::ExcessWhitespace,
            count: whitespace,
            suggestion: "Trim leading/trailing spaces and collapse repeated spaces".to_string(),
        });
    }

    let non_ascii = raw.iter().filter(|v| !v.is_ascii()).count();
    if non_ascii > 0 && non_ascii * 10 < raw.len() {
        issues.push(FormatIssue {
            kind: FormatIssueKind::NonAscii,
            count: non_ascii,
            suggestion: "Check encoding or normalize accented characters".to_string(),
        });
    }

    let mut by_lower: HashMap<String, Vec<&str>> = HashMap::new();
    for v in raw {
        let trimmed = v.trim();
        let variants = by_lower.entry(trimmed.to_lowercase()).or_default();
        if !variants.contains(&trimmed) {
            variants.push(trimmed);
        }
    }
    let mixed_case = by_lower.values().filter(|v| v.len() > 1).count();
    if mixed_case > 0 {
        issues.push(FormatIssue {
            kind: FormatIssueKind::InconsistentCase,
            count: mixed_case,
            suggestion: "Standardize letter case for repeated labels".to_string(),
        });
    }

    if let Some((summary, values)) = numeric {
        let outliers = summary.outlier_count(values);
        if outliers > 0 {
            issues.push(FormatIssue {
                kind: FormatIssueKind::Outliers,
                count: outliers,
                suggestion: "Review extreme values; consider capping or banding".to_string(),
            });
        }
    }

    issues
}
