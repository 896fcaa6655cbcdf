//! Weighted dataset quality score from column profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::{ColumnProfile, DataType, DatasetProfile, DuplicateStats};

/// Relative weight of each quality factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub completeness_weight: f64,
    pub duplicates_weight: f64,
    pub consistency_weight: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            completeness_weight: 1.0,
            duplicates_weight: 1.0,
            consistency_weight: 1.0,
        }
    }
}

/// Overall quality band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl QualityCategory {
    /// Band for a 0–100 score; lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => QualityCategory::Excellent,
            s if s >= 75.0 => QualityCategory::Good,
            s if s >= 60.0 => QualityCategory::Fair,
            s if s >= 40.0 => QualityCategory::Poor,
            _ => QualityCategory::Critical,
        }
    }
}

/// Factor sub-scores, each 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub completeness: f64,
    pub duplicates: f64,
    pub consistency: f64,
}

/// Per-column contribution to the completeness and consistency factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub column: String,
    pub completeness_percentage: f64,
    pub null_count: usize,
    pub empty_string_count: usize,
    pub data_type: DataType,
    pub type_declared: bool,
    pub invalid_count: usize,
    pub invalid_percentage: f64,
    /// 100 − invalid percentage; 0 for a column with no values.
    pub valid_percentage: f64,
}

impl From<&ColumnProfile> for ColumnQuality {
    fn from(profile: &ColumnProfile) -> Self {
        Self {
            column: profile.name.clone(),
            completeness_percentage: round1(profile.completeness_percentage),
            null_count: profile.null_count,
            empty_string_count: profile.empty_string_count,
            data_type: profile.data_type,
            type_declared: profile.type_declared,
            invalid_count: profile.invalid_count,
            invalid_percentage: round1(profile.invalid_percentage),
            valid_percentage: round1(valid_percentage(profile)),
        }
    }
}

/// Size and timing facts about the analyzed dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub size_bytes: u64,
    pub analyzed_at: DateTime<Utc>,
}

/// Scored quality assessment of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_score: f64,
    pub category: QualityCategory,
    pub factors: FactorScores,
    pub duplicates: DuplicateStats,
    pub columns: Vec<ColumnQuality>,
    pub recommendations: Vec<String>,
}

/// Aggregates profiles into a [`QualityReport`].
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, profile: &DatasetProfile) -> QualityReport {
        let completeness = mean(profile.columns.iter().map(|c| c.completeness_percentage));
        let duplicates = 100.0 - profile.duplicates.duplicate_percentage;
        let consistency = mean(profile.columns.iter().map(valid_percentage));

        let weights = [
            self.config.completeness_weight.max(0.0),
            self.config.duplicates_weight.max(0.0),
            self.config.consistency_weight.max(0.0),
        ];
        let total_weight: f64 = weights.iter().sum();
        let overall = if total_weight > 0.0 {
            (completeness * weights[0] + duplicates * weights[1] + consistency * weights[2])
                / total_weight
        } else {
            0.0
        };
        let overall_score = round1(overall);

        let factors = FactorScores {
            completeness: round1(completeness),
            duplicates: round1(duplicates),
            consistency: round1(consistency),
        };
        let recommendations =
            recommendations(overall_score, &factors, profile.duplicates.duplicate_percentage);

        QualityReport {
            overall_score,
            category: QualityCategory::from_score(overall_score),
            factors,
            duplicates: profile.duplicates.clone(),
            columns: profile.columns.iter().map(ColumnQuality::from).collect(),
            recommendations,
        }
    }
}

fn valid_percentage(profile: &ColumnProfile) -> f64 {
    if profile.data_type == DataType::Empty {
        0.0
    } else {
        100.0 - profile.invalid_percentage
    }
}

fn recommendations(overall: f64, factors: &FactorScores, duplicate_percentage: f64) -> Vec<String> {
    let mut hints: Vec<(f64, &str)> = Vec::new();
    if factors.completeness < 80.0 {
        hints.push((
            factors.completeness,
            "Address missing values: fill sparse columns or drop mostly empty ones",
        ));
    }
    if duplicate_percentage > 5.0 {
        hints.push((factors.duplicates, "Remove duplicate rows"));
    }
    if factors.consistency < 70.0 {
        hints.push((
            factors.consistency,
            "Standardize formats: values do not match their column types",
        ));
    }
    hints.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out = Vec::new();
    if overall < 60.0 {
        out.push("Data quality needs immediate attention".to_string());
    }
    out.extend(hints.into_iter().map(|(_, hint)| hint.to_string()));
    if out.is_empty() {
        out.push("Maintain current data quality standards".to_string());
    }
    out
}

/// Mean summed in ascending order, so column order cannot change the result.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
