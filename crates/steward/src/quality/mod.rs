//! Dataset quality scoring.
//!
//! Three factors, each 0–100, are combined with configurable weights:
//!
//! - **completeness**: mean share of populated cells per column
//! - **duplicates**: 100 minus the percentage of exact duplicate rows
//! - **consistency**: mean share of values matching their column type

mod scorer;

pub use scorer::{
    ColumnQuality, DatasetSummary, FactorScores, QualityCategory, QualityConfig, QualityReport,
    QualityScorer, round1,
};
