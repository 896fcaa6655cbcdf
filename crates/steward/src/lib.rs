//! Steward: data-quality and privacy profiling for tabular datasets.
//!
//! Steward profiles every column of a dataset, scores its quality, proposes
//! one handling action per column (fill, generalize, mask, drop, categorize,
//! enrich, or keep), optionally lets a judge pick among the candidates, and
//! rewrites the data once a single action per column has been decided.
//!
//! # Core Principles
//!
//! - **Non-destructive**: every transformation produces a new dataset
//! - **Degrade, don't abort**: a failing recognizer, judge or action affects
//!   one column only and is reported
//! - **Untrusted judge**: judge replies are validated before they count
//!
//! # Example
//!
//! ```no_run
//! use steward::Steward;
//!
//! let steward = Steward::new();
//! let (dataset, _source) = steward.load("patients.csv").unwrap();
//!
//! let quality = steward.quality(&dataset);
//! println!("Quality: {} ({:?})", quality.quality.overall_score, quality.quality.category);
//!
//! for (column, recs) in &steward.recommend(&dataset).columns {
//!     for rec in &recs.candidates {
//!         println!("{}: {} ({})", column, rec.action, rec.reason);
//!     }
//! }
//! ```

pub mod apply;
pub mod error;
pub mod input;
pub mod judge;
pub mod merge;
pub mod profile;
pub mod quality;
pub mod recognize;
pub mod recommend;

mod steward;

pub use crate::steward::{
    ApplyResponse, ColumnRecommendations, QualityResponse, RecommendResponse, Steward,
    StewardConfig,
};
pub use apply::{ApplicationReport, ColumnOutcome, ColumnReport};
pub use error::{ApplyConflict, JudgeError, RecognizerError, Result, StewardError};
pub use input::{Cell, Column, Dataset, OutputFormat, SourceMetadata};
pub use judge::{Judge, JudgeConfig, JudgeVerdict, MockJudge, OllamaJudge, OpenAiJudge};
pub use merge::{ColumnFeedback, Decision, DecisionSource, DecisionStatus, MergePolicy};
pub use profile::{ColumnProfile, DatasetProfile};
pub use quality::{QualityCategory, QualityReport};
pub use recognize::{PatternRecognizer, Recognizer};
pub use recommend::{Action, Recommendation, ReferenceLookup};
pub use tokio_util::sync::CancellationToken;
