//! Column profiling: completeness, consistency, duplication and entity signal.

mod profiler;
mod stats;
mod types;

pub use profiler::{
    CategoryCount, ColumnProfile, DatasetProfile, DuplicateStats, EntityCount, EntityProfile,
    ProfileConfig, Profiler, strided_sample,
};
pub use stats::{FormatIssue, FormatIssueKind, NumericSummary, TextSummary, mode, percentile, value_counts};
pub use types::{DataType, declared_type, is_numeric, parse_number};
