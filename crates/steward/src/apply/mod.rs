//! Turning accepted decisions into a transformed dataset.
//!
//! Each column receives at most one action. A transformation that cannot be
//! carried out is recorded as [`ColumnOutcome::Failed`] and the column is left
//! as it was; the rest of the dataset is still processed.

mod engine;
mod generalize;
mod operations;
mod report;

pub use engine::{ApplyConfig, ApplyEngine};
pub use generalize::{GeneralizeStrategy, OTHER_BUCKET};
pub use operations::{REDACTED_TOKEN, redaction_token};
pub use report::{ApplicationReport, ColumnOutcome, ColumnReport};
