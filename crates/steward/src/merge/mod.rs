//! Decision merge: one final action per column.
//!
//! Inputs per column are an optional manual [`DecisionMap`], an optional
//! [`JudgePlan`](crate::judge::JudgePlan) and whether the caller accepted the
//! plan. [`MergePolicy`] decides which input wins; a column with no usable
//! input is kept unchanged.

mod decision;
mod policy;

pub use decision::{
    ActionChoice, ColumnFeedback, Decision, DecisionMap, DecisionSource, DecisionStatus,
};
pub use policy::{MergePolicy, merge, parse_feedback, resolve_column, resolve_manual};

pub(crate) use decision::json_value_text;
