//! Decision types shared by reviewers, judge plans and the merge step.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::judge::JudgePlan;
use crate::recommend::Action;

/// Status of one action in a decision map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Accepted,
    Rejected,
}

impl DecisionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionStatus::Accepted => "accepted",
            DecisionStatus::Rejected => "rejected",
        }
    }

    /// Parse a status, ignoring case and surrounding whitespace.
    pub fn parse(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "accepted" => Some(DecisionStatus::Accepted),
            "rejected" => Some(DecisionStatus::Rejected),
            _ => None,
        }
    }
}

/// Where a final decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Manual,
    Judge,
    /// No usable input; the column is kept.
    Default,
}

/// Status and optional parameter for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionChoice {
    pub status: DecisionStatus,
    #[serde(
        default,
        deserialize_with = "value_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
}

impl ActionChoice {
    pub fn accepted(value: Option<String>) -> Self {
        Self {
            status: DecisionStatus::Accepted,
            value,
        }
    }

    pub fn rejected() -> Self {
        Self {
            status: DecisionStatus::Rejected,
            value: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == DecisionStatus::Accepted
    }
}

/// Action → choice, as submitted by a reviewer or a judge.
pub type DecisionMap = IndexMap<Action, ActionChoice>;

/// Accept strings, numbers and booleans as a decision value; blank is none.
pub(crate) fn value_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| json_value_text(&v)))
}

/// Text form of a scalar JSON value; `None` for null, blank or composite.
pub(crate) fn json_value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Everything known about one column before merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<DecisionMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<JudgePlan>,
    /// Whether the caller accepted the judge plan.
    pub accept_judge: bool,
}

impl ColumnFeedback {
    pub fn manual(map: DecisionMap) -> Self {
        Self {
            manual: Some(map),
            ..Self::default()
        }
    }

    /// An accepted judge plan.
    pub fn judge(plan: JudgePlan) -> Self {
        Self {
            judge: Some(plan),
            accept_judge: true,
            ..Self::default()
        }
    }

    pub fn with_manual(mut self, map: DecisionMap) -> Self {
        self.manual = Some(map);
        self
    }
}

/// The single final action for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub column: String,
    pub action: Action,
    pub status: DecisionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub source: DecisionSource,
    /// Other accepted actions that lost on priority.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Action>,
}

impl Decision {
    /// Default decision: keep the column as is.
    pub fn keep(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            action: Action::Keep,
            status: DecisionStatus::Accepted,
            value: None,
            source: DecisionSource::Default,
            conflicts: Vec::new(),
        }
    }

    pub fn accepted(column: impl Into<String>, action: Action, value: Option<String>) -> Self {
        Self {
            column: column.into(),
            action,
            status: DecisionStatus::Accepted,
            value,
            source: DecisionSource::Manual,
            conflicts: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: DecisionSource) -> Self {
        self.source = source;
        self
    }

    /// Whether applying the decision changes the data.
    pub fn is_effective(&self) -> bool {
        self.status == DecisionStatus::Accepted && self.action != Action::Keep
    }
}
