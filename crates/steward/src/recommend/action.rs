//! The closed set of column handling actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A handling action for one column.
///
/// Variants are declared in proposal priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Action {
    Fill,
    Generalize,
    Mask,
    Drop,
    Categorize,
    Enrich,
    Keep,
}

impl Action {
    /// Every action, in priority order.
    pub const ALL: [Action; 7] = [
        Action::Fill,
        Action::Generalize,
        Action::Mask,
        Action::Drop,
        Action::Categorize,
        Action::Enrich,
        Action::Keep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Fill => "fill",
            Action::Generalize => "generalize",
            Action::Mask => "mask",
            Action::Drop => "drop",
            Action::Categorize => "categorize",
            Action::Enrich => "enrich",
            Action::Keep => "keep",
        }
    }

    /// Values the action understands, for prompts and help output.
    pub fn value_hint(&self) -> &'static str {
        match self {
            Action::Fill => "median | mean | mode | min | max | <literal>",
            Action::Generalize => "decade | year | month | <band width> | job",
            Action::Mask => "partial | full",
            Action::Drop | Action::Categorize | Action::Enrich | Action::Keep => "none",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}
