//! Candidate actions and the evidence behind them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Action;
use crate::apply::GeneralizeStrategy;
use crate::input::Cell;
use crate::profile::EntityCount;
use crate::recognize::{PrivacyClass, RiskLevel};

/// A candidate action for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub column: String,
    pub action: Action,
    /// Human-readable explanation.
    pub reason: String,
    pub evidence: Evidence,
}

impl Recommendation {
    /// Create a recommendation; the action follows from the evidence.
    pub fn new(column: impl Into<String>, reason: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            column: column.into(),
            action: evidence.action(),
            reason: reason.into(),
            evidence,
        }
    }

    /// Value a reviewer would most likely pick for this action.
    pub fn suggested_value(&self) -> Option<String> {
        match &self.evidence {
            Evidence::Fill(fill) => Some(fill.suggested.clone()),
            Evidence::Generalize(generalize) => Some(generalize.strategy.to_string()),
            Evidence::Mask(_) => Some("partial".to_string()),
            Evidence::Drop(_) | Evidence::Categorize(_) | Evidence::Enrich(_) => None,
        }
    }
}

/// Per-action evidence, enough to decide without re-profiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    Fill(FillCandidates),
    Drop(DropEvidence),
    Mask(MaskEvidence),
    Generalize(GeneralizeEvidence),
    Categorize(CategorizeEvidence),
    Enrich(EnrichEvidence),
}

impl Evidence {
    pub fn action(&self) -> Action {
        match self {
            Evidence::Fill(_) => Action::Fill,
            Evidence::Drop(_) => Action::Drop,
            Evidence::Mask(_) => Action::Mask,
            Evidence::Generalize(_) => Action::Generalize,
            Evidence::Categorize(_) => Action::Categorize,
            Evidence::Enrich(_) => Action::Enrich,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillCandidates {
    pub missing_percentage: f64,
    /// Statistic name → value it would fill with.
    pub candidates: IndexMap<String, Cell>,
    /// Statistic picked by default (`median` or `mode`).
    pub suggested: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEvidence {
    pub missing_percentage: f64,
    pub threshold_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskEvidence {
    pub label: String,
    pub gdpr_category: String,
    pub privacy_class: PrivacyClass,
    pub risk: RiskLevel,
    /// Percentage of sampled values carrying the label.
    pub entity_percentage: f64,
    pub top_entities: Vec<EntityCount>,
    /// The header name points at the same label.
    pub header_confirmed: bool,
}

/// One value and the bucket it would move to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketExample {
    pub value: String,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralizeEvidence {
    pub strategy: GeneralizeStrategy,
    /// Entity label that triggered the rule, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdpr_category: Option<String>,
    pub header_sensitive: bool,
    pub examples: Vec<BucketExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeEvidence {
    pub unique_count: usize,
    /// Distinct values / row count.
    pub uniqueness_ratio: f64,
    pub example_categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichEvidence {
    /// Name of the reference table.
    pub reference: String,
    pub derived_column: String,
    /// Percentage of populated values the reference resolves.
    pub match_percentage: f64,
    pub header_match: bool,
    pub suggestions: Vec<String>,
}
