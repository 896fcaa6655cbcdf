//! Prompt templates for judge providers.

use super::provider::{ColumnBrief, JudgeRequest};
use crate::recognize::catalog::CATALOG;
use crate::recommend::Action;

/// System prompt shared by every provider.
pub fn system_prompt() -> String {
    let actions: Vec<String> = Action::ALL
        .iter()
        .map(|a| format!("- {}: value {}", a, a.value_hint()))
        .collect();
    let glossary: Vec<String> = CATALOG
        .iter()
        .map(|e| {
            format!(
                "- {} ({:?}, {}, default {}): {}",
                e.label, e.class, e.gdpr_category, e.default_action, e.description
            )
        })
        .collect();

    format!(
        r#"You are a data protection reviewer deciding how each column of a dataset should be handled before it is shared.

For every column you receive profile facts and candidate actions with their evidence. Choose exactly one action per column.

Rules:
1. Accept exactly one action per column and mark every other listed action as rejected.
2. Only accept an action from the column's candidates, or "keep".
3. Prefer the least destructive action that removes the privacy risk.
4. Personal identifiers (PII) should be masked; quasi-identifiers such as dates, ages and job titles should be generalized.
5. Respond with valid JSON only.

Allowed actions:
{}

Entity glossary:
{}"#,
        actions.join("\n"),
        glossary.join("\n")
    )
}

/// User prompt for one request.
pub fn request_prompt(request: &JudgeRequest) -> String {
    let columns: Vec<String> = request.columns.iter().map(column_section).collect();
    let format = if request.batched {
        r#"Respond with one JSON object keyed by column name:
{"columns": {"<column>": {"text": "short reasoning", "value": {"<action>": {"status": "accepted", "value": "<value>"}, "<other action>": {"status": "rejected"}}}}}"#
    } else {
        r#"Respond with one JSON object:
{"text": "short reasoning", "value": {"<action>": {"status": "accepted", "value": "<value>"}, "<other action>": {"status": "rejected"}}}"#
    };
    format!("{}\n\n{}", columns.join("\n\n"), format)
}

fn column_section(brief: &ColumnBrief) -> String {
    let entities = if brief.top_entities.is_empty() {
        "none".to_string()
    } else {
        brief
            .top_entities
            .iter()
            .map(|e| format!("{} ({})", e.label, e.count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let candidates: Vec<String> = brief
        .candidates
        .iter()
        .map(|c| {
            let evidence = serde_json::to_string(&c.evidence)
                .unwrap_or_else(|_| "unavailable".to_string());
            format!("- {}: {}\n  evidence: {}", c.action, c.reason, evidence)
        })
        .collect();

    format!(
        "## Column '{}'\n- type: {}\n- rows: {}\n- missing: {}%\n- distinct values: {}\n- detected entities: {}\n\nCandidates:\n{}",
        brief.column,
        brief.data_type.as_str(),
        brief.row_count,
        brief.missing_percentage,
        brief.unique_count,
        entities,
        candidates.join("\n")
    )
}
