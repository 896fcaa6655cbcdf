//! Combining manual choices and judge plans into final decisions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::decision::{ColumnFeedback, Decision, DecisionMap, DecisionSource, DecisionStatus};
use crate::error::{Result, StewardError};
use crate::judge::JudgePlan;

/// Which input wins when a column has both a judge plan and manual choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// An accepted, valid judge plan wins over manual choices.
    #[default]
    JudgeFirst,
    /// Manual choices win over the judge plan.
    ManualFirst,
}

/// Resolve one decision per header, in header order.
///
/// Feedback naming a column that is not in `headers` is an input error.
pub fn merge(
    headers: &[&str],
    feedback: &IndexMap<String, ColumnFeedback>,
    policy: MergePolicy,
) -> Result<Vec<Decision>> {
    if let Some(unknown) = feedback.keys().find(|c| !headers.contains(&c.as_str())) {
        return Err(StewardError::UnknownColumn(unknown.clone()));
    }

    let decisions: Vec<Decision> = headers
        .iter()
        .map(|&column| match feedback.get(column) {
            Some(input) => resolve_column(column, input, policy),
            None => Decision::keep(column),
        })
        .collect();

    tracing::debug!(
        columns = decisions.len(),
        effective = decisions.iter().filter(|d| d.is_effective()).count(),
        ?policy,
        "merged decisions"
    );
    Ok(decisions)
}

/// Final decision for one column.
pub fn resolve_column(column: &str, input: &ColumnFeedback, policy: MergePolicy) -> Decision {
    let judge = || {
        input
            .judge
            .as_ref()
            .filter(|_| input.accept_judge)
            .and_then(|plan| resolve_judge(column, plan))
    };
    let manual = || {
        input
            .manual
            .as_ref()
            .filter(|map| !map.is_empty())
            .and_then(|map| resolve_manual(column, map))
    };

    let resolved = match policy {
        MergePolicy::JudgeFirst => judge().or_else(manual),
        MergePolicy::ManualFirst => manual().or_else(judge),
    };
    resolved.unwrap_or_else(|| Decision::keep(column))
}

fn resolve_judge(column: &str, plan: &JudgePlan) -> Option<Decision> {
    match plan.accepted() {
        Ok((action, choice)) => Some(
            Decision::accepted(column, action, choice.value.clone()).with_source(DecisionSource::Judge),
        ),
        Err(e) => {
            tracing::warn!(column, error = %e, "ignoring invalid judge plan");
            None
        }
    }
}

/// A manual map's single accepted action; several accepted resolve to the
/// first by priority with the rest recorded as conflicts.
pub fn resolve_manual(column: &str, map: &DecisionMap) -> Option<Decision> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(action, _)| **action);

    let mut accepted = entries.iter().filter(|(_, choice)| choice.is_accepted());
    if let Some((action, choice)) = accepted.next() {
        let mut decision = Decision::accepted(column, **action, choice.value.clone());
        decision.conflicts = accepted.map(|(a, _)| **a).collect();
        if !decision.conflicts.is_empty() {
            tracing::warn!(
                column,
                chosen = %decision.action,
                conflicts = decision.conflicts.len(),
                "several accepted actions; kept the highest priority"
            );
        }
        return Some(decision);
    }

    entries.first().map(|(action, choice)| Decision {
        column: column.to_string(),
        action: **action,
        status: DecisionStatus::Rejected,
        value: choice.value.clone(),
        source: DecisionSource::Manual,
        conflicts: Vec::new(),
    })
}

/// Parse per-column feedback JSON.
///
/// Each column maps either to a full [`ColumnFeedback`] object or, as a
/// shorthand, directly to a manual decision map.
pub fn parse_feedback(json: &str) -> Result<IndexMap<String, ColumnFeedback>> {
    let raw: IndexMap<String, Value> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|(column, value)| {
            let feedback = parse_column_feedback(&column, value)?;
            Ok((column, feedback))
        })
        .collect()
}

fn parse_column_feedback(column: &str, value: Value) -> Result<ColumnFeedback> {
    let full = serde_json::from_value::<ColumnFeedback>(value.clone());
    match full {
        Ok(feedback) => Ok(feedback),
        Err(full_err) => serde_json::from_value::<DecisionMap>(value)
            .map(ColumnFeedback::manual)
            .map_err(|manual_err| StewardError::InvalidFeedback {
                column: column.to_string(),
                message: format!("{}; as a decision map: {}", full_err, manual_err),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ActionChoice;
    use crate::recommend::Action;

    fn manual(entries: &[(Action, ActionChoice)]) -> ColumnFeedback {
        ColumnFeedback::manual(entries.iter().cloned().collect())
    }

    fn plan(action: Action, value: Option<&str>) -> JudgePlan {
        JudgePlan {
            text: "judge says".to_string(),
            value: [(action, ActionChoice::accepted(value.map(String::from)))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_missing_feedback_defaults_to_keep() {
        let decisions = merge(&["a", "b"], &IndexMap::new(), MergePolicy::default()).unwrap();
        assert_eq!(decisions.len(), 2);
        assert!(decisions.iter().all(|d| d.action == Action::Keep));
        assert!(decisions.iter().all(|d| d.source == DecisionSource::Default));
    }

    #[test]
    fn test_unknown_column_is_input_error() {
        let mut feedback = IndexMap::new();
        feedback.insert("ghost".to_string(), ColumnFeedback::default());
        let err = merge(&["a"], &feedback, MergePolicy::default()).unwrap_err();
        assert!(matches!(err, StewardError::UnknownColumn(c) if c == "ghost"));
    }

    #[test]
    fn test_several_accepted_keeps_priority_first() {
        let input = manual(&[
            (Action::Drop, ActionChoice::accepted(None)),
            (Action::Mask, ActionChoice::accepted(Some("full".into()))),
        ]);
        let decision = resolve_column("email", &input, MergePolicy::default());
        assert_eq!(decision.action, Action::Mask);
        assert_eq!(decision.value.as_deref(), Some("full"));
        assert_eq!(decision.conflicts, vec![Action::Drop]);
    }

    #[test]
    fn test_all_rejected_is_a_rejected_no_op() {
        let input = manual(&[
            (Action::Drop, ActionChoice::rejected()),
            (Action::Fill, ActionChoice::rejected()),
        ]);
        let decision = resolve_column("a", &input, MergePolicy::default());
        assert_eq!(decision.status, DecisionStatus::Rejected);
        assert_eq!(decision.action, Action::Fill);
        assert!(!decision.is_effective());
    }

    #[test]
    fn test_policy_precedence() {
        let input = ColumnFeedback::judge(plan(Action::Mask, Some("partial")))
            .with_manual([(Action::Drop, ActionChoice::accepted(None))].into_iter().collect());

        let judge_first = resolve_column("a", &input, MergePolicy::JudgeFirst);
        assert_eq!(judge_first.action, Action::Mask);
        assert_eq!(judge_first.source, DecisionSource::Judge);

        let manual_first = resolve_column("a", &input, MergePolicy::ManualFirst);
        assert_eq!(manual_first.action, Action::Drop);
        assert_eq!(manual_first.source, DecisionSource::Manual);
    }

    #[test]
    fn test_unaccepted_judge_plan_is_ignored() {
        let mut input = ColumnFeedback::judge(plan(Action::Mask, None));
        input.accept_judge = false;
        let decision = resolve_column("a", &input, MergePolicy::JudgeFirst);
        assert_eq!(decision.action, Action::Keep);
    }

    #[test]
    fn test_invalid_judge_plan_falls_back_to_manual() {
        let mut bad = plan(Action::Mask, None);
        bad.value.insert(Action::Drop, ActionChoice::accepted(None));
        let input = ColumnFeedback::judge(bad)
            .with_manual([(Action::Fill, ActionChoice::accepted(Some("0".into())))].into_iter().collect());
        let decision = resolve_column("a", &input, MergePolicy::JudgeFirst);
        assert_eq!(decision.action, Action::Fill);
        assert_eq!(decision.source, DecisionSource::Manual);
    }

    #[test]
    fn test_parse_feedback_shorthand_and_full() {
        let feedback = parse_feedback(
            r#"{
                "email": {"mask": {"status": "accepted", "value": "full"}},
                "age": {
                    "judge": {"text": "band it", "value": {"generalize": {"status": "accepted", "value": "10"}}},
                    "accept_judge": true
                }
            }"#,
        )
        .unwrap();
        assert_eq!(feedback.len(), 2);
        assert!(feedback["email"].manual.is_some());
        assert!(feedback["age"].accept_judge);

        let err = parse_feedback(r#"{"email": {"explode": {"status": "accepted"}}}"#).unwrap_err();
        assert!(matches!(err, StewardError::InvalidFeedback { column, .. } if column == "email"));
    }
}
