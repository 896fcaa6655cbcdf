//! Strict validation of judge replies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::provider::ColumnBrief;
use crate::error::JudgeError;
use crate::merge::{ActionChoice, DecisionMap, DecisionStatus, json_value_text};
use crate::recommend::Action;

/// A judge's plan for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgePlan {
    /// Narrative explanation.
    #[serde(default)]
    pub text: String,
    pub value: DecisionMap,
}

impl JudgePlan {
    /// The single accepted action, or why there is not exactly one.
    pub fn accepted(&self) -> Result<(Action, &ActionChoice), JudgeError> {
        let mut accepted = self.value.iter().filter(|(_, choice)| choice.is_accepted());
        match (accepted.next(), accepted.count()) {
            (Some((action, choice)), 0) => Ok((*action, choice)),
            (None, _) => Err(JudgeError::AcceptedCount(0)),
            (Some(_), rest) => Err(JudgeError::AcceptedCount(rest + 1)),
        }
    }
}

/// Outcome of judging one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum JudgeVerdict {
    Accepted {
        action: Action,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        plan: JudgePlan,
    },
    NoPlan {
        reason: String,
    },
}

impl JudgeVerdict {
    /// Verdict for a validated plan.
    pub fn from_plan(plan: JudgePlan) -> Result<Self, JudgeError> {
        let (action, choice) = plan.accepted()?;
        let value = choice.value.clone();
        Ok(JudgeVerdict::Accepted { action, value, plan })
    }

    pub fn no_plan(err: &JudgeError) -> Self {
        JudgeVerdict::NoPlan {
            reason: err.to_string(),
        }
    }

    pub fn plan(&self) -> Option<&JudgePlan> {
        match self {
            JudgeVerdict::Accepted { plan, .. } => Some(plan),
            JudgeVerdict::NoPlan { .. } => None,
        }
    }
}

/// Validate a single-column reply against the proposed actions.
pub fn parse_reply(reply: &str, proposed: &[Action]) -> Result<JudgePlan, JudgeError> {
    let value = extract_json(reply)?;
    let object = value
        .as_object()
        .ok_or_else(|| JudgeError::Malformed("reply is not a JSON object".to_string()))?;
    plan_from_object(object, proposed)
}

/// Validate a batched reply, keyed by column name, either at the top level
/// or under a `columns` object. Each column is validated on its own.
pub fn parse_batched_reply(
    reply: &str,
    briefs: &[ColumnBrief],
) -> IndexMap<String, Result<JudgePlan, JudgeError>> {
    let parsed = extract_json(reply).and_then(|value| match value {
        Value::Object(mut root) => match root.remove("columns") {
            Some(Value::Object(columns)) => Ok(columns),
            Some(_) => Err(JudgeError::Malformed("'columns' is not an object".to_string())),
            None => Ok(root),
        },
        _ => Err(JudgeError::Malformed("reply is not a JSON object".to_string())),
    });

    briefs
        .iter()
        .map(|brief| {
            let result = match &parsed {
                Err(e) => Err(e.clone()),
                Ok(columns) => match columns.get(&brief.column) {
                    Some(Value::Object(object)) => plan_from_object(object, &brief.proposed_actions()),
                    Some(_) => Err(JudgeError::Malformed(format!(
                        "plan for '{}' is not an object",
                        brief.column
                    ))),
                    None => Err(JudgeError::MissingColumn(brief.column.clone())),
                },
            };
            (brief.column.clone(), result)
        })
        .collect()
}

/// Find the outermost JSON object in a reply, ignoring code fences and prose.
fn extract_json(reply: &str) -> Result<Value, JudgeError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json_str = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(JudgeError::Malformed("no JSON object in reply".to_string())),
    };
    serde_json::from_str(json_str).map_err(|e| JudgeError::Malformed(e.to_string()))
}

fn plan_from_object(object: &Map<String, Value>, proposed: &[Action]) -> Result<JudgePlan, JudgeError> {
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let entries = object
        .get("value")
        .and_then(Value::as_object)
        .ok_or_else(|| JudgeError::Malformed("missing 'value' object".to_string()))?;

    let mut value = DecisionMap::new();
    for (key, entry) in entries {
        let action: Action = key
            .parse()
            .map_err(|_| JudgeError::InvalidAction(key.clone()))?;
        let status_text = entry
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let status = DecisionStatus::parse(status_text).ok_or_else(|| JudgeError::InvalidStatus {
            action: key.clone(),
            status: status_text.to_string(),
        })?;
        let choice_value = entry.get("value").and_then(json_value_text);
        let previous = value.insert(
            action,
            ActionChoice {
                status,
                value: choice_value,
            },
        );
        if previous.is_some() {
            return Err(JudgeError::Malformed(format!("duplicate action '{}'", key)));
        }
    }

    let plan = JudgePlan { text, value };
    let (action, _) = plan.accepted()?;
    if action != Action::Keep && !proposed.contains(&action) {
        return Err(JudgeError::Unproposed(action.to_string()));
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPOSED: &[Action] = &[Action::Fill, Action::Mask];

    #[test]
    fn test_valid_reply_in_code_fence() {
        let reply = "Here is my plan:\n```json\n{\"text\": \"mask it\", \"value\": {\"mask\": {\"status\": \"accepted\", \"value\": \"partial\"}, \"fill\": {\"status\": \"rejected\"}}, \"confidence\": 0.9}\n```";
        let plan = parse_reply(reply, PROPOSED).unwrap();
        assert_eq!(plan.text, "mask it");
        let (action, choice) = plan.accepted().unwrap();
        assert_eq!(action, Action::Mask);
        assert_eq!(choice.value.as_deref(), Some("partial"));
    }

    #[test]
    fn test_keep_is_always_allowed() {
        let reply = r#"{"text": "", "value": {"keep": {"status": "accepted"}}}"#;
        let plan = parse_reply(reply, PROPOSED).unwrap();
        assert_eq!(plan.accepted().unwrap().0, Action::Keep);
    }

    #[test]
    fn test_rejections() {
        let cases = [
            ("not json at all", JudgeError::Malformed("no JSON object in reply".into())),
            (
                r#"{"value": {"shred": {"status": "accepted"}}}"#,
                JudgeError::InvalidAction("shred".into()),
            ),
            (
                r#"{"value": {"mask": {"status": "maybe"}}}"#,
                JudgeError::InvalidStatus {
                    action: "mask".into(),
                    status: "maybe".into(),
                },
            ),
            (
                r#"{"value": {"mask": {"status": "accepted"}, "fill": {"status": "accepted"}}}"#,
                JudgeError::AcceptedCount(2),
            ),
            (
                r#"{"value": {"mask": {"status": "rejected"}}}"#,
                JudgeError::AcceptedCount(0),
            ),
            (
                r#"{"value": {"drop": {"status": "accepted"}}}"#,
                JudgeError::Unproposed("drop".into()),
            ),
        ];
        for (reply, expected) in cases {
            assert_eq!(parse_reply(reply, PROPOSED).unwrap_err(), expected, "reply: {}", reply);
        }
        assert!(matches!(
            parse_reply("{\"value\": {", PROPOSED),
            Err(JudgeError::Malformed(_))
        ));
    }

    #[test]
    fn test_case_variant_actions_are_rejected() {
        let reply = r#"{"value": {"mask": {"status": "rejected"}, "Mask": {"status": "accepted"}}}"#;
        let err = parse_reply(reply, PROPOSED).unwrap_err();
        assert!(
            matches!(&err, JudgeError::Malformed(msg) if msg.starts_with("duplicate action")),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_verdict_from_plan() {
        let plan = parse_reply(r#"{"value": {"fill": {"status": "accepted", "value": 0}}}"#, PROPOSED)
            .unwrap();
        let verdict = JudgeVerdict::from_plan(plan).unwrap();
        let JudgeVerdict::Accepted { action, value, .. } = &verdict else {
            panic!("expected accepted verdict");
        };
        assert_eq!(*action, Action::Fill);
        assert_eq!(value.as_deref(), Some("0"));
        assert!(verdict.plan().is_some());
    }
}
