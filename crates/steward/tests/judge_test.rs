//! Judge adapter tests with mock judges.
//!
//! Time is paused in these tests so delays and timeouts resolve instantly.

use std::sync::Arc;
use std::time::Duration;

use steward::judge::{ColumnBrief, JudgeAdapter};
use steward::{
    Action, CancellationToken, Column, Dataset, JudgeConfig, JudgeError, JudgeVerdict, MockJudge,
    Steward, StewardError,
};

/// Dataset whose columns each get exactly one fill candidate.
fn gappy(columns: &[&str]) -> Dataset {
    Dataset::from_columns(
        columns
            .iter()
            .map(|name| Column::from_strs(*name, &["1", "", "3"]))
            .collect(),
    )
    .expect("equal lengths")
}

fn briefs(dataset: &Dataset) -> Vec<ColumnBrief> {
    Steward::new()
        .recommend(dataset)
        .columns
        .values()
        .map(|c| ColumnBrief::new(&c.profile, c.candidates.clone()))
        .collect()
}

fn no_plan_reason(verdict: &JudgeVerdict) -> &str {
    match verdict {
        JudgeVerdict::NoPlan { reason } => reason,
        JudgeVerdict::Accepted { action, .. } => panic!("expected no plan, got {}", action),
    }
}

#[tokio::test(start_paused = true)]
async fn test_every_column_gets_a_verdict() {
    let judge = Arc::new(MockJudge::new());
    let adapter = JudgeAdapter::new(judge.clone());
    let dataset = gappy(&["a", "b", "c"]);

    let verdicts = adapter
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    assert_eq!(verdicts.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    for verdict in verdicts.values() {
        match verdict {
            JudgeVerdict::Accepted { action, value, .. } => {
                assert_eq!(*action, Action::Fill);
                assert_eq!(value.as_deref(), Some("median"));
            }
            JudgeVerdict::NoPlan { reason } => panic!("unexpected no plan: {}", reason),
        }
    }
    assert_eq!(judge.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_calls_are_bounded() {
    let config = JudgeConfig::default().with_max_in_flight(2);
    let judge = Arc::new(
        MockJudge::new()
            .with_delay(Duration::from_millis(50))
            .with_config(config),
    );
    let adapter = JudgeAdapter::new(judge.clone());
    let dataset = gappy(&["a", "b", "c", "d", "e", "f"]);

    let verdicts = adapter
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    assert_eq!(verdicts.len(), 6);
    assert_eq!(judge.calls(), 6);
    assert!(judge.peak_in_flight() <= 2);
}

#[tokio::test(start_paused = true)]
async fn test_columns_without_candidates_are_not_sent() {
    let judge = Arc::new(MockJudge::new());
    let dataset = Dataset::from_columns(vec![
        Column::from_strs("sku", &["A-1", "B-2", "C-3"]),
        Column::from_strs("qty", &["1", "", "3"]),
    ])
    .expect("equal lengths");

    let verdicts = JudgeAdapter::new(judge.clone())
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    assert_eq!(verdicts.keys().collect::<Vec<_>>(), vec!["qty"]);
    assert_eq!(judge.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_degrades_to_no_plan() {
    let config = JudgeConfig::default().with_timeout_secs(1);
    let judge = Arc::new(
        MockJudge::new()
            .with_delay(Duration::from_secs(5))
            .with_config(config),
    );
    let dataset = gappy(&["a", "b"]);

    let verdicts = JudgeAdapter::new(judge)
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    for verdict in verdicts.values() {
        assert!(no_plan_reason(verdict).contains("timed out"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_invalid_replies_degrade_to_no_plan() {
    let dataset = gappy(&["a"]);
    let cases = [
        (MockJudge::failing(JudgeError::Transport("connection refused".into())), "connection refused"),
        (MockJudge::with_reply("I think you should fill it."), "Malformed"),
        (
            MockJudge::with_reply(r#"{"value": {"drop": {"status": "accepted"}}}"#),
            "drop",
        ),
        (
            MockJudge::with_reply(r#"{"value": {"fill": {"status": "maybe"}}}"#),
            "maybe",
        ),
        (
            MockJudge::with_reply(r#"{"value": {"fill": {"status": "rejected"}}}"#),
            "found 0",
        ),
    ];

    for (judge, expected) in cases {
        let verdicts = JudgeAdapter::new(Arc::new(judge))
            .judge_columns(briefs(&dataset), &CancellationToken::new())
            .await
            .expect("not cancelled");
        let reason = no_plan_reason(&verdicts["a"]);
        assert!(reason.contains(expected), "'{}' should mention '{}'", reason, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_discards_results() {
    let dataset = gappy(&["a", "b"]);

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let err = JudgeAdapter::new(Arc::new(MockJudge::new()))
        .judge_columns(briefs(&dataset), &cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, StewardError::Cancelled));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let slow = MockJudge::new().with_delay(Duration::from_secs(10));
    let err = JudgeAdapter::new(Arc::new(slow))
        .judge_columns(briefs(&dataset), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, StewardError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_batched_mode_makes_one_call() {
    let judge = Arc::new(MockJudge::new().with_config(JudgeConfig::default().with_batch(true)));
    let dataset = gappy(&["a", "b", "c"]);

    let verdicts = JudgeAdapter::new(judge.clone())
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    assert_eq!(judge.calls(), 1);
    assert_eq!(verdicts.len(), 3);
    assert!(verdicts.values().all(|v| matches!(v, JudgeVerdict::Accepted { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_batched_reply_missing_a_column() {
    let reply = r#"{"columns": {"a": {"text": "fill it", "value": {"fill": {"status": "accepted", "value": "mean"}}}}}"#;
    let judge = MockJudge::with_reply(reply).with_config(JudgeConfig::default().with_batch(true));
    let dataset = gappy(&["a", "b"]);

    let verdicts = JudgeAdapter::new(Arc::new(judge))
        .judge_columns(briefs(&dataset), &CancellationToken::new())
        .await
        .expect("not cancelled");

    assert!(matches!(
        &verdicts["a"],
        JudgeVerdict::Accepted { action: Action::Fill, value: Some(v), .. } if v == "mean"
    ));
    assert!(no_plan_reason(&verdicts["b"]).contains("'b'"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_judge_leaves_data_untouched() {
    let steward = Steward::new().with_judge(Arc::new(MockJudge::failing(JudgeError::Transport(
        "down".into(),
    ))));
    let dataset = gappy(&["a", "b"]);

    let response = steward
        .recommend_with_judge(&dataset, &CancellationToken::new())
        .await
        .expect("not cancelled");
    assert!(response
        .columns
        .values()
        .all(|c| matches!(c.judge, Some(JudgeVerdict::NoPlan { .. }))));

    let feedback = response.feedback_from_verdicts();
    assert!(feedback.is_empty());
    let applied = steward.apply(&dataset, &feedback).expect("apply");
    assert_eq!(applied.dataset, dataset);
}
