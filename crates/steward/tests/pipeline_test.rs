//! End-to-end tests for the Steward pipeline.

use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use steward::merge::{ActionChoice, DecisionMap, parse_feedback};
use steward::{
    Action, CancellationToken, Cell, ColumnFeedback, ColumnOutcome, Dataset, DecisionSource,
    MockJudge, QualityCategory, Steward, StewardError,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn texts(dataset: &Dataset, column: &str) -> Vec<String> {
    dataset
        .column(column)
        .expect("column exists")
        .values
        .iter()
        .map(Cell::to_string)
        .collect()
}

fn people() -> Dataset {
    Steward::new()
        .load_bytes(
            b"email,age,country\n\
              a@x.com,34,Morocco\n\
              ,51,France\n\
              b@x.com,29,Spain\n\
              c@x.com,42,Morocco\n",
        )
        .expect("valid csv")
}

// =============================================================================
// Quality
// =============================================================================

#[test]
fn test_quality_scenario_email_column() {
    let file = create_test_file("id,email\n1,a@x.com\n2,\n3,b@x.com\n4,not-an-email\n");
    let steward = Steward::new();
    let (dataset, _) = steward.load(file.path()).expect("load");

    let response = steward.quality(&dataset);
    let email = &response.profile.columns[1];
    assert_eq!(email.non_null_count, 3);
    assert_eq!(email.empty_string_count, 1);
    assert_eq!(email.null_count, 0);
    assert_eq!(email.invalid_count, 1);
    assert!(response.quality.overall_score <= 100.0);
}

#[test]
fn test_quality_duplicates_scenario() {
    let mut content = String::from("id,name\n");
    for i in 1..=8 {
        content.push_str(&format!("{},n{}\n", i, i));
    }
    content.push_str("1,n1\n2,n2\n");
    let dataset = Steward::new().load_bytes(content.as_bytes()).expect("valid csv");

    let response = Steward::new().quality(&dataset);
    let duplicates = &response.quality.duplicates;
    assert_eq!(duplicates.unique_rows, 8);
    assert_eq!(duplicates.duplicate_rows, 2);
    assert_eq!(duplicates.duplicate_percentage, 20.0);
    assert_eq!(response.quality.factors.duplicates, 80.0);
}

#[test]
fn test_clean_dataset_is_excellent() {
    let dataset = Steward::new()
        .load_bytes(b"sku,qty\nA-1,3\nB-2,5\nC-3,8\n")
        .expect("valid csv");
    let response = Steward::new().quality(&dataset);
    assert_eq!(response.quality.category, QualityCategory::Excellent);
    assert_eq!(response.summary.row_count, 3);
    assert!(response.summary.size_bytes > 0);
}

// =============================================================================
// Recommend
// =============================================================================

#[test]
fn test_recommend_people() {
    let response = Steward::new().recommend(&people());

    let actions = |name: &str| -> Vec<Action> {
        response.columns[name].candidates.iter().map(|r| r.action).collect()
    };
    assert_eq!(actions("email"), vec![Action::Fill, Action::Mask]);
    assert_eq!(actions("age"), vec![Action::Generalize]);
    assert_eq!(actions("country"), vec![Action::Enrich]);
    assert_eq!(response.flagged_columns(), 3);
}

#[test]
fn test_recommendations_serialize_with_tagged_evidence() {
    let response = Steward::new().recommend(&people());
    let json = serde_json::to_value(&response).expect("serializable");
    let mask = &json["columns"]["email"]["candidates"][1];
    assert_eq!(mask["action"], "mask");
    assert_eq!(mask["evidence"]["kind"], "mask");
    assert_eq!(mask["evidence"]["gdpr_category"], "identifier");
}

// =============================================================================
// Judge → merge → apply
// =============================================================================

#[tokio::test]
async fn test_mock_judge_end_to_end() {
    let steward = Steward::new().with_judge(Arc::new(MockJudge::new()));
    let dataset = people();

    let response = steward
        .recommend_with_judge(&dataset, &CancellationToken::new())
        .await
        .expect("judge run");
    let feedback = response.feedback_from_verdicts();
    assert_eq!(feedback.len(), 3);

    let applied = steward.apply(&dataset, &feedback).expect("apply");
    assert!(applied.decisions.iter().all(|d| d.source == DecisionSource::Judge));

    let out = &applied.dataset;
    assert_eq!(out.headers(), vec!["email", "age", "country", "country_iso_code"]);
    assert_eq!(texts(out, "email"), vec!["a@x.com", "a@x.com", "b@x.com", "c@x.com"]);
    assert_eq!(texts(out, "age"), vec!["30-39", "50-59", "20-29", "40-49"]);
    assert_eq!(texts(out, "country"), texts(&dataset, "country"));
    assert_eq!(texts(out, "country_iso_code"), vec!["MA", "FR", "ES", "MA"]);

    assert_eq!(applied.report.rows_before, 4);
    assert_eq!(applied.report.rows_after, 4);
    assert_eq!(applied.report.count(ColumnOutcome::Applied), 3);
}

#[test]
fn test_manual_feedback_json() {
    let feedback = parse_feedback(
        r#"{
            "email": {"mask": {"status": "accepted", "value": "full"}},
            "age": {"drop": {"status": "accepted"}},
            "country": {"enrich": {"status": "rejected"}}
        }"#,
    )
    .expect("valid feedback");

    let dataset = people();
    let applied = Steward::new().apply(&dataset, &feedback).expect("apply");

    assert_eq!(applied.dataset.headers(), vec!["email", "country"]);
    assert_eq!(
        texts(&applied.dataset, "email"),
        vec!["<IDENTIFIER>", "", "<IDENTIFIER>", "<IDENTIFIER>"]
    );
    assert_eq!(texts(&applied.dataset, "country"), texts(&dataset, "country"));
    assert_eq!(applied.report.dropped_columns, vec!["age"]);
    assert_eq!(applied.report.rows_after, 4);

    let country = applied.report.column("country").expect("reported");
    assert_eq!(country.outcome, ColumnOutcome::Skipped);
}

#[test]
fn test_fill_literal_replaces_exactly_the_missing_cells() {
    let dataset = Steward::new()
        .load_bytes(b"city,n\nRabat,1\n,2\nFes,3\nNA,4\n")
        .expect("valid csv");

    let mut map = DecisionMap::new();
    map.insert(Action::Fill, ActionChoice::accepted(Some("unknown".into())));
    let mut feedback = IndexMap::new();
    feedback.insert("city".to_string(), ColumnFeedback::manual(map));

    let applied = Steward::new().apply(&dataset, &feedback).expect("apply");
    assert_eq!(texts(&applied.dataset, "city"), vec!["Rabat", "unknown", "Fes", "unknown"]);
    assert_eq!(applied.report.column("city").expect("reported").cells_changed, 2);
    assert_eq!(texts(&applied.dataset, "n"), texts(&dataset, "n"));
}

#[test]
fn test_conflicting_manual_choices_keep_priority_first() {
    let dataset = people();
    let feedback = parse_feedback(
        r#"{"email": {
            "mask": {"status": "accepted"},
            "fill": {"status": "accepted", "value": "mode"}
        }}"#,
    )
    .expect("valid feedback");

    let applied = Steward::new().apply(&dataset, &feedback).expect("apply");
    let decision = &applied.decisions[0];
    assert_eq!(decision.action, Action::Fill);
    assert_eq!(decision.conflicts, vec![Action::Mask]);
}

#[test]
fn test_unknown_feedback_column_aborts() {
    let feedback = parse_feedback(r#"{"salary": {"drop": {"status": "accepted"}}}"#).expect("parses");
    let err = Steward::new().apply(&people(), &feedback).unwrap_err();
    assert!(matches!(err, StewardError::UnknownColumn(c) if c == "salary"));
}

#[test]
fn test_reapplying_is_idempotent() {
    let feedback = parse_feedback(
        r#"{
            "email": {"mask": {"status": "accepted"}},
            "age": {"generalize": {"status": "accepted"}},
            "country": {"categorize": {"status": "accepted"}}
        }"#,
    )
    .expect("valid feedback");

    let steward = Steward::new();
    let once = steward.apply(&people(), &feedback).expect("first apply");
    let twice = steward.apply(&once.dataset, &feedback).expect("second apply");
    assert_eq!(once.dataset, twice.dataset);
    assert_eq!(twice.report.cells_changed(), 0);
}
