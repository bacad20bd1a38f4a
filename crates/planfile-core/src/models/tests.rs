use std::str::FromStr;

use crate::models::{
    Change, Document, Item, Section, Status, TaskStatus, TestStepStatus,
};

fn sample_document() -> Document<TaskStatus> {
    let mut setup = Section::new("1", "Setup");
    setup
        .items
        .push(Item::new("1.1", "Scaffold", TaskStatus::Complete));
    setup
        .items
        .push(Item::new("1.2", "Wire CI", TaskStatus::Pending));

    let mut build = Section::new("2", "Build");
    build
        .items
        .push(Item::new("2.1", "Parser", TaskStatus::InProgress));

    Document {
        sections: vec![setup, build],
        overview: None,
        success_criteria: Vec::new(),
    }
}

#[test]
fn flattened_iteration_follows_section_then_item_order() {
    let doc = sample_document();
    let ids: Vec<&str> = doc.items().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["1.1", "1.2", "2.1"]);
    assert_eq!(doc.item_count(), 3);
}

#[test]
fn lookup_by_id() {
    let mut doc = sample_document();
    assert_eq!(doc.get("2.1").expect("item").title, "Parser");
    assert!(doc.get("9.9").is_none());

    doc.get_mut("1.2").expect("item").status = TaskStatus::Complete;
    assert_eq!(doc.get("1.2").expect("item").status, TaskStatus::Complete);
}

#[test]
fn task_status_round_trips_through_tokens() {
    for status in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::AwaitingReview,
        TaskStatus::Complete,
        TaskStatus::Skipped,
    ] {
        assert_eq!(TaskStatus::from_token(status.as_str()), status);
        assert_eq!(TaskStatus::from_checkbox(status.checkbox_char()), status);
    }
}

#[test]
fn test_step_status_round_trips_through_checkbox_chars() {
    for status in [
        TestStepStatus::Pending,
        TestStepStatus::InProgress,
        TestStepStatus::Passed,
        TestStepStatus::Failed,
    ] {
        assert_eq!(TestStepStatus::from_checkbox(status.checkbox_char()), status);
    }
}

#[test]
fn unknown_markers_fall_back_to_the_default_member() {
    assert_eq!(TaskStatus::from_token("nonsense"), TaskStatus::Pending);
    assert_eq!(TaskStatus::from_checkbox('z'), TaskStatus::Pending);
    assert_eq!(TestStepStatus::from_checkbox('z'), TestStepStatus::Pending);
}

#[test]
fn from_str_rejects_unknown_statuses() {
    assert!(TaskStatus::from_str("in_progress").is_ok());
    assert!(TaskStatus::from_str("nonsense").is_err());
    assert!(TestStepStatus::from_str("passed").is_ok());
}

#[test]
fn only_complete_and_skipped_satisfy_dependencies() {
    assert!(TaskStatus::Complete.satisfies_dependency());
    assert!(TaskStatus::Skipped.satisfies_dependency());
    assert!(!TaskStatus::Pending.satisfies_dependency());
    assert!(!TaskStatus::InProgress.satisfies_dependency());
    assert!(!TaskStatus::AwaitingReview.satisfies_dependency());
}

#[test]
fn only_failed_test_steps_carry_notes() {
    assert!(TestStepStatus::Failed.carries_note());
    assert!(!TestStepStatus::Passed.carries_note());
    assert!(!TaskStatus::Complete.carries_note());
}

fn json_snapshot<S: Status + serde::Serialize>(document: &Document<S>) -> String {
    serde_json::to_string(document).expect("serializable document")
}

#[test]
fn documents_serialize_behind_a_generic_status_parameter() {
    let doc = sample_document();
    let json = json_snapshot(&doc);
    assert!(json.contains("\"in_progress\""));

    let back: Document<TaskStatus> = serde_json::from_str(&json).expect("deserializable document");
    assert_eq!(back, doc);
}

#[test]
fn change_display_is_human_readable() {
    let change = Change::StatusChanged {
        id: "1.2".to_string(),
        old: TaskStatus::Pending,
        new: TaskStatus::Complete,
        title: "Wire CI".to_string(),
    };
    assert_eq!(change.to_string(), "1.2 \"Wire CI\": pending -> complete");
    assert_eq!(change.item_id(), "1.2");
}
