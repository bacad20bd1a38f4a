//! Write queue integration tests: serialization, coordination with the
//! watcher, and failure isolation.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use planfile_core::{
    parse, FileWatcher, PlanKind, TaskStatus, TestPlanKind, TestStepStatus, WriteQueue,
};

use common::{plan_environment, wait_for, PLAN_V1, TEST_PLAN_V1};

#[tokio::test]
async fn rapid_enqueues_coalesce_into_one_drain_applied_in_order() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);
    let queue = WriteQueue::new(watcher.clone());

    queue.enqueue("1.2", TaskStatus::InProgress, None);
    queue.enqueue("1.2", TaskStatus::Complete, None);
    queue.wait_until_complete().await;

    let text = std::fs::read_to_string(&path).expect("read plan");
    assert!(text.contains("- [x] **Wire CI** `[complete]`"));
    assert!(!text.contains("in_progress"));
    assert!(!queue.is_processing());
    assert_eq!(queue.pending_len(), 0);
}

#[tokio::test]
async fn held_document_is_updated_without_a_reparse() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);
    let initial = watcher.force_reload().await.expect("initial parse");
    assert_eq!(
        initial.get("2.1").expect("item").status,
        TaskStatus::Pending
    );

    let queue = WriteQueue::new(watcher.clone());
    queue.enqueue("2.1", TaskStatus::InProgress, None);
    queue.wait_until_complete().await;

    let held = watcher.document().expect("document");
    assert_eq!(
        held.get("2.1").expect("item").status,
        TaskStatus::InProgress
    );
}

#[tokio::test]
async fn own_writes_do_not_fire_callbacks() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let events = events.clone();
        watcher.on_reloaded(move |_| events.lock().expect("events").push("reloaded".into()));
    }
    {
        let events = events.clone();
        watcher
            .on_conflict_detected(move |_, _| events.lock().expect("events").push("conflict".into()));
    }

    watcher
        .start_watching(Some(parse::<PlanKind>(PLAN_V1)))
        .expect("start watching");
    tokio::time::sleep(Duration::from_millis(300)).await;

    let queue = WriteQueue::new(watcher.clone());
    queue.enqueue("1.2", TaskStatus::Complete, None);
    queue.wait_until_complete().await;

    // Leave the watch loop enough time to observe (and suppress) the
    // notification caused by our own write.
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(
        events.lock().expect("events").is_empty(),
        "self-write must not fire callbacks, got {:?}",
        events.lock().expect("events")
    );

    watcher.stop_watching();
}

#[tokio::test]
async fn missing_item_is_skipped_and_the_drain_continues() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);
    let queue = WriteQueue::new(watcher.clone());

    queue.enqueue("99.99", TaskStatus::Complete, None);
    queue.enqueue("1.2", TaskStatus::Complete, None);
    queue.wait_until_complete().await;

    let text = std::fs::read_to_string(&path).expect("read plan");
    assert!(text.contains("- [x] **Wire CI** `[complete]`"));
}

#[tokio::test]
async fn failed_test_step_write_records_the_note() {
    let (_dir, path) = plan_environment("TEST_PLAN.md", TEST_PLAN_V1);
    let watcher: FileWatcher<TestPlanKind> = FileWatcher::new(&path);
    watcher.force_reload().await.expect("initial parse");
    let queue = WriteQueue::new(watcher.clone());

    queue.enqueue(
        "section-0-2",
        TestStepStatus::Failed,
        Some("redirect loop on login".to_string()),
    );
    queue.wait_until_complete().await;

    let text = std::fs::read_to_string(&path).expect("read test plan");
    assert!(text.contains("- [!] Login works\n  Note: redirect loop on login\n"));

    let held = watcher.document().expect("document");
    let step = held.get("section-0-2").expect("item");
    assert_eq!(step.status, TestStepStatus::Failed);
    assert_eq!(step.note.as_deref(), Some("redirect loop on login"));
}

#[tokio::test]
async fn wait_until_complete_returns_immediately_when_idle() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);
    let queue = WriteQueue::new(watcher);

    queue.wait_until_complete().await;
    assert!(!queue.is_processing());
}

#[tokio::test]
async fn cancel_discards_queued_requests() {
    let (_dir, path) = plan_environment("PLAN.md", PLAN_V1);
    let watcher: FileWatcher<PlanKind> = FileWatcher::new(&path);
    let queue = WriteQueue::new(watcher.clone());

    for _ in 0..50 {
        queue.enqueue("1.2", TaskStatus::InProgress, None);
    }
    queue.cancel();

    assert_eq!(queue.pending_len(), 0);
    assert!(wait_for(|| !queue.is_processing(), 1000).await);
}
