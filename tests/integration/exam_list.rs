//! Integration tests for the live exam list

use super::test_utils::{seed_exam, signed_in, signed_out, sled_store, utc};
use examwise::repository::ExamRepository;
use examwise::session::{SessionContext, UserIdentity};
use examwise::store::{path, DocumentStore, WriteFields};
use examwise::types::{DocId, UserId};
use examwise::views::ExamListView;

fn names(exams: &[examwise::exam::Exam]) -> Vec<&str> {
    exams.iter().map(|e| e.name.as_str()).collect()
}

#[tokio::test]
async fn test_exams_arrive_in_date_order() {
    let repo = ExamRepository::new(sled_store());
    seed_exam(&repo, "u1", "Chemistry", utc(2030, 7, 1)).await;
    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;
    seed_exam(&repo, "u1", "Biology", utc(2030, 8, 1)).await;

    let mut view = ExamListView::new(repo, signed_in("u1"));
    assert!(view.is_loading());
    assert!(view.poll());
    assert!(!view.is_loading());
    assert_eq!(names(view.exams()), vec!["Physics", "Chemistry", "Biology"]);
}

#[tokio::test]
async fn test_past_exams_follow_upcoming_ones() {
    let repo = ExamRepository::new(sled_store());
    seed_exam(&repo, "u1", "Old", utc(2024, 1, 1)).await;
    seed_exam(&repo, "u1", "Today", utc(2025, 6, 1)).await;
    seed_exam(&repo, "u1", "Later", utc(2025, 9, 1)).await;

    let mut view = ExamListView::new(repo, signed_in("u1"));
    view.poll();

    let now = utc(2025, 6, 1);
    let partition = view.partition_at(now);
    assert_eq!(names(&partition.upcoming), vec!["Today", "Later"]);
    assert_eq!(names(&partition.past), vec!["Old"]);
    let ordered = view.ordered_at(now);
    assert_eq!(names(&ordered), vec!["Today", "Later", "Old"]);
}

#[tokio::test]
async fn test_new_exam_is_delivered_on_poll() {
    let repo = ExamRepository::new(sled_store());
    let mut view = ExamListView::new(repo.clone(), signed_in("u1"));
    view.poll();
    assert!(view.exams().is_empty());
    assert!(!view.poll());

    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;
    assert!(view.poll());
    assert_eq!(names(view.exams()), vec!["Physics"]);
}

#[tokio::test]
async fn test_other_users_exams_are_invisible() {
    let repo = ExamRepository::new(sled_store());
    seed_exam(&repo, "u2", "Someone else's", utc(2030, 6, 1)).await;

    let mut view = ExamListView::new(repo, signed_in("u1"));
    view.poll();
    assert!(view.exams().is_empty());
}

#[tokio::test]
async fn test_sign_out_closes_subscription() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;
    let session = signed_in("u1");

    let mut view = ExamListView::new(repo, session.clone());
    view.poll();
    assert_eq!(store.listener_count(), 1);
    assert_eq!(view.exams().len(), 1);

    session.sign_out();
    view.poll();
    assert_eq!(store.listener_count(), 0);
    assert!(!view.is_subscribed());
    assert!(view.exams().is_empty());
    assert!(!view.is_loading());
}

#[tokio::test]
async fn test_user_switch_resubscribes() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;
    seed_exam(&repo, "u2", "History", utc(2030, 6, 2)).await;
    let session = signed_in("u1");

    let mut view = ExamListView::new(repo, session.clone());
    view.poll();
    assert_eq!(names(view.exams()), vec!["Physics"]);

    session.on_auth_changed(Some(UserIdentity::new("u2")));
    view.poll();
    assert_eq!(names(view.exams()), vec!["History"]);
    assert_eq!(store.listener_count(), 1);
}

#[tokio::test]
async fn test_signed_out_list_is_empty_and_settled() {
    let store = sled_store();
    let mut view = ExamListView::new(ExamRepository::new(store.clone()), signed_out());
    assert!(!view.poll());
    assert!(view.exams().is_empty());
    assert!(!view.is_loading());
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test]
async fn test_loading_session_does_not_subscribe() {
    let store = sled_store();
    let mut view = ExamListView::new(ExamRepository::new(store.clone()), SessionContext::new());
    view.poll();
    assert!(view.is_loading());
    assert!(!view.is_subscribed());
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test]
async fn test_dropping_view_unsubscribes() {
    let store = sled_store();
    {
        let mut view = ExamListView::new(ExamRepository::new(store.clone()), signed_in("u1"));
        view.poll();
        assert_eq!(store.listener_count(), 1);
    }
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test]
async fn test_undecodable_exam_is_skipped() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;
    store
        .add_document(
            &path::exams(&UserId::from("u1")),
            WriteFields::new().set("name", "Broken").set("date", "someday"),
        )
        .await
        .unwrap();

    let mut view = ExamListView::new(repo, signed_in("u1"));
    view.poll();
    assert_eq!(names(view.exams()), vec!["Physics"]);
}

#[tokio::test]
async fn test_snapshot_error_clears_list_without_retry() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let user = UserId::from("u1");
    seed_exam(&repo, "u1", "Physics", utc(2030, 6, 1)).await;

    let mut view = ExamListView::new(repo.clone(), signed_in("u1"));
    view.poll();
    assert_eq!(view.exams().len(), 1);

    // An unreadable stored value makes every later snapshot of the collection fail.
    let corrupt = path::exam(&user, &DocId::from("corrupt"));
    store
        .db()
        .insert(corrupt.as_str().as_bytes(), b"not json".to_vec())
        .unwrap();
    seed_exam(&repo, "u1", "Chemistry", utc(2030, 7, 1)).await;

    assert!(view.poll());
    assert!(view.exams().is_empty());
    assert!(!view.is_loading());
    assert!(view.is_subscribed());
    assert_eq!(store.listener_count(), 1);
    assert!(!view.poll());
}
