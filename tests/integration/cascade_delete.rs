//! Integration tests for cascading exam deletion

use super::test_utils::{faulty_repo, seed_exam, signed_in, sled_store, utc, Faults};
use examwise::item::ItemType;
use examwise::notice::{NoticeLevel, Notices};
use examwise::repository::ExamRepository;
use examwise::store::{path, DocumentStore, Query};
use examwise::types::UserId;
use examwise::views::ExamCard;
use chrono::Utc;
use std::sync::atomic::Ordering;

async fn add_items(repo: &ExamRepository, exam_id: &examwise::types::DocId, n: i64) {
    let user = UserId::from("u1");
    for order in 0..n {
        repo.add_item(
            &user,
            exam_id,
            ItemType::TitleCheckbox,
            order,
            utc(2030, 6, 1),
            Utc::now(),
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_delete_removes_exam_and_every_item() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    add_items(&repo, &exam_id, 3).await;

    let report = repo.delete_exam(&user, &exam_id).await.unwrap();
    assert_eq!(report.items_deleted, 3);

    let items = store
        .read_once(&Query::collection(path::items(&user, &exam_id)))
        .await
        .unwrap();
    assert!(items.is_empty());
    assert!(repo.list_exams(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_leaves_other_exams_alone() {
    let repo = ExamRepository::new(sled_store());
    let user = UserId::from("u1");
    let doomed = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let kept = seed_exam(&repo, "u1", "Chemistry", utc(2030, 7, 1)).await;
    add_items(&repo, &doomed, 2).await;
    add_items(&repo, &kept, 2).await;

    repo.delete_exam(&user, &doomed).await.unwrap();

    let exams = repo.list_exams(&user).await.unwrap();
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0].id, kept);
    assert_eq!(repo.list_items(&user, &kept).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_batch_failure_keeps_exam_document() {
    let (repo, faulty, _inner) = faulty_repo();
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    add_items(&repo, &exam_id, 2).await;

    Faults::fail(&faulty.faults.batch);
    assert!(repo.delete_exam(&user, &exam_id).await.is_err());

    assert_eq!(repo.list_exams(&user).await.unwrap().len(), 1);
    assert_eq!(repo.list_items(&user, &exam_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_read_failure_aborts_before_any_delete() {
    let (repo, faulty, inner) = faulty_repo();
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    add_items(&repo, &exam_id, 1).await;

    Faults::fail(&faulty.faults.read);
    assert!(repo.delete_exam(&user, &exam_id).await.is_err());

    let exams = inner
        .read_once(&Query::collection(path::exams(&user)))
        .await
        .unwrap();
    assert_eq!(exams.len(), 1);
}

#[tokio::test]
async fn test_card_reports_deletion_outcome() {
    let (repo, faulty, _inner) = faulty_repo();
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    add_items(&repo, &exam_id, 1).await;
    let exam = repo.get_exam(&user, &exam_id).await.unwrap();

    let mut card = ExamCard::new(repo.clone(), signed_in("u1"), Notices::new(), exam);
    card.poll();

    Faults::fail(&faulty.faults.batch);

    assert!(card.delete_exam().await.is_err());
    assert!(!card.is_deleting());
    let notices = card.notices().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].description, "Failed to delete exam.");

    faulty.faults.batch.store(false, Ordering::SeqCst);
    let report = card.delete_exam().await.unwrap();
    assert_eq!(report.items_deleted, 1);
    let notices = card.notices().drain();
    assert_eq!(notices[0].title, "Exam Deleted");
    assert_eq!(notices[0].description, "\"Physics Final\" has been removed.");
}

#[tokio::test]
async fn test_exam_delete_failure_leaves_empty_exam() {
    let (repo, faulty, _inner) = faulty_repo();
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    add_items(&repo, &exam_id, 2).await;
    let exam = repo.get_exam(&user, &exam_id).await.unwrap();

    let mut card = ExamCard::new(repo.clone(), signed_in("u1"), Notices::new(), exam);
    card.poll();
    assert_eq!(card.items().len(), 2);

    Faults::fail(&faulty.faults.delete);
    assert!(card.delete_exam().await.is_err());
    assert!(!card.is_deleting());

    let exams = repo.list_exams(&user).await.unwrap();
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0].id, exam_id);
    assert!(repo.list_items(&user, &exam_id).await.unwrap().is_empty());

    card.poll();
    assert!(card.items().is_empty());
    let notices = card.notices().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].description, "Failed to delete exam.");
}
