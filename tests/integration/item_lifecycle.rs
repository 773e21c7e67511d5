//! Integration tests for item edits through an exam card

use super::test_utils::{faulty_repo, seed_exam, signed_in, signed_out, sled_store, utc, Faults};
use examwise::error::ExamError;
use examwise::item::{FieldName, ItemField, ItemKind, ItemType};
use examwise::notice::Notices;
use examwise::repository::ExamRepository;
use examwise::session::{SessionContext, UserIdentity};
use examwise::store::path;
use examwise::types::{DocId, UserId};
use examwise::views::ExamCard;

async fn open_card(repo: &ExamRepository, session: SessionContext, exam_id: &DocId) -> ExamCard {
    let exam = repo
        .get_exam(&UserId::from("u1"), exam_id)
        .await
        .unwrap();
    let mut card = ExamCard::new(repo.clone(), session, Notices::new(), exam);
    card.poll();
    card
}

async fn card_with_item(repo: &ExamRepository, item_type: ItemType) -> (ExamCard, DocId, DocId) {
    let exam_id = seed_exam(repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let mut card = open_card(repo, signed_in("u1"), &exam_id).await;
    card.add_item(item_type).unwrap().settle().await.unwrap();
    assert!(card.poll());
    let item_id = card.items()[0].id().clone();
    (card, exam_id, item_id)
}

fn title_of(kind: &ItemKind) -> &str {
    match kind {
        ItemKind::TitleDate { title, .. }
        | ItemKind::TitleCheckbox { title, .. }
        | ItemKind::Countdown { title, .. }
        | ItemKind::Eligibility { title, .. }
        | ItemKind::Payment { title, .. }
        | ItemKind::TitleDescription { title, .. } => title,
        ItemKind::ButtonLink { label, .. } => label,
    }
}

#[tokio::test]
async fn test_checkbox_toggle_is_written_immediately() {
    let repo = ExamRepository::new(sled_store());
    let (mut card, exam_id, item_id) = card_with_item(&repo, ItemType::TitleCheckbox).await;

    let pending = card.toggle_checked(&item_id).unwrap();
    assert!(card.item(&item_id).unwrap().has_pending());
    pending.settle().await.unwrap();

    let stored = repo.list_items(&UserId::from("u1"), &exam_id).await.unwrap();
    assert!(matches!(stored[0].kind, ItemKind::TitleCheckbox { checked: true, .. }));

    card.poll();
    let editor = card.item(&item_id).unwrap();
    assert!(!editor.has_pending());
    assert!(matches!(editor.displayed().kind, ItemKind::TitleCheckbox { checked: true, .. }));
}

#[tokio::test]
async fn test_text_edit_is_written_on_blur() {
    let repo = ExamRepository::new(sled_store());
    let user = UserId::from("u1");
    let (mut card, exam_id, item_id) = card_with_item(&repo, ItemType::TitleCheckbox).await;

    card.input(&item_id, &ItemField::Title("Register online".to_string()))
        .unwrap();
    assert_eq!(title_of(&card.item(&item_id).unwrap().displayed().kind), "Register online");
    let stored = repo.list_items(&user, &exam_id).await.unwrap();
    assert_eq!(title_of(&stored[0].kind), "New Task");

    card.blur(&item_id, FieldName::Title)
        .unwrap()
        .settle()
        .await
        .unwrap();
    let stored = repo.list_items(&user, &exam_id).await.unwrap();
    assert_eq!(title_of(&stored[0].kind), "Register online");
}

#[tokio::test]
async fn test_blur_on_missing_field_is_rejected() {
    let repo = ExamRepository::new(sled_store());
    let (mut card, _exam_id, item_id) = card_with_item(&repo, ItemType::ButtonLink).await;

    assert!(matches!(
        card.blur(&item_id, FieldName::Checked),
        Err(ExamError::FieldNotApplicable { field: "checked", .. })
    ));
    assert!(!card.item(&item_id).unwrap().has_pending());
}

#[tokio::test]
async fn test_new_items_are_appended_in_order() {
    let repo = ExamRepository::new(sled_store());
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let mut card = open_card(&repo, signed_in("u1"), &exam_id).await;

    for item_type in [ItemType::Countdown, ItemType::TitleDate, ItemType::Payment] {
        card.add_item(item_type).unwrap().settle().await.unwrap();
        card.poll();
    }

    let orders: Vec<i64> = card.items().iter().map(|e| e.displayed().order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    let types: Vec<ItemType> = card.items().iter().map(|e| e.displayed().item_type()).collect();
    assert_eq!(types, vec![ItemType::Countdown, ItemType::TitleDate, ItemType::Payment]);
    match &card.items()[0].displayed().kind {
        ItemKind::Countdown { date, .. } => assert_eq!(*date, utc(2030, 6, 1)),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_adds_share_an_order_value() {
    let repo = ExamRepository::new(sled_store());
    let user = UserId::from("u1");
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let mut first = open_card(&repo, signed_in("u1"), &exam_id).await;
    for _ in 0..2 {
        first.add_item(ItemType::TitleCheckbox).unwrap().settle().await.unwrap();
        first.poll();
    }
    let second = open_card(&repo, signed_in("u1"), &exam_id).await;
    assert_eq!(second.items().len(), 2);

    let a = first.add_item(ItemType::TitleDate).unwrap();
    let b = second.add_item(ItemType::Payment).unwrap();
    a.settle().await.unwrap();
    b.settle().await.unwrap();

    let items = repo.list_items(&user, &exam_id).await.unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items.iter().filter(|i| i.order == 2).count(), 2);
    // Ties keep a stable sequence.
    assert_eq!(items, repo.list_items(&user, &exam_id).await.unwrap());
}

#[tokio::test]
async fn test_snapshot_overrides_pending_local_edit() {
    let repo = ExamRepository::new(sled_store());
    let user = UserId::from("u1");
    let (mut card, exam_id, item_id) = card_with_item(&repo, ItemType::TitleDescription).await;

    card.input(&item_id, &ItemField::Description("draft".to_string()))
        .unwrap();
    assert!(card.item(&item_id).unwrap().has_pending());

    repo.update_item_field(&user, &exam_id, &item_id, &ItemField::Title("From elsewhere".to_string()))
        .await
        .unwrap();
    assert!(card.poll());

    let editor = card.item(&item_id).unwrap();
    assert!(!editor.has_pending());
    assert_eq!(title_of(&editor.displayed().kind), "From elsewhere");
    match &editor.displayed().kind {
        ItemKind::TitleDescription { description, .. } => {
            assert_eq!(description, "Enter your description here.")
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_edit_without_user_changes_nothing() {
    let repo = ExamRepository::new(sled_store());
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let session = signed_in("u1");
    let mut card = open_card(&repo, session.clone(), &exam_id).await;
    card.add_item(ItemType::TitleCheckbox).unwrap().settle().await.unwrap();
    card.poll();
    let item_id = card.items()[0].id().clone();

    session.sign_out();

    assert!(matches!(card.toggle_checked(&item_id), Err(ExamError::AuthRequired)));
    assert!(matches!(
        card.add_item(ItemType::Payment),
        Err(ExamError::AuthRequired)
    ));
    assert!(matches!(card.delete_item(&item_id), Err(ExamError::AuthRequired)));
    let editor = card.item(&item_id).unwrap();
    assert!(!editor.has_pending());
    assert!(matches!(editor.displayed().kind, ItemKind::TitleCheckbox { checked: false, .. }));
    assert!(card.notices().is_empty());
}

#[tokio::test]
async fn test_sign_out_clears_card_items() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let session = signed_in("u1");
    let mut card = open_card(&repo, session.clone(), &exam_id).await;
    card.add_item(ItemType::Payment).unwrap().settle().await.unwrap();
    card.poll();
    assert_eq!(card.items().len(), 1);
    assert_eq!(store.listener_count(), 1);

    session.sign_out();
    card.poll();
    assert!(card.items().is_empty());
    assert!(!card.is_loading());
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test]
async fn test_user_switch_reloads_card() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;
    let session = signed_in("u1");
    let mut card = open_card(&repo, session.clone(), &exam_id).await;
    card.add_item(ItemType::Payment).unwrap().settle().await.unwrap();
    card.poll();
    assert!(!card.is_loading());

    session.on_auth_changed(Some(UserIdentity::new("u2")));
    card.bind();
    assert!(card.is_loading());
    assert!(card.items().is_empty());

    card.poll();
    assert!(!card.is_loading());
    assert!(card.items().is_empty());
    assert_eq!(store.listener_count(), 1);
}

#[tokio::test]
async fn test_signed_out_card_is_settled_and_empty() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let exam_id = seed_exam(&repo, "u1", "Physics Final", utc(2030, 6, 1)).await;

    let card = open_card(&repo, signed_out(), &exam_id).await;
    assert!(!card.is_loading());
    assert!(card.items().is_empty());
    assert_eq!(store.listener_count(), 0);

    let pending = open_card(&repo, SessionContext::new(), &exam_id).await;
    assert!(pending.is_loading());
    assert_eq!(store.listener_count(), 0);
}

#[tokio::test]
async fn test_snapshot_error_clears_card_items() {
    let store = sled_store();
    let repo = ExamRepository::new(store.clone());
    let (mut card, exam_id, _item_id) = card_with_item(&repo, ItemType::Payment).await;
    assert_eq!(card.items().len(), 1);

    let corrupt = path::item(&UserId::from("u1"), &exam_id, &DocId::from("corrupt"));
    store
        .db()
        .insert(corrupt.as_str().as_bytes(), b"not json".to_vec())
        .unwrap();
    card.add_item(ItemType::TitleDate).unwrap().settle().await.unwrap();

    assert!(card.poll());
    assert!(card.items().is_empty());
    assert!(!card.is_loading());
    assert_eq!(store.listener_count(), 1);
}

#[tokio::test]
async fn test_failed_write_raises_notice() {
    let (repo, faulty, _inner) = faulty_repo();
    let (mut card, _exam_id, item_id) = card_with_item(&repo, ItemType::TitleCheckbox).await;

    Faults::fail(&faulty.faults.update);
    let result = card.toggle_checked(&item_id).unwrap().settle().await;
    assert!(matches!(result, Err(ExamError::Store(_))));

    let notices = card.notices().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].to_string(), "Error: Failed to update item.");
}

#[tokio::test]
async fn test_write_completes_after_card_is_dropped() {
    let repo = ExamRepository::new(sled_store());
    let user = UserId::from("u1");
    let (mut card, exam_id, item_id) = card_with_item(&repo, ItemType::TitleCheckbox).await;

    let pending = card.toggle_checked(&item_id).unwrap();
    drop(card);
    pending.settle().await.unwrap();

    let stored = repo.list_items(&user, &exam_id).await.unwrap();
    assert!(matches!(stored[0].kind, ItemKind::TitleCheckbox { checked: true, .. }));
}

#[tokio::test]
async fn test_delete_item_removes_it_from_the_card() {
    let repo = ExamRepository::new(sled_store());
    let (mut card, _exam_id, item_id) = card_with_item(&repo, ItemType::Eligibility).await;

    card.delete_item(&item_id).unwrap().settle().await.unwrap();
    card.poll();
    assert!(card.items().is_empty());

    assert!(matches!(
        card.delete_item(&item_id),
        Err(ExamError::ItemNotFound(_))
    ));
}
