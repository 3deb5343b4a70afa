//! Level Column Tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::*;
use crate::domain::{OptionId, OptionItem, OptionPayload, OptionType, TypeDescriptor, ValidationError};
use crate::escalation::Severity;
use crate::hierarchy::{Hierarchy, HierarchyController, LevelScope, LevelSpec, Selection};
use crate::repository::{
    InMemoryOptionsRepository, Operation, OptionsRepository, RepositoryCall, RepositoryResult,
};

fn root(option_type: OptionType) -> LevelScope {
    LevelScope::Root { option_type }
}

fn child(option_type: OptionType, parent: &OptionItem) -> LevelScope {
    LevelScope::Child {
        option_type,
        parent: Selection::from(parent),
    }
}

fn column(index: usize, option_type: OptionType, repo: &Arc<InMemoryOptionsRepository>) -> LevelColumn {
    LevelColumn::new(index, &LevelSpec::fixed(option_type), repo.clone())
}

fn seed(repo: &InMemoryOptionsRepository, option_type: OptionType, label: &str) -> OptionItem {
    repo.seed(OptionPayload::new(option_type, label).unwrap())
}

// ========================
// Loading
// ========================

#[tokio::test]
async fn test_unset_parent_is_empty_without_fetch() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let board = seed(&repo, OptionType::Board, "CBSE");
    repo.seed(OptionPayload::new(OptionType::Grade, "Class 9").unwrap().with_parent(Some(board.id)));

    let mut grades = column(1, OptionType::Grade, &repo);
    let items = grades.load(LevelScope::Unset).await.unwrap();

    assert!(items.is_empty());
    assert_eq!(repo.call_count(Operation::ListOptions), 0);
}

#[tokio::test]
async fn test_root_loads_unscoped() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    seed(&repo, OptionType::Board, "CBSE");
    seed(&repo, OptionType::Board, "ICSE");

    let mut boards = column(0, OptionType::Board, &repo);
    assert_eq!(boards.load(root(OptionType::Board)).await.unwrap().len(), 2);
    assert_eq!(
        repo.calls(),
        vec![RepositoryCall::ListOptions {
            option_type: OptionType::Board,
            parent: None
        }]
    );
}

#[tokio::test]
async fn test_parent_becoming_unset_blanks_column() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let board = seed(&repo, OptionType::Board, "CBSE");
    repo.seed(OptionPayload::new(OptionType::Grade, "Class 9").unwrap().with_parent(Some(board.id.clone())));

    let mut grades = column(1, OptionType::Grade, &repo);
    assert_eq!(grades.load(child(OptionType::Grade, &board)).await.unwrap().len(), 1);
    assert!(grades.load(LevelScope::Unset).await.unwrap().is_empty());
    assert!(grades.items().is_empty());
}

#[tokio::test]
async fn test_failed_load_keeps_previous_items() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    seed(&repo, OptionType::City, "Bhopal");

    let mut cities = column(0, OptionType::City, &repo);
    cities.load(root(OptionType::City)).await.unwrap();

    repo.fail_next(Operation::ListOptions, "gateway timeout");
    let err = cities.reload().await.unwrap_err();

    assert!(matches!(err, ColumnError::FetchFailed { .. }));
    assert_eq!(cities.items().len(), 1);
    assert!(cities.error().unwrap().contains("gateway timeout"));

    cities.reload().await.unwrap();
    assert!(cities.error().is_none());
}

#[tokio::test]
async fn test_failed_load_for_new_parent_drops_old_rows() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let cbse = seed(&repo, OptionType::Board, "CBSE");
    let icse = seed(&repo, OptionType::Board, "ICSE");
    let class_9 = repo.seed(
        OptionPayload::new(OptionType::Grade, "Class 9")
            .unwrap()
            .with_parent(Some(cbse.id.clone())),
    );

    let mut grades = column(1, OptionType::Grade, &repo);
    grades.load(child(OptionType::Grade, &cbse)).await.unwrap();
    assert_eq!(grades.items().len(), 1);

    repo.fail_next(Operation::ListOptions, "gateway timeout");
    let err = grades.load(child(OptionType::Grade, &icse)).await.unwrap_err();
    assert!(matches!(err, ColumnError::FetchFailed { .. }));
    assert_eq!(grades.scope().parent_id(), Some(&icse.id));
    assert!(grades.items().is_empty());

    // A CBSE grade cannot be re-saved under ICSE
    let err = grades
        .update(class_9.id.clone(), OptionInput::new("Class 9"))
        .await
        .unwrap_err();
    assert!(matches!(err, ColumnError::UnknownItem { .. }));
    assert_eq!(repo.call_count(Operation::Upsert), 0);

    let stored = repo.items().into_iter().find(|i| i.id == class_9.id).unwrap();
    assert_eq!(stored.parent, Some(cbse.id));
}

#[tokio::test]
async fn test_parent_relabel_keeps_pending_work() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let cbse = seed(&repo, OptionType::Board, "CBSE");
    let grade = repo.seed(
        OptionPayload::new(OptionType::Grade, "Class 9")
            .unwrap()
            .with_parent(Some(cbse.id.clone())),
    );

    let mut grades = column(1, OptionType::Grade, &repo);
    grades.load(child(OptionType::Grade, &cbse)).await.unwrap();
    grades.request_delete(&grade).unwrap();
    grades.begin_edit(&grade);

    let relabelled = LevelScope::Child {
        option_type: OptionType::Grade,
        parent: Selection {
            label: "Central Board".to_string(),
            ..Selection::from(&cbse)
        },
    };
    grades.load(relabelled).await.unwrap();

    assert!(grades.form().is_editing());
    assert_eq!(grades.items().len(), 1);
    match grades.confirm_delete().await.unwrap() {
        DeleteProgress::Confirming(w) => assert_eq!(w.step, 2),
        other => panic!("unexpected {:?}", other),
    }
}

// ========================
// Create / Update
// ========================

#[tokio::test]
async fn test_blank_label_never_reaches_repository() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let mut boards = column(0, OptionType::Board, &repo);
    boards.load(root(OptionType::Board)).await.unwrap();
    repo.clear_calls();

    for label in ["", "   ", "\t\n"] {
        let err = boards.create(OptionInput::new(label)).await.unwrap_err();
        assert_eq!(err, ColumnError::ValidationFailed(ValidationError::EmptyLabel));
    }
    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn test_create_without_parent_is_rejected() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let mut grades = column(1, OptionType::Grade, &repo);
    grades.load(LevelScope::Unset).await.unwrap();

    let err = grades.create(OptionInput::new("Class 9")).await.unwrap_err();
    assert!(matches!(
        err,
        ColumnError::ValidationFailed(ValidationError::MissingParent { .. })
    ));
    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn test_create_attaches_parent_and_reloads() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let board = seed(&repo, OptionType::Board, "CBSE");

    let mut grades = column(1, OptionType::Grade, &repo);
    grades.load(child(OptionType::Grade, &board)).await.unwrap();
    grades.form_mut().label = "  Class 10 ".to_string();

    let saved = grades.submit().await.unwrap();

    assert_eq!(saved.label, "Class 10");
    assert_eq!(saved.value, "CLASS_10");
    assert_eq!(saved.parent, Some(board.id.clone()));
    assert_eq!(grades.form(), &ColumnForm::default());
    assert_eq!(grades.items().len(), 1);

    let ops: Vec<Operation> = repo.calls().iter().map(RepositoryCall::operation).collect();
    assert_eq!(
        ops,
        vec![Operation::ListOptions, Operation::Upsert, Operation::ListOptions]
    );
}

#[tokio::test]
async fn test_city_packages_whatsapp_link() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let mut cities = column(0, OptionType::City, &repo);
    cities.load(root(OptionType::City)).await.unwrap();

    let saved = cities
        .create(OptionInput::new("Bhopal").with_whatsapp_link(" https://chat.whatsapp.com/Bh0pal "))
        .await
        .unwrap();
    assert_eq!(saved.whatsapp_link(), Some("https://chat.whatsapp.com/Bh0pal"));

    let err = cities
        .create(OptionInput::new("Indore").with_whatsapp_link("whatsapp please"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ColumnError::ValidationFailed(ValidationError::InvalidWhatsappLink(_))
    ));
}

#[tokio::test]
async fn test_whatsapp_link_ignored_for_other_types() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let mut boards = column(0, OptionType::Board, &repo);
    boards.load(root(OptionType::Board)).await.unwrap();

    let saved = boards
        .create(OptionInput::new("CBSE").with_whatsapp_link("https://chat.whatsapp.com/x1"))
        .await
        .unwrap();
    assert!(saved.metadata.is_empty());
}

#[tokio::test]
async fn test_edit_keeps_order_and_recomputes_value() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let city = repo.seed(
        OptionPayload::new(OptionType::City, "Bhopal")
            .unwrap()
            .with_sort_order(3),
    );

    let mut cities = column(0, OptionType::City, &repo);
    cities.load(root(OptionType::City)).await.unwrap();
    cities.begin_edit(&city);
    assert!(cities.form().is_editing());
    cities.form_mut().label = "Bhopal City".to_string();

    let saved = cities.submit().await.unwrap();
    assert_eq!(saved.id, city.id);
    assert_eq!(saved.value, "BHOPAL_CITY");
    assert_eq!(saved.sort_order, 3);
    assert!(!cities.form().is_editing());
}

#[tokio::test]
async fn test_failed_create_keeps_list_and_form() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    seed(&repo, OptionType::Board, "CBSE");
    let mut boards = column(0, OptionType::Board, &repo);
    boards.load(root(OptionType::Board)).await.unwrap();

    repo.fail_next(Operation::Upsert, "duplicate value");
    boards.form_mut().label = "CBSE".to_string();
    let err = boards.submit().await.unwrap_err();

    assert!(matches!(
        err,
        ColumnError::MutationFailed {
            action: MutationKind::Create,
            ..
        }
    ));
    assert_eq!(boards.items().len(), 1);
    assert_eq!(boards.form().label, "CBSE");
}

// ========================
// Selection
// ========================

#[tokio::test]
async fn test_select_updates_controller() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let board = seed(&repo, OptionType::Board, "CBSE");
    let boards = column(0, OptionType::Board, &repo);
    let mut controller = HierarchyController::new(Hierarchy::curriculum());

    boards.select(&board, &mut controller).unwrap();
    assert!(controller.is_selected(0, &board.id));
    assert_eq!(controller.scope_for(1).parent_id(), Some(&board.id));
}

// ========================
// Deletion
// ========================

#[tokio::test]
async fn test_delete_needs_three_confirmations() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let city = seed(&repo, OptionType::City, "Bhopal");
    let mut cities = column(0, OptionType::City, &repo);
    cities.load(root(OptionType::City)).await.unwrap();

    let first = cities.request_delete(&city).unwrap();
    assert_eq!((first.step, first.severity), (1, Severity::Notice));

    match cities.confirm_delete().await.unwrap() {
        DeleteProgress::Confirming(w) => assert_eq!((w.step, w.severity), (2, Severity::Caution)),
        other => panic!("unexpected {:?}", other),
    }
    match cities.confirm_delete().await.unwrap() {
        DeleteProgress::Confirming(w) => assert_eq!((w.step, w.severity), (3, Severity::Final)),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(repo.call_count(Operation::Delete), 0);

    let done = cities.confirm_delete().await.unwrap();
    assert_eq!(done, DeleteProgress::Deleted(city.clone()));
    assert_eq!(repo.call_count(Operation::Delete), 1);
    assert!(cities.items().is_empty());
    assert!(cities.pending_deletion().is_none());
}

#[tokio::test]
async fn test_cancel_midway_keeps_item() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let city = seed(&repo, OptionType::City, "Bhopal");
    let mut cities = column(0, OptionType::City, &repo);
    cities.load(root(OptionType::City)).await.unwrap();

    cities.request_delete(&city).unwrap();
    cities.confirm_delete().await.unwrap();
    assert!(cities.cancel_delete());

    assert_eq!(cities.confirm_delete().await, Err(ColumnError::EscalationAborted));
    let restarted = cities.request_delete(&city).unwrap();
    assert_eq!(restarted.step, 1);
    assert_eq!(repo.call_count(Operation::Delete), 0);

    let listed = repo.list_options(&OptionType::City, None).await.unwrap();
    assert!(listed.iter().any(|c| c.label == "Bhopal"));
}

#[tokio::test]
async fn test_only_final_confirmation_shows_deleting() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let city = seed(&repo, OptionType::City, "Bhopal");
    let shared = SharedColumn::new(column(0, OptionType::City, &repo));
    shared.load(root(OptionType::City)).await.unwrap();

    let mut idle = shared.view().await;
    assert!(!idle.mark_deleting());

    shared.request_delete(&city).await.unwrap();
    let mut first = shared.view().await;
    assert!(!first.mark_deleting());
    assert!(!first.pending.unwrap().executing);

    shared.confirm_delete().await.unwrap();
    let (_, mut last) = shared.confirm_delete().await.unwrap();
    assert!(last.mark_deleting());
    assert!(last.pending.unwrap().executing);
}

#[tokio::test]
async fn test_failed_delete_allows_retry() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let board = seed(&repo, OptionType::Board, "CBSE");
    let mut boards = column(0, OptionType::Board, &repo);
    boards.load(root(OptionType::Board)).await.unwrap();

    boards.request_delete(&board).unwrap();
    boards.confirm_delete().await.unwrap();
    boards.confirm_delete().await.unwrap();
    repo.fail_next(Operation::Delete, "board in use");

    let err = boards.confirm_delete().await.unwrap_err();
    assert!(matches!(
        err,
        ColumnError::MutationFailed {
            action: MutationKind::Delete,
            ..
        }
    ));
    let pending = boards.pending_deletion().unwrap();
    assert_eq!(pending.warning.unwrap().step, 3);
    assert!(pending.error.unwrap().contains("board in use"));
    assert_eq!(boards.items().len(), 1);

    assert!(matches!(
        boards.confirm_delete().await.unwrap(),
        DeleteProgress::Deleted(_)
    ));
    assert_eq!(repo.call_count(Operation::Delete), 2);
}

#[tokio::test]
async fn test_scope_change_drops_pending_work() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    let cbse = seed(&repo, OptionType::Board, "CBSE");
    let icse = seed(&repo, OptionType::Board, "ICSE");
    let grade = repo.seed(
        OptionPayload::new(OptionType::Grade, "Class 9")
            .unwrap()
            .with_parent(Some(cbse.id.clone())),
    );

    let mut grades = column(1, OptionType::Grade, &repo);
    grades.load(child(OptionType::Grade, &cbse)).await.unwrap();
    grades.request_delete(&grade).unwrap();
    grades.begin_edit(&grade);

    grades.load(child(OptionType::Grade, &icse)).await.unwrap();
    assert!(grades.pending_deletion().is_none());
    assert!(!grades.form().is_editing());
    assert_eq!(grades.confirm_delete().await, Err(ColumnError::EscalationAborted));
}

// ========================
// Ordering
// ========================

#[tokio::test]
async fn test_reorder_rewrites_sort_order() {
    let repo = Arc::new(InMemoryOptionsRepository::new());
    for (order, label) in ["Class 1", "Class 2", "Class 3"].iter().enumerate() {
        repo.seed(
            OptionPayload::new(OptionType::Custom("GRADE_BAND".to_string()), label)
                .unwrap()
                .with_sort_order(order as i32),
        );
    }
    let band = OptionType::Custom("GRADE_BAND".to_string());
    let mut bands = column(0, band.clone(), &repo);
    bands.load(root(band)).await.unwrap();

    let rewritten = bands.reorder(2, 0).await.unwrap();
    assert_eq!(rewritten, 3);
    let labels: Vec<&str> = bands.items().iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["Class 3", "Class 1", "Class 2"]);

    assert_eq!(bands.reorder(1, 1).await.unwrap(), 0);
    assert_eq!(bands.reorder(0, 7).await.unwrap(), 0);
}

// ========================
// Serialized access
// ========================

/// Holds every upsert until a permit is added
struct GatedRepository {
    inner: InMemoryOptionsRepository,
    gate: Semaphore,
    entered: AtomicUsize,
}

impl GatedRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryOptionsRepository::new(),
            gate: Semaphore::new(0),
            entered: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OptionsRepository for GatedRepository {
    async fn list_types(&self) -> RepositoryResult<Vec<TypeDescriptor>> {
        self.inner.list_types().await
    }

    async fn list_options(
        &self,
        option_type: &OptionType,
        parent: Option<&OptionId>,
    ) -> RepositoryResult<Vec<OptionItem>> {
        self.inner.list_options(option_type, parent).await
    }

    async fn upsert_option(
        &self,
        id: Option<&OptionId>,
        payload: &OptionPayload,
    ) -> RepositoryResult<OptionItem> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await.expect("gate closed");
        self.inner.upsert_option(id, payload).await
    }

    async fn delete_option(&self, id: &OptionId) -> RepositoryResult<()> {
        self.inner.delete_option(id).await
    }
}

fn form(label: &str) -> ColumnForm {
    ColumnForm {
        label: label.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_second_change_while_saving_is_busy() {
    let repo = Arc::new(GatedRepository::new());
    let shared = SharedColumn::new(LevelColumn::new(
        0,
        &LevelSpec::fixed(OptionType::Board),
        repo.clone(),
    ));
    shared.load(root(OptionType::Board)).await.unwrap();

    let first = {
        let shared = shared.clone();
        tokio::spawn(async move { shared.submit(form("CBSE")).await })
    };
    while repo.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let second = shared.submit(form("ICSE")).await;
    assert!(matches!(second, Err(ColumnError::Busy { .. })));

    // A load queues behind the save and sees its result
    let queued = {
        let shared = shared.clone();
        tokio::spawn(async move { shared.load(root(OptionType::Board)).await })
    };
    tokio::task::yield_now().await;
    assert!(!queued.is_finished());

    repo.gate.add_permits(1);
    let (saved, _) = first.await.unwrap().unwrap();
    assert_eq!(saved.label, "CBSE");

    let view = queued.await.unwrap().unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(repo.entered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_columns_do_not_block_each_other() {
    let repo = Arc::new(GatedRepository::new());
    let boards = SharedColumn::new(LevelColumn::new(
        0,
        &LevelSpec::fixed(OptionType::Board),
        repo.clone(),
    ));
    let cities = SharedColumn::new(LevelColumn::new(
        0,
        &LevelSpec::fixed(OptionType::City),
        repo.clone(),
    ));
    boards.load(root(OptionType::Board)).await.unwrap();
    cities.load(root(OptionType::City)).await.unwrap();

    let pending = {
        let boards = boards.clone();
        tokio::spawn(async move { boards.submit(form("CBSE")).await })
    };
    while repo.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    // The city column is free while the board column waits on its save
    let view = cities.reload().await.unwrap();
    assert!(view.items.is_empty());

    repo.gate.add_permits(1);
    pending.await.unwrap().unwrap();
}
