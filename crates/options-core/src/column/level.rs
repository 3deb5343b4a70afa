//! Level Column
//!
//! One depth of a hierarchy: the items under the current parent, the
//! inline form, and the gated delete. The column never edits its list in
//! place; after every successful change it loads again.

use log::{debug, info, warn};

use super::error::{ColumnError, ColumnResult, MutationKind};
use super::form::{ColumnForm, OptionInput};
use crate::domain::{
    normalize_label, normalize_whatsapp_link, OptionId, OptionItem, OptionPayload,
    ValidationError,
};
use crate::escalation::{Confirmation, EscalationError, EscalationMachine, Warning};
use crate::hierarchy::{HierarchyController, HierarchyError, LevelScope, LevelSpec};
use crate::repository::SharedRepository;

/// Outcome of one delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteProgress {
    /// Another confirmation is needed
    Confirming(Warning),
    /// The item is gone and the column has reloaded
    Deleted(OptionItem),
}

/// Pending deletion as the UI renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub target: OptionItem,
    pub warning: Option<Warning>,
    pub executing: bool,
    pub error: Option<String>,
}

/// Data column for one hierarchy level
pub struct LevelColumn {
    index: usize,
    name: String,
    repo: SharedRepository,
    scope: LevelScope,
    items: Vec<OptionItem>,
    error: Option<String>,
    form: ColumnForm,
    deletion: EscalationMachine<OptionItem>,
}

impl LevelColumn {
    pub fn new(index: usize, spec: &LevelSpec, repo: SharedRepository) -> Self {
        Self {
            index,
            name: spec.name.clone(),
            repo,
            scope: LevelScope::Unset,
            items: Vec::new(),
            error: None,
            form: ColumnForm::default(),
            deletion: EscalationMachine::destructive(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &LevelScope {
        &self.scope
    }

    pub fn items(&self) -> &[OptionItem] {
        &self.items
    }

    /// Message of the last failed load
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &ColumnForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ColumnForm {
        &mut self.form
    }

    pub fn deletion(&self) -> &EscalationMachine<OptionItem> {
        &self.deletion
    }

    fn subject(&self, item: &OptionItem) -> String {
        format!("{} \"{}\"", self.name, item.label)
    }

    // ========================
    // Loading
    // ========================

    /// Load the items for `scope`.
    ///
    /// An unset scope blanks the column without touching the repository.
    /// A failed reload of the same scope records the message and keeps the
    /// previous list. Moving to another parent drops the old rows first.
    pub async fn load(&mut self, scope: LevelScope) -> ColumnResult<&[OptionItem]> {
        if !scope.same_target(&self.scope) {
            // Rows, edits and deletions all belong to the old parent
            if self.deletion.cancel() {
                self.deletion.settle();
            }
            self.form.clear();
            self.items.clear();
        }
        self.scope = scope;

        let option_type = match &self.scope {
            LevelScope::Unset => {
                debug!("[COLUMN] {} parent unset, blank", self.name);
                self.items.clear();
                self.error = None;
                return Ok(&self.items);
            }
            LevelScope::Root { option_type } | LevelScope::Child { option_type, .. } => {
                option_type.clone()
            }
        };
        let parent = self.scope.parent_id().cloned();

        debug!(
            "[COLUMN] {} loading {} (parent {:?})",
            self.name, option_type, parent
        );
        match self.repo.list_options(&option_type, parent.as_ref()).await {
            Ok(items) => {
                debug!("[COLUMN] {} loaded {} items", self.name, items.len());
                self.items = items;
                self.error = None;
                Ok(&self.items)
            }
            Err(source) => {
                warn!("[COLUMN] {} load failed: {}", self.name, source);
                let err = ColumnError::FetchFailed {
                    level: self.name.clone(),
                    source,
                };
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Load the current scope again
    pub async fn reload(&mut self) -> ColumnResult<&[OptionItem]> {
        let scope = self.scope.clone();
        self.load(scope).await
    }

    // ========================
    // Create / Update
    // ========================

    fn build_payload(
        &self,
        input: &OptionInput,
        existing: Option<&OptionItem>,
    ) -> ColumnResult<OptionPayload> {
        let label = normalize_label(&input.label)?;
        let (option_type, parent) = match &self.scope {
            LevelScope::Root { option_type } => (option_type.clone(), None),
            LevelScope::Child {
                option_type,
                parent,
            } => (option_type.clone(), Some(parent.id.clone())),
            LevelScope::Unset => {
                return Err(ValidationError::MissingParent {
                    level: self.name.clone(),
                }
                .into())
            }
        };

        let is_city = option_type.is_city();
        let mut payload = OptionPayload::new(option_type, &label)?
            .with_value(input.value.as_deref())
            .with_parent(parent);

        let mut metadata = existing.map(|item| item.metadata.clone()).unwrap_or_default();
        if is_city {
            let link = normalize_whatsapp_link(input.whatsapp_link.as_deref().unwrap_or_default())?;
            metadata = metadata.with_whatsapp_link(link);
        }
        if is_city || !metadata.is_empty() {
            payload = payload.with_metadata(metadata);
        }

        match (input.sort_order, existing) {
            (Some(order), _) => payload = payload.with_sort_order(order),
            (None, Some(item)) => payload = payload.with_sort_order(item.sort_order),
            (None, None) => {}
        }
        Ok(payload)
    }

    async fn upsert(
        &mut self,
        id: Option<OptionId>,
        input: &OptionInput,
    ) -> ColumnResult<OptionItem> {
        let existing = match &id {
            Some(id) => Some(
                self.items
                    .iter()
                    .find(|item| &item.id == id)
                    .cloned()
                    .ok_or_else(|| ColumnError::UnknownItem {
                        level: self.name.clone(),
                        id: id.clone(),
                    })?,
            ),
            None => None,
        };
        let payload = self.build_payload(input, existing.as_ref())?;
        let action = if id.is_some() {
            MutationKind::Update
        } else {
            MutationKind::Create
        };

        match self.repo.upsert_option(id.as_ref(), &payload).await {
            Ok(saved) => {
                info!("[COLUMN] {} {}d {}", self.name, action, saved.id);
                self.form.clear();
                // A failed refresh is recorded on the column; the change itself went through
                let _ = self.reload().await;
                Ok(saved)
            }
            Err(source) => {
                warn!("[COLUMN] {} {} failed: {}", self.name, action, source);
                Err(ColumnError::MutationFailed {
                    action,
                    subject: format!("{} \"{}\"", self.name, payload.label),
                    source,
                })
            }
        }
    }

    /// Add an item under the current parent
    pub async fn create(&mut self, input: OptionInput) -> ColumnResult<OptionItem> {
        self.upsert(None, &input).await
    }

    /// Change an existing item; the parent is the current scope's
    pub async fn update(&mut self, id: OptionId, input: OptionInput) -> ColumnResult<OptionItem> {
        self.upsert(Some(id), &input).await
    }

    /// Save the inline form: update when editing, create otherwise
    pub async fn submit(&mut self) -> ColumnResult<OptionItem> {
        let input = self.form.input();
        match self.form.editing.clone() {
            Some(id) => self.update(id, input).await,
            None => self.create(input).await,
        }
    }

    pub fn begin_edit(&mut self, item: &OptionItem) {
        self.form = ColumnForm::for_edit(item);
    }

    pub fn cancel_edit(&mut self) {
        self.form.clear();
    }

    // ========================
    // Selection
    // ========================

    /// Make `item` this level's selection
    pub fn select(
        &self,
        item: &OptionItem,
        controller: &mut HierarchyController,
    ) -> Result<(), HierarchyError> {
        controller.select_at(self.index, item)
    }

    // ========================
    // Deletion
    // ========================

    /// Start the confirmation sequence for `item`
    pub fn request_delete(&mut self, item: &OptionItem) -> ColumnResult<Warning> {
        self.deletion.request(item.clone())?;
        let subject = self.subject(item);
        self.deletion
            .warning(&subject)
            .ok_or(ColumnError::Escalation(EscalationError::NotConfirming))
    }

    /// Give the next confirmation. Only the last one deletes.
    pub async fn confirm_delete(&mut self) -> ColumnResult<DeleteProgress> {
        let confirmation = match self.deletion.confirm() {
            Ok(confirmation) => confirmation,
            Err(EscalationError::NotConfirming) => return Err(ColumnError::EscalationAborted),
            Err(other) => return Err(other.into()),
        };

        let target = match confirmation {
            Confirmation::Escalated { .. } => {
                let warning = self.pending_deletion().and_then(|p| p.warning);
                return warning
                    .map(DeleteProgress::Confirming)
                    .ok_or(ColumnError::Escalation(EscalationError::NotConfirming));
            }
            Confirmation::Execute(target) => target,
        };

        match self.repo.delete_option(&target.id).await {
            Ok(()) => {
                info!("[COLUMN] {} deleted {}", self.name, target.id);
                self.deletion.succeed()?;
                self.deletion.settle();
                if self.form.editing.as_ref() == Some(&target.id) {
                    self.form.clear();
                }
                let _ = self.reload().await;
                Ok(DeleteProgress::Deleted(target))
            }
            Err(source) => {
                warn!("[COLUMN] {} delete failed: {}", self.name, source);
                self.deletion.fail(source.to_string())?;
                Err(ColumnError::MutationFailed {
                    action: MutationKind::Delete,
                    subject: self.subject(&target),
                    source,
                })
            }
        }
    }

    /// Abandon the pending deletion; the next request starts at step 1
    pub fn cancel_delete(&mut self) -> bool {
        let cancelled = self.deletion.cancel();
        self.deletion.settle();
        cancelled
    }

    pub fn pending_deletion(&self) -> Option<PendingDeletion> {
        if !self.deletion.is_open() {
            return None;
        }
        let target = self.deletion.target()?.clone();
        let subject = self.subject(&target);
        Some(PendingDeletion {
            warning: self.deletion.warning(&subject),
            executing: self.deletion.is_executing(),
            error: self.deletion.last_error().map(str::to_string),
            target,
        })
    }

    // ========================
    // Ordering
    // ========================

    /// Move the item at `from` to `to` and persist the new order as
    /// `sortOrder` = position. Returns how many items were rewritten.
    pub async fn reorder(&mut self, from: usize, to: usize) -> ColumnResult<usize> {
        if from == to || from >= self.items.len() || to >= self.items.len() {
            return Ok(0);
        }
        let mut order = self.items.clone();
        let moved = order.remove(from);
        order.insert(to, moved);

        let mut rewritten = 0;
        for (position, item) in order.iter().enumerate() {
            let position = position as i32;
            if item.sort_order == position {
                continue;
            }
            let payload = OptionPayload::from_item(item).with_sort_order(position);
            if let Err(source) = self.repo.upsert_option(Some(&item.id), &payload).await {
                warn!("[COLUMN] {} reorder failed at {}: {}", self.name, item.id, source);
                if rewritten > 0 {
                    let _ = self.reload().await;
                }
                return Err(ColumnError::MutationFailed {
                    action: MutationKind::Reorder,
                    subject: self.subject(item),
                    source,
                });
            }
            rewritten += 1;
        }

        info!("[COLUMN] {} reordered, {} items rewritten", self.name, rewritten);
        let _ = self.reload().await;
        Ok(rewritten)
    }
}
