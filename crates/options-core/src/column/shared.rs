//! Shared Column Handle
//!
//! Serializes everything that happens to one column. Loads queue behind
//! whatever is running; changes refuse to start while the column is busy,
//! the way a disabled "Save" button would. Separate columns never wait on
//! each other.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::error::{ColumnError, ColumnResult};
use super::form::ColumnForm;
use super::level::{DeleteProgress, LevelColumn, PendingDeletion};
use crate::domain::OptionItem;
use crate::escalation::Warning;
use crate::hierarchy::LevelScope;

/// Snapshot of a column for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub scope: LevelScope,
    pub items: Vec<OptionItem>,
    pub error: Option<String>,
    pub form: ColumnForm,
    pub pending: Option<PendingDeletion>,
}

impl ColumnView {
    fn of(column: &LevelColumn) -> Self {
        Self {
            scope: column.scope().clone(),
            items: column.items().to_vec(),
            error: column.error().map(str::to_string),
            form: column.form().clone(),
            pending: column.pending_deletion(),
        }
    }

    /// Show the pending deletion as running when the next confirmation is
    /// the one that deletes. Returns true when it was marked.
    pub fn mark_deleting(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        let is_final = pending.warning.as_ref().is_some_and(|w| w.step == w.of);
        if is_final {
            pending.executing = true;
            pending.error = None;
        }
        is_final
    }
}

/// Cloneable, serialized access to a [`LevelColumn`]
#[derive(Clone)]
pub struct SharedColumn {
    name: String,
    inner: Arc<Mutex<LevelColumn>>,
}

impl SharedColumn {
    pub fn new(column: LevelColumn) -> Self {
        Self {
            name: column.name().to_string(),
            inner: Arc::new(Mutex::new(column)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn try_claim(&self) -> ColumnResult<MutexGuard<'_, LevelColumn>> {
        self.inner.try_lock().map_err(|_| ColumnError::Busy {
            level: self.name.clone(),
        })
    }

    pub async fn view(&self) -> ColumnView {
        ColumnView::of(&*self.inner.lock().await)
    }

    /// Load `scope` once every earlier operation on this column is done
    pub async fn load(&self, scope: LevelScope) -> ColumnResult<ColumnView> {
        let mut column = self.inner.lock().await;
        column.load(scope).await?;
        Ok(ColumnView::of(&column))
    }

    pub async fn reload(&self) -> ColumnResult<ColumnView> {
        let mut column = self.inner.lock().await;
        column.reload().await?;
        Ok(ColumnView::of(&column))
    }

    /// Save `form`. Fails with `Busy` while another change is running.
    pub async fn submit(&self, form: ColumnForm) -> ColumnResult<(OptionItem, ColumnView)> {
        let mut column = self.try_claim()?;
        *column.form_mut() = form;
        let saved = column.submit().await?;
        Ok((saved, ColumnView::of(&column)))
    }

    pub async fn request_delete(&self, item: &OptionItem) -> ColumnResult<Warning> {
        let mut column = self.inner.lock().await;
        column.request_delete(item)
    }

    /// Next delete confirmation. Fails with `Busy` while another change is
    /// running.
    pub async fn confirm_delete(&self) -> ColumnResult<(DeleteProgress, ColumnView)> {
        let mut column = self.try_claim()?;
        let progress = column.confirm_delete().await?;
        Ok((progress, ColumnView::of(&column)))
    }

    pub async fn cancel_delete(&self) -> ColumnView {
        let mut column = self.inner.lock().await;
        column.cancel_delete();
        ColumnView::of(&column)
    }

    pub async fn reorder(&self, from: usize, to: usize) -> ColumnResult<ColumnView> {
        let mut column = self.try_claim()?;
        column.reorder(from, to).await?;
        Ok(ColumnView::of(&column))
    }
}
