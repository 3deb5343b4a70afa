//! In-Memory Options Repository
//!
//! Process-local backend with the same semantics as the REST one. It
//! records every call and can be primed to fail, which is what the tests
//! and the dashboard's demo mode use it for.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::error::{RepositoryError, RepositoryResult};
use super::traits::OptionsRepository;
use crate::domain::{OptionId, OptionItem, OptionPayload, OptionType, TypeDescriptor};

/// Repository operation, used to count calls and to schedule failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListTypes,
    ListOptions,
    Upsert,
    Delete,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryCall {
    ListTypes,
    ListOptions {
        option_type: OptionType,
        parent: Option<OptionId>,
    },
    Upsert {
        id: Option<OptionId>,
        payload: OptionPayload,
    },
    Delete {
        id: OptionId,
    },
}

impl RepositoryCall {
    pub fn operation(&self) -> Operation {
        match self {
            RepositoryCall::ListTypes => Operation::ListTypes,
            RepositoryCall::ListOptions { .. } => Operation::ListOptions,
            RepositoryCall::Upsert { .. } => Operation::Upsert,
            RepositoryCall::Delete { .. } => Operation::Delete,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    items: Vec<OptionItem>,
    next_id: u64,
    calls: Vec<RepositoryCall>,
    failures: HashMap<Operation, String>,
}

impl MemoryState {
    fn record(&mut self, call: RepositoryCall) -> RepositoryResult<()> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.remove(&operation) {
            Some(message) => Err(RepositoryError::Status {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }

    fn insert(&mut self, payload: OptionPayload) -> OptionItem {
        self.next_id += 1;
        let id = OptionId::new(format!("opt-{}", self.next_id));
        let now = Utc::now();
        let mut item = OptionItem::from_payload(id, payload);
        item.created_at = Some(now);
        item.updated_at = Some(now);
        self.items.push(item.clone());
        item
    }
}

/// In-process implementation of [`OptionsRepository`]
#[derive(Default)]
pub struct InMemoryOptionsRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryOptionsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // Nothing panics while holding the lock; recover the data if it ever does
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a record directly, bypassing call recording
    pub fn seed(&self, payload: OptionPayload) -> OptionItem {
        self.state().insert(payload)
    }

    /// Snapshot of every stored record
    pub fn items(&self) -> Vec<OptionItem> {
        self.state().items.clone()
    }

    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make the next call of `operation` fail with a 500 and `message`
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        self.state().failures.insert(operation, message.into());
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl OptionsRepository for InMemoryOptionsRepository {
    async fn list_types(&self) -> RepositoryResult<Vec<TypeDescriptor>> {
        let mut state = self.state();
        state.record(RepositoryCall::ListTypes)?;

        let mut types: Vec<OptionType> = vec![
            OptionType::Board,
            OptionType::Grade,
            OptionType::Subject,
            OptionType::Chapter,
            OptionType::City,
        ];
        for item in &state.items {
            if !types.contains(&item.option_type) {
                types.push(item.option_type.clone());
            }
        }
        Ok(types.iter().map(TypeDescriptor::from).collect())
    }

    async fn list_options(
        &self,
        option_type: &OptionType,
        parent: Option<&OptionId>,
    ) -> RepositoryResult<Vec<OptionItem>> {
        let mut state = self.state();
        state.record(RepositoryCall::ListOptions {
            option_type: option_type.clone(),
            parent: parent.cloned(),
        })?;

        let mut items: Vec<OptionItem> = state
            .items
            .iter()
            .filter(|item| &item.option_type == option_type)
            .filter(|item| parent.is_none() || item.parent.as_ref() == parent)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.label.cmp(&b.label))
        });
        Ok(items)
    }

    async fn upsert_option(
        &self,
        id: Option<&OptionId>,
        payload: &OptionPayload,
    ) -> RepositoryResult<OptionItem> {
        let mut state = self.state();
        state.record(RepositoryCall::Upsert {
            id: id.cloned(),
            payload: payload.clone(),
        })?;

        let Some(id) = id else {
            return Ok(state.insert(payload.clone()));
        };

        let existing = state
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;

        let mut updated = OptionItem::from_payload(id.clone(), payload.clone());
        if payload.sort_order.is_none() {
            updated.sort_order = existing.sort_order;
        }
        updated.created_at = existing.created_at;
        updated.updated_at = Some(Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_option(&self, id: &OptionId) -> RepositoryResult<()> {
        let mut state = self.state();
        state.record(RepositoryCall::Delete { id: id.clone() })?;

        let before = state.items.len();
        state.items.retain(|item| &item.id != id);
        if state.items.len() == before {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }
}
