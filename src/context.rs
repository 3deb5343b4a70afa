//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use options_core::{Hierarchy, HierarchyController, LevelScope, OptionId, OptionItem, SharedRepository};

/// Selection chain and backend handle shared by every column
#[derive(Clone, Copy)]
pub struct OptionsContext {
    pub controller: RwSignal<HierarchyController>,
    repo: StoredValue<SharedRepository, LocalStorage>,
}

impl OptionsContext {
    pub fn new(hierarchy: Hierarchy, repo: SharedRepository) -> Self {
        Self {
            controller: RwSignal::new(HierarchyController::new(hierarchy)),
            repo: StoredValue::new_local(repo),
        }
    }

    pub fn repo(&self) -> SharedRepository {
        self.repo.get_value()
    }

    /// Scope of level `index`, tracked
    pub fn scope_for(&self, index: usize) -> LevelScope {
        self.controller.with(|c| c.scope_for(index))
    }

    pub fn is_selected(&self, index: usize, id: &OptionId) -> bool {
        self.controller.with(|c| c.is_selected(index, id))
    }

    pub fn select(&self, index: usize, item: &OptionItem) {
        self.controller.update(|c| {
            if let Err(e) = c.select_at(index, item) {
                log::warn!("[CONTEXT] {}", e);
            }
        });
    }

    pub fn item_deleted(&self, index: usize, id: &OptionId) {
        self.controller.update(|c| {
            c.on_item_deleted(index, id);
        });
    }

    pub fn item_updated(&self, index: usize, item: &OptionItem) {
        self.controller.update(|c| {
            c.on_item_updated(index, item);
        });
    }

    /// Swap the active hierarchy; a no-op when it is already showing
    pub fn switch_to(&self, hierarchy: Hierarchy) {
        if self.controller.with_untracked(|c| c.hierarchy() == &hierarchy) {
            return;
        }
        self.controller.update(|c| c.switch_to(hierarchy));
    }
}

pub fn use_options() -> OptionsContext {
    expect_context::<OptionsContext>()
}
