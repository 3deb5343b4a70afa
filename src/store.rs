//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use std::time::Duration;

use gloo_timers::future::sleep;
use leptos::prelude::*;
use leptos::task::spawn_local;
use options_core::{Hierarchy, OptionType, TypeDescriptor};
use reactive_stores::Store;

/// How long a notice stays on screen
const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient message shown in the notification stack
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u32,
    pub kind: NoticeKind,
    pub message: String,
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Tabs: the built-in hierarchies followed by one flat list per custom type
    pub hierarchies: Vec<Hierarchy>,
    /// Index into `hierarchies`
    pub active: usize,
    /// Every type the backend reported
    pub types: Vec<TypeDescriptor>,
    pub notices: Vec<Notice>,
    pub next_notice_id: u32,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            hierarchies: vec![Hierarchy::curriculum(), Hierarchy::locations()],
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Replace the known types and rebuild the custom-type tabs
pub fn store_set_types(store: &AppStore, types: Vec<TypeDescriptor>) {
    let custom: Vec<Hierarchy> = types
        .iter()
        .filter_map(|t| t.option_type().ok().map(|option_type| (option_type, t.label.clone())))
        .filter(|(option_type, _)| matches!(option_type, OptionType::Custom(_)))
        .map(|(option_type, label)| Hierarchy::flat(option_type, label))
        .collect();

    let mut hierarchies = vec![Hierarchy::curriculum(), Hierarchy::locations()];
    hierarchies.extend(custom);
    if store.active().get_untracked() >= hierarchies.len() {
        store.active().set(0);
    }
    store.hierarchies().set(hierarchies);
    store.types().set(types);
}

/// Active hierarchy, falling back to the first tab
pub fn store_active_hierarchy(store: &AppStore) -> Hierarchy {
    let active = store.active().get();
    store
        .hierarchies()
        .with(|all| all.get(active).or_else(|| all.first()).cloned())
        .unwrap_or_else(Hierarchy::curriculum)
}

/// Show a notice and drop it again after a while
pub fn store_push_notice(store: &AppStore, kind: NoticeKind, message: impl Into<String>) {
    let id = store.next_notice_id().get_untracked();
    store.next_notice_id().set(id.wrapping_add(1));
    store.notices().write().push(Notice {
        id,
        kind,
        message: message.into(),
    });

    let store = *store;
    spawn_local(async move {
        sleep(NOTICE_TTL).await;
        store_dismiss_notice(&store, id);
    });
}

pub fn store_dismiss_notice(store: &AppStore, id: u32) {
    store.notices().write().retain(|notice| notice.id != id);
}
