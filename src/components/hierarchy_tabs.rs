//! Hierarchy Tab Bar Component
//!
//! Tab bar for switching between the built-in hierarchies and the flat
//! lists of custom types.

use leptos::prelude::*;

use crate::store::{use_app_store, AppStateStoreFields};

/// Hierarchy Tab Bar component
#[component]
pub fn HierarchyTabs() -> impl IntoView {
    let store = use_app_store();

    let tabs = move || {
        store
            .hierarchies()
            .get()
            .into_iter()
            .enumerate()
            .collect::<Vec<_>>()
    };

    view! {
        <div class="hierarchy-tab-bar">
            <For
                each=tabs
                key=|(index, hierarchy)| (*index, hierarchy.title().to_string())
                children=move |(index, hierarchy)| {
                    let is_active = move || store.active().get() == index;
                    let title = hierarchy.title().to_string();
                    view! {
                        <button
                            class=move || if is_active() { "hierarchy-tab active" } else { "hierarchy-tab" }
                            on:click=move |_| store.active().set(index)
                        >
                            {title}
                        </button>
                    }
                }
            />
        </div>
    }
}
