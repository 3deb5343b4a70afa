//! Options Admin App
//!
//! Hierarchy tabs over a row of level columns.

use leptos::prelude::*;
use leptos::task::spawn_local;
use options_core::{Hierarchy, OptionsRepository};
use reactive_stores::Store;

use crate::components::{HierarchyTabs, LevelColumn, Notifications};
use crate::config;
use crate::context::OptionsContext;
use crate::store::{
    store_active_hierarchy, store_push_notice, store_set_types, AppState, AppStore, NoticeKind,
};

#[component]
pub fn App() -> impl IntoView {
    let store: AppStore = Store::new(AppState::new());
    provide_context(store);

    let repo = match config::build_repository() {
        Ok(repo) => repo,
        Err(e) => {
            log::error!("[APP] cannot start: {}", e);
            return view! {
                <div class="app-error">
                    <h1>"Options"</h1>
                    <p>{e}</p>
                </div>
            }
            .into_any();
        }
    };

    let ctx = OptionsContext::new(Hierarchy::curriculum(), repo);
    provide_context(ctx);

    // Custom types become extra tabs
    Effect::new(move |_| {
        let repo = ctx.repo();
        spawn_local(async move {
            match repo.list_types().await {
                Ok(types) => {
                    log::debug!("[APP] {} option types", types.len());
                    store_set_types(&store, types);
                }
                Err(e) => {
                    log::warn!("[APP] could not load option types: {}", e);
                    store_push_notice(&store, NoticeKind::Error, format!("Could not load option types: {}", e));
                }
            }
        });
    });

    // Keep the controller on the active tab
    Effect::new(move |_| {
        let hierarchy = store_active_hierarchy(&store);
        ctx.switch_to(hierarchy);
    });

    let hierarchy = Memo::new(move |_| ctx.controller.with(|c| c.hierarchy().clone()));

    let columns = move || {
        let levels = hierarchy.with(|h| h.levels().to_vec());
        levels
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let parent_name = index
                    .checked_sub(1)
                    .and_then(|above| levels.get(above))
                    .map(|above| above.name.clone());
                view! { <LevelColumn index=index spec=spec.clone() parent_name=parent_name /> }
            })
            .collect_view()
    };

    let path = move || {
        ctx.controller.with(|c| {
            c.selected_path()
                .iter()
                .map(|s| s.label.clone())
                .collect::<Vec<_>>()
                .join(" › ")
        })
    };

    view! {
        <div class="app-layout">
            <main class="main-content">
                <HierarchyTabs />
                <p class="selection-path">{path}</p>
                <div class="level-columns">{columns}</div>
            </main>
            <Notifications />
        </div>
    }
    .into_any()
}
