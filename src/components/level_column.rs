//! Level Column Component
//!
//! One depth of the active hierarchy: scoped list, row actions, inline
//! form. The column reloads whenever the selection above it changes.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_row_listeners, create_row_dnd, make_on_mousedown, make_on_row_mouseenter};
use options_core::{
    ColumnError, ColumnForm, ColumnView, DeleteProgress, LevelColumn as ColumnState, LevelScope,
    LevelSpec, OptionItem, OptionType, SharedColumn,
};

use crate::components::{DeleteConfirmButton, OptionForm};
use crate::context::use_options;
use crate::store::{store_push_notice, use_app_store, NoticeKind};

/// Column for hierarchy level `index`
#[component]
pub fn LevelColumn(
    index: usize,
    spec: LevelSpec,
    /// Name of the level above, for the empty-state hint
    parent_name: Option<String>,
) -> impl IntoView {
    let ctx = use_options();
    let store = use_app_store();
    let name = spec.name.clone();

    let column = StoredValue::new_local(SharedColumn::new(ColumnState::new(index, &spec, ctx.repo())));
    let snapshot = RwSignal::new(None::<ColumnView>);
    let loading = RwSignal::new(false);
    let saving = RwSignal::new(false);
    let form = RwSignal::new(ColumnForm::default());
    let form_error = RwSignal::new(None::<String>);
    let dnd = create_row_dnd();

    let scope = Memo::new(move |_| ctx.scope_for(index));

    // Reload when the scope changes; edits for another parent are dropped
    Effect::new(move |previous: Option<LevelScope>| {
        let scope = scope.get();
        if !previous.is_some_and(|p| p.same_target(&scope)) {
            form.set(ColumnForm::default());
            form_error.set(None);
        }
        loading.set(true);
        let shared = column.get_value();
        let target = scope.clone();
        spawn_local(async move {
            match shared.load(target).await {
                Ok(view) => snapshot.set(Some(view)),
                Err(e) => {
                    log::warn!("[UI] {}", e);
                    snapshot.set(Some(shared.view().await));
                }
            }
            loading.set(false);
        });
        scope
    });

    let refresh = move || {
        let shared = column.get_value();
        spawn_local(async move {
            snapshot.set(Some(shared.view().await));
        });
    };

    let items = move || snapshot.with(|s| s.as_ref().map(|v| v.items.clone()).unwrap_or_default());
    let load_error = move || snapshot.with(|s| s.as_ref().and_then(|v| v.error.clone()));
    let pending = move || snapshot.with(|s| s.as_ref().and_then(|v| v.pending.clone()));
    let is_city = Signal::derive(move || scope.with(|s| s.option_type().is_some_and(OptionType::is_city)));
    let enabled = Signal::derive(move || !scope.with(LevelScope::is_unset));

    // ========================
    // Mutations
    // ========================

    let on_submit = Callback::new(move |_: ()| {
        let shared = column.get_value();
        let current = form.get_untracked();
        let editing = current.is_editing();
        saving.set(true);
        form_error.set(None);
        spawn_local(async move {
            match shared.submit(current).await {
                Ok((saved, view)) => {
                    snapshot.set(Some(view));
                    form.set(ColumnForm::default());
                    if editing {
                        ctx.item_updated(index, &saved);
                    }
                }
                Err(ColumnError::ValidationFailed(e)) => form_error.set(Some(e.to_string())),
                Err(e) => store_push_notice(&store, NoticeKind::Error, e.to_string()),
            }
            saving.set(false);
        });
    });

    let request_delete = move |item: OptionItem| {
        let shared = column.get_value();
        spawn_local(async move {
            if let Err(e) = shared.request_delete(&item).await {
                store_push_notice(&store, NoticeKind::Error, e.to_string());
            }
            snapshot.set(Some(shared.view().await));
        });
    };

    let confirm_delete = Callback::new(move |_: ()| {
        let running = snapshot.with_untracked(|s| {
            s.as_ref()
                .and_then(|v| v.pending.as_ref())
                .is_some_and(|p| p.executing)
        });
        if running {
            return;
        }
        // The final confirmation holds the column until the delete settles
        snapshot.update(|s| {
            if let Some(view) = s.as_mut() {
                view.mark_deleting();
            }
        });
        let shared = column.get_value();
        spawn_local(async move {
            match shared.confirm_delete().await {
                Ok((DeleteProgress::Confirming(_), view)) => snapshot.set(Some(view)),
                Ok((DeleteProgress::Deleted(item), view)) => {
                    snapshot.set(Some(view));
                    ctx.item_deleted(index, &item.id);
                    store_push_notice(&store, NoticeKind::Info, format!("Deleted \"{}\"", item.label));
                }
                Err(ColumnError::EscalationAborted) => refresh(),
                Err(e) => {
                    store_push_notice(&store, NoticeKind::Error, e.to_string());
                    refresh();
                }
            }
        });
    });

    let cancel_delete = Callback::new(move |_: ()| {
        let shared = column.get_value();
        spawn_local(async move {
            snapshot.set(Some(shared.cancel_delete().await));
        });
    });

    bind_row_listeners(dnd, move |from, to| {
        let shared = column.get_value();
        spawn_local(async move {
            match shared.reorder(from, to).await {
                Ok(view) => snapshot.set(Some(view)),
                Err(e) => {
                    store_push_notice(&store, NoticeKind::Error, e.to_string());
                    snapshot.set(Some(shared.view().await));
                }
            }
        });
    });

    // ========================
    // View
    // ========================

    let rows = move || items().into_iter().enumerate().collect::<Vec<_>>();

    view! {
        <section class="level-column">
            <header class="level-column-header">
                <h2>{name.clone()}</h2>
                <Show when=move || loading.get()>
                    <span class="level-column-loading">"Loading..."</span>
                </Show>
            </header>

            {move || load_error().map(|e| view! {
                <div class="level-column-error">
                    {e}
                    <button class="retry-btn" on:click=move |_| {
                        let shared = column.get_value();
                        spawn_local(async move {
                            match shared.reload().await {
                                Ok(view) => snapshot.set(Some(view)),
                                Err(_) => snapshot.set(Some(shared.view().await)),
                            }
                        });
                    }>"Retry"</button>
                </div>
            })}

            <Show when=move || !enabled.get()>
                <p class="level-column-hint">
                    {parent_name.clone().map(|p| format!("Select a {} first", p)).unwrap_or_default()}
                </p>
            </Show>

            <ul class="level-column-rows">
                <For
                    each=rows
                    key=|(position, item)| (*position, item.id.clone(), item.label.clone(), item.value.clone())
                    children=move |(position, item)| {
                        let id = item.id.clone();
                        let selected = {
                            let id = id.clone();
                            move || ctx.is_selected(index, &id)
                        };
                        let row_pending = {
                            let id = id.clone();
                            Signal::derive(move || pending().filter(|p| p.target.id == id))
                        };
                        let select_item = item.clone();
                        let edit_item = item.clone();
                        let delete_item = item.clone();
                        let row_class = move || {
                            let mut class = String::from("level-row");
                            if selected() { class.push_str(" selected"); }
                            if dnd.is_dragging(position) { class.push_str(" dragging"); }
                            if dnd.is_over(position) { class.push_str(" drop-target"); }
                            class
                        };
                        view! {
                            <li
                                class=row_class
                                on:mousedown=make_on_mousedown(dnd, position)
                                on:mouseenter=make_on_row_mouseenter(dnd, position)
                                on:click=move |_| {
                                    if dnd.just_ended.get_untracked() { return; }
                                    ctx.select(index, &select_item);
                                }
                            >
                                <span class="level-row-label">{item.label.clone()}</span>
                                <span class="level-row-code">{item.value.clone()}</span>
                                {item.whatsapp_link().map(|link| view! {
                                    <a class="level-row-link" href=link.to_string() target="_blank"
                                        on:click=|ev| ev.stop_propagation()>"WhatsApp"</a>
                                })}
                                <button
                                    class="edit-btn"
                                    title="Edit"
                                    on:click=move |ev| {
                                        ev.stop_propagation();
                                        form_error.set(None);
                                        form.set(ColumnForm::for_edit(&edit_item));
                                    }
                                >
                                    "✎"
                                </button>
                                <DeleteConfirmButton
                                    button_class="delete-btn"
                                    pending=row_pending
                                    on_request=move |_: ()| request_delete(delete_item.clone())
                                    on_confirm=confirm_delete
                                    on_cancel=cancel_delete
                                />
                            </li>
                        }
                    }
                />
            </ul>

            <Show when=move || enabled.get() && !loading.get() && items().is_empty() && load_error().is_none()>
                <p class="level-column-empty">"Nothing here yet"</p>
            </Show>

            <OptionForm
                form=form
                is_city=is_city
                enabled=enabled
                saving=saving
                error=form_error
                on_submit=on_submit
            />
        </section>
    }
}
