//! Delete Confirm Button Component
//!
//! Inline delete with escalating confirmation. Each confirmation shows the
//! next, sterner warning; only the last one deletes.

use leptos::prelude::*;
use options_core::{PendingDeletion, Severity};

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Notice => "delete-confirm notice",
        Severity::Caution => "delete-confirm caution",
        Severity::Final => "delete-confirm final",
    }
}

/// Inline delete confirmation for one row
///
/// # Arguments
/// * `button_class` - CSS class for the initial delete button
/// * `pending` - The column's pending deletion when it targets this row
/// * `on_request` - Start the sequence
/// * `on_confirm` - Give the next confirmation
/// * `on_cancel` - Abandon the sequence
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] pending: Signal<Option<PendingDeletion>>,
    #[prop(into)] on_request: Callback<()>,
    #[prop(into)] on_confirm: Callback<()>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || pending.with(Option::is_none)>
            <button
                class=button_class.clone()
                title="Delete"
                on:click=move |ev| {
                    ev.stop_propagation();
                    on_request.run(());
                }
            >
                "×"
            </button>
        </Show>
        {move || pending.get().and_then(|p| {
            let executing = p.executing;
            let error = p.error.clone();
            p.warning.map(|warning| {
                let confirm_label = if warning.step == warning.of { "Delete" } else { "Continue" };
                view! {
                    <div class=severity_class(warning.severity) on:click=|ev| ev.stop_propagation()>
                        <div class="delete-confirm-title">
                            {warning.title.clone()}
                            <span class="delete-confirm-step">
                                {format!(" ({}/{})", warning.step, warning.of)}
                            </span>
                        </div>
                        <p class="delete-confirm-text">{warning.message.clone()}</p>
                        {error.map(|e| view! { <p class="delete-confirm-error">{e}</p> })}
                        <button
                            class="confirm-btn"
                            disabled=executing
                            on:click=move |_| on_confirm.run(())
                        >
                            {if executing { "Deleting..." } else { confirm_label }}
                        </button>
                        <button
                            class="cancel-btn"
                            disabled=executing
                            on:click=move |_| on_cancel.run(())
                        >
                            "Cancel"
                        </button>
                    </div>
                }
            })
        })}
    }
}
