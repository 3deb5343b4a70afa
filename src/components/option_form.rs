//! Option Form Component
//!
//! Inline add/edit form at the bottom of a level column.

use leptos::prelude::*;
use options_core::ColumnForm;

/// Add/edit form bound to a column's form state
#[component]
pub fn OptionForm(
    form: RwSignal<ColumnForm>,
    /// Show the WhatsApp group link field
    #[prop(into)]
    is_city: Signal<bool>,
    /// Parent is selected (or not needed)
    #[prop(into)]
    enabled: Signal<bool>,
    #[prop(into)] saving: Signal<bool>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(into)] on_submit: Callback<()>,
) -> impl IntoView {
    let editing = move || form.with(ColumnForm::is_editing);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() || !enabled.get_untracked() {
            return;
        }
        on_submit.run(());
    };

    view! {
        <form class="option-form" on:submit=submit>
            <input
                type="text"
                placeholder=move || if editing() { "Label" } else { "Add new..." }
                disabled=move || !enabled.get()
                prop:value=move || form.with(|f| f.label.clone())
                on:input=move |ev| form.update(|f| f.label = event_target_value(&ev))
            />
            <input
                type="text"
                class="option-form-code"
                placeholder="Code (from label)"
                disabled=move || !enabled.get()
                prop:value=move || form.with(|f| f.value.clone())
                on:input=move |ev| form.update(|f| f.value = event_target_value(&ev))
            />
            <Show when=move || is_city.get()>
                <input
                    type="url"
                    placeholder="WhatsApp group link"
                    prop:value=move || form.with(|f| f.whatsapp_link.clone())
                    on:input=move |ev| form.update(|f| f.whatsapp_link = event_target_value(&ev))
                />
            </Show>
            {move || error.get().map(|e| view! { <p class="option-form-error">{e}</p> })}
            <div class="option-form-actions">
                <button type="submit" disabled=move || saving.get() || !enabled.get()>
                    {move || match (saving.get(), editing()) {
                        (true, _) => "Saving...",
                        (false, true) => "Save",
                        (false, false) => "Add",
                    }}
                </button>
                <Show when=editing>
                    <button
                        type="button"
                        class="cancel-btn"
                        on:click=move |_| form.set(ColumnForm::default())
                    >
                        "Cancel"
                    </button>
                </Show>
            </div>
        </form>
    }
}
