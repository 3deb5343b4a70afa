//! Notification Stack Component

use leptos::prelude::*;

use crate::store::{store_dismiss_notice, use_app_store, AppStateStoreFields, NoticeKind};

#[component]
pub fn Notifications() -> impl IntoView {
    let store = use_app_store();

    view! {
        <div class="notifications">
            <For
                each=move || store.notices().get()
                key=|notice| notice.id
                children=move |notice| {
                    let id = notice.id;
                    let class = match notice.kind {
                        NoticeKind::Info => "notice info",
                        NoticeKind::Error => "notice error",
                    };
                    view! {
                        <div class=class on:click=move |_| store_dismiss_notice(&store, id)>
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
