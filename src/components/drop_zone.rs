//! Scan upload area: drag-and-drop, browse, preview and clear.

use leptos::html::Input;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use crate::triage::session::DashboardFrame;
use crate::triage::upload::{files_from_list, RawFile};
use crate::triage::TriageSession;

#[component]
pub fn ScanDropZone(
    frame: ReadSignal<DashboardFrame>,
    session: StoredValue<TriageSession, LocalStorage>,
) -> impl IntoView {
    let file_input = NodeRef::<Input>::new();
    let (is_over, set_is_over) = signal(false);

    let open_picker = move |_| {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        set_is_over.set(false);

        let files = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .map(|list| files_from_list(&list))
            .unwrap_or_default();
        session.with_value(|s| {
            let _ = s.submit_drop(files);
        });
    };

    let on_input_change = move |ev: web_sys::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            session.with_value(|s| {
                let _ = s.submit(RawFile::from(file));
            });
        }
    };

    let on_remove = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        session.with_value(|s| s.clear());
        if let Some(input) = file_input.get() {
            input.set_value("");
        }
    };

    let preview = move || frame.with(|f| f.preview_url.clone());

    view! {
        <div class="scan-upload">
            <div
                class="drop-zone"
                class:dragover=move || is_over.get()
                on:click=open_picker
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    set_is_over.set(true);
                }
                on:dragleave=move |_| set_is_over.set(false)
                on:drop=on_drop
            >
                <Show
                    when=move || preview().is_some()
                    fallback=|| view! {
                        <div class="upload-content">
                            <div class="drop-icon">"[x-ray]"</div>
                            <p class="drop-main">"Drop a chest X-ray here"</p>
                            <p class="drop-hint">"or click to browse"</p>
                            <p class="drop-formats">"Supports JPG, PNG"</p>
                        </div>
                    }
                >
                    <div class="preview-container">
                        <img
                            class="preview-image"
                            alt="Scan preview"
                            src=move || preview().unwrap_or_default()
                        />
                        <div class="preview-footer">
                            <span class="file-name">
                                {move || frame.with(|f| f.file_name.clone().unwrap_or_default())}
                            </span>
                            <button
                                class="btn btn-secondary btn-small"
                                disabled=move || !frame.with(|f| f.can_clear)
                                on:click=on_remove
                            >
                                "Remove"
                            </button>
                        </div>
                    </div>
                </Show>
            </div>
            <input
                type="file"
                accept="image/*"
                style="display: none"
                node_ref=file_input
                on:change=on_input_change
            />
            {move || frame.with(|f| f.notice).map(|notice| view! {
                <p class="upload-notice">{notice}</p>
            })}
        </div>
    }
}
