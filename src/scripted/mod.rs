//! Binding for pages that ship their own dashboard markup.
//!
//! The page provides elements with the ids listed in [`Slot::element_id`];
//! this module attaches listeners to them and keeps them in sync with a
//! [`TriageSession`].

mod dom;
pub mod render;

pub use dom::ElementTarget;
pub use render::{DomRenderer, RenderTarget, Slot};

use std::rc::Rc;

use tracing::info;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, HtmlInputElement};

use crate::triage::upload::{files_from_list, RawFile};
use crate::triage::TriageSession;

const DRAGOVER_CLASS: &str = "dragover";

/// Whether the document carries scripted dashboard markup.
pub fn is_present(document: &Document) -> bool {
    document
        .get_element_by_id(Slot::AnalyzeButton.element_id())
        .is_some()
}

/// Render the session into the page and route page events back to it.
pub fn install(document: &Document, session: TriageSession) -> Result<(), JsValue> {
    let target = ElementTarget::bind(document);
    let drop_zone = target.element(Slot::DropZone).cloned();
    let file_input = target
        .element(Slot::FileInput)
        .and_then(|el| el.dyn_ref::<HtmlInputElement>().cloned());
    let remove_btn = target.element(Slot::RemoveButton).cloned();
    let analyze_btn = target.element(Slot::AnalyzeButton).cloned();
    let retry_btn = target.element(Slot::RetryButton).cloned();

    session.subscribe(Rc::new(DomRenderer::new(target)));

    if let Some(zone) = &drop_zone {
        let input = file_input.clone();
        on(zone, "click", move |_| {
            if let Some(input) = &input {
                input.click();
            }
        })?;

        let el = zone.clone();
        on(zone, "dragover", move |ev| {
            ev.prevent_default();
            let _ = el.class_list().add_1(DRAGOVER_CLASS);
        })?;

        let el = zone.clone();
        on(zone, "dragleave", move |_| {
            let _ = el.class_list().remove_1(DRAGOVER_CLASS);
        })?;

        let el = zone.clone();
        let s = session.clone();
        on(zone, "drop", move |ev| {
            ev.prevent_default();
            let _ = el.class_list().remove_1(DRAGOVER_CLASS);
            let files = ev
                .dyn_ref::<web_sys::DragEvent>()
                .and_then(|d| d.data_transfer())
                .and_then(|dt| dt.files())
                .map(|list| files_from_list(&list))
                .unwrap_or_default();
            // Rejections surface through the frame's notice.
            let _ = s.submit_drop(files);
        })?;
    }

    if let Some(input) = &file_input {
        let el = input.clone();
        let s = session.clone();
        on(input, "change", move |_| {
            let picked = el
                .files()
                .and_then(|list| list.get(0))
                .map(RawFile::from);
            if let Some(raw) = picked {
                let _ = s.submit(raw);
            }
        })?;
    }

    if let Some(btn) = &remove_btn {
        let input = file_input.clone();
        let s = session.clone();
        on(btn, "click", move |ev| {
            // Keep the click from reaching the drop zone and reopening the picker.
            ev.stop_propagation();
            s.clear();
            if let Some(input) = &input {
                input.set_value("");
            }
        })?;
    }

    for btn in [&analyze_btn, &retry_btn].into_iter().flatten() {
        let s = session.clone();
        on(btn, "click", move |_| s.trigger_analysis())?;
    }

    info!("Scripted dashboard bound");
    Ok(())
}

fn on(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

