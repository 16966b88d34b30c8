//! [`RenderTarget`] over real page elements.

use std::collections::HashMap;

use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlImageElement};

use super::render::{RenderTarget, Slot};
use crate::triage::presenter::Tone;

const TONE_CLASSES: [&str; 2] = ["normal", "pneumonia"];

/// Elements resolved once from a document. Slots the page lacks are skipped.
pub struct ElementTarget {
    document: Document,
    elements: HashMap<Slot, Element>,
}

impl ElementTarget {
    pub fn bind(document: &Document) -> Self {
        let mut elements = HashMap::new();
        for slot in Slot::ALL {
            match document.get_element_by_id(slot.element_id()) {
                Some(el) => {
                    elements.insert(slot, el);
                }
                None => debug!("No #{} on page", slot.element_id()),
            }
        }
        Self {
            document: document.clone(),
            elements,
        }
    }

    pub fn element(&self, slot: Slot) -> Option<&Element> {
        self.elements.get(&slot)
    }
}

impl RenderTarget for ElementTarget {
    fn set_visible(&self, slot: Slot, visible: bool) {
        let Some(el) = self.element(slot) else { return };
        let result = if visible {
            el.remove_attribute("hidden")
        } else {
            el.set_attribute("hidden", "")
        };
        if let Err(e) = result {
            warn!("Toggle #{} failed: {:?}", slot.element_id(), e);
        }
    }

    fn set_text(&self, slot: Slot, text: &str) {
        if let Some(el) = self.element(slot) {
            el.set_text_content(Some(text));
        }
    }

    fn set_items(&self, slot: Slot, items: &[String]) {
        let Some(list) = self.element(slot) else { return };
        list.set_text_content(None);
        for item in items {
            let li = match self.document.create_element("li") {
                Ok(li) => li,
                Err(e) => {
                    warn!("Could not create list item: {:?}", e);
                    return;
                }
            };
            li.set_text_content(Some(item));
            if let Err(e) = list.append_child(&li) {
                warn!("Append to #{} failed: {:?}", slot.element_id(), e);
            }
        }
    }

    fn set_enabled(&self, slot: Slot, enabled: bool) {
        let Some(el) = self.element(slot) else { return };
        if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(!enabled);
        }
    }

    fn set_tone(&self, slot: Slot, tone: Option<Tone>) {
        let Some(el) = self.element(slot) else { return };
        let classes = el.class_list();
        for class in TONE_CLASSES {
            let _ = classes.remove_1(class);
        }
        if let Some(tone) = tone {
            let _ = classes.add_1(tone.css_class());
        }
    }

    fn set_gauge(&self, slot: Slot, percent: u8, color: &str) {
        let Some(el) = self.element(slot) else { return };
        let _ = el.set_attribute("stroke-dasharray", &format!("{}, 100", percent));
        let _ = el.set_attribute("style", &format!("stroke: {}", color));
    }

    fn set_image(&self, slot: Slot, src: Option<&str>) {
        let Some(el) = self.element(slot) else { return };
        if let Some(img) = el.dyn_ref::<HtmlImageElement>() {
            match src {
                Some(src) => img.set_src(src),
                None => {
                    let _ = img.remove_attribute("src");
                }
            }
        }
    }
}
