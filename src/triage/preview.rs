//! Preview lifecycle for the currently armed image.
//!
//! At most one preview URI is live at a time. Replacing or clearing the source
//! revokes the previous one first.

use std::rc::Rc;

use tracing::{debug, warn};

use super::upload::{ImageHandle, ImagePayload};

/// Creates and revokes locally renderable preview URIs.
pub trait PreviewAllocator {
    /// Returns `None` when no preview can be produced for this image.
    fn allocate(&self, image: &ImageHandle) -> Option<String>;

    fn release(&self, uri: &str);
}

impl<T: PreviewAllocator + ?Sized> PreviewAllocator for Rc<T> {
    fn allocate(&self, image: &ImageHandle) -> Option<String> {
        (**self).allocate(image)
    }

    fn release(&self, uri: &str) {
        (**self).release(uri)
    }
}

impl<T: PreviewAllocator + ?Sized> PreviewAllocator for Box<T> {
    fn allocate(&self, image: &ImageHandle) -> Option<String> {
        (**self).allocate(image)
    }

    fn release(&self, uri: &str) {
        (**self).release(uri)
    }
}

/// A live preview URI. Deliberately not `Clone`: only the manager holds it.
#[derive(Debug)]
struct PreviewResource {
    uri: String,
}

pub struct PreviewManager<A: PreviewAllocator> {
    allocator: A,
    active: Option<PreviewResource>,
}

impl<A: PreviewAllocator> PreviewManager<A> {
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            active: None,
        }
    }

    /// Replace the preview with one for `image`. The prior URI is revoked
    /// before the new one is allocated.
    pub fn set_source(&mut self, image: &ImageHandle) -> Option<&str> {
        self.clear();

        self.active = self
            .allocator
            .allocate(image)
            .map(|uri| PreviewResource { uri });

        if self.active.is_none() {
            warn!("No preview available for {}", image.name());
        }

        self.current()
    }

    /// Revoke the active preview. Returns whether one was held.
    pub fn clear(&mut self) -> bool {
        match self.active.take() {
            Some(resource) => {
                debug!("Releasing preview {}", resource.uri);
                self.allocator.release(&resource.uri);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.active.as_ref().map(|r| r.uri.as_str())
    }
}

impl<A: PreviewAllocator> Drop for PreviewManager<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Blob object URLs (`URL.createObjectURL`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectUrlAllocator;

impl PreviewAllocator for ObjectUrlAllocator {
    fn allocate(&self, image: &ImageHandle) -> Option<String> {
        let created = match image.payload() {
            ImagePayload::File(file) => web_sys::Url::create_object_url_with_blob(file),
            ImagePayload::Bytes(bytes) => bytes_to_blob(bytes, image.media_type())
                .and_then(|blob| web_sys::Url::create_object_url_with_blob(&blob)),
        };

        match created {
            Ok(uri) => Some(uri),
            Err(e) => {
                warn!("Failed to create object URL: {:?}", e);
                None
            }
        }
    }

    fn release(&self, uri: &str) {
        if let Err(e) = web_sys::Url::revoke_object_url(uri) {
            warn!("Failed to revoke object URL {}: {:?}", uri, e);
        }
    }
}

/// Wrap raw bytes in a `Blob` of the given media type.
pub(crate) fn bytes_to_blob(
    bytes: &[u8],
    media_type: &str,
) -> Result<web_sys::Blob, wasm_bindgen::JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::of1(&array);
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(media_type);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::triage::upload::{submit, RawFile};

    #[derive(Default)]
    struct Ledger {
        next: usize,
        live: Vec<String>,
        released: Vec<String>,
    }

    #[derive(Default, Clone)]
    struct CountingAllocator(Rc<RefCell<Ledger>>);

    impl PreviewAllocator for CountingAllocator {
        fn allocate(&self, image: &ImageHandle) -> Option<String> {
            let mut ledger = self.0.borrow_mut();
            ledger.next += 1;
            let uri = format!("blob:test/{}-{}", ledger.next, image.name());
            ledger.live.push(uri.clone());
            Some(uri)
        }

        fn release(&self, uri: &str) {
            let mut ledger = self.0.borrow_mut();
            ledger.live.retain(|u| u != uri);
            ledger.released.push(uri.to_string());
        }
    }

    fn image(name: &str) -> ImageHandle {
        submit(RawFile::from_bytes(name, "image/png", b"png")).unwrap()
    }

    #[test]
    fn test_set_source_replaces_previous_preview() {
        let alloc = CountingAllocator::default();
        let mut previews = PreviewManager::new(alloc.clone());

        previews.set_source(&image("a.png"));
        let second = previews.set_source(&image("b.png")).map(str::to_string);

        let ledger = alloc.0.borrow();
        assert_eq!(ledger.live.len(), 1, "only one preview may be live");
        assert_eq!(ledger.live[0], second.unwrap());
        assert_eq!(ledger.released, vec!["blob:test/1-a.png".to_string()]);
    }

    #[test]
    fn test_clear_releases_exactly_once() {
        let alloc = CountingAllocator::default();
        let mut previews = PreviewManager::new(alloc.clone());

        previews.set_source(&image("a.png"));
        assert!(previews.clear());
        assert!(!previews.clear());
        assert!(previews.current().is_none());

        let ledger = alloc.0.borrow();
        assert!(ledger.live.is_empty());
        assert_eq!(ledger.released.len(), 1);
    }

    #[test]
    fn test_clear_without_source_is_noop() {
        let alloc = CountingAllocator::default();
        let mut previews = PreviewManager::new(alloc.clone());
        assert!(!previews.clear());
        assert!(alloc.0.borrow().released.is_empty());
    }

    #[test]
    fn test_drop_releases_active_preview() {
        let alloc = CountingAllocator::default();
        {
            let mut previews = PreviewManager::new(alloc.clone());
            previews.set_source(&image("a.png"));
        }
        assert!(alloc.0.borrow().live.is_empty());
    }
}
