//! Upload source.
//!
//! File-picker selections and drag-and-drop both arrive here as [`RawFile`]s
//! and go through the same [`submit`] check before anything else sees them.

use std::rc::Rc;

use crate::error::UploadError;

/// Bytes behind a user-supplied file.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    /// Browser `File` handle, uploaded as-is.
    File(web_sys::File),
    /// In-memory image data.
    Bytes(Rc<[u8]>),
}

impl ImagePayload {
    pub fn len(&self) -> u64 {
        match self {
            ImagePayload::File(file) => file.size() as u64,
            ImagePayload::Bytes(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A file exactly as the user handed it over, not yet checked.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub media_type: String,
    pub payload: ImagePayload,
}

impl RawFile {
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: ImagePayload::Bytes(Rc::from(bytes)),
        }
    }
}

impl From<web_sys::File> for RawFile {
    fn from(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            media_type: file.type_(),
            payload: ImagePayload::File(file),
        }
    }
}

/// A file that passed media-type validation and may enter the pipeline.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    name: String,
    media_type: String,
    payload: ImagePayload,
}

impl ImageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }
}

/// Validate a raw file. Only the declared media type is checked; the image
/// itself is never decoded.
pub fn submit(raw: RawFile) -> Result<ImageHandle, UploadError> {
    if !is_image_media_type(&raw.media_type) {
        return Err(UploadError::InvalidMediaType(raw.media_type));
    }

    Ok(ImageHandle {
        name: raw.name,
        media_type: raw.media_type,
        payload: raw.payload,
    })
}

/// Pick the file a drop should use: the first one. An empty drop yields `None`.
pub fn first_dropped<I>(files: I) -> Option<RawFile>
where
    I: IntoIterator<Item = RawFile>,
{
    files.into_iter().next()
}

/// Collect the entries of a browser `FileList`.
pub fn files_from_list(list: &web_sys::FileList) -> Vec<RawFile> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(RawFile::from)
        .collect()
}

fn is_image_media_type(media_type: &str) -> bool {
    let media_type = media_type.trim();
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && media_type.len() > 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_accepted() {
        let raw = RawFile::from_bytes("chest.png", "image/png", &[0x89, 0x50, 0x4e, 0x47]);
        let handle = submit(raw).expect("png should be accepted");
        assert_eq!(handle.name(), "chest.png");
        assert_eq!(handle.media_type(), "image/png");
        assert_eq!(handle.payload().len(), 4);
    }

    #[test]
    fn test_media_type_prefix_is_case_insensitive() {
        assert!(submit(RawFile::from_bytes("a.jpg", "IMAGE/JPEG", b"x")).is_ok());
        assert!(submit(RawFile::from_bytes("a.webp", " image/webp", b"x")).is_ok());
    }

    #[test]
    fn test_pdf_is_rejected() {
        let raw = RawFile::from_bytes("report.pdf", "application/pdf", b"%PDF");
        assert_eq!(
            submit(raw).unwrap_err(),
            UploadError::InvalidMediaType("application/pdf".to_string())
        );
    }

    #[test]
    fn test_missing_or_bare_media_type_is_rejected() {
        assert!(submit(RawFile::from_bytes("blob", "", b"x")).is_err());
        assert!(submit(RawFile::from_bytes("blob", "image/", b"x")).is_err());
        assert!(submit(RawFile::from_bytes("blob", "imagery/png", b"x")).is_err());
    }

    #[test]
    fn test_first_dropped_uses_first_file_only() {
        let files = vec![
            RawFile::from_bytes("one.png", "image/png", b"1"),
            RawFile::from_bytes("two.png", "image/png", b"2"),
        ];
        let picked = first_dropped(files).unwrap();
        assert_eq!(picked.name, "one.png");
    }

    #[test]
    fn test_empty_drop_yields_nothing() {
        assert!(first_dropped(Vec::new()).is_none());
    }
}
