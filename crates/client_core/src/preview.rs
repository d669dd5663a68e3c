//! Owned handles onto a selected file's bytes for on-screen preview.

use std::sync::Arc;

use shared::domain::ImageMime;

use crate::types::SelectedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(pub u64);

/// Preview resource for the current selection.
///
/// Not `Clone`: exactly one handle exists per selection, and it must be
/// given up through [`PreviewHandle::release`] when a newer selection
/// supersedes it so the front end can free whatever it built from it.
#[derive(Debug)]
pub struct PreviewHandle {
    id: PreviewId,
    mime: ImageMime,
    bytes: Arc<[u8]>,
}

impl PreviewHandle {
    pub(crate) fn for_file(id: PreviewId, file: &SelectedFile) -> Self {
        Self {
            id,
            mime: file.mime(),
            bytes: file.shared_contents(),
        }
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use = "the released id tells the front end which preview to drop"]
    pub fn release(self) -> PreviewId {
        tracing::trace!(preview = self.id.0, "released preview handle");
        self.id
    }
}
