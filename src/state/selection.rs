/// Current image selection and its preview handle
///
/// Only one image is selected at a time. Every preview handle registers itself
/// with a live counter when created and unregisters when dropped, so replacing
/// the selection (or dropping the manager) always releases the old preview.

use iced::widget::image::Handle;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::data::ImageFile;

/// Display handle for the preview widget
///
/// Released exactly once, when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    handle: Handle,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    fn new(id: u64, file: &ImageFile, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            handle: Handle::from_bytes(file.bytes.as_ref().clone()),
            live,
        }
    }

    /// Sequence number, unique within one manager
    #[cfg(test)]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Handle to pass to the `image` widget
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        log::debug!("🗑️  Released preview handle #{}", self.id);
    }
}

/// The selected file together with its preview
#[derive(Debug)]
pub struct SelectedImage {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

/// Owns the current selection
#[derive(Debug, Default)]
pub struct SelectionManager {
    current: Option<SelectedImage>,
    live: Arc<AtomicUsize>,
    next_id: u64,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection. `None` (no file chosen) is a no-op.
    ///
    /// The previous preview handle is released before this returns.
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, file: Option<ImageFile>) -> bool {
        let Some(file) = file else {
            return false;
        };

        self.next_id += 1;
        let preview = PreviewHandle::new(self.next_id, &file, Arc::clone(&self.live));

        log::info!(
            "🖼️  Selected {} ({}, {}KB)",
            file.name,
            file.mime,
            file.len() / 1024
        );

        // Old selection (and its preview) is dropped here
        self.current = Some(SelectedImage { file, preview });
        true
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.current.as_ref().map(|selected| &selected.file)
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.current.as_ref().map(|selected| &selected.preview)
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    /// Number of preview handles not yet released
    pub fn live_previews(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Shared counter, lets callers check releases after the manager is gone
    #[cfg(test)]
    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }
}
