//! Ordered image selection for the JPEG-to-PDF direction.
//!
//! The selection owns the working set between "pick files" and "convert":
//! a list of validated JPEGs, each with a stable id and a live preview
//! handle, in the exact order pages will appear in the assembled PDF.
//! Reordering goes through [`Selection::move_entry`] whether it was
//! requested directly or driven by the drag state machine.

use crate::config::ConversionConfig;
use crate::error::RepageError;
use crate::pipeline::input::InputFile;
use crate::preview::{PreviewHandle, MIME_JPEG};
use tracing::{debug, warn};
use uuid::Uuid;

/// One image in the selection: the original bytes plus a preview handle.
///
/// The id is assigned at selection time and survives reordering, so callers
/// can track an entry across moves without relying on its position.
#[derive(Debug)]
pub struct ImageEntry {
    id: Uuid,
    file: InputFile,
    preview: PreviewHandle,
}

impl ImageEntry {
    fn new(file: InputFile, config: &ConversionConfig) -> Self {
        let preview = PreviewHandle::new(file.shared_bytes(), MIME_JPEG, &config.handle_registry);
        ImageEntry {
            id: Uuid::new_v4(),
            file,
            preview,
        }
    }

    /// Stable identifier, unique within the process.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The selected file.
    pub fn file(&self) -> &InputFile {
        &self.file
    }

    /// Preview handle over the original JPEG bytes.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        self.file.name()
    }
}

/// Non-fatal outcome of a selection worth surfacing to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionNotice {
    /// More images were offered than the selection accepts; the overflow
    /// was dropped. Emitted at most once per selection, regardless of how
    /// many files were cut.
    Truncated { offered: usize, kept: usize },
}

/// In-flight drag gesture. Source is set on drag start, target follows the
/// pointer; only the last hovered target counts.
#[derive(Debug, Default, Clone, Copy)]
struct DragState {
    source: Option<usize>,
    target: Option<usize>,
}

/// The ordered working set of images awaiting assembly.
#[derive(Debug, Default)]
pub struct Selection {
    entries: Vec<ImageEntry>,
    drag: DragState,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a new batch of files.
    ///
    /// Validation is all-or-nothing: if any file fails the JPEG gate the
    /// whole batch is rejected and the current selection stays as it was.
    /// A batch larger than `config.max_images` is cut down to the first
    /// `max_images` files and reported through the returned notice.
    pub fn select(
        &mut self,
        files: Vec<InputFile>,
        config: &ConversionConfig,
    ) -> Result<Option<SelectionNotice>, RepageError> {
        for file in &files {
            file.validate_jpeg()?;
        }

        // Old previews are released here, before the new batch registers.
        self.clear();

        let offered = files.len();
        let kept = offered.min(config.max_images);

        self.entries = files
            .into_iter()
            .take(kept)
            .map(|file| ImageEntry::new(file, config))
            .collect();

        debug!("Selected {} images", kept);

        if offered > kept {
            warn!("Selection truncated: {} offered, {} kept", offered, kept);
            Ok(Some(SelectionNotice::Truncated { offered, kept }))
        } else {
            Ok(None)
        }
    }

    /// Move the entry at `from` so it ends up at index `to`, shifting the
    /// entries in between. `to` addresses the list as it stands after the
    /// entry is lifted out, so `[A, B, C, D]` with `(0, 2)` yields
    /// `[B, C, A, D]`.
    ///
    /// Returns `false` without touching the order when `from == to` or
    /// either index is out of bounds.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        debug!("Moved entry {} -> {}", from, to);
        true
    }

    /// Begin a drag gesture from the entry at `index`.
    pub fn drag_start(&mut self, index: usize) {
        if index < self.entries.len() {
            self.drag.source = Some(index);
            self.drag.target = None;
        }
    }

    /// Record the entry currently hovered as the drop target. May be called
    /// any number of times during one gesture; the last call wins.
    pub fn drag_enter(&mut self, index: usize) {
        if index < self.entries.len() {
            self.drag.target = Some(index);
        }
    }

    /// Finish the drag gesture, committing the move when both a source and
    /// a target were recorded. The gesture state is cleared either way, so
    /// a drop outside the list simply abandons the drag.
    pub fn drag_end(&mut self) -> bool {
        let source = self.drag.source.take();
        let target = self.drag.target.take();
        match (source, target) {
            (Some(from), Some(to)) => self.move_entry(from, to),
            _ => false,
        }
    }

    /// Drop every entry (releasing the previews) and reset drag state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.drag = DragState::default();
    }

    /// Entries in output order.
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Snapshot of the selected files in output order.
    pub fn files(&self) -> Vec<InputFile> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
