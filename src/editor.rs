use crate::error::{DeleteError, EditError, LoadError, SaveError};
use crate::gallery::{Gallery, ThumbnailSlot};
use crate::pdf::{DocumentSession, PageRenderer};
use crate::tracker::PageIndexTracker;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// What a front end holds while a user works on one PDF: the open document,
/// the current slot mapping and the thumbnails shown for it.
pub struct PageEditor {
    session: DocumentSession,
    tracker: PageIndexTracker,
    gallery: Gallery,
    renderer: Box<dyn PageRenderer>,
}

impl PageEditor {
    pub fn open<P: AsRef<Path>>(
        path: P,
        renderer: Box<dyn PageRenderer>,
    ) -> Result<Self, LoadError> {
        let session = DocumentSession::open(path)?;
        Ok(Self::from_session(session, renderer))
    }

    pub fn from_session(session: DocumentSession, renderer: Box<dyn PageRenderer>) -> Self {
        let mut editor = PageEditor {
            session,
            tracker: PageIndexTracker::default(),
            gallery: Gallery::default(),
            renderer,
        };
        editor.refresh();
        editor
    }

    pub fn slots(&self) -> &[ThumbnailSlot] {
        self.gallery.slots()
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn page_count(&self) -> usize {
        self.session.page_count()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.session.source_path()
    }

    /// Regenerate the slot mapping and every thumbnail from the document as
    /// it is now. The previous cycle's images are dropped.
    pub fn refresh(&mut self) {
        self.gallery = Gallery::default();
        self.tracker = PageIndexTracker::initialize(self.session.page_count());
        if let Some(document) = self.session.document() {
            self.gallery = Gallery::build(document, &self.tracker, self.renderer.as_ref());
        }
    }

    /// Delete the pages shown in `selected` slots and refresh. Returns how many
    /// pages were removed.
    pub fn remove_selected(&mut self, selected: &BTreeSet<usize>) -> Result<usize, EditError> {
        if self.session.is_closed() {
            return Err(DeleteError::Closed.into());
        }
        if selected.is_empty() {
            return Err(EditError::NothingSelected);
        }

        let positions = self.tracker.resolve_selection(selected)?;
        let before = self.session.page_count();
        let result = self.session.delete_pages(&positions);

        if self.session.page_count() != before {
            self.refresh();
        }
        result?;

        info!(
            "Removed {} page(s), {} remaining",
            positions.len(),
            self.page_count()
        );
        Ok(positions.len())
    }

    /// Save to `destination`. The editor stays open and its thumbnails stay
    /// valid whether or not the save succeeds.
    pub fn save<P: AsRef<Path>>(&mut self, destination: P) -> Result<(), SaveError> {
        self.session.save(destination)
    }

    /// Discard the document and the current thumbnails. Idempotent.
    pub fn close(&mut self) {
        self.session.close();
        self.tracker = PageIndexTracker::default();
        self.gallery = Gallery::default();
    }
}
