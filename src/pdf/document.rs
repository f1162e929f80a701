use crate::error::{DeleteError, LoadError, SaveError};
use lopdf::Document;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Owns one open PDF for its whole lifetime: open, any number of deletion
/// batches and saves, then close. Nothing else mutates the document.
#[derive(Debug)]
pub struct DocumentSession {
    doc: Option<Document>,
    source: Option<PathBuf>,
}

impl DocumentSession {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let mut session = Self::from_bytes(&bytes)?;
        session.source = Some(path.to_path_buf());
        info!(
            "Opened {} ({} pages)",
            path.display(),
            session.page_count()
        );
        Ok(session)
    }

    /// Load a document that is already in memory. The session has no source
    /// path, so every save needs an explicit destination anyway.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let doc = Document::load_mem(bytes)?;
        // lopdf decrypts documents with an empty user password on load, so
        // the trailer entry alone does not tell whether it stayed locked.
        if doc.is_encrypted() || doc.encryption_state.is_some() {
            return Err(LoadError::Encrypted);
        }
        if doc.get_pages().is_empty() {
            return Err(LoadError::NoPages);
        }

        Ok(DocumentSession {
            doc: Some(doc),
            source: None,
        })
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.doc.is_none()
    }

    /// Number of pages right now; zero once closed.
    pub fn page_count(&self) -> usize {
        self.doc.as_ref().map_or(0, |doc| doc.get_pages().len())
    }

    /// Remove the pages at `positions` (0-based), which must be strictly
    /// descending so that every position is still valid when it is applied.
    ///
    /// The whole batch is validated before the first removal; a rejected batch
    /// leaves the document untouched.
    pub fn delete_pages(&mut self, positions: &[usize]) -> Result<(), DeleteError> {
        let doc = self.doc.as_mut().ok_or(DeleteError::Closed)?;
        let Some(&highest) = positions.first() else {
            return Ok(());
        };

        if positions.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(DeleteError::NotDescending(positions.to_vec()));
        }

        let page_count = doc.get_pages().len();
        if highest >= page_count {
            return Err(DeleteError::OutOfRange {
                position: highest,
                page_count,
            });
        }

        for &position in positions {
            let before = doc.get_pages().len();
            if position >= before {
                return Err(DeleteError::OutOfRange {
                    position,
                    page_count: before,
                });
            }

            // lopdf numbers pages from 1
            doc.delete_pages(&[position as u32 + 1]);
            if doc.get_pages().len() != before - 1 {
                return Err(DeleteError::Unapplied(position));
            }
            debug!("Deleted page at position {}", position);
        }

        let pruned = doc.prune_objects();
        info!(
            "Deleted {} page(s), {} remaining ({} objects pruned)",
            positions.len(),
            page_count - positions.len(),
            pruned.len()
        );
        Ok(())
    }

    /// Write the current state to `destination`. On failure nothing in memory
    /// changes, so the caller may retry with another destination.
    pub fn save<P: AsRef<Path>>(&mut self, destination: P) -> Result<(), SaveError> {
        let destination = destination.as_ref();
        let doc = self.doc.as_ref().ok_or(SaveError::Closed)?;
        if doc.get_pages().is_empty() {
            return Err(SaveError::NoPages);
        }

        // lopdf serializes through `&mut self`; work on a copy so a failed
        // write cannot leave the session's document half-updated.
        let mut snapshot = doc.clone();
        let mut bytes = Vec::new();
        snapshot
            .save_to(&mut bytes)
            .map_err(|err| SaveError::Serialize(err.to_string()))?;

        fs::write(destination, &bytes).map_err(|source| SaveError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        info!(
            "Saved {} pages to {}",
            snapshot.get_pages().len(),
            destination.display()
        );
        Ok(())
    }

    /// Drop the document, discarding unsaved changes. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.doc.take().is_some() {
            debug!("Closed document");
        }
    }
}
