use crate::pdf::PageRenderer;
use crate::tracker::PageIndexTracker;
use image::RgbaImage;
use lopdf::Document;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum Thumbnail {
    Rendered(RgbaImage),
    /// The page could not be rasterized; carries the reason for display.
    Degraded(String),
}

impl Thumbnail {
    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            Thumbnail::Rendered(image) => Some(image),
            Thumbnail::Degraded(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailSlot {
    pub slot_index: usize,
    pub label: String,
    pub thumbnail: Thumbnail,
    /// Snapshot of the page position; stale after the next mutation.
    pub source_position: usize,
}

/// All thumbnails of one refresh cycle. The image buffers live exactly as
/// long as the gallery does.
#[derive(Debug, Default)]
pub struct Gallery {
    slots: Vec<ThumbnailSlot>,
}

impl Gallery {
    pub fn build<R>(document: &Document, tracker: &PageIndexTracker, renderer: &R) -> Self
    where
        R: PageRenderer + ?Sized,
    {
        let mut rendered = renderer.render_all(document).into_iter();

        let slots: Vec<ThumbnailSlot> = (0..tracker.slot_count())
            .filter_map(|slot_index| {
                let position = tracker.position(slot_index)?;
                let thumbnail = match rendered.next() {
                    Some(Ok(image)) => Thumbnail::Rendered(image),
                    Some(Err(err)) => {
                        warn!("Thumbnail for page {} unavailable: {}", position + 1, err);
                        Thumbnail::Degraded(err.to_string())
                    }
                    None => Thumbnail::Degraded("renderer returned no image".to_string()),
                };
                Some(ThumbnailSlot {
                    slot_index,
                    label: format!("Page {}", position + 1),
                    thumbnail,
                    source_position: position,
                })
            })
            .collect();

        debug_assert!(slots
            .iter()
            .enumerate()
            .all(|(i, slot)| slot.source_position == i));
        debug!("Built gallery with {} slots", slots.len());

        Gallery { slots }
    }

    pub fn slots(&self) -> &[ThumbnailSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots whose page could not be rendered.
    pub fn degraded(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.thumbnail.image().is_none())
            .count()
    }
}
