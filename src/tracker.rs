use crate::error::SelectionError;
use std::collections::BTreeSet;

/// Maps thumbnail slots to page positions for one refresh cycle.
///
/// The mapping is only valid until the document is next mutated; after a
/// deletion batch the tracker is rebuilt with [`PageIndexTracker::initialize`]
/// rather than patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndexTracker {
    positions: Vec<usize>,
}

impl PageIndexTracker {
    /// Identity mapping: slot `i` shows the page at position `i`.
    pub fn initialize(page_count: usize) -> Self {
        Self {
            positions: (0..page_count).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, slot: usize) -> Option<usize> {
        self.positions.get(slot).copied()
    }

    /// Translate selected slots into the page positions to delete, highest
    /// first. Removing a page only shifts the pages after it, so applying the
    /// result in order keeps every not-yet-applied position valid.
    pub fn resolve_selection(
        &self,
        selected: &BTreeSet<usize>,
    ) -> Result<Vec<usize>, SelectionError> {
        let mut positions = selected
            .iter()
            .map(|&slot| {
                self.position(slot).ok_or(SelectionError::UnknownSlot {
                    slot,
                    slot_count: self.slot_count(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_labels, sample_bytes};
    use crate::pdf::DocumentSession;
    use pretty_assertions::assert_eq;

    fn set(slots: &[usize]) -> BTreeSet<usize> {
        slots.iter().copied().collect()
    }

    #[test]
    fn test_initialize_is_identity() {
        let tracker = PageIndexTracker::initialize(4);
        assert_eq!(tracker.slot_count(), 4);
        assert_eq!(
            (0..4).map(|slot| tracker.position(slot)).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
        assert_eq!(tracker.position(4), None);
    }

    #[test]
    fn test_resolve_is_descending() {
        let tracker = PageIndexTracker::initialize(10);
        assert_eq!(
            tracker.resolve_selection(&set(&[1, 7, 3, 0])).unwrap(),
            vec![7, 3, 1, 0]
        );
    }

    #[test]
    fn test_empty_selection() {
        let tracker = PageIndexTracker::initialize(3);
        assert!(tracker.resolve_selection(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_slot() {
        let tracker = PageIndexTracker::initialize(3);
        assert_eq!(
            tracker.resolve_selection(&set(&[0, 3])).unwrap_err(),
            SelectionError::UnknownSlot {
                slot: 3,
                slot_count: 3
            }
        );
    }

    #[test]
    fn test_every_selection_is_strictly_descending_and_valid() {
        let page_count = 6;
        let tracker = PageIndexTracker::initialize(page_count);
        for mask in 1u32..(1 << page_count) {
            let selected: BTreeSet<usize> =
                (0..page_count).filter(|i| mask & (1 << i) != 0).collect();
            let positions = tracker.resolve_selection(&selected).unwrap();

            assert_eq!(positions.len(), selected.len());
            assert!(positions.windows(2).all(|pair| pair[0] > pair[1]));
            assert!(positions.iter().all(|&p| p < page_count));
        }
    }

    #[test]
    fn test_every_selection_deletes_exactly_the_selected_pages() {
        let labels = ["A", "B", "C", "D", "E"];
        let bytes = sample_bytes(&labels);
        for mask in 1u32..(1 << labels.len()) {
            let selected: BTreeSet<usize> =
                (0..labels.len()).filter(|i| mask & (1 << i) != 0).collect();

            let mut session = DocumentSession::from_bytes(&bytes).unwrap();
            let tracker = PageIndexTracker::initialize(session.page_count());
            let positions = tracker.resolve_selection(&selected).unwrap();
            session.delete_pages(&positions).unwrap();

            let expected: Vec<&str> = labels
                .iter()
                .enumerate()
                .filter(|(i, _)| !selected.contains(i))
                .map(|(_, label)| *label)
                .collect();
            assert_eq!(page_labels(session.document().unwrap()), expected);
        }
    }
}
