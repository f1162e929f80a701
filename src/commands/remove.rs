use crate::page_range::select_slots;
use crate::pdf::DocumentSession;
use crate::tracker::PageIndexTracker;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RemoveSummary {
    pub removed: usize,
    pub page_count: usize,
}

/// Remove the pages named by `pages` (range syntax, 1-based) and save the
/// result to `output`.
pub fn remove_pages<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: &str,
    output: Q,
) -> Result<RemoveSummary> {
    let input = input.as_ref();
    let mut session = DocumentSession::open(input)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    let tracker = PageIndexTracker::initialize(session.page_count());
    let selected = select_slots(pages, tracker.slot_count())?;
    if selected.is_empty() {
        anyhow::bail!("No pages selected");
    }

    let positions = tracker.resolve_selection(&selected)?;
    session.delete_pages(&positions)?;
    session.save(&output)?;

    Ok(RemoveSummary {
        removed: positions.len(),
        page_count: session.page_count(),
    })
}

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, pages: &str, output: Q) -> Result<()> {
    let summary = remove_pages(input, pages, &output)?;

    println!(
        "Removed {} page(s); wrote {} page(s) to {}",
        summary.removed,
        summary.page_count,
        output.as_ref().display()
    );

    Ok(())
}
