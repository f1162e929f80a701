use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub start: PageRef,
    pub end: Option<PageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Number(usize),
    End,
}

impl PageRange {
    /// Parse a page range specification like "1-5", "9-6", "1-end", "end"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Empty page range"));
        }

        match s.split_once('-') {
            // "-5" is not a range
            Some(("", _)) => Err(anyhow!("Invalid page range: {}", s)),
            Some((start, end)) => Ok(PageRange {
                start: parse_page_ref(start)?,
                end: Some(parse_page_ref(end)?),
            }),
            None => Ok(PageRange {
                start: parse_page_ref(s)?,
                end: None,
            }),
        }
    }

    /// Expand this range into the 1-based page numbers it covers
    pub fn expand(&self, total_pages: usize) -> Result<Vec<usize>> {
        let resolve = |page: &PageRef| match page {
            PageRef::Number(n) => *n,
            PageRef::End => total_pages,
        };

        let start = resolve(&self.start);
        let end = self.end.as_ref().map_or(start, resolve);

        if start == 0 || end == 0 {
            return Err(anyhow!("Page numbers must be >= 1"));
        }

        for page in [start, end] {
            if page > total_pages {
                return Err(anyhow!(
                    "Page {} exceeds total pages {}",
                    page,
                    total_pages
                ));
            }
        }

        Ok((start.min(end)..=start.max(end)).collect())
    }
}

fn parse_page_ref(s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<usize>()
            .map(PageRef::Number)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }
}

/// Turn a selection like "1-3,7,9-end" over the pages currently shown into
/// 0-based slot indices.
pub fn select_slots(s: &str, slot_count: usize) -> Result<BTreeSet<usize>> {
    let mut slots = BTreeSet::new();
    for part in s.split(',') {
        let range = PageRange::parse(part)?;
        slots.extend(range.expand(slot_count)?.into_iter().map(|page| page - 1));
    }
    Ok(slots)
}
