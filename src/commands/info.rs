use crate::pdf::render::page_size;
use crate::pdf::DocumentSession;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: usize,
    /// `None` when the page's geometry could not be read.
    pub width_pt: Option<f32>,
    pub height_pt: Option<f32>,
}

pub fn page_infos<P: AsRef<Path>>(path: P) -> Result<Vec<PageInfo>> {
    let path = path.as_ref();
    let session = DocumentSession::open(path)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
    let document = session
        .document()
        .context("document closed while reading page sizes")?;

    Ok((0..session.page_count())
        .map(|position| {
            let size = page_size(document, position).ok();
            PageInfo {
                page: position + 1,
                width_pt: size.map(|s| s.width_pt),
                height_pt: size.map(|s| s.height_pt),
            }
        })
        .collect())
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let pages = page_infos(&path)?;

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", pages.len());

    for info in &pages {
        match (info.width_pt, info.height_pt) {
            (Some(width), Some(height)) => {
                println!("  {:>4}: {:.1} x {:.1} pt", info.page, width, height)
            }
            _ => println!("  {:>4}: unreadable page geometry", info.page),
        }
    }

    Ok(())
}
