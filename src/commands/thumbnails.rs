use crate::editor::PageEditor;
use crate::gallery::Gallery;
use crate::pdf::PageRenderer;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, Serialize)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    /// Labels of the slots that had no image to write.
    pub degraded: Vec<String>,
}

/// Write every rendered slot of `gallery` as `<stem>_page_NNNN.png`.
pub fn export_gallery(gallery: &Gallery, output_dir: &Path, stem: &str) -> Result<ExportSummary> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut summary = ExportSummary::default();
    for slot in gallery.slots() {
        let Some(image) = slot.thumbnail.image() else {
            summary.degraded.push(slot.label.clone());
            continue;
        };

        let path = output_dir.join(format!("{}_page_{:04}.png", stem, slot.source_position + 1));
        image
            .save(&path)
            .with_context(|| format!("Failed to write image: {}", path.display()))?;
        debug!("Wrote {}", path.display());
        summary.written.push(path);
    }

    Ok(summary)
}

pub fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page")
}

pub fn export<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    renderer: Box<dyn PageRenderer>,
) -> Result<ExportSummary> {
    let input = input.as_ref();
    let mut editor = PageEditor::open(input, renderer)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    let summary = export_gallery(editor.gallery(), output_dir.as_ref(), file_stem(input));
    editor.close();
    summary
}

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    renderer: Box<dyn PageRenderer>,
) -> Result<()> {
    let summary = export(&input, &output_dir, renderer)?;

    println!(
        "Wrote {} thumbnail(s) to {}",
        summary.written.len(),
        output_dir.as_ref().display()
    );
    if !summary.degraded.is_empty() {
        println!("Unavailable: {}", summary.degraded.join(", "));
    }

    Ok(())
}
