use crate::commands::thumbnails::{export_gallery, file_stem};
use crate::editor::PageEditor;
use crate::gallery::Thumbnail;
use crate::page_range::select_slots;
use crate::pdf::PageRenderer;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

const HELP: &str = "\
Commands:
  list               show the pages currently in the document
  remove <PAGES>     remove pages, e.g. \"2,5-7,end\" (numbers as listed)
  save <PATH>        write the document to PATH
  export <DIR>       write the current thumbnails as PNG files to DIR
  help               show this message
  quit               leave without saving";

/// Interactive page removal on `path`, driven by stdin.
pub fn run<P: AsRef<Path>>(path: P, renderer: Box<dyn PageRenderer>) -> Result<()> {
    let path = path.as_ref();
    let mut editor = PageEditor::open(path, renderer)
        .with_context(|| format!("Failed to open PDF: {}", path.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    shell(&mut editor, stdin.lock(), stdout.lock())?;

    editor.close();
    Ok(())
}

pub fn shell<R: BufRead, W: Write>(editor: &mut PageEditor, input: R, mut out: W) -> Result<()> {
    list(editor, &mut out)?;
    writeln!(out, "Type `help` for commands.")?;

    for line in input.lines() {
        let line = line?;
        let (command, argument) = match line.trim().split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line.trim(), ""),
        };

        match (command, argument) {
            ("", _) => continue,
            ("quit" | "exit" | "q", _) => break,
            ("help" | "?", _) => writeln!(out, "{}", HELP)?,
            ("list" | "ls", _) => list(editor, &mut out)?,
            ("remove" | "rm", pages) => {
                let outcome = select_slots(pages, editor.slots().len())
                    .and_then(|selected| editor.remove_selected(&selected).map_err(Into::into));
                match outcome {
                    Ok(removed) => {
                        writeln!(
                            out,
                            "Removed {} page(s); {} remaining",
                            removed,
                            editor.page_count()
                        )?;
                        list(editor, &mut out)?;
                    }
                    Err(err) => writeln!(out, "Error: {:#}", err)?,
                }
            }
            ("save", "") => writeln!(out, "Error: save needs a destination path")?,
            ("save", destination) => match editor.save(destination) {
                Ok(()) => writeln!(
                    out,
                    "Saved {} page(s) to {}",
                    editor.page_count(),
                    destination
                )?,
                Err(err) => writeln!(out, "Error: {}", err)?,
            },
            ("export", "") => writeln!(out, "Error: export needs a directory")?,
            ("export", dir) => {
                let stem = editor.source_path().map_or("page", file_stem).to_string();
                match export_gallery(editor.gallery(), Path::new(dir), &stem) {
                    Ok(summary) => writeln!(
                        out,
                        "Wrote {} thumbnail(s) to {}",
                        summary.written.len(),
                        dir
                    )?,
                    Err(err) => writeln!(out, "Error: {:#}", err)?,
                }
            }
            (other, _) => writeln!(out, "Error: unknown command `{}`; try `help`", other)?,
        }
    }

    Ok(())
}

fn list<W: Write>(editor: &PageEditor, out: &mut W) -> Result<()> {
    let gallery = editor.gallery();
    if gallery.is_empty() {
        writeln!(out, "(no pages)")?;
    }
    for slot in gallery.slots() {
        let number = slot.slot_index + 1;
        match &slot.thumbnail {
            Thumbnail::Rendered(image) => writeln!(
                out,
                "{number:>4}. {} ({}x{})",
                slot.label,
                image.width(),
                image.height()
            )?,
            Thumbnail::Degraded(reason) => writeln!(
                out,
                "{number:>4}. {} (thumbnail unavailable: {})",
                slot.label, reason
            )?,
        }
    }
    if gallery.degraded() > 0 {
        writeln!(out, "{} of {} thumbnail(s) unavailable", gallery.degraded(), gallery.len())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_labels, sample_bytes};
    use crate::pdf::render::PreviewRenderer;
    use crate::pdf::{DocumentSession, RenderOptions};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn editor(labels: &[&str]) -> PageEditor {
        let session = DocumentSession::from_bytes(&sample_bytes(labels)).unwrap();
        let renderer = PreviewRenderer::new(RenderOptions { scale: 0.1 });
        PageEditor::from_session(session, Box::new(renderer))
    }

    fn drive(editor: &mut PageEditor, script: &str) -> String {
        let mut out = Vec::new();
        shell(editor, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_remove_then_save() {
        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join("out.pdf");
        let mut editor = editor(&["A", "B", "C", "D", "E"]);

        let script = format!("remove 2,4\nremove end\nsave {}\nquit\n", saved.display());
        let output = drive(&mut editor, &script);

        assert!(output.contains("Removed 2 page(s); 3 remaining"));
        assert!(output.contains("Removed 1 page(s); 2 remaining"));
        assert!(output.contains("Saved 2 page(s)"));

        let reopened = DocumentSession::open(&saved).unwrap();
        assert_eq!(page_labels(reopened.document().unwrap()), vec!["A", "C"]);
    }

    #[test]
    fn test_errors_are_reported_and_shell_continues() {
        let mut editor = editor(&["A", "B"]);
        let output = drive(&mut editor, "remove\nremove 9\nfrobnicate\nsave\nlist\n");

        assert!(output.contains("Error: Empty page range"));
        assert!(output.contains("Error: Page 9 exceeds total pages 2"));
        assert!(output.contains("Error: unknown command `frobnicate`"));
        assert!(output.contains("Error: save needs a destination path"));
        assert_eq!(editor.page_count(), 2);
    }

    #[test]
    fn test_list_shows_labels() {
        let mut editor = editor(&["A", "B"]);
        let output = drive(&mut editor, "");
        assert!(output.contains("   1. Page 1 (61x79)"));
        assert!(output.contains("   2. Page 2 (61x79)"));
    }

    #[test]
    fn test_list_numbers_follow_refresh() {
        let mut editor = editor(&["A", "B", "C"]);
        let output = drive(&mut editor, "remove 1
list
");
        let after = output.split("Removed 1 page(s)").nth(1).unwrap();
        assert!(after.contains("   1. Page 1 (61x79)"));
        assert!(after.contains("   2. Page 2 (61x79)"));
        assert!(!after.contains("   3. "));
    }
}
