use crate::error::RenderError;
use image::{Rgba, RgbaImage};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, warn};

/// Magnification applied to every thumbnail.
pub const DEFAULT_SCALE: f32 = 1.5;

const LETTER: PageSize = PageSize {
    width_pt: 612.0,
    height_pt: 792.0,
};

/// Longest thumbnail edge in pixels. Bigger pages are scaled down to fit,
/// keeping their aspect ratio.
pub const MAX_EDGE_PX: u32 = 4096;

// Guards the Parent walk against malformed page trees.
const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub scale: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

impl RenderOptions {
    fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            DEFAULT_SCALE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Turns one page of a document into a raster image. Implementations must
/// not mutate the document.
pub trait PageRenderer {
    fn render(&self, document: &Document, position: usize) -> Result<RgbaImage, RenderError>;

    /// Render every page, one result per position. Backends with a costly
    /// per-document setup override this to do that setup once.
    fn render_all(&self, document: &Document) -> Vec<Result<RgbaImage, RenderError>> {
        (0..document.get_pages().len())
            .map(|position| self.render(document, position))
            .collect()
    }
}

/// Pure-Rust fallback: a blank sheet with the page's proportions and border.
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    options: RenderOptions,
}

impl PreviewRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl PageRenderer for PreviewRenderer {
    fn render(&self, document: &Document, position: usize) -> Result<RgbaImage, RenderError> {
        let size = page_size(document, position)?;
        let (width, height) =
            thumbnail_dimensions(size, self.options.effective_scale(), position)?;
        debug!("Preview page {} at {}x{}", position, width, height);

        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        if width >= 4 && height >= 4 {
            let border = Rgba([220, 220, 220, 255]);
            for x in 0..width {
                image.put_pixel(x, 0, border);
                image.put_pixel(x, height - 1, border);
            }
            for y in 0..height {
                image.put_pixel(0, y, border);
                image.put_pixel(width - 1, y, border);
            }
        }

        Ok(image)
    }
}

/// Pixel size of a page rendered at `scale`, capped at [`MAX_EDGE_PX`].
fn thumbnail_dimensions(
    size: PageSize,
    scale: f32,
    position: usize,
) -> Result<(u32, u32), RenderError> {
    let width = f64::from(size.width_pt) * f64::from(scale);
    let height = f64::from(size.height_pt) * f64::from(scale);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(corrupt(
            position,
            format!("cannot render a {}x{} pt page", size.width_pt, size.height_pt),
        ));
    }

    let max_edge = f64::from(MAX_EDGE_PX);
    let fit = (max_edge / width.max(height)).min(1.0);
    let pixels = |len: f64| (len * fit).round().clamp(1.0, max_edge) as u32;
    Ok((pixels(width), pixels(height)))
}

/// Size of the page at `position` in points, as displayed (rotation applied).
pub fn page_size(document: &Document, position: usize) -> Result<PageSize, RenderError> {
    let page_id = page_id(document, position)?;

    let size = match inherited(document, page_id, position, b"MediaBox")? {
        Some(media_box) => parse_media_box(document, media_box, position)?,
        None => LETTER,
    };

    let rotate = inherited(document, page_id, position, b"Rotate")?
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    if rotate.rem_euclid(180) == 90 {
        Ok(PageSize {
            width_pt: size.height_pt,
            height_pt: size.width_pt,
        })
    } else {
        Ok(size)
    }
}

fn page_id(document: &Document, position: usize) -> Result<ObjectId, RenderError> {
    let pages = document.get_pages();
    pages
        .values()
        .nth(position)
        .copied()
        .ok_or(RenderError::OutOfRange {
            position,
            page_count: pages.len(),
        })
}

/// Look `key` up on the page, then on its ancestors in the page tree.
fn inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    position: usize,
    key: &[u8],
) -> Result<Option<&'a Object>, RenderError> {
    let mut dict = document
        .get_dictionary(page_id)
        .map_err(|err| corrupt(position, format!("page object: {err}")))?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(document, value, position)?));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => {
                dict = document
                    .get_dictionary(parent)
                    .map_err(|err| corrupt(position, format!("page tree node: {err}")))?;
            }
            Err(_) => return Ok(None),
        }
    }

    Err(corrupt(position, "page tree is too deep".to_string()))
}

fn resolve<'a>(
    document: &'a Document,
    value: &'a Object,
    position: usize,
) -> Result<&'a Object, RenderError> {
    match value {
        Object::Reference(id) => document
            .get_object(*id)
            .map_err(|err| corrupt(position, format!("dangling reference: {err}"))),
        other => Ok(other),
    }
}

fn parse_media_box(
    document: &Document,
    value: &Object,
    position: usize,
) -> Result<PageSize, RenderError> {
    let array = value
        .as_array()
        .map_err(|_| corrupt(position, "MediaBox is not an array".to_string()))?;
    if array.len() != 4 {
        return Err(corrupt(
            position,
            format!("MediaBox has {} entries", array.len()),
        ));
    }

    let mut coords = [0.0f32; 4];
    for (coord, item) in coords.iter_mut().zip(array) {
        *coord = resolve(document, item, position)?
            .as_float()
            .map_err(|_| corrupt(position, "MediaBox entry is not a number".to_string()))?;
    }

    if coords.iter().any(|coord| !coord.is_finite()) {
        return Err(corrupt(position, "MediaBox entry is not finite".to_string()));
    }

    let [x0, y0, x1, y1] = coords;
    let size = PageSize {
        width_pt: (x1 - x0).abs(),
        height_pt: (y1 - y0).abs(),
    };
    if size.width_pt == 0.0 || size.height_pt == 0.0 {
        return Err(corrupt(position, "MediaBox is empty".to_string()));
    }
    if !(size.width_pt.is_finite() && size.height_pt.is_finite()) {
        return Err(corrupt(position, "MediaBox is too large".to_string()));
    }
    Ok(size)
}

fn corrupt(position: usize, reason: String) -> RenderError {
    RenderError::Corrupt { position, reason }
}

/// Pick the best available backend: pdfium when compiled in and the library
/// binds, the preview renderer otherwise.
pub fn default_renderer(options: RenderOptions, library: Option<&Path>) -> Box<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        let bound = match library {
            Some(path) => pdfium_backend::PdfiumRenderer::from_library_path(path, options),
            None => pdfium_backend::PdfiumRenderer::from_system_library(options),
        };
        match bound {
            Ok(renderer) => return Box::new(renderer),
            Err(err) => warn!("{}; falling back to preview thumbnails", err),
        }
    }

    #[cfg(not(feature = "pdfium"))]
    if let Some(path) = library {
        warn!(
            "Ignoring pdfium library {}: built without the `pdfium` feature",
            path.display()
        );
    }

    Box::new(PreviewRenderer::new(options))
}

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::*;
    use pdfium_render::prelude::*;

    /// Rasterizes real page content through the pdfium shared library.
    pub struct PdfiumRenderer {
        pdfium: Pdfium,
        options: RenderOptions,
    }

    impl PdfiumRenderer {
        pub fn from_system_library(options: RenderOptions) -> Result<Self, RenderError> {
            let bindings = Pdfium::bind_to_system_library().map_err(|err| {
                RenderError::Backend(format!("failed to bind pdfium system library: {err}"))
            })?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
                options,
            })
        }

        pub fn from_library_path(path: &Path, options: RenderOptions) -> Result<Self, RenderError> {
            let bindings = Pdfium::bind_to_library(path).map_err(|err| {
                RenderError::Backend(format!(
                    "failed to bind pdfium library {}: {err}",
                    path.display()
                ))
            })?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
                options,
            })
        }

        fn render_from_bytes(
            &self,
            bytes: &[u8],
            positions: std::ops::Range<usize>,
        ) -> Vec<Result<RgbaImage, RenderError>> {
            let document = match self.pdfium.load_pdf_from_byte_slice(bytes, None) {
                Ok(document) => document,
                Err(err) => {
                    let message = format!("pdfium could not load document: {err}");
                    return positions
                        .map(|_| Err(RenderError::Backend(message.clone())))
                        .collect();
                }
            };

            let config = PdfRenderConfig::new()
                .scale_page_by_factor(self.options.effective_scale())
                .set_maximum_width(MAX_EDGE_PX as Pixels)
                .set_maximum_height(MAX_EDGE_PX as Pixels);
            let pages = document.pages();
            let page_count = usize::from(pages.len());

            positions
                .map(|position| {
                    let out_of_range = || RenderError::OutOfRange {
                        position,
                        page_count,
                    };
                    let index = PdfPageIndex::try_from(position).map_err(|_| out_of_range())?;
                    let page = pages.get(index).map_err(|_| out_of_range())?;
                    let bitmap = page
                        .render_with_config(&config)
                        .map_err(|err| corrupt(position, err.to_string()))?;
                    debug!("Rendered page {} with pdfium", position);
                    RgbaImage::from_raw(
                        bitmap.width() as u32,
                        bitmap.height() as u32,
                        bitmap.as_rgba_bytes(),
                    )
                    .ok_or_else(|| RenderError::Backend("bitmap size mismatch".to_string()))
                })
                .collect()
        }
    }

    fn serialize(document: &Document) -> Result<Vec<u8>, RenderError> {
        let mut copy = document.clone();
        let mut bytes = Vec::new();
        copy.save_to(&mut bytes)
            .map_err(|err| RenderError::Backend(format!("failed to serialize document: {err}")))?;
        Ok(bytes)
    }

    impl PageRenderer for PdfiumRenderer {
        fn render(&self, document: &Document, position: usize) -> Result<RgbaImage, RenderError> {
            let bytes = serialize(document)?;
            self.render_from_bytes(&bytes, position..position + 1)
                .pop()
                .unwrap_or_else(|| Err(RenderError::Backend("no page rendered".to_string())))
        }

        fn render_all(&self, document: &Document) -> Vec<Result<RgbaImage, RenderError>> {
            let page_count = document.get_pages().len();
            match serialize(document) {
                Ok(bytes) => self.render_from_bytes(&bytes, 0..page_count),
                Err(err) => {
                    let message = err.to_string();
                    (0..page_count)
                        .map(|_| Err(RenderError::Backend(message.clone())))
                        .collect()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::sample_document;
    use lopdf::dictionary;

    #[test]
    fn test_preview_uses_scale() {
        let doc = sample_document(&["A"]);
        let image = PreviewRenderer::default().render(&doc, 0).unwrap();
        assert_eq!((image.width(), image.height()), (918, 1188));
    }

    #[test]
    fn test_preview_out_of_range() {
        let doc = sample_document(&["A", "B"]);
        let err = PreviewRenderer::default().render(&doc, 2).unwrap_err();
        assert!(matches!(
            err,
            RenderError::OutOfRange {
                position: 2,
                page_count: 2
            }
        ));
    }

    #[test]
    fn test_page_level_media_box_and_rotation() {
        let mut doc = sample_document(&["A", "B"]);
        let page_id = *doc.get_pages().get(&2).unwrap();
        let page = doc.get_dictionary_mut(page_id).unwrap();
        page.set(
            "MediaBox",
            vec![0.into(), 0.into(), 200.into(), Object::Real(100.5)],
        );
        page.set("Rotate", 90);

        assert_eq!(
            page_size(&doc, 0).unwrap(),
            PageSize {
                width_pt: 612.0,
                height_pt: 792.0
            }
        );
        assert_eq!(
            page_size(&doc, 1).unwrap(),
            PageSize {
                width_pt: 100.5,
                height_pt: 200.0
            }
        );
    }

    #[test]
    fn test_malformed_media_box_is_corrupt() {
        let mut doc = sample_document(&["A"]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("MediaBox", vec![0.into(), 0.into(), 612.into()]);

        let err = PreviewRenderer::default().render(&doc, 0).unwrap_err();
        assert!(matches!(err, RenderError::Corrupt { position: 0, .. }));
    }

    #[test]
    fn test_missing_media_box_defaults_to_letter() {
        let mut doc = sample_document(&["A"]);
        let pages_id = doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .and_then(Object::as_reference)
            .unwrap();
        doc.get_dictionary_mut(pages_id).unwrap().remove(b"MediaBox");

        assert_eq!(page_size(&doc, 0).unwrap(), LETTER);
    }

    #[test]
    fn test_huge_page_is_scaled_to_max_edge() {
        let mut doc = sample_document(&["A"]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        doc.get_dictionary_mut(page_id).unwrap().set(
            "MediaBox",
            vec![0.into(), 0.into(), 14400.into(), 7200.into()],
        );

        let image = PreviewRenderer::default().render(&doc, 0).unwrap();
        assert_eq!((image.width(), image.height()), (MAX_EDGE_PX, MAX_EDGE_PX / 2));
    }

    #[test]
    fn test_sliver_page_keeps_one_pixel() {
        let size = PageSize {
            width_pt: 1e9,
            height_pt: 1.0,
        };
        assert_eq!(
            thumbnail_dimensions(size, DEFAULT_SCALE, 0).unwrap(),
            (MAX_EDGE_PX, 1)
        );
    }

    #[test]
    fn test_non_finite_media_box_is_corrupt() {
        let mut doc = sample_document(&["A"]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        doc.get_dictionary_mut(page_id).unwrap().set(
            "MediaBox",
            vec![0.into(), 0.into(), Object::Real(f32::INFINITY), 792.into()],
        );

        let err = PreviewRenderer::default().render(&doc, 0).unwrap_err();
        assert!(matches!(err, RenderError::Corrupt { position: 0, .. }));

        doc.get_dictionary_mut(page_id).unwrap().set(
            "MediaBox",
            vec![
                Object::Real(-f32::MAX),
                0.into(),
                Object::Real(f32::MAX),
                792.into(),
            ],
        );
        let err = PreviewRenderer::default().render(&doc, 0).unwrap_err();
        assert!(matches!(err, RenderError::Corrupt { position: 0, .. }));
    }

    #[test]
    fn test_render_all_one_result_per_page() {
        let mut doc = sample_document(&["A", "B", "C"]);
        let page_id = *doc.get_pages().get(&2).unwrap();
        let broken = doc.add_object(dictionary! { "Kind" => "broken" });
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("MediaBox", broken);

        let results = PreviewRenderer::default().render_all(&doc);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_default_renderer_renders() {
        let doc = sample_document(&["A"]);
        let renderer = default_renderer(RenderOptions { scale: 0.5 }, None);
        let image = renderer.render(&doc, 0).unwrap();
        assert!(image.width() > 0 && image.height() > 0);
    }
}
