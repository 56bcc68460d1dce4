//! Capability interfaces over the external engines.
//!
//! Routines never call pdfium or LibreOffice directly; they talk to these
//! traits so the dispatcher and every routine can run against fakes.
//!
//! ```text
//! Rasterizer             PDF page  → DynamicImage     (pdfium)
//! DocumentTextExtractor  PDF       → String           (pdfium)
//! PageWriter             [PageContent] → PDF file     (pdfium)
//! OfficeExporter         pptx/xlsx → PDF file         (LibreOffice)
//! ```

pub mod office;
pub mod pdfium;

use crate::error::ConvertError;
use crate::geometry::{PageGeometry, PageSize};
use image::DynamicImage;
use std::path::Path;

pub use office::LibreOffice;
pub use pdfium::PdfiumEngine;

/// Receives each rendered page: `(page_index_0based, total_pages, image)`.
pub type PageSink<'a> = dyn FnMut(usize, usize, DynamicImage) -> Result<(), ConvertError> + 'a;

/// Rasterises PDF pages.
pub trait Rasterizer {
    /// Render every page of `pdf` at `dpi`, handing each image to `sink` in
    /// page order. Returns the number of pages rendered.
    ///
    /// The first error from the engine or from `sink` aborts the walk.
    fn render_pages(
        &self,
        pdf: &Path,
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, ConvertError>;
}

/// Extracts plain text from a PDF.
pub trait DocumentTextExtractor {
    /// Text of all pages, pages joined with `\n`.
    fn extract_text(&self, pdf: &Path) -> Result<String, ConvertError>;
}

/// Writes generated pages to a PDF file.
pub trait PageWriter {
    fn write_pdf(&self, pages: &[PageContent], output: &Path) -> Result<(), ConvertError>;
}

/// Exports an office document to PDF with the office suite's own renderer.
pub trait OfficeExporter {
    fn export_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// The set of capabilities a conversion may use.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub rasterizer: &'a dyn Rasterizer,
    pub text_extractor: &'a dyn DocumentTextExtractor,
    pub page_writer: &'a dyn PageWriter,
    pub office: &'a dyn OfficeExporter,
}

/// One generated page and the items drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub size: PageSize,
    pub items: Vec<PageItem>,
}

impl PageContent {
    pub fn blank(size: PageSize) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }
}

/// Something drawn on a page. Coordinates are millimetres from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// A bitmap stretched over `geometry`'s content box.
    Image {
        image: DynamicImage,
        geometry: PageGeometry,
    },
    /// One line of Helvetica text whose baseline sits `baseline_mm` below the top edge.
    Text {
        text: String,
        x_mm: f64,
        baseline_mm: f64,
        font_size_pt: f64,
    },
}
