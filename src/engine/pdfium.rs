//! pdfium-backed capabilities: rasterisation, text extraction, PDF authoring.
//!
//! The pdfium library is bound lazily on first use, so routes that never
//! touch a PDF (office exports) run on machines without libpdfium. Every
//! document handle is scoped to the call that opened it.

use super::{DocumentTextExtractor, PageContent, PageItem, PageSink, PageWriter, Rasterizer};
use crate::error::ConvertError;
use crate::geometry::MM_PER_PT;
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// pdfium engine implementing [`Rasterizer`], [`DocumentTextExtractor`] and [`PageWriter`].
#[derive(Default)]
pub struct PdfiumEngine {
    library: Option<PathBuf>,
    font: Option<PathBuf>,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumEngine {
    /// Engine that locates libpdfium with [`pdfium_locate::bind_pdfium`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine bound to an explicit library file.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
            ..Self::default()
        }
    }

    /// Embed the TrueType font at `path` for text pages instead of Helvetica.
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    fn pdfium(&self) -> Result<&Pdfium, ConvertError> {
        self.pdfium.get_or_try_init(|| {
            let bound = match self.library {
                Some(ref path) => pdfium_locate::bind_pdfium_from_path(path),
                None => pdfium_locate::bind_pdfium(),
            };
            let pdfium = bound.map_err(|e| ConvertError::PdfiumBindingFailed(e.to_string()))?;
            debug!("pdfium bound");
            Ok(pdfium)
        })
    }

    fn open<'a>(&'a self, pdf: &Path) -> Result<PdfDocument<'a>, ConvertError> {
        if !pdf.exists() {
            return Err(ConvertError::InputNotFound {
                path: pdf.to_path_buf(),
            });
        }
        self.pdfium()?
            .load_pdf_from_file(pdf, None)
            .map_err(|e| ConvertError::CorruptPdf {
                path: pdf.to_path_buf(),
                detail: format!("{:?}", e),
            })
    }
}

impl Rasterizer for PdfiumEngine {
    fn render_pages(
        &self,
        pdf: &Path,
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, ConvertError> {
        let document = self.open(pdf)?;
        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        let scale = dpi as f32 / 72.0;
        for (idx, page) in pages.iter().enumerate() {
            let width = (page.width().value * scale).round().max(1.0) as i32;
            let height = (page.height().value * scale).round().max(1.0) as i32;

            let render_config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConvertError::Rasterisation {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            sink(idx, total, image)?;
        }

        Ok(total)
    }
}

impl DocumentTextExtractor for PdfiumEngine {
    fn extract_text(&self, pdf: &Path) -> Result<String, ConvertError> {
        let document = self.open(pdf)?;

        let mut pages_text = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page.text().map_err(|e| ConvertError::TextExtraction {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;
            pages_text.push(text.all());
        }

        let text = pages_text.join("\n");
        debug!("Extracted {} chars from {} pages", text.len(), pages_text.len());
        Ok(text)
    }
}

impl PageWriter for PdfiumEngine {
    fn write_pdf(&self, pages: &[PageContent], output: &Path) -> Result<(), ConvertError> {
        let pdf_err = |e: PdfiumError| ConvertError::PdfWrite {
            path: output.to_path_buf(),
            detail: format!("{:?}", e),
        };

        let mut document = self.pdfium()?.create_new_pdf().map_err(pdf_err)?;
        let font = match self.font {
            // CID encoding so glyphs outside WinAnsi (Cyrillic, Greek, CJK) survive.
            Some(ref path) => document
                .fonts_mut()
                .load_true_type_from_file(path, true)
                .map_err(pdf_err)?,
            None => document.fonts_mut().helvetica(),
        };

        for content in pages {
            let page_height = content.size.height_mm;
            let mut page = document
                .pages_mut()
                .create_page_at_end(PdfPagePaperSize::Custom(
                    mm(content.size.width_mm),
                    mm(page_height),
                ))
                .map_err(pdf_err)?;

            for item in &content.items {
                match item {
                    PageItem::Image { image, geometry } => {
                        // PDF space grows upwards from the bottom-left corner.
                        let bottom = page_height - geometry.offset_y - geometry.content_height;
                        page.objects_mut()
                            .create_image_object(
                                mm(geometry.offset_x),
                                mm(bottom),
                                image,
                                Some(mm(geometry.content_width)),
                                Some(mm(geometry.content_height)),
                            )
                            .map_err(pdf_err)?;
                    }
                    PageItem::Text {
                        text,
                        x_mm,
                        baseline_mm,
                        font_size_pt,
                    } => {
                        page.objects_mut()
                            .create_text_object(
                                mm(*x_mm),
                                mm(page_height - baseline_mm),
                                text,
                                font,
                                PdfPoints::new(*font_size_pt as f32),
                            )
                            .map_err(pdf_err)?;
                    }
                }
            }
        }

        document.save_to_file(output).map_err(pdf_err)?;
        info!("Wrote {} page(s) to {}", pages.len(), output.display());
        Ok(())
    }
}

fn mm(value: f64) -> PdfPoints {
    PdfPoints::new((value / MM_PER_PT) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimetres_to_points() {
        assert!((mm(25.4).value - 72.0).abs() < 1e-4);
        assert!((mm(210.0).value - 595.28).abs() < 0.01);
    }

    #[test]
    fn missing_input_fails_before_binding() {
        let engine = PdfiumEngine::with_library("/nonexistent/libpdfium.so");
        let err = engine
            .extract_text(Path::new("/nonexistent/input.pdf"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }), "{err:?}");
    }

    #[test]
    fn bad_library_path_is_a_binding_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();

        let engine = PdfiumEngine::with_library(dir.path().join("libpdfium.so"));
        let err = engine.extract_text(&pdf).unwrap_err();
        assert!(matches!(err, ConvertError::PdfiumBindingFailed(_)), "{err:?}");
    }
}
