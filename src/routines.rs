//! One conversion routine per [`Route`].
//!
//! Every routine follows the same contract: read the input, call the
//! capabilities it needs, write the output file(s), and return what it wrote.
//! The first error aborts the routine; outputs already written by a
//! multi-page routine stay on disk, temporary files do not.

use crate::config::ConversionConfig;
use crate::dispatch::{ConversionRequest, RasterFormat, Route};
use crate::engine::{Capabilities, PageContent, PageItem};
use crate::error::ConvertError;
use crate::formats::pptx::PresentationBuilder;
use crate::formats::{docx, image as raster, xlsx};
use crate::geometry::{fit_to_page, raster_page_size};
use crate::layout::layout_text;
use crate::progress::{ConversionProgressCallback, NoopProgressCallback};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Files written by a routine and the number of pages it handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineOutput {
    pub outputs: Vec<PathBuf>,
    pub pages: usize,
}

impl RoutineOutput {
    fn single(output: &Path, pages: usize) -> Self {
        Self {
            outputs: vec![output.to_path_buf()],
            pages,
        }
    }
}

/// Run the routine for `route`.
pub fn run(
    route: Route,
    request: &ConversionRequest,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    let input = request.input_path.as_path();
    let output = request.output_path.as_path();
    match route {
        Route::ImageToPdf => image_to_pdf(input, output, config, caps),
        Route::TextToPdf => text_to_pdf(input, &request.pair.source, output, config, caps),
        Route::PresentationToPdf | Route::SpreadsheetToPdf => {
            office_to_pdf(input, output, config, caps)
        }
        Route::PdfToImage(format) => pdf_to_image(input, output, format, config, caps),
        Route::PdfToText => pdf_to_text(input, output, config, caps),
        Route::PdfToPresentation => pdf_to_presentation(input, output, config, caps),
        Route::PdfToSpreadsheet => pdf_to_spreadsheet(input, output, config, caps),
    }
}

fn progress(config: &ConversionConfig) -> &dyn ConversionProgressCallback {
    match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &NoopProgressCallback,
    }
}

/// Wrap a single-shot step in start/page/complete events.
fn single_shot<T>(
    config: &ConversionConfig,
    step: impl FnOnce() -> Result<T, ConvertError>,
) -> Result<T, ConvertError> {
    let cb = progress(config);
    cb.on_conversion_start(1);
    let value = step()?;
    cb.on_page_complete(1, 1);
    cb.on_conversion_complete(1);
    Ok(value)
}

// ── Into PDF ─────────────────────────────────────────────────────────────────

/// Decode the image, fit it on one page, write the PDF.
pub fn image_to_pdf(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    single_shot(config, || {
        let image = raster::load_image(input)?;
        let geometry = fit_to_page(image.width(), image.height(), config.page_size);
        debug!(
            "Placing {}x{} px at ({:.2}, {:.2}) mm, {:.2}x{:.2} mm",
            image.width(),
            image.height(),
            geometry.offset_x,
            geometry.offset_y,
            geometry.content_width,
            geometry.content_height
        );

        let page = PageContent {
            size: config.page_size,
            items: vec![PageItem::Image { image, geometry }],
        };
        caps.page_writer.write_pdf(&[page], output)?;
        Ok(RoutineOutput::single(output, 1))
    })
}

/// Read plain text (or the paragraphs of a `.docx`), lay it out, write the PDF.
pub fn text_to_pdf(
    input: &Path,
    source_ext: &str,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    let text = if source_ext == "docx" {
        docx::extract_text(input)?
    } else {
        read_text_lossy(input)?
    };

    let pages = layout_text(&text, config);
    let cb = progress(config);
    cb.on_conversion_start(pages.len());
    caps.page_writer.write_pdf(&pages, output)?;
    for page_num in 1..=pages.len() {
        cb.on_page_complete(page_num, pages.len());
    }
    cb.on_conversion_complete(pages.len());

    info!("Laid out {} chars on {} page(s)", text.len(), pages.len());
    Ok(RoutineOutput::single(output, pages.len()))
}

/// Hand the document to the office suite's own PDF export.
pub fn office_to_pdf(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    single_shot(config, || {
        caps.office.export_pdf(input, output)?;
        Ok(RoutineOutput::single(output, 1))
    })
}

fn read_text_lossy(path: &Path) -> Result<String, ConvertError> {
    let bytes = std::fs::read(path).map_err(|e| ConvertError::input(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ── Out of PDF ───────────────────────────────────────────────────────────────

/// Path of page `index` out of `total` rasters.
///
/// A single page keeps `output` as is; otherwise pages are numbered from zero
/// as `stem-N.ext` next to `output`.
pub fn page_output_path(output: &Path, index: usize, total: usize) -> PathBuf {
    if total == 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    output.with_file_name(name)
}

/// Rasterise every page and write one image file per page.
pub fn pdf_to_image(
    input: &Path,
    output: &Path,
    format: RasterFormat,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    let cb = progress(config);
    let mut outputs = Vec::new();

    let mut sink = |idx: usize, total: usize, image: DynamicImage| -> Result<(), ConvertError> {
        if idx == 0 {
            cb.on_conversion_start(total);
        }
        let path = page_output_path(output, idx, total);
        raster::encode_raster(&image, format, config.jpeg_quality, &path)?;
        debug!("Page {}/{} → {}", idx + 1, total, path.display());
        outputs.push(path);
        cb.on_page_complete(idx + 1, total);
        Ok(())
    };
    let pages = caps.rasterizer.render_pages(input, config.dpi, &mut sink)?;
    cb.on_conversion_complete(pages);

    info!("Rendered {} page(s) at {} DPI", pages, config.dpi);
    Ok(RoutineOutput { outputs, pages })
}

/// Extract the text of every page and write it verbatim.
pub fn pdf_to_text(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    single_shot(config, || {
        let text = caps.text_extractor.extract_text(input)?;
        std::fs::write(output, text.as_bytes()).map_err(|e| ConvertError::output(output, e))?;
        info!("Wrote {} bytes of text", text.len());
        Ok(RoutineOutput::single(output, 1))
    })
}

/// Rasterise every page to a temporary JPEG, then build one slide per page.
pub fn pdf_to_presentation(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    let scratch = TempDir::with_prefix("docshift-slides-")
        .map_err(|e| ConvertError::Internal(format!("tempdir: {e}")))?;
    let cb = progress(config);
    let mut builder: Option<PresentationBuilder> = None;

    let mut sink = |idx: usize, total: usize, image: DynamicImage| -> Result<(), ConvertError> {
        if idx == 0 {
            cb.on_conversion_start(total);
        }
        let jpeg_path = scratch.path().join(format!("temp_page_{idx}.jpg"));
        raster::encode_raster(&image, RasterFormat::Jpeg, config.jpeg_quality, &jpeg_path)?;
        let jpeg = std::fs::read(&jpeg_path).map_err(|e| ConvertError::Io {
            path: jpeg_path.clone(),
            source: e,
        })?;

        // Slide size follows the first page.
        let deck = builder.get_or_insert_with(|| {
            PresentationBuilder::new(raster_page_size(image.width(), image.height(), config.dpi))
        });
        let geometry = fit_to_page(image.width(), image.height(), deck.slide_size());
        deck.add_slide(jpeg, geometry);

        cb.on_page_complete(idx + 1, total);
        Ok(())
    };
    let pages = caps.rasterizer.render_pages(input, config.dpi, &mut sink)?;

    let deck = builder.unwrap_or_else(|| PresentationBuilder::new(config.page_size));
    deck.save(output)?;
    cb.on_conversion_complete(pages);

    info!("Wrote {} slide(s)", deck.slide_count());
    Ok(RoutineOutput::single(output, pages))
}

/// Extract text, then write one line per row into column A.
pub fn pdf_to_spreadsheet(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<RoutineOutput, ConvertError> {
    single_shot(config, || {
        let text = caps.text_extractor.extract_text(input)?;
        let rows = xlsx::write_lines_sheet(text.lines(), config.max_sheet_rows, output)?;
        info!("Wrote {} row(s)", rows);
        Ok(RoutineOutput::single(output, 1))
    })
}
