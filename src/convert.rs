//! Conversion entry points.
//!
//! Both entry points run the same sequence: resolve the route from the
//! extension pair (no filesystem access yet), execute the routine, and report
//! what was written. [`convert`] wires in pdfium and LibreOffice;
//! [`convert_with`] takes any [`Capabilities`], which is how the routines are
//! exercised against fakes.

use crate::config::ConversionConfig;
use crate::dispatch::{ConversionRequest, Route};
use crate::engine::{Capabilities, LibreOffice, PdfiumEngine};
use crate::error::ConvertError;
use crate::routines;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// The routine that ran.
    pub route: Route,
    /// Input file as given.
    pub input: PathBuf,
    /// Every file written, in page order.
    pub outputs: Vec<PathBuf>,
    /// Pages handled (rendered, laid out or exported).
    pub pages: usize,
    /// Wall-clock time of the routine.
    pub duration_ms: u64,
}

/// Convert `request.input_path` according to its extension pair.
///
/// The pdfium library is only bound if the route needs it, so office exports
/// work without libpdfium installed.
///
/// # Errors
/// [`ConvertError::UnsupportedConversion`] for an unknown pair, before any
/// file is touched; otherwise the first error raised by the routine.
///
/// # Example
/// ```rust,no_run
/// use docshift::{convert, ConversionConfig, ConversionRequest};
///
/// let request = ConversionRequest::new("photo.jpg", "jpg", "pdf");
/// let report = convert(&request, &ConversionConfig::default())?;
/// assert_eq!(report.outputs[0].to_str(), Some("photo.pdf"));
/// # Ok::<(), docshift::ConvertError>(())
/// ```
pub fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionReport, ConvertError> {
    let pdfium = match config.font_path {
        Some(ref font) => PdfiumEngine::new().with_font(font),
        None => PdfiumEngine::new(),
    };
    let office = LibreOffice::new(
        config.soffice_path.clone(),
        Duration::from_secs(config.office_timeout_secs),
    );
    let caps = Capabilities {
        rasterizer: &pdfium,
        text_extractor: &pdfium,
        page_writer: &pdfium,
        office: &office,
    };
    convert_with(request, config, caps)
}

/// Like [`convert`], with caller-supplied capabilities.
pub fn convert_with(
    request: &ConversionRequest,
    config: &ConversionConfig,
    caps: Capabilities<'_>,
) -> Result<ConversionReport, ConvertError> {
    let route = request.route()?;
    info!(
        "Converting {} ({}, {})",
        request.input_path.display(),
        request.pair,
        route
    );
    debug!("Output path: {}", request.output_path.display());

    let start = Instant::now();
    let done = routines::run(route, request, config, caps)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} file(s), {} page(s) in {}ms",
        done.outputs.len(),
        done.pages,
        duration_ms
    );

    Ok(ConversionReport {
        route,
        input: request.input_path.clone(),
        outputs: done.outputs,
        pages: done.pages,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_pair_fails_before_io() {
        let request = ConversionRequest::new("/nonexistent/report.docx", "docx", "xlsx");
        let err = convert(&request, &ConversionConfig::default()).unwrap_err();
        assert!(
            matches!(err, ConvertError::UnsupportedConversion { ref pair } if pair == "docx->xlsx"),
            "{err:?}"
        );
        assert!(!PathBuf::from("/nonexistent/report.xlsx").exists());
    }

    #[test]
    fn report_serialises_route() {
        let report = ConversionReport {
            route: Route::PdfToText,
            input: "a.pdf".into(),
            outputs: vec!["a.txt".into()],
            pages: 1,
            duration_ms: 3,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["route"], "pdf_to_text");
        assert_eq!(json["outputs"][0], "a.txt");
    }
}
