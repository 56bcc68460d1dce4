//! Error type for the docshift library.
//!
//! Every failure is terminal: a conversion either completes or returns one
//! [`ConvertError`]. Nothing is retried and nothing is rolled back. The
//! variants fall into four families, and [`ConvertError::exit_code`] maps each
//! family to the process exit status used by the `converter` binary:
//!
//! | Family | Exit code |
//! |--------|-----------|
//! | usage / configuration | 1 |
//! | unsupported extension pair | 2 |
//! | file I/O | 3 |
//! | external library (pdfium, LibreOffice, writers) | 4 |

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docshift library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Dispatch errors ───────────────────────────────────────────────────
    /// The `(source, target)` extension pair has no conversion route.
    #[error("Unsupported conversion '{pair}'\nRun `converter --list` to see supported pairs.")]
    UnsupportedConversion { pair: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Reading an input (or a temporary file) failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The image could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The decoded image has a zero width or height.
    #[error("Image '{path}' has zero dimensions ({width}x{height})")]
    EmptyImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    /// A rendered page could not be encoded to the target raster format.
    #[error("Failed to encode {format} image '{path}': {detail}")]
    ImageEncode {
        path: PathBuf,
        format: String,
        detail: String,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF could not be opened or parsed.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium failed to render a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    Rasterisation { page: usize, detail: String },

    /// pdfium failed to extract the text of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtraction { page: usize, detail: String },

    /// Building or saving a generated PDF failed.
    #[error("Failed to write PDF '{path}': {detail}")]
    PdfWrite { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the converter binary, or set\n\
PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Office errors ─────────────────────────────────────────────────────
    /// A source office document is malformed.
    #[error("Invalid document '{path}': {detail}")]
    InvalidDocument { path: PathBuf, detail: String },

    /// LibreOffice is not installed or not found.
    #[error("LibreOffice not found. Install LibreOffice and ensure 'soffice' is in PATH, or pass --soffice")]
    OfficeSuiteNotFound,

    /// LibreOffice ran but did not produce a PDF.
    #[error("LibreOffice conversion failed for '{path}': {message}")]
    OfficeConversionFailed { path: PathBuf, message: String },

    /// LibreOffice exceeded the configured timeout and was killed.
    #[error("LibreOffice conversion timed out after {timeout_secs} seconds for '{path}'")]
    OfficeTimeout { path: PathBuf, timeout_secs: u64 },

    /// The XLSX writer failed.
    #[error("Failed to write spreadsheet '{path}': {detail}")]
    SpreadsheetWrite { path: PathBuf, detail: String },

    /// Packaging the PPTX failed.
    #[error("Failed to write presentation '{path}': {detail}")]
    PresentationWrite { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::InvalidConfig(_) => 1,
            ConvertError::UnsupportedConversion { .. } => 2,
            ConvertError::InputNotFound { .. }
            | ConvertError::Io { .. }
            | ConvertError::OutputWriteFailed { .. } => 3,
            _ => 4,
        }
    }

    /// Wrap an input-side `io::Error`, mapping `NotFound` to [`ConvertError::InputNotFound`].
    pub(crate) fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConvertError::InputNotFound { path }
        } else {
            ConvertError::Io { path, source }
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unsupported_display_names_pair() {
        let e = ConvertError::UnsupportedConversion {
            pair: "docx->xlsx".into(),
        };
        assert!(e.to_string().contains("docx->xlsx"), "got: {e}");
    }

    #[test]
    fn exit_codes_by_family() {
        assert_eq!(ConvertError::InvalidConfig("x".into()).exit_code(), 1);
        assert_eq!(
            ConvertError::UnsupportedConversion { pair: "a->b".into() }.exit_code(),
            2
        );
        assert_eq!(
            ConvertError::InputNotFound { path: "a.jpg".into() }.exit_code(),
            3
        );
        assert_eq!(
            ConvertError::output("out.pdf", io::Error::other("disk full")).exit_code(),
            3
        );
        assert_eq!(ConvertError::OfficeSuiteNotFound.exit_code(), 4);
        assert_eq!(
            ConvertError::Rasterisation {
                page: 1,
                detail: "x".into()
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn input_maps_not_found() {
        let e = ConvertError::input("missing.txt", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(e, ConvertError::InputNotFound { .. }));

        let e = ConvertError::input(
            "locked.txt",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(e, ConvertError::Io { .. }));
    }

    #[test]
    fn timeout_display() {
        let e = ConvertError::OfficeTimeout {
            path: "deck.pptx".into(),
            timeout_secs: 120,
        };
        assert!(e.to_string().contains("120 seconds"));
        assert!(e.to_string().contains("deck.pptx"));
    }
}
