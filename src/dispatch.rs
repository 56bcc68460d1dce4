//! Extension-pair dispatch.
//!
//! A [`ConversionRequest`] carries the user's `(source, target)` extensions;
//! [`Route::resolve`] maps the pair to exactly one conversion routine or fails
//! with [`ConvertError::UnsupportedConversion`]. Resolution is pure: it never
//! touches the filesystem.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Every supported `(source, target)` pair, in display order.
pub const SUPPORTED_PAIRS: &[(&str, &str)] = &[
    ("jpg", "pdf"),
    ("jpeg", "pdf"),
    ("png", "pdf"),
    ("txt", "pdf"),
    ("docx", "pdf"),
    ("pptx", "pdf"),
    ("xlsx", "pdf"),
    ("pdf", "jpg"),
    ("pdf", "jpeg"),
    ("pdf", "png"),
    ("pdf", "txt"),
    ("pdf", "pptx"),
    ("pdf", "xlsx"),
];

/// Normalise a user-supplied extension: trim, drop a leading dot, lower-case.
pub fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// The dispatch key. Displays as `"src->tgt"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionPair {
    pub source: String,
    pub target: String,
}

impl ExtensionPair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: normalize_ext(source),
            target: normalize_ext(target),
        }
    }
}

impl fmt::Display for ExtensionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Raster formats produced by PDF→Image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Jpeg,
    Png,
}

impl RasterFormat {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
            RasterFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterFormat::Jpeg => f.write_str("jpeg"),
            RasterFormat::Png => f.write_str("png"),
        }
    }
}

/// One conversion routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    ImageToPdf,
    TextToPdf,
    PresentationToPdf,
    SpreadsheetToPdf,
    PdfToImage(RasterFormat),
    PdfToText,
    PdfToPresentation,
    PdfToSpreadsheet,
}

impl Route {
    /// Select the route for `pair`.
    pub fn resolve(pair: &ExtensionPair) -> Result<Route, ConvertError> {
        let route = match (pair.source.as_str(), pair.target.as_str()) {
            ("jpg" | "jpeg" | "png", "pdf") => Route::ImageToPdf,
            ("txt" | "docx", "pdf") => Route::TextToPdf,
            ("pptx", "pdf") => Route::PresentationToPdf,
            ("xlsx", "pdf") => Route::SpreadsheetToPdf,
            ("pdf", "jpg" | "jpeg") => Route::PdfToImage(RasterFormat::Jpeg),
            ("pdf", "png") => Route::PdfToImage(RasterFormat::Png),
            ("pdf", "txt") => Route::PdfToText,
            ("pdf", "pptx") => Route::PdfToPresentation,
            ("pdf", "xlsx") => Route::PdfToSpreadsheet,
            _ => {
                return Err(ConvertError::UnsupportedConversion {
                    pair: pair.to_string(),
                })
            }
        };
        Ok(route)
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::ImageToPdf => "image->pdf",
            Route::TextToPdf => "text->pdf",
            Route::PresentationToPdf => "presentation->pdf",
            Route::SpreadsheetToPdf => "spreadsheet->pdf",
            Route::PdfToImage(_) => "pdf->image",
            Route::PdfToText => "pdf->text",
            Route::PdfToPresentation => "pdf->presentation",
            Route::PdfToSpreadsheet => "pdf->spreadsheet",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single conversion: input file, extension pair, and derived output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub pair: ExtensionPair,
    pub output_path: PathBuf,
}

impl ConversionRequest {
    /// Build a request; the output path is the input path with its extension
    /// replaced by `target_ext`.
    pub fn new(input_path: impl Into<PathBuf>, source_ext: &str, target_ext: &str) -> Self {
        let input_path = input_path.into();
        let pair = ExtensionPair::new(source_ext, target_ext);
        let output_path = derive_output_path(&input_path, &pair.target);
        Self {
            input_path,
            pair,
            output_path,
        }
    }

    pub fn route(&self) -> Result<Route, ConvertError> {
        Route::resolve(&self.pair)
    }
}

/// `photo.jpg` + `pdf` → `photo.pdf`; `notes` + `pdf` → `notes.pdf`.
pub fn derive_output_path(input: &Path, target_ext: &str) -> PathBuf {
    input.with_extension(target_ext)
}
