//! # docshift
//!
//! Convert between PDF and everyday document formats, one file at a time.
//!
//! A conversion is chosen by an extension pair such as `jpg->pdf` or
//! `pdf->xlsx`. Each supported pair maps to exactly one routine; anything else
//! is rejected before a file is read.
//!
//! ## Pipeline Overview
//!
//! ```text
//! (input, source ext, target ext)
//!  │
//!  ├─ 1. Request   normalise extensions, derive the output path
//!  ├─ 2. Dispatch  extension pair → Route (or UnsupportedConversion)
//!  ├─ 3. Routine   read input, call capabilities, write output file(s)
//!  └─ 4. Report    route, outputs, pages, duration
//! ```
//!
//! | Pair | Engine |
//! |------|--------|
//! | `jpg`/`jpeg`/`png` → `pdf` | image decode + page fit, pdfium authoring |
//! | `txt`/`docx` → `pdf` | Helvetica text layout, pdfium authoring |
//! | `pptx`/`xlsx` → `pdf` | LibreOffice headless export |
//! | `pdf` → `jpg`/`jpeg`/`png` | pdfium rasterisation |
//! | `pdf` → `txt` | pdfium text extraction |
//! | `pdf` → `pptx` | pdfium rasterisation, one picture per slide |
//! | `pdf` → `xlsx` | pdfium text extraction, one line per row |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshift::{convert, ConversionConfig, ConversionRequest};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(150).build()?;
//!     let request = ConversionRequest::new("report.pdf", "pdf", "png");
//!     let report = convert(&request, &config)?;
//!     for path in &report.outputs {
//!         println!("wrote {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `converter` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docshift = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod layout;
pub mod progress;
pub mod routines;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_with, ConversionReport};
pub use dispatch::{ConversionRequest, ExtensionPair, RasterFormat, Route, SUPPORTED_PAIRS};
pub use engine::{
    Capabilities, DocumentTextExtractor, OfficeExporter, PageContent, PageItem, PageWriter,
    Rasterizer,
};
pub use error::ConvertError;
pub use geometry::{fit_to_page, PageGeometry, PageSize};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
