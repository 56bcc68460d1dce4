//! Configuration types for a conversion run.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Defaults reproduce the classic
//! converter behaviour: A4 pages, Helvetica 12 pt with 10 mm lines, 300 DPI
//! rasters, and a 1001-row spreadsheet cap.

use crate::error::ConvertError;
use crate::geometry::PageSize;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a single conversion.
///
/// # Example
/// ```rust
/// use docshift::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .page_size(PageSize::LETTER)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Raster resolution for PDF→Image and PDF→Presentation. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// JPEG quality (1–100) for rendered pages. Default: 90.
    pub jpeg_quality: u8,

    /// Size of generated pages for Image→PDF and Text→PDF. Default: A4.
    pub page_size: PageSize,

    /// Font size of laid-out text, in points. Default: 12.
    pub font_size_pt: f64,

    /// Distance between consecutive text lines, in millimetres. Default: 10.
    pub line_height_mm: f64,

    /// Left, right and top page margin for text, in millimetres. Default: 10.
    pub margin_mm: f64,

    /// TrueType font embedded for laid-out text. If None, the standard-14
    /// Helvetica is used, which only covers the WinAnsi character set.
    pub font_path: Option<PathBuf>,

    /// Bottom margin that triggers a page break, in millimetres. Default: 20.
    pub bottom_margin_mm: f64,

    /// Maximum number of rows written by PDF→Spreadsheet. Default: 1001.
    ///
    /// Rows are indexed from zero and the last written index is 1000; lines
    /// beyond the cap are dropped without error.
    pub max_sheet_rows: usize,

    /// Explicit LibreOffice binary. If None, common locations and `PATH` are searched.
    pub soffice_path: Option<PathBuf>,

    /// LibreOffice timeout in seconds. Default: 120.
    pub office_timeout_secs: u64,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            jpeg_quality: 90,
            page_size: PageSize::A4,
            font_size_pt: 12.0,
            line_height_mm: 10.0,
            margin_mm: 10.0,
            bottom_margin_mm: 20.0,
            font_path: None,
            max_sheet_rows: 1001,
            soffice_path: None,
            office_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("page_size", &self.page_size)
            .field("font_size_pt", &self.font_size_pt)
            .field("line_height_mm", &self.line_height_mm)
            .field("margin_mm", &self.margin_mm)
            .field("bottom_margin_mm", &self.bottom_margin_mm)
            .field("font_path", &self.font_path)
            .field("max_sheet_rows", &self.max_sheet_rows)
            .field("soffice_path", &self.soffice_path)
            .field("office_timeout_secs", &self.office_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Width available to a text line, in millimetres.
    pub fn text_width_mm(&self) -> f64 {
        self.page_size.width_mm - 2.0 * self.margin_mm
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn font_size_pt(mut self, pt: f64) -> Self {
        self.config.font_size_pt = pt;
        self
    }

    pub fn line_height_mm(mut self, mm: f64) -> Self {
        self.config.line_height_mm = mm;
        self
    }

    pub fn margin_mm(mut self, mm: f64) -> Self {
        self.config.margin_mm = mm;
        self
    }

    pub fn bottom_margin_mm(mut self, mm: f64) -> Self {
        self.config.bottom_margin_mm = mm;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn max_sheet_rows(mut self, rows: usize) -> Self {
        self.config.max_sheet_rows = rows;
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_path = Some(path.into());
        self
    }

    pub fn office_timeout_secs(mut self, secs: u64) -> Self {
        self.config.office_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.page_size.width_mm <= 0.0 || c.page_size.height_mm <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "page size must be positive, got {}x{} mm",
                c.page_size.width_mm, c.page_size.height_mm
            )));
        }
        if c.font_size_pt <= 0.0 || c.line_height_mm <= 0.0 {
            return Err(ConvertError::InvalidConfig(
                "font size and line height must be positive".into(),
            ));
        }
        if c.margin_mm < 0.0 || c.bottom_margin_mm < 0.0 {
            return Err(ConvertError::InvalidConfig("margins must be ≥ 0".into()));
        }
        if c.text_width_mm() <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "margins of {} mm leave no room on a {} mm wide page",
                c.margin_mm, c.page_size.width_mm
            )));
        }
        if c.page_size.height_mm - c.margin_mm - c.bottom_margin_mm < c.line_height_mm {
            return Err(ConvertError::InvalidConfig(
                "page is too short to hold a single line of text".into(),
            ));
        }
        if let Some(ref font) = c.font_path {
            if !font.is_file() {
                return Err(ConvertError::InvalidConfig(format!(
                    "font file not found: {}",
                    font.display()
                )));
            }
        }
        if c.max_sheet_rows == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_sheet_rows must be ≥ 1".into(),
            ));
        }
        if c.office_timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "office timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.page_size, PageSize::A4);
        assert_eq!(c.font_size_pt, 12.0);
        assert_eq!(c.max_sheet_rows, 1001);
        assert!((c.text_width_mm() - 190.0).abs() < 1e-9);
    }

    #[test]
    fn builder_clamps_dpi_and_quality() {
        let c = ConversionConfig::builder()
            .dpi(5000)
            .jpeg_quality(0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 600);
        assert_eq!(c.jpeg_quality, 1);
    }

    #[test]
    fn builder_rejects_margins_wider_than_page() {
        let err = ConversionConfig::builder().margin_mm(120.0).build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_row_cap() {
        assert!(ConversionConfig::builder().max_sheet_rows(0).build().is_err());
    }

    #[test]
    fn builder_rejects_missing_font_file() {
        let err = ConversionConfig::builder()
            .font_path("/nonexistent/DejaVuSans.ttf")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(ref m) if m.contains("DejaVuSans")));
    }

    #[test]
    fn builder_accepts_existing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        std::fs::write(&font, b"\0\x01\0\0").unwrap();
        let c = ConversionConfig::builder().font_path(&font).build().unwrap();
        assert_eq!(c.font_path.as_deref(), Some(font.as_path()));
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", ConversionConfig::default());
        assert!(dbg.contains("dpi: 300"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
