//! Page-fit geometry: place a bitmap on a fixed-size page.
//!
//! Pixels are converted to millimetres at 96 DPI, then the box is scaled so
//! that it touches the page on its dominant axis and centered on the other.
//! Images are never rotated or cropped.

use serde::{Deserialize, Serialize};

/// Millimetres per pixel at 96 DPI.
pub const MM_PER_PX: f64 = 0.264583;

/// Millimetres per PDF point (1/72 inch).
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Physical size of a generated page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A4 portrait.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// US Letter portrait.
    pub const LETTER: PageSize = PageSize {
        width_mm: 215.9,
        height_mm: 279.4,
    };

    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Look up a named size (`a4`, `letter`), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" | "us-letter" => Some(Self::LETTER),
            _ => None,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Placement of content within a page. All values in millimetres, origin at
/// the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub content_width: f64,
    pub content_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Fit a `width_px` × `height_px` bitmap onto `page`.
///
/// Both dimensions must be non-zero; callers reject empty images first.
pub fn fit_to_page(width_px: u32, height_px: u32, page: PageSize) -> PageGeometry {
    debug_assert!(width_px > 0 && height_px > 0, "empty image reached fit_to_page");

    let width = width_px as f64 * MM_PER_PX;
    let height = height_px as f64 * MM_PER_PX;
    let image_ratio = width / height;

    let (content_width, content_height) = if image_ratio > page.aspect_ratio() {
        (page.width_mm, page.width_mm / image_ratio)
    } else {
        (page.height_mm * image_ratio, page.height_mm)
    };

    PageGeometry {
        page_width: page.width_mm,
        page_height: page.height_mm,
        content_width,
        content_height,
        offset_x: (page.width_mm - content_width) / 2.0,
        offset_y: (page.height_mm - content_height) / 2.0,
    }
}

/// Physical page size of a raster rendered at `dpi`.
pub fn raster_page_size(width_px: u32, height_px: u32, dpi: u32) -> PageSize {
    let mm_per_px = 25.4 / dpi as f64;
    PageSize::new(width_px as f64 * mm_per_px, height_px as f64 * mm_per_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_fits(g: &PageGeometry, w: u32, h: u32) {
        assert!(g.content_width <= g.page_width + EPS, "{g:?}");
        assert!(g.content_height <= g.page_height + EPS, "{g:?}");
        assert!(g.offset_x >= -EPS && g.offset_y >= -EPS, "{g:?}");
        let full_w = (g.content_width - g.page_width).abs() < EPS;
        let full_h = (g.content_height - g.page_height).abs() < EPS;
        assert!(full_w || full_h, "no page dimension fully used: {g:?}");
        let expected = w as f64 / h as f64;
        assert!(
            (g.content_width / g.content_height - expected).abs() < 1e-6,
            "aspect drifted for {w}x{h}: {g:?}"
        );
        assert!((g.offset_x - (g.page_width - g.content_width) / 2.0).abs() < EPS);
        assert!((g.offset_y - (g.page_height - g.content_height) / 2.0).abs() < EPS);
    }

    #[test]
    fn landscape_photo_fills_width() {
        let g = fit_to_page(640, 480, PageSize::A4);
        assert!((g.content_width - 210.0).abs() < EPS);
        assert!((g.content_height - 157.5).abs() < 1e-6);
        assert!((g.offset_x).abs() < EPS);
        assert!((g.offset_y - 69.75).abs() < 1e-6);
        assert_fits(&g, 640, 480);
    }

    #[test]
    fn tall_image_fills_height() {
        let g = fit_to_page(100, 1000, PageSize::A4);
        assert!((g.content_height - 297.0).abs() < EPS);
        assert!((g.content_width - 29.7).abs() < 1e-6);
        assert_fits(&g, 100, 1000);
    }

    #[test]
    fn small_image_is_scaled_up() {
        let g = fit_to_page(1, 1, PageSize::A4);
        assert!((g.content_width - 210.0).abs() < EPS);
        assert!((g.content_height - 210.0).abs() < EPS);
    }

    #[test]
    fn exact_page_ratio_uses_both_dimensions() {
        let g = fit_to_page(210, 297, PageSize::A4);
        assert!((g.content_width - 210.0).abs() < 1e-6);
        assert!((g.content_height - 297.0).abs() < 1e-6);
    }

    #[test]
    fn fits_across_dimension_grid() {
        let dims = [1u32, 2, 3, 7, 96, 480, 640, 1024, 4000, 65_535];
        for page in [PageSize::A4, PageSize::LETTER, PageSize::new(300.0, 100.0)] {
            for &w in &dims {
                for &h in &dims {
                    assert_fits(&fit_to_page(w, h, page), w, h);
                }
            }
        }
    }

    #[test]
    fn named_sizes() {
        assert_eq!(PageSize::from_name("A4"), Some(PageSize::A4));
        assert_eq!(PageSize::from_name(" letter "), Some(PageSize::LETTER));
        assert_eq!(PageSize::from_name("tabloid"), None);
    }

    #[test]
    fn raster_size_at_300_dpi() {
        // A4 rendered at 300 DPI is 2480 x 3508 px.
        let s = raster_page_size(2480, 3508, 300);
        assert!((s.width_mm - 209.97).abs() < 0.01);
        assert!((s.height_mm - 297.01).abs() < 0.01);
    }
}
