//! File formats read or written without an external engine.
//!
//! - [`image`]: raster decode (Image→PDF) and encode (PDF→Image)
//! - [`docx`]: paragraph text of a Word document
//! - [`pptx`]: a picture-per-slide presentation package
//! - [`xlsx`]: one line per row in a single worksheet

pub mod docx;
pub mod image;
pub mod pptx;
pub mod xlsx;
