//! Raster decode and encode.
//!
//! Input format is sniffed from the file content, not the extension, so a PNG
//! saved as `.jpg` still loads. JPEG output drops the alpha channel.

use crate::dispatch::RasterFormat;
use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Decode the image at `path`, rejecting zero-sized bitmaps.
pub fn load_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    let reader = ImageReader::open(path)
        .map_err(|e| ConvertError::input(path, e))?
        .with_guessed_format()
        .map_err(|e| ConvertError::input(path, e))?;

    let img = reader.decode().map_err(|e| ConvertError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ConvertError::EmptyImage {
            path: path.to_path_buf(),
            width: img.width(),
            height: img.height(),
        });
    }

    debug!("Decoded {:?}: {}x{} px", path, img.width(), img.height());
    Ok(img)
}

/// Encode `img` as `format` into a new file at `path`.
pub fn encode_raster(
    img: &DynamicImage,
    format: RasterFormat,
    jpeg_quality: u8,
    path: &Path,
) -> Result<(), ConvertError> {
    let file = File::create(path).map_err(|e| ConvertError::output(path, e))?;
    let mut writer = BufWriter::new(file);

    let encode_err = |detail: String| ConvertError::ImageEncode {
        path: path.to_path_buf(),
        format: format.to_string(),
        detail,
    };

    match format {
        RasterFormat::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality)
                .encode_image(&rgb)
                .map_err(|e| encode_err(e.to_string()))?;
        }
        RasterFormat::Png => {
            img.write_to(&mut writer, image::ImageFormat::Png)
                .map_err(|e| encode_err(e.to_string()))?;
        }
    }

    writer.flush().map_err(|e| ConvertError::output(path, e))?;
    Ok(())
}
