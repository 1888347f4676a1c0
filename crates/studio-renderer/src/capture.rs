//! Viewport screenshots as PNG data URLs

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::backend::CapturedImage;

/// Data URL prefix produced by [`to_png_data_url`]
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Screenshot encoding errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    /// Pixel buffer length does not match the dimensions
    #[error("Expected {expected} bytes of RGBA data, got {actual}")]
    BufferSize {
        /// `width * height * 4`
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },
    /// PNG encoder failure
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Encode captured pixels as PNG bytes
pub fn encode_png(image: &CapturedImage) -> Result<Vec<u8>, CaptureError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba.len() != expected {
        return Err(CaptureError::BufferSize {
            expected,
            actual: image.rgba.len(),
        });
    }
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&image.rgba, image.width, image.height, ColorType::Rgba8)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(png)
}

/// Encode captured pixels as a `data:image/png;base64,...` URL
pub fn to_png_data_url(image: &CapturedImage) -> Result<String, CaptureError> {
    let png = encode_png(image)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_decodes_to_png() {
        let image = CapturedImage {
            width: 2,
            height: 2,
            rgba: vec![255; 16],
        };
        let url = to_png_data_url(&image).unwrap();
        let payload = url.strip_prefix(PNG_DATA_URL_PREFIX).unwrap();
        let png = STANDARD.decode(payload).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let image = CapturedImage {
            width: 4,
            height: 4,
            rgba: vec![0; 3],
        };
        assert!(matches!(
            encode_png(&image),
            Err(CaptureError::BufferSize { expected: 64, .. })
        ));
    }
}
