//! QR decoding with an upscale retry for small photos.

use image::{imageops::FilterType, DynamicImage};
use scan_types::{QrDecoder, QrError};
use tracing::debug;

/// Largest dimension below which a failed detection is retried upscaled.
const MIN_DETECT_DIM: u32 = 800;

pub struct ImageQrDecoder;

impl ImageQrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageQrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_grids(img: &DynamicImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare(img.to_luma8());
    for grid in prepared.detect_grids() {
        if let Ok((_meta, content)) = grid.decode() {
            return Some(content);
        }
    }
    None
}

#[async_trait::async_trait]
impl QrDecoder for ImageQrDecoder {
    async fn decode(&self, image: &[u8]) -> Result<Option<String>, QrError> {
        let img =
            image::load_from_memory(image).map_err(|e| QrError::InvalidImage(e.to_string()))?;
        if let Some(value) = decode_grids(&img) {
            return Ok(Some(value));
        }
        // Small photos often render the code too few pixels wide for the
        // detector; blow the image up once and retry.
        let (w, h) = (img.width(), img.height());
        let max_dim = w.max(h);
        if max_dim > 0 && max_dim < MIN_DETECT_DIM {
            let scale = 2u32.max(MIN_DETECT_DIM / max_dim);
            debug!(w, h, scale, "retrying qr detection upscaled");
            let scaled = img.resize_exact(w * scale, h * scale, FilterType::Nearest);
            return Ok(decode_grids(&scaled));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::io::Cursor;

    fn blank_png(w: u32, h: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(w, h, Luma([255u8]));
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn undecodable_bytes_are_an_error() {
        let err = ImageQrDecoder::new().decode(b"garbage").await.unwrap_err();
        assert!(matches!(err, QrError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn blank_image_decodes_to_none() {
        // 64px wide: exercises the upscale retry path as well.
        let png = blank_png(64, 64);
        let value = ImageQrDecoder::new().decode(&png).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn large_blank_image_decodes_to_none_without_retry() {
        let png = blank_png(900, 600);
        let value = ImageQrDecoder::new().decode(&png).await.unwrap();
        assert_eq!(value, None);
    }
}
