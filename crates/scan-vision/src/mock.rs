//! Mock vision collaborators for tests: fixed outputs, no subprocess.

use scan_types::{OcrEngine, OcrError, QrDecoder, QrError};

/// OcrEngine that returns a fixed text for any image.
pub struct MockOcr {
    text: String,
}

impl MockOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait::async_trait]
impl OcrEngine for MockOcr {
    async fn extract_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// QrDecoder that returns a fixed value for any image.
pub struct MockQrDecoder {
    value: Option<String>,
}

impl MockQrDecoder {
    pub fn new(value: Option<&str>) -> Self {
        Self {
            value: value.map(str::to_string),
        }
    }
}

#[async_trait::async_trait]
impl QrDecoder for MockQrDecoder {
    async fn decode(&self, _image: &[u8]) -> Result<Option<String>, QrError> {
        Ok(self.value.clone())
    }
}
