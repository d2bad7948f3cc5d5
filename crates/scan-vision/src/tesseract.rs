//! OCR via the external `tesseract` binary.
//!
//! The engine stays outside the process boundary: the photo is decoded,
//! converted to grayscale, re-encoded as PNG, and piped through
//! `tesseract stdin stdout`. Stdout is the extracted text.

use image::ImageFormat;
use scan_types::{OcrEngine, OcrError};
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

pub struct TesseractOcr {
    program: String,
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Binary path from `TESSERACT_BIN`, falling back to `tesseract` on PATH.
    pub fn from_env() -> Self {
        Self::new(std::env::var("TESSERACT_BIN").unwrap_or_else(|_| "tesseract".to_string()))
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let img =
            image::load_from_memory(image).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        let gray = img.grayscale();
        let mut png = Vec::new();
        gray.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        debug!(bytes = png.len(), program = %self.program, "running ocr");
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OcrError::Engine(format!("spawn {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Engine("child stdin not captured".to_string()))?;
        stdin
            .write_all(&png)
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        drop(stdin);

        let out = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        if !out.status.success() {
            return Err(OcrError::Engine(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn undecodable_bytes_are_rejected_before_spawning() {
        let ocr = TesseractOcr::new("tesseract-binary-that-does-not-exist");
        let err = ocr.extract_text(b"not an image").await.unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }
}
