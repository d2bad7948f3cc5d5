//! Vision collaborators: OCR through the external `tesseract` binary and QR
//! decoding through `rqrr`.

#[cfg(feature = "test-util")]
pub mod mock;
mod qr;
mod tesseract;

pub use qr::ImageQrDecoder;
pub use scan_types::{OcrEngine, OcrError, QrDecoder, QrError};
pub use tesseract::TesseractOcr;

#[cfg(feature = "test-util")]
pub use mock::{MockOcr, MockQrDecoder};
