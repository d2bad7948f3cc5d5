//! Gateway orchestration: compose OCR, QR decoding, label parsing, and the
//! inventory client into the request-level operations.

mod pipeline;

pub use pipeline::AssetPipeline;
pub use scan_types::GatewayError;
