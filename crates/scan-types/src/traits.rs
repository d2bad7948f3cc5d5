//! Traits for the gateway's external collaborators.
//!
//! OCR, barcode decoding, and the GLPI backend are all black boxes behind
//! these traits; the pipeline only sees trait objects.

use crate::{AssetInput, ItemType};
use async_trait::async_trait;

/// Text extraction from a label photo.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract all discernible text from an encoded image.
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// QR extraction from a photo.
#[async_trait]
pub trait QrDecoder: Send + Sync {
    /// Decode the first QR code found in the image, if any.
    async fn decode(&self, image: &[u8]) -> Result<Option<String>, QrError>;
}

/// Asset-management backend (GLPI REST API, session-token protocol).
///
/// Every method other than `init_session` takes the session token obtained
/// from it; callers own the session lifecycle.
#[async_trait]
pub trait AssetInventory: Send + Sync {
    /// Open a session and return its token.
    async fn init_session(&self) -> Result<String, InventoryError>;

    /// Close a session. Best-effort: implementations swallow failures.
    async fn kill_session(&self, session: &str);

    /// Create an item of the given type; returns the backend's response body.
    async fn create_item(
        &self,
        session: &str,
        item_type: ItemType,
        input: &AssetInput,
    ) -> Result<serde_json::Value, InventoryError>;

    /// Update fields on an existing item.
    async fn update_item(
        &self,
        session: &str,
        item_type: ItemType,
        item_id: u64,
        fields: serde_json::Value,
    ) -> Result<serde_json::Value, InventoryError>;

    /// Fetch an item by id.
    async fn get_item(
        &self,
        session: &str,
        item_type: ItemType,
        item_id: u64,
    ) -> Result<serde_json::Value, InventoryError>;

    /// Search items whose name contains `needle`; returns matching ids.
    async fn search_item_ids(
        &self,
        session: &str,
        item_type: ItemType,
        needle: &str,
    ) -> Result<Vec<u64>, InventoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("cannot open image: {0}")]
    InvalidImage(String),
    #[error("ocr engine error: {0}")]
    Engine(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("cannot open image: {0}")]
    InvalidImage(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("inventory unreachable: {0}")]
    Transport(String),
    #[error("inventory error {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("unexpected inventory response: {0}")]
    BadResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("GLPI configuration missing. Set GLPI_URL, GLPI_APP_TOKEN, GLPI_USER_TOKEN.")]
    NotConfigured,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("ocr: {0}")]
    Ocr(#[from] OcrError),
    #[error("qr: {0}")]
    Qr(#[from] QrError),
    #[error("inventory: {0}")]
    Inventory(#[from] InventoryError),
}
