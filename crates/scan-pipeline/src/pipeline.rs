//! AssetPipeline: the gateway's operations over trait-object collaborators.

use scan_label::{classify, parse_label_text};
use scan_types::{
    AssetInput, AssetInventory, CheckedItem, Classification, GatewayError, ItemSelector, ItemType,
    OcrEngine, QrDecoder, RegisteredAsset, UpdatedItem,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Composes the vision collaborators and the inventory backend. The
/// inventory is optional: scanning works without a configured GLPI server,
/// relay operations report `NotConfigured`.
///
/// Every operation that talks to the inventory opens one session up front
/// and kills it exactly once before returning, error or not.
pub struct AssetPipeline {
    ocr: Arc<dyn OcrEngine>,
    qr: Arc<dyn QrDecoder>,
    inventory: Option<Arc<dyn AssetInventory>>,
}

impl AssetPipeline {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        qr: Arc<dyn QrDecoder>,
        inventory: Option<Arc<dyn AssetInventory>>,
    ) -> Self {
        Self { ocr, qr, inventory }
    }

    pub fn glpi_enabled(&self) -> bool {
        self.inventory.is_some()
    }

    fn inventory(&self) -> Result<&Arc<dyn AssetInventory>, GatewayError> {
        self.inventory.as_ref().ok_or(GatewayError::NotConfigured)
    }

    /// Decode a QR photo. No inventory involvement.
    pub async fn scan_qr(&self, image: &[u8]) -> Result<Option<String>, GatewayError> {
        Ok(self.qr.decode(image).await?)
    }

    /// OCR a spec label, classify the device, and create it in the
    /// inventory. `requested` bypasses classification with an explicit type.
    pub async fn register_asset(
        &self,
        spec_image: &[u8],
        qr_image: Option<&[u8]>,
        requested: Option<ItemType>,
    ) -> Result<RegisteredAsset, GatewayError> {
        let inventory = Arc::clone(self.inventory()?);
        let session = inventory.init_session().await?;
        let result = self
            .register_with_session(&inventory, &session, spec_image, qr_image, requested)
            .await;
        inventory.kill_session(&session).await;
        result
    }

    async fn register_with_session(
        &self,
        inventory: &Arc<dyn AssetInventory>,
        session: &str,
        spec_image: &[u8],
        qr_image: Option<&[u8]>,
        requested: Option<ItemType>,
    ) -> Result<RegisteredAsset, GatewayError> {
        let text = self.ocr.extract_text(spec_image).await?;
        let parsed = parse_label_text(&text);
        let classification = match requested {
            Some(item_type) => Classification {
                item_type,
                category: "Unspecified".to_string(),
            },
            None => classify(&parsed),
        };
        let target = classification.item_type;

        // The companion QR photo is best-effort: any decode problem just
        // leaves the code out of the comment.
        let qr_value = match qr_image {
            Some(bytes) => self.qr.decode(bytes).await.unwrap_or(None),
            None => None,
        };

        let payload = AssetInput {
            name: parsed
                .model
                .clone()
                .or_else(|| parsed.serial.clone())
                .unwrap_or_else(|| "New Asset".to_string()),
            serial: parsed.serial.clone(),
            otherserial: parsed.part_number.clone(),
            comment: format!(
                "Manufacturer: {}\nCategory: {}\nQR: {}",
                parsed.manufacturer.as_deref().unwrap_or(""),
                classification.category,
                qr_value.as_deref().unwrap_or("")
            ),
        };

        let glpi = inventory.create_item(session, target, &payload).await?;
        info!(item_type = %target, name = %payload.name, "asset created");
        Ok(RegisteredAsset {
            created: true,
            payload,
            classification,
            target_item_type: target,
            glpi,
        })
    }

    /// Move an item to another location.
    pub async fn change_location(
        &self,
        selector: &ItemSelector,
        location_id: u64,
        item_type: ItemType,
    ) -> Result<UpdatedItem, GatewayError> {
        self.update_field(selector, item_type, json!({ "locations_id": location_id }))
            .await
    }

    /// Assign an item to another user.
    pub async fn change_user(
        &self,
        selector: &ItemSelector,
        user_id: u64,
        item_type: ItemType,
    ) -> Result<UpdatedItem, GatewayError> {
        self.update_field(selector, item_type, json!({ "users_id": user_id }))
            .await
    }

    async fn update_field(
        &self,
        selector: &ItemSelector,
        item_type: ItemType,
        fields: serde_json::Value,
    ) -> Result<UpdatedItem, GatewayError> {
        let inventory = Arc::clone(self.inventory()?);
        let session = inventory.init_session().await?;
        let result: Result<UpdatedItem, GatewayError> = async {
            let item_id =
                resolve_item_id(inventory.as_ref(), &session, item_type, selector).await?;
            let glpi = inventory
                .update_item(&session, item_type, item_id, fields)
                .await?;
            Ok(UpdatedItem {
                updated: true,
                item_id,
                glpi,
            })
        }
        .await;
        inventory.kill_session(&session).await;
        result
    }

    /// Look an item up and relay its record.
    pub async fn check_entry(
        &self,
        selector: &ItemSelector,
        item_type: ItemType,
    ) -> Result<CheckedItem, GatewayError> {
        let inventory = Arc::clone(self.inventory()?);
        let session = inventory.init_session().await?;
        let result: Result<CheckedItem, GatewayError> = async {
            let item_id =
                resolve_item_id(inventory.as_ref(), &session, item_type, selector).await?;
            let glpi = inventory.get_item(&session, item_type, item_id).await?;
            Ok(CheckedItem {
                exists: true,
                item_id,
                glpi,
            })
        }
        .await;
        inventory.kill_session(&session).await;
        result
    }
}

/// Explicit id wins; otherwise the QR payload is searched by name and the
/// first hit is taken.
async fn resolve_item_id(
    inventory: &dyn AssetInventory,
    session: &str,
    item_type: ItemType,
    selector: &ItemSelector,
) -> Result<u64, GatewayError> {
    if let Some(id) = selector.item_id {
        return Ok(id);
    }
    let qr_value = selector
        .qr_value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            GatewayError::BadRequest("Either item_id or qr_value is required.".to_string())
        })?;
    let ids = inventory
        .search_item_ids(session, item_type, qr_value)
        .await?;
    ids.first()
        .copied()
        .ok_or_else(|| GatewayError::NotFound("No matching item found for QR.".to_string()))
}
