//! Request and response DTOs for the gateway API.

use serde::{Deserialize, Serialize};

/// GLPI item family an asset is filed under. The variant name doubles as the
/// REST endpoint segment (`/Computer`, `/NetworkEquipment`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[default]
    Computer,
    NetworkEquipment,
    Printer,
    Peripheral,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Computer => "Computer",
            ItemType::NetworkEquipment => "NetworkEquipment",
            ItemType::Printer => "Printer",
            ItemType::Peripheral => "Peripheral",
        }
    }

    /// Parse a user-supplied type name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "computer" => Some(ItemType::Computer),
            "networkequipment" => Some(ItemType::NetworkEquipment),
            "printer" => Some(ItemType::Printer),
            "peripheral" => Some(ItemType::Peripheral),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields pulled out of OCR'd label text. `raw_text` keeps the normalized
/// text so classification can run over the full blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedLabel {
    pub serial: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
    pub raw_text: String,
}

/// Outcome of device classification: which GLPI endpoint to create under and
/// a human-readable category hint for the item comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub item_type: ItemType,
    pub category: String,
}

/// Create payload relayed to GLPI as the `input` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInput {
    pub name: String,
    pub serial: Option<String>,
    pub otherserial: Option<String>,
    pub comment: String,
}

/// How update/read requests point at an existing item: a known id, or a QR
/// payload to search the inventory by.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSelector {
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub qr_value: Option<String>,
}

/// Move an item to another location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub qr_value: Option<String>,
    pub location_id: u64,
    #[serde(default)]
    pub item_type: ItemType,
}

impl UpdateLocationRequest {
    pub fn selector(&self) -> ItemSelector {
        ItemSelector {
            item_id: self.item_id,
            qr_value: self.qr_value.clone(),
        }
    }
}

/// Assign an item to another user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub qr_value: Option<String>,
    pub user_id: u64,
    #[serde(default)]
    pub item_type: ItemType,
}

impl UpdateUserRequest {
    pub fn selector(&self) -> ItemSelector {
        ItemSelector {
            item_id: self.item_id,
            qr_value: self.qr_value.clone(),
        }
    }
}

/// Look an item up without changing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckEntryRequest {
    #[serde(default)]
    pub item_id: Option<u64>,
    #[serde(default)]
    pub qr_value: Option<String>,
    #[serde(default)]
    pub item_type: ItemType,
}

impl CheckEntryRequest {
    pub fn selector(&self) -> ItemSelector {
        ItemSelector {
            item_id: self.item_id,
            qr_value: self.qr_value.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Public runtime configuration: whether the inventory relay is usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub glpi_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanQrResponse {
    pub qr_value: Option<String>,
}

/// Result of a label registration: what was sent and what GLPI answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredAsset {
    pub created: bool,
    pub payload: AssetInput,
    pub classification: Classification,
    pub target_item_type: ItemType,
    pub glpi: serde_json::Value,
}

/// Result of a field update (location or user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedItem {
    pub updated: bool,
    pub item_id: u64,
    pub glpi: serde_json::Value,
}

/// Result of an existence check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckedItem {
    pub exists: bool,
    pub item_id: u64,
    pub glpi: serde_json::Value,
}
