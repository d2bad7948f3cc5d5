//! GLPI REST API client.

#[cfg(feature = "test-util")]
pub mod mock;
mod client;

pub use client::{GlpiClient, GlpiConfig};
pub use scan_types::{AssetInventory, InventoryError};

#[cfg(feature = "test-util")]
pub use mock::MockInventory;
