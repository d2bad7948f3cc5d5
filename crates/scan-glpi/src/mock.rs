//! Mock inventory for tests: in-memory items, scripted search hits, call log.

use scan_types::{AssetInput, AssetInventory, InventoryError, ItemType};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

pub struct MockInventory {
    items: RwLock<HashMap<u64, Value>>,
    search_hits: Vec<u64>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            search_hits: Vec::new(),
            next_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Ids that any search will report, in order.
    pub fn with_search_hits(mut self, hits: Vec<u64>) -> Self {
        self.search_hits = hits;
        self
    }

    /// Seed an existing item.
    pub async fn insert(&self, id: u64, item: Value) {
        self.items.write().await.insert(id, item);
    }

    pub async fn item(&self, id: u64) -> Option<Value> {
        self.items.read().await.get(&id).cloned()
    }

    /// Trait methods invoked so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, name: &str) {
        self.calls.lock().await.push(name.to_string());
    }
}

impl Default for MockInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssetInventory for MockInventory {
    async fn init_session(&self) -> Result<String, InventoryError> {
        self.record("init_session").await;
        Ok("mock-session".to_string())
    }

    async fn kill_session(&self, _session: &str) {
        self.record("kill_session").await;
    }

    async fn create_item(
        &self,
        _session: &str,
        item_type: ItemType,
        input: &AssetInput,
    ) -> Result<Value, InventoryError> {
        self.record("create_item").await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = json!({
            "id": id,
            "itemtype": item_type.as_str(),
            "name": input.name,
            "serial": input.serial,
            "otherserial": input.otherserial,
            "comment": input.comment,
        });
        self.items.write().await.insert(id, stored);
        Ok(json!({ "id": id, "message": "" }))
    }

    async fn update_item(
        &self,
        _session: &str,
        _item_type: ItemType,
        item_id: u64,
        fields: Value,
    ) -> Result<Value, InventoryError> {
        self.record("update_item").await;
        let mut guard = self.items.write().await;
        let item = guard.get_mut(&item_id).ok_or(InventoryError::Upstream {
            status: 404,
            body: "item not found".to_string(),
        })?;
        if let (Some(obj), Some(patch)) = (item.as_object_mut(), fields.as_object()) {
            for (k, v) in patch {
                obj.insert(k.clone(), v.clone());
            }
        }
        Ok(json!([{ "message": "" }]))
    }

    async fn get_item(
        &self,
        _session: &str,
        _item_type: ItemType,
        item_id: u64,
    ) -> Result<Value, InventoryError> {
        self.record("get_item").await;
        self.items
            .read()
            .await
            .get(&item_id)
            .cloned()
            .ok_or(InventoryError::Upstream {
                status: 404,
                body: "item not found".to_string(),
            })
    }

    async fn search_item_ids(
        &self,
        _session: &str,
        _item_type: ItemType,
        _needle: &str,
    ) -> Result<Vec<u64>, InventoryError> {
        self.record("search_item_ids").await;
        Ok(self.search_hits.clone())
    }
}
