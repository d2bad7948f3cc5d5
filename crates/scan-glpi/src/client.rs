//! HTTP client for the GLPI REST API.
//!
//! GLPI authenticates with an `App-Token` header on every call plus a
//! per-session `Session-Token` obtained from `POST /initSession` (which
//! itself carries `Authorization: user_token <token>`). Item payloads are
//! wrapped in an `input` object.

use scan_types::{AssetInput, AssetInventory, InventoryError, ItemType};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const KILL_TIMEOUT: Duration = Duration::from_secs(5);
const CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const RW_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for a GLPI server: API root plus the token pair.
#[derive(Debug, Clone)]
pub struct GlpiConfig {
    pub url: String,
    pub app_token: String,
    pub user_token: String,
}

impl GlpiConfig {
    /// Read `GLPI_URL`, `GLPI_APP_TOKEN`, `GLPI_USER_TOKEN`. Returns `None`
    /// unless all three are set and non-empty. Trailing slashes on the URL
    /// are stripped.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("GLPI_URL")
            .ok()?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let app_token = std::env::var("GLPI_APP_TOKEN").ok()?.trim().to_string();
        let user_token = std::env::var("GLPI_USER_TOKEN").ok()?.trim().to_string();
        if url.is_empty() || app_token.is_empty() || user_token.is_empty() {
            return None;
        }
        Some(Self {
            url,
            app_token,
            user_token,
        })
    }
}

/// AssetInventory implementation over GLPI's session-token REST protocol.
pub struct GlpiClient {
    client: reqwest::Client,
    cfg: GlpiConfig,
}

impl GlpiClient {
    pub fn new(cfg: GlpiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cfg,
        }
    }

    pub fn from_env() -> Option<Self> {
        GlpiConfig::from_env().map(Self::new)
    }

    fn authed(
        &self,
        req: reqwest::RequestBuilder,
        session: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let req = req.header("App-Token", &self.cfg.app_token);
        match session {
            Some(token) => req.header("Session-Token", token),
            None => req,
        }
    }

    async fn read_body(res: reqwest::Response) -> Result<(u16, String), InventoryError> {
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        Ok((status, body))
    }

    fn parse_json(body: &str) -> Result<Value, InventoryError> {
        serde_json::from_str(body).map_err(|e| InventoryError::BadResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_token: Option<String>,
}

fn session_token_from_body(body: &str) -> Result<String, InventoryError> {
    let parsed: SessionResponse =
        serde_json::from_str(body).map_err(|e| InventoryError::BadResponse(e.to_string()))?;
    parsed
        .session_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| InventoryError::BadResponse("no session_token in response".to_string()))
}

/// Search rows carry the id in column `"2"`; some GLPI versions use `"id"`.
/// Either may be a number or a numeric string.
fn row_id(row: &Value) -> Option<u64> {
    let cell = row.get("2").or_else(|| row.get("id"))?;
    match cell {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn ids_from_search_body(value: &Value) -> Result<Vec<u64>, InventoryError> {
    let rows = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            InventoryError::BadResponse("search response has no data rows".to_string())
        })?;
    Ok(rows.iter().filter_map(row_id).collect())
}

#[async_trait::async_trait]
impl AssetInventory for GlpiClient {
    async fn init_session(&self) -> Result<String, InventoryError> {
        let res = self
            .client
            .post(format!("{}/initSession", self.cfg.url))
            .header("App-Token", &self.cfg.app_token)
            .header(
                "Authorization",
                format!("user_token {}", self.cfg.user_token),
            )
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let (status, body) = Self::read_body(res).await?;
        if status != 200 {
            return Err(InventoryError::Upstream { status, body });
        }
        session_token_from_body(&body)
    }

    async fn kill_session(&self, session: &str) {
        let req = self
            .authed(
                self.client.get(format!("{}/killSession", self.cfg.url)),
                Some(session),
            )
            .timeout(KILL_TIMEOUT);
        if let Err(e) = req.send().await {
            debug!(error = %e, "killSession failed");
        }
    }

    async fn create_item(
        &self,
        session: &str,
        item_type: ItemType,
        input: &AssetInput,
    ) -> Result<Value, InventoryError> {
        let res = self
            .authed(
                self.client
                    .post(format!("{}/{}", self.cfg.url, item_type)),
                Some(session),
            )
            .timeout(CREATE_TIMEOUT)
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let (status, body) = Self::read_body(res).await?;
        if status != 200 && status != 201 {
            return Err(InventoryError::Upstream { status, body });
        }
        Self::parse_json(&body)
    }

    async fn update_item(
        &self,
        session: &str,
        item_type: ItemType,
        item_id: u64,
        fields: Value,
    ) -> Result<Value, InventoryError> {
        let res = self
            .authed(
                self.client
                    .put(format!("{}/{}/{}", self.cfg.url, item_type, item_id)),
                Some(session),
            )
            .timeout(RW_TIMEOUT)
            .json(&serde_json::json!({ "input": fields }))
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let (status, body) = Self::read_body(res).await?;
        if status != 200 && status != 201 {
            return Err(InventoryError::Upstream { status, body });
        }
        Self::parse_json(&body)
    }

    async fn get_item(
        &self,
        session: &str,
        item_type: ItemType,
        item_id: u64,
    ) -> Result<Value, InventoryError> {
        let res = self
            .authed(
                self.client
                    .get(format!("{}/{}/{}", self.cfg.url, item_type, item_id)),
                Some(session),
            )
            .timeout(RW_TIMEOUT)
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let (status, body) = Self::read_body(res).await?;
        if status != 200 {
            return Err(InventoryError::Upstream { status, body });
        }
        Self::parse_json(&body)
    }

    async fn search_item_ids(
        &self,
        session: &str,
        item_type: ItemType,
        needle: &str,
    ) -> Result<Vec<u64>, InventoryError> {
        let res = self
            .authed(
                self.client
                    .get(format!("{}/search/{}", self.cfg.url, item_type)),
                Some(session),
            )
            .timeout(RW_TIMEOUT)
            .query(&[
                ("criteria[0][field]", "1"),
                ("criteria[0][searchtype]", "contains"),
                ("criteria[0][value]", needle),
                ("forcedisplay[0]", "2"),
            ])
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let (status, body) = Self::read_body(res).await?;
        if status != 200 {
            return Err(InventoryError::Upstream { status, body });
        }
        ids_from_search_body(&Self::parse_json(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_token_is_extracted() {
        let token = session_token_from_body(r#"{"session_token":"abc123"}"#).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn missing_session_token_is_a_bad_response() {
        let err = session_token_from_body(r#"{"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, InventoryError::BadResponse(_)));
    }

    #[test]
    fn search_rows_yield_ids_from_column_2_or_id() {
        let body = json!({
            "totalcount": 3,
            "data": [
                { "2": 17, "1": "printer-a" },
                { "2": "42", "1": "printer-b" },
                { "id": 7, "1": "printer-c" }
            ]
        });
        assert_eq!(ids_from_search_body(&body).unwrap(), vec![17, 42, 7]);
    }

    #[test]
    fn rows_without_usable_id_are_skipped() {
        let body = json!({ "data": [ { "1": "nameless" }, { "2": "not-a-number" } ] });
        assert_eq!(ids_from_search_body(&body).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn search_body_without_data_is_rejected() {
        let body = json!({ "totalcount": 0 });
        let err = ids_from_search_body(&body).unwrap_err();
        assert!(matches!(err, InventoryError::BadResponse(_)));
    }

    #[test]
    fn empty_session_token_is_a_bad_response() {
        let err = session_token_from_body(r#"{"session_token":""}"#).unwrap_err();
        assert!(matches!(err, InventoryError::BadResponse(_)));
    }
}
