//! Axum server and routes.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scan_pipeline::AssetPipeline;
use scan_types::{
    CheckEntryRequest, CheckedItem, ConfigResponse, GatewayError, HealthResponse, ItemType,
    OcrError, QrError, RegisteredAsset, ScanQrResponse, UpdateLocationRequest, UpdateUserRequest,
    UpdatedItem,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Upload size cap for label/QR photos.
const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

pub struct AppState {
    pub pipeline: AssetPipeline,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/config", get(handle_config))
        .route("/api/scan_qr", post(handle_scan_qr))
        .route("/api/add_entry", post(handle_add_entry))
        .route("/api/change_location", post(handle_change_location))
        .route("/api/change_user", post(handle_change_user))
        .route("/api/check_entry", post(handle_check_entry))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error surfaced to HTTP clients as `{"detail": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Ocr(OcrError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Qr(QrError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Ocr(OcrError::Engine(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Inventory(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("invalid multipart body: {err}"))
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn handle_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        glpi_enabled: state.pipeline.glpi_enabled(),
    })
}

async fn handle_scan_qr(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ScanQrResponse>, ApiError> {
    let mut file: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("file") {
            file = Some(field.bytes().await.map_err(bad_multipart)?);
        }
    }
    let file =
        file.ok_or_else(|| ApiError::bad_request("multipart field 'file' is required"))?;
    let qr_value = state.pipeline.scan_qr(&file).await?;
    Ok(Json(ScanQrResponse { qr_value }))
}

async fn handle_add_entry(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<RegisteredAsset>, ApiError> {
    let mut spec_image: Option<Bytes> = None;
    let mut qr_image: Option<Bytes> = None;
    let mut item_type: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("spec_image") => spec_image = Some(field.bytes().await.map_err(bad_multipart)?),
            Some("qr_image") => qr_image = Some(field.bytes().await.map_err(bad_multipart)?),
            Some("item_type") => item_type = Some(field.text().await.map_err(bad_multipart)?),
            _ => {}
        }
    }
    let spec_image = spec_image
        .ok_or_else(|| ApiError::bad_request("multipart field 'spec_image' is required"))?;
    let requested = parse_item_type_choice(item_type.as_deref())?;
    let registered = state
        .pipeline
        .register_asset(&spec_image, qr_image.as_deref(), requested)
        .await?;
    Ok(Json(registered))
}

/// `auto` (or absent) means classify from the label; anything else must be a
/// known item type name.
fn parse_item_type_choice(raw: Option<&str>) -> Result<Option<ItemType>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("auto") => Ok(None),
        Some(s) => ItemType::from_name(s)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("unknown item_type: {s}"))),
    }
}

async fn handle_change_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateLocationRequest>,
) -> Result<Json<UpdatedItem>, ApiError> {
    let updated = state
        .pipeline
        .change_location(&req.selector(), req.location_id, req.item_type)
        .await?;
    Ok(Json(updated))
}

async fn handle_change_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UpdatedItem>, ApiError> {
    let updated = state
        .pipeline
        .change_user(&req.selector(), req.user_id, req.item_type)
        .await?;
    Ok(Json(updated))
}

async fn handle_check_entry(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckEntryRequest>,
) -> Result<Json<CheckedItem>, ApiError> {
    let checked = state
        .pipeline
        .check_entry(&req.selector(), req.item_type)
        .await?;
    Ok(Json(checked))
}
