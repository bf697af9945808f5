use crate::cache_validator::CachedPayload;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{CitySearchRequest, ExportRequest, ResultSet};
use crate::services::{FirmDiscoveryService, GeminiVisionService};
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Firm-search response cache (10 minute TTL) to skip repeated webhook
    /// calls for the same city. Values are checksum-sealed payloads.
    pub firm_cache: Cache<String, String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-console-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/extract
///
/// Accepts a multipart upload with a `file` field, relays the image to the
/// vision model, and returns the normalized result set. Rejects a missing
/// or empty upload before any external call is made.
pub async fn extract_numbers(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ResultSet>, AppError> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no content type".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((bytes.to_vec(), mime_type));
        break;
    }

    let (bytes, mime_type) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    tracing::info!("POST /api/v1/extract - {} byte {}", bytes.len(), mime_type);

    let vision = GeminiVisionService::new(&state.config)?;
    let result = vision
        .extract_numbers(&bytes, &mime_type)
        .await
        .context("Image extraction failed")?;

    Ok(Json(result))
}

/// POST /api/v1/firms/search
///
/// Accepts `{city}` and relays it to the discovery webhook, returning the
/// webhook's JSON body under `data`. Empty input is rejected before calling
/// out; recent results are served from the validated cache.
pub async fn search_firms(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CitySearchRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let city = request.city.as_deref().map(str::trim).unwrap_or("");
    if city.is_empty() {
        return Err(AppError::BadRequest("City is required".to_string()));
    }

    tracing::info!("POST /api/v1/firms/search - city: {}", city);
    let cache_key = city.to_lowercase();

    // Check cache first with validation
    if let Some(cached) = state.firm_cache.get(&cache_key).await {
        if let Some(valid_payload) = CachedPayload::unseal(&cached) {
            if let Ok(data) = serde_json::from_str::<serde_json::Value>(&valid_payload) {
                tracing::debug!("Firm cache HIT (validated) for city: {}", city);
                return Ok(Json(json!({ "data": data })));
            }
        } else {
            tracing::warn!("Cache validation failed for {}, refetching from webhook", city);
        }
    }

    tracing::info!("Firm cache MISS - calling webhook for city: {}", city);
    let service = FirmDiscoveryService::new(&state.config)?;
    let data = service.search_city(city).await?;

    // Cache successful response with checksum validation
    if let Ok(json_str) = serde_json::to_string(&data) {
        state
            .firm_cache
            .insert(cache_key, CachedPayload::seal(json_str).serialize())
            .await;
    }

    Ok(Json(json!({ "data": data })))
}

/// POST /api/v1/firms/export
///
/// Serializes the submitted firm records in the requested format and returns
/// the artifact as an attachment. An empty record list produces no file and
/// answers 204 No Content.
pub async fn export_firms(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    tracing::info!(
        "POST /api/v1/firms/export - {} records as {:?}",
        request.records.len(),
        request.format
    );

    let artifact = crate::export::export_firms(
        &request.records,
        request.format,
        request.filename_base.as_deref(),
    )?;

    match artifact {
        None => Ok(StatusCode::NO_CONTENT.into_response()),
        Some(artifact) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, artifact.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.bytes,
        )
            .into_response()),
    }
}
