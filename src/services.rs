use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::{parse_model_reply, EXTRACTION_PROMPT};
use crate::models::ResultSet;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Gemini `generateContent` REST endpoint.
///
/// The relay's only job is forwarding image bytes plus the fixed extraction
/// prompt and normalizing whatever comes back; the model does the OCR.
pub struct GeminiVisionService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiVisionService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Gemini client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    /// Sends the image to the model and parses its reply into a normalized
    /// [`ResultSet`].
    pub async fn extract_numbers(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<ResultSet, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::info!(
            "Forwarding {} byte image ({}) to Gemini model {}",
            image_bytes.len(),
            mime_type,
            self.model
        );

        let body = json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": BASE64.encode(image_bytes),
                        }
                    },
                    { "text": EXTRACTION_PROMPT }
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            // Key travels in a header, never in the URL or the logs.
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned status {}: {}",
                status, error_text
            )));
        }

        let reply: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = candidate_text(&reply).ok_or_else(|| AppError::ShapeError {
            message: "Gemini response contained no candidate text".to_string(),
            raw_response: reply.to_string(),
        })?;

        let set = parse_model_reply(&text)?;
        tracing::info!(
            "Extraction succeeded: {} rows, {} numbers",
            set.rows.len(),
            set.total_count
        );
        Ok(set)
    }
}

/// Concatenates the text parts of the first candidate, if any.
fn candidate_text(reply: &Value) -> Option<String> {
    let parts = reply
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Client for the external firm-discovery automation webhook.
pub struct FirmDiscoveryService {
    client: Client,
    webhook_url: String,
}

impl FirmDiscoveryService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create webhook client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url: config.scrape_webhook_url.clone(),
        })
    }

    /// Forwards `{city}` to the webhook and returns its JSON body unchanged.
    ///
    /// Non-success statuses propagate to the caller with the upstream body as
    /// detail; a body that is not JSON is a shape error carrying the raw text.
    pub async fn search_city(&self, city: &str) -> Result<Value, AppError> {
        tracing::info!("Forwarding firm search for city '{}' to webhook", city);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "city": city }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError { status, details });
        }

        let raw = response.text().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read webhook response: {}", e))
        })?;
        let data: Value = serde_json::from_str(&raw).map_err(|e| AppError::ShapeError {
            message: format!("Webhook response is not valid JSON: {}", e),
            raw_response: raw,
        })?;

        tracing::info!("Firm search for '{}' succeeded", city);
        Ok(data)
    }
}
