//! Text-to-speech pass-through endpoint
//!
//! The service does no synthesis of its own: the validated request is
//! forwarded to the configured upstream and the audio bytes come back
//! untouched. Identical text yields identical audio, so the response is
//! marked cacheable for a year.

use crate::error::ScenegenError;
use crate::server::{ApiError, AppState};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

/// Upper bound on synthesized text, in characters
const MAX_TEXT_CHARS: usize = 1000;

/// Allowed playback speed range
const SPEED_RANGE: (f64, f64) = (0.25, 4.0);

fn default_language() -> String {
    "en".to_string()
}

fn default_speed() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

pub async fn synthesize(
    State(state): State<AppState>,
    Json(payload): Json<TtsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ScenegenError::Validation("text is required".to_string()).into());
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ScenegenError::Validation(format!(
            "text must be at most {} characters",
            MAX_TEXT_CHARS
        ))
        .into());
    }
    if payload.speed < SPEED_RANGE.0 || payload.speed > SPEED_RANGE.1 {
        return Err(ScenegenError::Validation(format!(
            "speed must be between {} and {}",
            SPEED_RANGE.0, SPEED_RANGE.1
        ))
        .into());
    }

    let endpoint = state
        .config
        .tts
        .endpoint
        .as_deref()
        .ok_or_else(|| ScenegenError::Config("tts.endpoint is not configured".to_string()))?
        .to_string();

    let mut req = state.http.post(&endpoint).json(&serde_json::json!({
        "text": text,
        "language": payload.language,
        "speed": payload.speed,
    }));
    if let Some(key) = &state.config.tts.api_key {
        req = req.bearer_auth(key);
    }

    let response = req
        .send()
        .await
        .map_err(|e| ScenegenError::Provider(format!("TTS request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(ScenegenError::Provider(format!(
            "TTS request rejected with status {}: {}",
            status, detail
        ))
        .into());
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();
    let audio = response
        .bytes()
        .await
        .map_err(|e| ScenegenError::Provider(format!("TTS response read failed: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000".to_string(),
            ),
        ],
        audio,
    ))
}
