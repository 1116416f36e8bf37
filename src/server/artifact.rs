//! Interactive artifact endpoint

use crate::artifact::generate_artifact;
use crate::error::ScenegenError;
use crate::server::{ApiError, AppState};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

/// Upper bound on the artifact request text, in characters
const MAX_PROMPT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ArtifactRequest {
    pub prompt: String,
}

pub async fn create_artifact(
    State(state): State<AppState>,
    Json(payload): Json<ArtifactRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(ScenegenError::Validation("prompt is required".to_string()).into());
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ScenegenError::Validation(format!(
            "prompt must be at most {} characters",
            MAX_PROMPT_CHARS
        ))
        .into());
    }

    let html = generate_artifact(state.generator.clone(), prompt).await?;
    Ok(Json(serde_json::json!({ "html": html })))
}
