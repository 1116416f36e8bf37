//! Streamed generation endpoint
//!
//! `POST /generate` starts a generation and returns the fragments as an SSE
//! response. The provider stream is driven by a spawned task writing into a
//! bounded channel; the response side owns a cancellation drop-guard, so
//! tearing down the SSE connection cancels the task cooperatively.

use crate::error::ScenegenError;
use crate::prompts::GenerationMode;
use crate::server::{ApiError, AppState};
use crate::session::ChatMessage;
use crate::stream::run_stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

/// Fragments buffered between the generation task and the response
const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub mode: GenerationMode,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let topic = payload.topic.trim().to_string();
    if topic.is_empty() {
        return Err(ScenegenError::Validation("topic is required".to_string()).into());
    }

    tracing::info!("Generation request: mode={} topic_len={}", payload.mode, topic.len());

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let generator = state.generator.clone();

    tokio::spawn(async move {
        let state = run_stream(
            generator,
            payload.mode,
            topic,
            payload.history,
            tx,
            task_cancel,
        )
        .await;
        tracing::debug!("Generation task finished: {:?}", state);
    });

    // Dropping the response stream drops the guard, which cancels the token
    // and lets the generation task notice the client is gone.
    let guard = cancel.drop_guard();
    let stream = ReceiverStream::new(rx).map(move |event| {
        let _alive = &guard;
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
