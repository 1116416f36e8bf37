//! Stream orchestration between a generator and an SSE client
//!
//! The orchestrator pulls fragments from a provider stream and forwards them
//! to the response channel, checking for client disconnect once per fragment.
//! Faults never propagate past this boundary: any failure mode collapses to
//! at most one error fragment on the wire and a terminal [`StreamState`].

use crate::prompts::GenerationMode;
use crate::providers::{StreamFragment, TextGenerator};
use crate::session::ChatMessage;
use axum::response::sse::Event;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal outcome of a streamed generation
///
/// `Started` and `Streaming` are the transient phases; a run always ends in
/// one of the other three. Terminal states are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Provider invoked, no fragment forwarded yet
    Started,
    /// At least one fragment forwarded
    Streaming,
    /// Terminal fragment delivered successfully
    Completed,
    /// Client went away; remaining work abandoned
    ClientDisconnected,
    /// Provider rejected the request or the stream ended abnormally
    Failed,
}

async fn send_fragment(tx: &mpsc::Sender<Event>, fragment: &StreamFragment) -> bool {
    tx.send(Event::default().data(fragment.to_payload()))
        .await
        .is_ok()
}

/// Drive one generation from provider to client
///
/// Pulls fragments from `generator.stream(...)` and forwards each over `tx`.
/// The `cancel` token is checked cooperatively once per fragment; a send
/// failure is treated the same way, since both mean the client is gone.
/// Token text is accumulated into a request-local transcript used only for
/// logging; persistence is the caller's job.
///
/// A provider rejection or a stream that ends without a terminal fragment
/// puts exactly one error fragment on the wire and returns
/// [`StreamState::Failed`].
pub async fn run_stream(
    generator: Arc<dyn TextGenerator>,
    mode: GenerationMode,
    topic: String,
    history: Vec<ChatMessage>,
    tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
) -> StreamState {
    let mut state = StreamState::Started;

    let mut stream = match generator.stream(mode, &topic, &history).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Generation request rejected: {}", e);
            let fragment = StreamFragment::provider_error(e.to_string());
            let _ = send_fragment(&tx, &fragment).await;
            return StreamState::Failed;
        }
    };

    let mut transcript = String::new();
    let mut saw_terminal = false;

    while let Some(fragment) = stream.next().await {
        if cancel.is_cancelled() {
            tracing::debug!("Client disconnected, abandoning stream");
            return StreamState::ClientDisconnected;
        }

        if let StreamFragment::Token(token) = &fragment {
            transcript.push_str(token);
        }
        let failed = matches!(fragment, StreamFragment::Error { .. });
        let terminal = fragment.is_terminal();

        if !send_fragment(&tx, &fragment).await {
            tracing::debug!("Client channel closed, abandoning stream");
            return StreamState::ClientDisconnected;
        }
        state = StreamState::Streaming;

        if terminal {
            saw_terminal = true;
            if failed {
                return StreamState::Failed;
            }
            break;
        }
    }

    if !saw_terminal {
        tracing::warn!("Generation stream ended without a terminal fragment");
        let fragment = StreamFragment::provider_error("Generation ended unexpectedly");
        let _ = send_fragment(&tx, &fragment).await;
        return StreamState::Failed;
    }

    debug_assert_eq!(state, StreamState::Streaming);
    tracing::debug!("Generation completed, {} chars streamed", transcript.len());
    StreamState::Completed
}
