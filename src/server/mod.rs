//! HTTP server assembly
//!
//! Routes are a thin translation layer: they validate and deserialize, call
//! into the store or generation pipeline, and map errors onto HTTP statuses.
//! All shared state is injected through [`AppState`]; nothing is global.

mod artifact;
mod generate;
mod sessions;
mod tts;

use crate::config::Config;
use crate::error::{Result, ScenegenError};
use crate::providers::TextGenerator;
use crate::session::SessionStore;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Shared application state injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// Volatile project/chat store
    pub store: Arc<SessionStore>,
    /// Generation backend, selected once at startup
    pub generator: Arc<dyn TextGenerator>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Client for pass-through calls (TTS)
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble application state from its parts
    pub fn new(store: Arc<SessionStore>, generator: Arc<dyn TextGenerator>, config: Config) -> Self {
        Self {
            store,
            generator,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

/// Error wrapper translating domain errors into HTTP responses
///
/// Handlers return `Result<_, ApiError>`; the `From` impl lets `?` work on
/// anything convertible to `anyhow::Error`. The concrete `ScenegenError` is
/// downcast back out to pick the status code.
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ScenegenError>() {
            Some(ScenegenError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(ScenegenError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(ScenegenError::Provider(_)) | Some(ScenegenError::EmptyResult) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let detail = self.0.to_string();
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate::generate))
        .route(
            "/api/projects",
            get(sessions::list_projects).post(sessions::create_project),
        )
        .route(
            "/api/projects/:id",
            axum::routing::patch(sessions::rename_project).delete(sessions::delete_project),
        )
        .route("/api/projects/:id/rename", post(sessions::rename_project_post))
        .route("/api/projects/:id/delete", post(sessions::delete_project_post))
        .route("/api/projects/:id/share", get(sessions::share_project))
        .route("/api/projects/:id/chats", get(sessions::list_project_chats))
        .route(
            "/api/chats",
            get(sessions::list_chats).post(sessions::create_chat),
        )
        .route(
            "/api/chats/:id",
            get(sessions::get_chat)
                .patch(sessions::rename_chat)
                .delete(sessions::delete_chat),
        )
        .route("/api/chats/:id/messages", post(sessions::append_message))
        .route("/api/chats/:id/share", get(sessions::share_chat))
        .route("/api/artifact", post(artifact::create_artifact))
        .route("/api/tts", post(tts::synthesize))
        .with_state(state)
}

/// Bind the configured address and serve until shutdown
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Derive the externally visible base URL from request headers
///
/// Share links are built against whatever host the client used to reach us.
/// Behind a TLS-terminating proxy the connection here is plain HTTP, so the
/// scheme comes from `X-Forwarded-Proto` when the proxy supplies it.
fn request_base_url(headers: &axum::http::HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}
