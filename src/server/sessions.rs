//! Session REST handlers for projects and chats
//!
//! Every handler is a thin pass-through to the store. The PATCH/DELETE
//! routes are the canonical interface; the POST `/rename` and `/delete`
//! aliases exist for clients that cannot issue those verbs.

use crate::server::{request_base_url, ApiError, AppState};
use crate::session::{Chat, ChatSummary, Project, Role};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NewProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewChatRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListChatsQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.list_projects())
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<NewProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.store.create_project(&payload.name)?))
}

pub async fn rename_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RenameProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.store.rename_project(&id, &payload.name)?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_project(&id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn rename_project_post(
    state: State<AppState>,
    id: Path<String>,
    payload: Json<RenameProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    rename_project(state, id, payload).await
}

pub async fn delete_project_post(
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    delete_project(state, id).await
}

pub async fn share_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = state
        .store
        .project_share_link(&request_base_url(&headers), &id)?;
    Ok(Json(serde_json::json!({ "url": url })))
}

pub async fn list_project_chats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<ChatSummary>> {
    Json(state.store.list_chats(None, Some(&id)))
}

pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<ListChatsQuery>,
) -> Json<Vec<ChatSummary>> {
    Json(
        state
            .store
            .list_chats(query.q.as_deref(), query.project_id.as_deref()),
    )
}

pub async fn create_chat(
    State(state): State<AppState>,
    Json(payload): Json<NewChatRequest>,
) -> Json<ChatSummary> {
    Json(
        state
            .store
            .create_chat(payload.title.as_deref(), payload.project_id.as_deref()),
    )
}

pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Chat>, ApiError> {
    Ok(Json(state.store.get_chat(&id)?))
}

pub async fn rename_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RenameChatRequest>,
) -> Result<Json<ChatSummary>, ApiError> {
    Ok(Json(state.store.rename_chat(&id, &payload.title)?))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_chat(&id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AppendMessageRequest>,
) -> Result<Json<Chat>, ApiError> {
    Ok(Json(
        state
            .store
            .append_message(&id, payload.role, &payload.content)?,
    ))
}

pub async fn share_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = state
        .store
        .chat_share_link(&request_base_url(&headers), &id)?;
    Ok(Json(serde_json::json!({ "url": url })))
}
