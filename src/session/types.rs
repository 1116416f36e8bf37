//! Entity types for the in-memory session store
//!
//! Projects group chats; chats hold an append-only ordered sequence of
//! messages. All timestamps are UTC and serialized as RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// End-user turn
    User,
    /// Model reply
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation
///
/// Messages are immutable once appended; only whole chats are deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A project groups related chats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque unique identifier
    pub id: String,
    /// Display name; not unique across projects
    pub name: String,
    /// Refreshed on every rename
    pub updated_at: DateTime<Utc>,
}

/// A chat session with its full message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Opaque unique identifier
    pub id: String,
    /// Display title; empty string means untitled
    pub title: String,
    /// Owning project, if any; a chat without one is "unfiled"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation (message append, rename)
    pub updated_at: DateTime<Utc>,
    /// Append-only conversation history in arrival order
    pub messages: Vec<ChatMessage>,
}

/// Listing view of a chat without its message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Opaque unique identifier
    pub id: String,
    /// Display title; empty string means untitled
    pub title: String,
    /// Owning project, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl From<&Chat> for ChatSummary {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.clone(),
            title: chat.title.clone(),
            project_id: chat.project_id.clone(),
            updated_at: chat.updated_at,
        }
    }
}
