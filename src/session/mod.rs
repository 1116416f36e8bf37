//! In-memory session store for projects and chats
//!
//! The store owns all project and chat records for the lifetime of the
//! process; state is volatile and cleared on startup. Each collection is
//! guarded by its own mutex, acquired before inspecting or mutating and
//! released before returning. No lock is ever held across an await, and
//! every returned value is a snapshot copy so callers never observe a
//! record mutated out from under them.

use crate::error::{Result, ScenegenError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

pub mod types;
pub use types::{Chat, ChatMessage, ChatSummary, Project, Role};

/// Maximum number of characters copied from the first user message into an
/// auto-populated chat title.
const TITLE_PREFIX_CHARS: usize = 28;

/// Title used when the first user message is empty after trimming.
const UNTITLED_CHAT_TITLE: &str = "New Chat";

/// Concurrent keyed repository of projects and chats
///
/// Constructed once at startup and injected into every handler; there is no
/// global store. Generation streaming never touches the store; callers that
/// want to persist generated output append it explicitly.
#[derive(Debug, Default)]
pub struct SessionStore {
    projects: Mutex<HashMap<String, Project>>,
    chats: Mutex<HashMap<String, Chat>>,
}

/// Generate a fresh opaque id (hex, no hyphens)
fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------

    /// Create a project with a fresh id
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::Validation` if the name is empty after
    /// trimming.
    pub fn create_project(&self, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScenegenError::Validation("Project name is required".to_string()).into());
        }

        let project = Project {
            id: new_id(),
            name: name.to_string(),
            updated_at: Utc::now(),
        };

        let mut projects = self.projects.lock().expect("projects lock poisoned");
        projects.insert(project.id.clone(), project.clone());
        tracing::debug!("Created project {} ({})", project.id, project.name);
        Ok(project)
    }

    /// List all projects sorted by `updated_at` descending
    ///
    /// Ties are broken by id so repeated calls return a stable order.
    pub fn list_projects(&self) -> Vec<Project> {
        let projects = self.projects.lock().expect("projects lock poisoned");
        let mut list: Vec<Project> = projects.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        list
    }

    /// Rename a project, refreshing its `updated_at`
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` for an unknown id and
    /// `ScenegenError::Validation` for a name that is empty after trimming.
    /// A failed rename leaves both the name and `updated_at` untouched.
    pub fn rename_project(&self, id: &str, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScenegenError::Validation("Project name is required".to_string()).into());
        }

        let mut projects = self.projects.lock().expect("projects lock poisoned");
        let project = projects
            .get_mut(id)
            .ok_or_else(|| ScenegenError::NotFound("Project not found".to_string()))?;
        project.name = name.to_string();
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    /// Delete a project and cascade to every chat filed under it
    ///
    /// The projects lock and the chats lock are taken sequentially, never
    /// nested. A chat created for this project between the two steps can
    /// survive orphaned; that race is accepted rather than paying for
    /// two-phase atomicity.
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the project does not exist.
    pub fn delete_project(&self, id: &str) -> Result<()> {
        {
            let mut projects = self.projects.lock().expect("projects lock poisoned");
            if projects.remove(id).is_none() {
                return Err(ScenegenError::NotFound("Project not found".to_string()).into());
            }
        }

        let removed = {
            let mut chats = self.chats.lock().expect("chats lock poisoned");
            let before = chats.len();
            chats.retain(|_, chat| chat.project_id.as_deref() != Some(id));
            before - chats.len()
        };

        tracing::debug!("Deleted project {} and {} chat(s)", id, removed);
        Ok(())
    }

    /// Build the share URL for an existing project
    ///
    /// Pure derivation from the base URL and id; the store is only consulted
    /// to confirm the id exists.
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the project does not exist.
    pub fn project_share_link(&self, base_url: &str, id: &str) -> Result<String> {
        let projects = self.projects.lock().expect("projects lock poisoned");
        if !projects.contains_key(id) {
            return Err(ScenegenError::NotFound("Project not found".to_string()).into());
        }
        Ok(format!(
            "{}/chat?project_id={}",
            base_url.trim_end_matches('/'),
            id
        ))
    }

    // ---------------------------------------------------------------------
    // Chats
    // ---------------------------------------------------------------------

    /// Create a chat, optionally titled and optionally filed under a project
    pub fn create_chat(&self, title: Option<&str>, project_id: Option<&str>) -> ChatSummary {
        let now = Utc::now();
        let chat = Chat {
            id: new_id(),
            title: title.map(str::trim).unwrap_or_default().to_string(),
            project_id: project_id.map(String::from),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };

        let summary = ChatSummary::from(&chat);
        let mut chats = self.chats.lock().expect("chats lock poisoned");
        chats.insert(chat.id.clone(), chat);
        summary
    }

    /// Fetch a full chat snapshot by id
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the chat does not exist.
    pub fn get_chat(&self, id: &str) -> Result<Chat> {
        let chats = self.chats.lock().expect("chats lock poisoned");
        chats
            .get(id)
            .cloned()
            .ok_or_else(|| ScenegenError::NotFound("Chat not found".to_string()).into())
    }

    /// List chats sorted by `updated_at` descending
    ///
    /// `query`, when given, is matched case-insensitively as a substring of
    /// the chat title or of any message's content. `project_id`, when given,
    /// filters by exact equality.
    pub fn list_chats(&self, query: Option<&str>, project_id: Option<&str>) -> Vec<ChatSummary> {
        let query = query.map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase);

        let chats = self.chats.lock().expect("chats lock poisoned");
        let mut list: Vec<ChatSummary> = chats
            .values()
            .filter(|chat| match project_id {
                Some(pid) => chat.project_id.as_deref() == Some(pid),
                None => true,
            })
            .filter(|chat| match &query {
                Some(q) => {
                    chat.title.to_lowercase().contains(q)
                        || chat
                            .messages
                            .iter()
                            .any(|m| m.content.to_lowercase().contains(q))
                }
                None => true,
            })
            .map(ChatSummary::from)
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        list
    }

    /// Rename a chat, refreshing its `updated_at`
    ///
    /// An explicitly supplied empty (after trimming) title is accepted and
    /// clears the title, which is distinct from never having supplied one.
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the chat does not exist.
    pub fn rename_chat(&self, id: &str, title: &str) -> Result<ChatSummary> {
        let mut chats = self.chats.lock().expect("chats lock poisoned");
        let chat = chats
            .get_mut(id)
            .ok_or_else(|| ScenegenError::NotFound("Chat not found".to_string()))?;
        chat.title = title.trim().to_string();
        chat.updated_at = Utc::now();
        Ok(ChatSummary::from(&*chat))
    }

    /// Append a message to a chat
    ///
    /// Content is trimmed; ordering is append-only. When the chat is still
    /// untitled and the message role is `user`, the title is set to the
    /// first [`TITLE_PREFIX_CHARS`] characters of the content, or
    /// [`UNTITLED_CHAT_TITLE`] when the content is empty.
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the chat does not exist.
    pub fn append_message(&self, id: &str, role: Role, content: &str) -> Result<Chat> {
        let content = content.trim().to_string();

        let mut chats = self.chats.lock().expect("chats lock poisoned");
        let chat = chats
            .get_mut(id)
            .ok_or_else(|| ScenegenError::NotFound("Chat not found".to_string()))?;

        if chat.title.is_empty() && role == Role::User {
            chat.title = if content.is_empty() {
                UNTITLED_CHAT_TITLE.to_string()
            } else {
                content.chars().take(TITLE_PREFIX_CHARS).collect()
            };
        }

        chat.messages.push(ChatMessage { role, content });
        chat.updated_at = Utc::now();
        Ok(chat.clone())
    }

    /// Delete a chat by id
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the chat does not exist.
    pub fn delete_chat(&self, id: &str) -> Result<()> {
        let mut chats = self.chats.lock().expect("chats lock poisoned");
        if chats.remove(id).is_none() {
            return Err(ScenegenError::NotFound("Chat not found".to_string()).into());
        }
        Ok(())
    }

    /// Build the share URL for an existing chat
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::NotFound` if the chat does not exist.
    pub fn chat_share_link(&self, base_url: &str, id: &str) -> Result<String> {
        let chats = self.chats.lock().expect("chats lock poisoned");
        if !chats.contains_key(id) {
            return Err(ScenegenError::NotFound("Chat not found".to_string()).into());
        }
        Ok(format!(
            "{}/chat?chat_id={}",
            base_url.trim_end_matches('/'),
            id
        ))
    }
}
