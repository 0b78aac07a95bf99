//! Session snapshot
//!
//! A chat transcript plus the A2UI surface it produced, saved and restored
//! as one unit.

use chrono::{DateTime, Utc};
use genui_a2ui::surface::SurfaceState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message of the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    /// Raw text as generated, fences included
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Saved chat + UI state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    /// Owner; stamped by the session service on save
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub surface: SurfaceState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSnapshot {
    /// Empty snapshot with a fresh id
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            title: None,
            messages: Vec::new(),
            surface: SurfaceState::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.touch();
    }

    pub fn set_surface(&mut self, surface: SurfaceState) {
        self.surface = surface;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_serde_uses_camel_case() {
        let mut snapshot = SessionSnapshot::new().with_title("Trip plan");
        snapshot.push_message(ChatMessage::user("Plan a trip"));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["title"], json!("Trip plan"));
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["messages"][0]["role"], json!("user"));

        let back: SessionSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_push_message_touches_updated_at() {
        let mut snapshot = SessionSnapshot::new();
        let before = snapshot.updated_at;
        snapshot.push_message(ChatMessage::assistant("Hi"));
        assert!(snapshot.updated_at >= before);
        assert_eq!(snapshot.messages.len(), 1);
    }
}
