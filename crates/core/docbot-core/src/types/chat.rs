//! Chat and lead types

use super::document::DocumentReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user
    User,
    /// Chatbot
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier
    pub id: String,
    /// Author
    pub role: Role,
    /// Raw text (assistant text is markdown-ish, see `formatter`)
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Documents the answer refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_documents: Option<Vec<DocumentReference>>,
}

impl Message {
    /// New user message stamped now
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// New assistant message stamped now
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            related_documents: None,
        }
    }

    /// Content rendered as HTML for assistant messages; user text is returned as-is
    pub fn render(&self) -> String {
        match self.role {
            Role::Assistant => crate::formatter::format(&self.content),
            Role::User => self.content.clone(),
        }
    }
}

/// Body sent to the chatbot backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotRequest {
    /// The user's question
    pub user_query: String,
    /// Conversation owner previously assigned by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Normalized chatbot answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatbotReply {
    /// Answer text
    pub response: String,
    /// Referenced library documents
    #[serde(default)]
    pub related_documents: Vec<DocumentReference>,
    /// Raw document links attached to the answer
    #[serde(default)]
    pub doc_urls: Vec<String>,
    /// Backend asks the front end to offer the lead form
    #[serde(default)]
    pub lead_flag: bool,
    /// Conversation owner assigned by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Contact request captured by the lead form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadRequest {
    /// Full name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Subject line
    #[serde(default)]
    pub subject: String,
    /// Message body
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatbot_request_omits_missing_user_id() {
        let req = ChatbotRequest {
            user_query: "hi".into(),
            user_id: None,
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"user_query":"hi"}"#
        );
    }

    #[test]
    fn test_message_render() {
        let msg = Message::assistant("**hi**");
        assert_eq!(msg.render(), "<p><strong>hi</strong></p>");
        assert_eq!(Message::user("**hi**").render(), "**hi**");
        assert_ne!(msg.id, Message::assistant("**hi**").id);
    }
}
