//! Client surface the Twitter adapter is written against
//!
//! [`TwitterApi`] mirrors the v1.1 REST endpoints the adapter needs. Paging is
//! the client's job: list calls return every page. Failures are reported as
//! [`ApiError`], classified by HTTP status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserLookup;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// User object as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiUser {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub protected: bool,
}

/// Direct message event (`type = "message_create"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDirectMessage {
    pub id: String,
    /// Milliseconds since the epoch, as a decimal string
    pub created_timestamp: String,
    pub message_create: MessageCreate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreate {
    pub sender_id: String,
    pub target: MessageTarget,
    pub message_data: MessageData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTarget {
    pub recipient_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub text: String,
}

/// Relationship changes the authenticated user can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Follow,
    Unfollow,
    Block,
    Unblock,
    Mute,
    Unmute,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User collections that are paged through with cursors
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserList {
    Followers { screen_name: String },
    Friends { screen_name: String },
    Blocks,
    Mutes,
}

/// Errors raised by a [`TwitterApi`] client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 401
    #[error("401 Unauthorized: {}", .messages.join("\n"))]
    Unauthorized { messages: Vec<String> },

    /// HTTP 429
    #[error("429 Too Many Requests: {}", .messages.join("\n"))]
    TooManyRequests { messages: Vec<String> },

    /// HTTP 404
    #[error("404 Not Found: {}", .messages.join("\n"))]
    NotFound { messages: Vec<String> },

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {}", .messages.join("\n"))]
    Http { status: u16, messages: Vec<String> },

    /// The request could not be signed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// The request never got an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, messages: Vec<String>) -> Self {
        match status {
            401 => Self::Unauthorized { messages },
            404 => Self::NotFound { messages },
            429 => Self::TooManyRequests { messages },
            _ => Self::Http { status, messages },
        }
    }

    /// Messages reported by the API, one per line
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized { messages }
            | Self::TooManyRequests { messages }
            | Self::NotFound { messages }
            | Self::Http { messages, .. }
                if !messages.is_empty() =>
            {
                messages.join("\n")
            }
            Self::Unauthorized { .. } => "Unauthorized".to_string(),
            Self::TooManyRequests { .. } => "Too Many Requests".to_string(),
            Self::NotFound { .. } => "Not Found".to_string(),
            Self::Http { status, .. } => format!("HTTP {}", status),
            Self::OAuth(msg) | Self::Transport(msg) | Self::Decode(msg) => msg.clone(),
        }
    }
}

/// Twitter API client
///
/// Implemented by [`super::rest::RestClient`] for real traffic and by
/// [`super::mock::MockTwitterApi`] in tests.
#[async_trait]
pub trait TwitterApi: Send + Sync + 'static {
    /// The authenticated user
    async fn verify_credentials(&self) -> ApiResult<ApiUser>;

    async fn get_user(&self, lookup: &UserLookup) -> ApiResult<ApiUser>;

    /// Apply a relationship change and return the affected user
    async fn update_relationship(&self, action: Relationship, screen_name: &str) -> ApiResult<ApiUser>;

    /// Every user in the list, all pages
    async fn list_users(&self, list: &UserList) -> ApiResult<Vec<ApiUser>>;

    async fn get_direct_message(&self, id: &str) -> ApiResult<ApiDirectMessage>;

    /// Direct message events visible to the authenticated user, all pages
    async fn list_direct_messages(&self) -> ApiResult<Vec<ApiDirectMessage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(ApiError::from_status(401, vec![]), ApiError::Unauthorized { .. }));
        assert!(matches!(ApiError::from_status(404, vec![]), ApiError::NotFound { .. }));
        assert!(matches!(ApiError::from_status(429, vec![]), ApiError::TooManyRequests { .. }));
        assert!(matches!(
            ApiError::from_status(403, vec![]),
            ApiError::Http { status: 403, .. }
        ));
        assert!(matches!(
            ApiError::from_status(503, vec![]),
            ApiError::Http { status: 503, .. }
        ));
    }

    #[test]
    fn test_message_joins_api_messages() {
        let error = ApiError::from_status(
            401,
            vec![
                "32 - Could not authenticate you.".to_string(),
                "89 - Invalid or expired token.".to_string(),
            ],
        );
        assert_eq!(
            error.message(),
            "32 - Could not authenticate you.\n89 - Invalid or expired token."
        );
    }

    #[test]
    fn test_message_falls_back_to_status() {
        assert_eq!(ApiError::from_status(404, vec![]).message(), "Not Found");
        assert_eq!(ApiError::from_status(502, vec![]).message(), "HTTP 502");
        assert_eq!(ApiError::Transport("connection reset".to_string()).message(), "connection reset");
    }

    #[test]
    fn test_api_user_deserializes_v1_payload() {
        let user: ApiUser = serde_json::from_value(serde_json::json!({
            "id": 6253282,
            "id_str": "6253282",
            "name": "Twitter API",
            "screen_name": "TwitterAPI",
            "location": "San Francisco, CA",
            "description": "The Real Twitter API.",
            "url": "https://t.co/8IkCzCDr19",
            "protected": false,
            "followers_count": 6133636
        }))
        .unwrap();

        assert_eq!(user.id, 6253282);
        assert_eq!(user.screen_name, "TwitterAPI");
        assert_eq!(user.location.as_deref(), Some("San Francisco, CA"));
        assert!(!user.protected);
    }

    #[test]
    fn test_api_user_tolerates_nulls() {
        let user: ApiUser = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "No Extras",
            "screen_name": "plain",
            "url": null,
            "location": null
        }))
        .unwrap();

        assert_eq!(user.id_str, None);
        assert_eq!(user.url, None);
        assert_eq!(user.description, None);
    }

    #[test]
    fn test_direct_message_deserializes_event() {
        let event: ApiDirectMessage = serde_json::from_value(serde_json::json!({
            "type": "message_create",
            "id": "1090353640046411780",
            "created_timestamp": "1548807386000",
            "message_create": {
                "target": { "recipient_id": "3805104374" },
                "sender_id": "1041490263209025536",
                "message_data": { "text": "Hello", "entities": {} }
            }
        }))
        .unwrap();

        assert_eq!(event.message_create.sender_id, "1041490263209025536");
        assert_eq!(event.message_create.target.recipient_id, "3805104374");
        assert_eq!(event.message_create.message_data.text, "Hello");
    }
}
