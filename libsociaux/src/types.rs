//! Unified records shared by every provider
//!
//! Records are immutable snapshots taken at fetch time. Each one carries a
//! [`ServiceHandle`] pointing back at the provider that produced it, so that
//! follow-up calls (refresh, follow, block, ...) can be made from the record
//! itself.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use crate::error::{MicroBlogError, Result, SociauxError};
use crate::microblogs::MicroBlog;

/// Non-owning reference from a record to the provider that produced it
///
/// Providers cache records, so the handle is weak: a record never keeps its
/// provider alive.
#[derive(Clone)]
pub struct ServiceHandle {
    id: &'static str,
    service: Weak<dyn MicroBlog>,
}

impl ServiceHandle {
    pub fn new(id: &'static str, service: Weak<dyn MicroBlog>) -> Self {
        Self { id, service }
    }

    /// Provider id (e.g. "twitter")
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The live provider, or `Detached` if it has been dropped
    pub fn upgrade(&self) -> Result<Arc<dyn MicroBlog>> {
        self.service.upgrade().ok_or(SociauxError::Detached(self.id))
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceHandle").field(&self.id).finish()
    }
}

impl PartialEq for ServiceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.service, &other.service)
    }
}

impl Serialize for ServiceHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id)
    }
}

/// How a user profile is looked up
///
/// Used as the cache key for profile fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserLookup {
    Username(String),
    Id(String),
}

impl UserLookup {
    /// Pick a lookup from optional arguments
    ///
    /// A username takes precedence over an id. Blank values are ignored.
    pub fn from_args(
        username: Option<&str>,
        user_id: Option<&str>,
    ) -> std::result::Result<Self, MicroBlogError> {
        let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(username) = present(username) {
            Ok(UserLookup::Username(username))
        } else if let Some(id) = present(user_id) {
            Ok(UserLookup::Id(id))
        } else {
            Err(MicroBlogError::InvalidRequest(
                "Either username or user_id must be provided.".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub service: ServiceHandle,
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub is_private: bool,
}

impl User {
    /// Fetch this user's current profile from the service, skipping the cache
    pub async fn refresh(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.refresh_user(&self.id).await
    }

    pub async fn follow(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.follow(&self.username).await
    }

    pub async fn unfollow(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.unfollow(&self.username).await
    }

    pub async fn block(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.block(&self.username).await
    }

    pub async fn unblock(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.unblock(&self.username).await
    }

    pub async fn mute(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.mute(&self.username).await
    }

    pub async fn unmute(&self) -> Result<User> {
        let service = self.service.upgrade()?;
        service.users()?.unmute(&self.username).await
    }

    pub async fn followers(&self) -> Result<Vec<User>> {
        let service = self.service.upgrade()?;
        service.users()?.list_followers(Some(&self.username)).await
    }

    pub async fn following(&self) -> Result<Vec<User>> {
        let service = self.service.upgrade()?;
        service.users()?.list_following(Some(&self.username)).await
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} ({})", self.username, self.full_name)
    }
}

/// Placeholder post record; providers do not populate content yet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub service: ServiceHandle,
    pub id: String,
}

/// A comment is a post made in reply to another post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    #[serde(flatten)]
    pub post: Post,
}

impl Deref for Comment {
    type Target = Post;

    fn deref(&self) -> &Post {
        &self.post
    }
}

/// Direct message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dm {
    pub service: ServiceHandle,
    pub id: String,
    pub sender: User,
    pub recipients: Vec<User>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Not every provider reports read state
    pub is_read: Option<bool>,
}

impl Dm {
    /// Whether `username` sent or received this message (case-insensitive)
    pub fn involves(&self, username: &str) -> bool {
        self.sender.username.eq_ignore_ascii_case(username)
            || self
                .recipients
                .iter()
                .any(|r| r.username.eq_ignore_ascii_case(username))
    }
}

impl fmt::Display for Dm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recipients = self
            .recipients
            .iter()
            .map(|r| format!("@{}", r.username))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "@{} to {}", self.sender.username, recipients)
    }
}
