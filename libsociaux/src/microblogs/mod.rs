//! Provider-agnostic microblog facade
//!
//! A provider implements [`MicroBlog`] and hands out one object per
//! capability group it supports: users, direct messages, posts and comments.
//! Groups a provider does not support report [`SociauxError::Unsupported`].
//!
//! # Examples
//!
//! ```no_run
//! use libsociaux::config::Config;
//! use libsociaux::microblogs;
//!
//! # async fn example() -> libsociaux::error::Result<()> {
//! let config = Config::load()?;
//! let twitter = microblogs::connect("twitter", config.provider("twitter")?)?;
//!
//! let me = twitter.users()?.current_user().await?;
//! for follower in twitter.users()?.list_followers(None).await? {
//!     println!("{} follows {}", follower, me);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::CacheConfig;
use crate::config::{Credentials, TwitterConfig};
use crate::error::{Result, SociauxError};
use crate::types::{Comment, Dm, Post, User};

pub mod twitter;

/// Ids accepted by [`connect`]
pub const SUPPORTED: &[&str] = &[twitter::SERVICE_ID];

/// A social-media provider
pub trait MicroBlog: Send + Sync {
    /// Lowercase identifier (e.g. "twitter")
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Home page of the service
    fn url(&self) -> &'static str;

    /// Interactions with user profiles and relationships
    fn users(&self) -> Result<&dyn MicroBlogUsers> {
        Err(unsupported(self.name(), "users"))
    }

    fn dms(&self) -> Result<&dyn MicroBlogDms> {
        Err(unsupported(self.name(), "direct messages"))
    }

    fn posts(&self) -> Result<&dyn MicroBlogPosts> {
        Err(unsupported(self.name(), "posts"))
    }

    fn comments(&self) -> Result<&dyn MicroBlogComments> {
        Err(unsupported(self.name(), "comments"))
    }
}

fn unsupported(service: &str, group: &str) -> SociauxError {
    SociauxError::Unsupported(format!("{} does not provide {}", service, group))
}

/// User profiles and relationships
///
/// Lookups that are expected to be read often (`get_user` and the `list_*`
/// family) may be served from a time-limited cache.
#[async_trait]
pub trait MicroBlogUsers: Send + Sync {
    /// Profile of the authenticated user
    async fn current_user(&self) -> Result<User>;

    /// Profile lookup by username or id
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when neither a username nor an id is given.
    async fn get_user(&self, username: Option<&str>, user_id: Option<&str>) -> Result<User>;

    /// Profile lookup by id that bypasses any cached entry
    ///
    /// Providers without a cache fall back to `get_user`.
    async fn refresh_user(&self, user_id: &str) -> Result<User> {
        self.get_user(None, Some(user_id)).await
    }

    async fn follow(&self, username: &str) -> Result<User>;

    async fn unfollow(&self, username: &str) -> Result<User>;

    async fn block(&self, username: &str) -> Result<User>;

    async fn unblock(&self, username: &str) -> Result<User>;

    async fn mute(&self, username: &str) -> Result<User>;

    async fn unmute(&self, username: &str) -> Result<User>;

    /// Followers of `username`, or of the current user when `None`
    async fn list_followers(&self, username: Option<&str>) -> Result<Vec<User>>;

    /// Accounts followed by `username`, or by the current user when `None`
    async fn list_following(&self, username: Option<&str>) -> Result<Vec<User>>;

    async fn list_blocked(&self) -> Result<Vec<User>>;

    async fn list_muted(&self) -> Result<Vec<User>>;
}

/// Direct messages
#[async_trait]
pub trait MicroBlogDms: Send + Sync {
    async fn get(&self, dm_id: &str) -> Result<Dm>;

    /// Direct messages visible to the current user
    ///
    /// With `username`, only messages exchanged with that user.
    async fn list_threads(&self, username: Option<&str>) -> Result<Vec<Dm>>;
}

#[async_trait]
pub trait MicroBlogPosts: Send + Sync {
    async fn get(&self, post_id: &str) -> Result<Post>;
}

#[async_trait]
pub trait MicroBlogComments: MicroBlogPosts {
    /// Comments made on a post
    async fn list(&self, post_id: &str) -> Result<Vec<Comment>>;
}

/// Build a provider from its id and credential map
pub fn connect(id: &str, credentials: &Credentials) -> Result<Arc<dyn MicroBlog>> {
    connect_with_cache(id, credentials, CacheConfig::default())
}

/// Like [`connect`], with explicit cache settings
pub fn connect_with_cache(
    id: &str,
    credentials: &Credentials,
    cache: CacheConfig,
) -> Result<Arc<dyn MicroBlog>> {
    match id {
        twitter::SERVICE_ID => {
            let config = TwitterConfig::from_map(credentials)?;
            let service: Arc<dyn MicroBlog> = twitter::Twitter::new(config, cache)?;
            Ok(service)
        }
        other => Err(SociauxError::Unsupported(format!(
            "Unknown provider '{}'. Supported providers: {}",
            other,
            SUPPORTED.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl MicroBlog for Bare {
        fn id(&self) -> &'static str {
            "bare"
        }

        fn name(&self) -> &'static str {
            "Bare"
        }

        fn url(&self) -> &'static str {
            "https://example.invalid"
        }
    }

    #[test]
    fn test_unimplemented_groups_are_unsupported() {
        let service = Bare;

        for result in [
            service.users().map(|_| ()),
            service.dms().map(|_| ()),
            service.posts().map(|_| ()),
            service.comments().map(|_| ()),
        ] {
            match result {
                Err(SociauxError::Unsupported(msg)) => assert!(msg.starts_with("Bare does not provide")),
                _ => panic!("Expected Unsupported"),
            }
        }
    }

    #[test]
    fn test_connect_unknown_provider() {
        let result = connect("myspace", &Credentials::new());
        match result {
            Err(SociauxError::Unsupported(msg)) => {
                assert!(msg.contains("myspace"));
                assert!(msg.contains("twitter"));
            }
            _ => panic!("Expected Unsupported for unknown provider"),
        }
    }

    #[test]
    fn test_connect_twitter_validates_credentials() {
        let mut credentials = Credentials::new();
        credentials.insert("consumer_key".to_string(), "ck".to_string());

        let result = connect("twitter", &credentials);
        assert!(matches!(result, Err(SociauxError::Config(_))));
    }

    #[test]
    fn test_connect_twitter() {
        let credentials: Credentials = TwitterConfig::REQUIRED_KEYS
            .iter()
            .map(|key| (key.to_string(), "secret".to_string()))
            .collect();

        let service = connect("twitter", &credentials).unwrap();
        assert_eq!(service.id(), "twitter");
        assert_eq!(service.name(), "Twitter");
        assert_eq!(service.url(), "https://twitter.com");
        assert!(service.users().is_ok());
        assert!(service.dms().is_ok());
        assert!(matches!(service.posts(), Err(SociauxError::Unsupported(_))));
        assert!(matches!(service.comments(), Err(SociauxError::Unsupported(_))));
    }
}
