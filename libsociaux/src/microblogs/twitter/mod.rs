//! Twitter provider
//!
//! Adapts a [`TwitterApi`] client to the unified facade. Only the users and
//! direct-message groups are implemented. Profile and relationship-list
//! lookups are memoized per provider instance for the configured TTL
//! (15 minutes by default).
//!
//! # Examples
//!
//! ```no_run
//! use libsociaux::cache::CacheConfig;
//! use libsociaux::config::{Config, TwitterConfig};
//! use libsociaux::microblogs::twitter::Twitter;
//! use libsociaux::microblogs::MicroBlog;
//!
//! # async fn example() -> libsociaux::error::Result<()> {
//! let config = Config::load()?;
//! let twitter = Twitter::new(TwitterConfig::from_map(config.provider("twitter")?)?, CacheConfig::default())?;
//!
//! let rustlang = twitter.users()?.get_user(Some("rustlang"), None).await?;
//! println!("{} has {} followers", rustlang, rustlang.followers().await?.len());
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};
use tracing::warn;

use crate::cache::{CacheConfig, TtlCache};
use crate::config::TwitterConfig;
use crate::error::{MicroBlogError, Result};
use crate::microblogs::{MicroBlog, MicroBlogDms, MicroBlogUsers};
use crate::types::{ServiceHandle, User, UserLookup};

pub mod api;
mod dms;
pub mod mock;
mod oauth;
pub mod rest;
mod users;

pub use api::{ApiError, TwitterApi};
pub use dms::TwitterDms;
pub use mock::MockTwitterApi;
pub use rest::RestClient;
pub use users::TwitterUsers;

pub const SERVICE_ID: &str = "twitter";
pub const SERVICE_NAME: &str = "Twitter";
pub const SERVICE_URL: &str = "https://twitter.com";

/// Page size for follower and friend lists (endpoint maximum)
pub const PAGINATION_COUNT: u32 = 200;

/// Page size for direct message events (endpoint maximum)
pub const DM_PAGE_SIZE: u32 = 50;

/// Twitter provider over a [`TwitterApi`] client
pub struct Twitter<C: TwitterApi = RestClient> {
    users: TwitterUsers<C>,
    dms: TwitterDms<C>,
}

/// State shared by the capability groups of one provider instance
pub(crate) struct Shared<C> {
    pub(crate) api: C,
    pub(crate) handle: ServiceHandle,
    pub(crate) users: TtlCache<UserLookup, User>,
    pub(crate) followers: TtlCache<Option<String>, Vec<User>>,
    pub(crate) following: TtlCache<Option<String>, Vec<User>>,
    pub(crate) blocked: TtlCache<(), Vec<User>>,
    pub(crate) muted: TtlCache<(), Vec<User>>,
}

impl Twitter<RestClient> {
    /// Provider talking to the REST API with the given credentials
    pub fn new(config: TwitterConfig, cache: CacheConfig) -> Result<Arc<Self>> {
        let api = RestClient::new(&config).map_err(|e| map_api_error(e, "client setup"))?;
        Ok(Self::with_api(api, cache))
    }
}

impl<C: TwitterApi> Twitter<C> {
    /// Provider over an arbitrary client (e.g. [`MockTwitterApi`])
    pub fn with_api(api: C, cache: CacheConfig) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let service: Weak<dyn MicroBlog> = this.clone();
            let shared = Arc::new(Shared {
                api,
                handle: ServiceHandle::new(SERVICE_ID, service),
                users: TtlCache::new("twitter.users", &cache),
                followers: TtlCache::new("twitter.followers", &cache),
                following: TtlCache::new("twitter.following", &cache),
                blocked: TtlCache::new("twitter.blocked", &cache),
                muted: TtlCache::new("twitter.muted", &cache),
            });

            Self {
                users: TwitterUsers::new(Arc::clone(&shared)),
                dms: TwitterDms::new(shared),
            }
        })
    }
}

impl<C: TwitterApi> MicroBlog for Twitter<C> {
    fn id(&self) -> &'static str {
        SERVICE_ID
    }

    fn name(&self) -> &'static str {
        SERVICE_NAME
    }

    fn url(&self) -> &'static str {
        SERVICE_URL
    }

    fn users(&self) -> Result<&dyn MicroBlogUsers> {
        Ok(&self.users)
    }

    fn dms(&self) -> Result<&dyn MicroBlogDms> {
        Ok(&self.dms)
    }
}

/// Translate a client failure into the unified taxonomy
///
/// The message is the API's own messages, one per line.
pub(crate) fn map_api_error(error: ApiError, context: &str) -> MicroBlogError {
    let message = error.message();

    let mapped = match error {
        ApiError::Unauthorized { .. } | ApiError::OAuth(_) => MicroBlogError::InvalidCredentials(message),
        ApiError::TooManyRequests { .. } => MicroBlogError::QuotaExceeded(message),
        ApiError::NotFound { .. } => MicroBlogError::NotFound(message),
        ApiError::Http { .. } | ApiError::Transport(_) => MicroBlogError::ServiceError(message),
        ApiError::Decode(_) => MicroBlogError::InvalidResponse(message),
    };

    warn!(context, error = %mapped, "Twitter request failed");
    mapped
}
