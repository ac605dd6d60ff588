use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::api::{ApiUser, Relationship, TwitterApi, UserList};
use super::{map_api_error, Shared};
use crate::error::{MicroBlogError, Result};
use crate::microblogs::MicroBlogUsers;
use crate::types::{ServiceHandle, User, UserLookup};

type Outcome<T> = std::result::Result<T, MicroBlogError>;

/// Users capability group of the Twitter provider
pub struct TwitterUsers<C> {
    shared: Arc<Shared<C>>,
}

impl<C: TwitterApi> TwitterUsers<C> {
    pub(crate) fn new(shared: Arc<Shared<C>>) -> Self {
        Self { shared }
    }

    async fn fetch_current_user(&self) -> Outcome<User> {
        debug!("Fetching authenticated Twitter user");
        let user = self
            .shared
            .api
            .verify_credentials()
            .await
            .map_err(|e| map_api_error(e, "verify credentials"))?;
        Ok(to_user(&self.shared.handle, user))
    }

    /// Cached profile lookup
    pub(crate) async fn lookup(&self, lookup: UserLookup) -> Outcome<User> {
        let shared = &self.shared;
        shared
            .users
            .get_or_try_insert_with(lookup.clone(), async {
                let user = shared
                    .api
                    .get_user(&lookup)
                    .await
                    .map_err(|e| map_api_error(e, "get user"))?;
                Ok::<_, MicroBlogError>(to_user(&shared.handle, user))
            })
            .await
    }

    /// Screen name to list relations for, defaulting to the current user
    async fn subject(&self, username: Option<String>) -> Outcome<String> {
        match username {
            Some(username) => Ok(username),
            None => Ok(self.fetch_current_user().await?.username),
        }
    }

    async fn fetch_list(&self, list: UserList) -> Outcome<Vec<User>> {
        debug!(?list, "Fetching Twitter user list");
        let users = self
            .shared
            .api
            .list_users(&list)
            .await
            .map_err(|e| map_api_error(e, "list users"))?;
        Ok(users
            .into_iter()
            .map(|user| to_user(&self.shared.handle, user))
            .collect())
    }

    async fn update(&self, action: Relationship, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(MicroBlogError::InvalidRequest(format!("A username is required to {}.", action)).into());
        }

        debug!(%action, username, "Updating Twitter relationship");
        let user = self
            .shared
            .api
            .update_relationship(action, username)
            .await
            .map_err(|e| map_api_error(e, action.as_str()))?;

        // Following someone changes their follower list too; blocking also
        // severs the follow edges in both directions
        match action {
            Relationship::Follow | Relationship::Unfollow => {
                self.shared.following.invalidate_all();
                self.shared.followers.invalidate_all();
            }
            Relationship::Block | Relationship::Unblock => {
                self.shared.blocked.invalidate_all();
                self.shared.following.invalidate_all();
                self.shared.followers.invalidate_all();
            }
            Relationship::Mute | Relationship::Unmute => self.shared.muted.invalidate_all(),
        }

        Ok(to_user(&self.shared.handle, user))
    }
}

impl<C> Clone for TwitterUsers<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Map an API user onto the unified record
pub(crate) fn to_user(handle: &ServiceHandle, user: ApiUser) -> User {
    let id = match user.id_str {
        Some(id) if !id.is_empty() => id,
        _ => user.id.to_string(),
    };

    User {
        service: handle.clone(),
        id,
        full_name: user.name,
        username: user.screen_name,
        description: user.description,
        location: user.location,
        url: user.url,
        is_private: user.protected,
    }
}

#[async_trait]
impl<C: TwitterApi> MicroBlogUsers for TwitterUsers<C> {
    async fn current_user(&self) -> Result<User> {
        Ok(self.fetch_current_user().await?)
    }

    async fn get_user(&self, username: Option<&str>, user_id: Option<&str>) -> Result<User> {
        let lookup = UserLookup::from_args(username, user_id)?;
        Ok(self.lookup(lookup).await?)
    }

    async fn refresh_user(&self, user_id: &str) -> Result<User> {
        let lookup = UserLookup::from_args(None, Some(user_id))?;
        self.shared.users.invalidate(&lookup).await;

        let user = self.lookup(lookup).await?;
        self.shared
            .users
            .insert(UserLookup::Username(user.username.clone()), user.clone())
            .await;
        Ok(user)
    }

    async fn follow(&self, username: &str) -> Result<User> {
        self.update(Relationship::Follow, username).await
    }

    async fn unfollow(&self, username: &str) -> Result<User> {
        self.update(Relationship::Unfollow, username).await
    }

    async fn block(&self, username: &str) -> Result<User> {
        self.update(Relationship::Block, username).await
    }

    async fn unblock(&self, username: &str) -> Result<User> {
        self.update(Relationship::Unblock, username).await
    }

    async fn mute(&self, username: &str) -> Result<User> {
        self.update(Relationship::Mute, username).await
    }

    async fn unmute(&self, username: &str) -> Result<User> {
        self.update(Relationship::Unmute, username).await
    }

    async fn list_followers(&self, username: Option<&str>) -> Result<Vec<User>> {
        let key = present(username);
        let users = self
            .shared
            .followers
            .get_or_try_insert_with(key.clone(), async {
                let screen_name = self.subject(key).await?;
                self.fetch_list(UserList::Followers { screen_name }).await
            })
            .await?;
        Ok(users)
    }

    async fn list_following(&self, username: Option<&str>) -> Result<Vec<User>> {
        let key = present(username);
        let users = self
            .shared
            .following
            .get_or_try_insert_with(key.clone(), async {
                let screen_name = self.subject(key).await?;
                self.fetch_list(UserList::Friends { screen_name }).await
            })
            .await?;
        Ok(users)
    }

    async fn list_blocked(&self) -> Result<Vec<User>> {
        let users = self
            .shared
            .blocked
            .get_or_try_insert_with((), self.fetch_list(UserList::Blocks))
            .await?;
        Ok(users)
    }

    async fn list_muted(&self) -> Result<Vec<User>> {
        let users = self
            .shared
            .muted
            .get_or_try_insert_with((), self.fetch_list(UserList::Mutes))
            .await?;
        Ok(users)
    }
}
