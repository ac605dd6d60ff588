//! In-memory Twitter client for testing
//!
//! [`MockTwitterApi`] serves canned users, relationship lists and direct
//! messages, records how often each client method is called, and can be told
//! to fail every call with a given [`ApiError`]. Clones share state, so a test
//! can keep one handle for assertions after moving another into the adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::api::{
    ApiDirectMessage, ApiError, ApiResult, ApiUser, MessageCreate, MessageData, MessageTarget,
    Relationship, TwitterApi, UserList,
};
use crate::types::UserLookup;

#[derive(Debug, Clone, Default)]
pub struct MockTwitterApi {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    current_user: Option<ApiUser>,
    users: Vec<ApiUser>,
    /// Keyed by lowercase screen name
    followers: HashMap<String, Vec<ApiUser>>,
    friends: HashMap<String, Vec<ApiUser>>,
    blocks: Vec<ApiUser>,
    mutes: Vec<ApiUser>,
    direct_messages: Vec<ApiDirectMessage>,
    error: Option<ApiError>,
    calls: HashMap<&'static str, usize>,
}

impl MockState {
    fn known_users(&self) -> impl Iterator<Item = &ApiUser> {
        self.current_user
            .iter()
            .chain(self.users.iter())
            .chain(self.followers.values().flatten())
            .chain(self.friends.values().flatten())
            .chain(self.blocks.iter())
            .chain(self.mutes.iter())
    }

    fn find(&self, lookup: &UserLookup) -> Option<ApiUser> {
        self.known_users()
            .find(|user| match lookup {
                UserLookup::Username(name) => user.screen_name.eq_ignore_ascii_case(name),
                UserLookup::Id(id) => {
                    user.id_str.as_deref() == Some(id.as_str()) || user.id.to_string() == *id
                }
            })
            .cloned()
    }

    fn find_by_name(&self, screen_name: &str) -> ApiResult<ApiUser> {
        self.find(&UserLookup::Username(screen_name.to_string()))
            .ok_or_else(user_not_found)
    }

    fn me(&self) -> ApiResult<ApiUser> {
        self.current_user.clone().ok_or_else(|| ApiError::Unauthorized {
            messages: vec!["89 - Invalid or expired token.".to_string()],
        })
    }
}

fn user_not_found() -> ApiError {
    ApiError::NotFound {
        messages: vec!["50 - User not found.".to_string()],
    }
}

fn add(list: &mut Vec<ApiUser>, user: ApiUser) {
    if !list.iter().any(|u| u.id == user.id) {
        list.push(user);
    }
}

fn remove(list: &mut Vec<ApiUser>, user: &ApiUser) {
    list.retain(|u| u.id != user.id);
}

impl MockTwitterApi {
    /// Client authenticated as `current_user`
    pub fn new(current_user: ApiUser) -> Self {
        let api = Self::default();
        api.state().current_user = Some(current_user);
        api
    }

    /// Client on which every call fails with `error`
    pub fn failing(error: ApiError) -> Self {
        let api = Self::default();
        api.state().error = Some(error);
        api
    }

    /// A plausible API user with `id_str` set
    pub fn user(id: u64, screen_name: &str) -> ApiUser {
        ApiUser {
            id,
            id_str: Some(id.to_string()),
            name: format!("{} (test)", screen_name),
            screen_name: screen_name.to_string(),
            description: Some(format!("Bio of {}", screen_name)),
            location: None,
            url: None,
            protected: false,
        }
    }

    /// A one-to-one direct message event
    pub fn direct_message(id: &str, sender: &ApiUser, recipient: &ApiUser, text: &str, created_ms: i64) -> ApiDirectMessage {
        ApiDirectMessage {
            id: id.to_string(),
            created_timestamp: created_ms.to_string(),
            message_create: MessageCreate {
                sender_id: sender.id.to_string(),
                target: MessageTarget {
                    recipient_id: recipient.id.to_string(),
                },
                message_data: MessageData {
                    text: text.to_string(),
                },
            },
        }
    }

    pub fn with_users(self, users: Vec<ApiUser>) -> Self {
        self.state().users.extend(users);
        self
    }

    pub fn with_followers(self, screen_name: &str, users: Vec<ApiUser>) -> Self {
        self.state().followers.insert(screen_name.to_lowercase(), users);
        self
    }

    pub fn with_friends(self, screen_name: &str, users: Vec<ApiUser>) -> Self {
        self.state().friends.insert(screen_name.to_lowercase(), users);
        self
    }

    pub fn with_blocks(self, users: Vec<ApiUser>) -> Self {
        self.state().blocks = users;
        self
    }

    pub fn with_mutes(self, users: Vec<ApiUser>) -> Self {
        self.state().mutes = users;
        self
    }

    /// Replace the stored profile with the same id, as if edited on the service
    pub fn update_user(&self, user: ApiUser) {
        let mut guard = self.state();
        let state = &mut *guard;
        let profiles = state
            .current_user
            .iter_mut()
            .chain(state.users.iter_mut())
            .chain(state.followers.values_mut().flatten())
            .chain(state.friends.values_mut().flatten())
            .chain(state.blocks.iter_mut())
            .chain(state.mutes.iter_mut());
        for existing in profiles.filter(|existing| existing.id == user.id) {
            *existing = user.clone();
        }
    }

    pub fn with_direct_messages(self, events: Vec<ApiDirectMessage>) -> Self {
        self.state().direct_messages = events;
        self
    }

    /// Make every subsequent call fail (`Some`) or succeed again (`None`)
    pub fn set_error(&self, error: Option<ApiError>) {
        self.state().error = error;
    }

    /// Number of times a client method has been called
    pub fn call_count(&self, method: &str) -> usize {
        self.state().calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call and apply the configured failure
    fn begin(&self, method: &'static str) -> ApiResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        *state.calls.entry(method).or_insert(0) += 1;

        if let Some(error) = state.error.clone() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl TwitterApi for MockTwitterApi {
    async fn verify_credentials(&self) -> ApiResult<ApiUser> {
        self.begin("verify_credentials")?.me()
    }

    async fn get_user(&self, lookup: &UserLookup) -> ApiResult<ApiUser> {
        self.begin("get_user")?.find(lookup).ok_or_else(user_not_found)
    }

    async fn update_relationship(&self, action: Relationship, screen_name: &str) -> ApiResult<ApiUser> {
        let mut state = self.begin("update_relationship")?;
        let me = state.me()?;
        let my_name = me.screen_name.to_lowercase();
        let user = state.find_by_name(screen_name)?;
        let their_name = user.screen_name.to_lowercase();

        match action {
            Relationship::Follow => {
                add(state.friends.entry(my_name).or_default(), user.clone());
                add(state.followers.entry(their_name).or_default(), me);
            }
            Relationship::Unfollow => {
                remove(state.friends.entry(my_name).or_default(), &user);
                remove(state.followers.entry(their_name).or_default(), &me);
            }
            Relationship::Block => {
                remove(state.friends.entry(my_name.clone()).or_default(), &user);
                remove(state.followers.entry(my_name).or_default(), &user);
                remove(state.friends.entry(their_name.clone()).or_default(), &me);
                remove(state.followers.entry(their_name).or_default(), &me);
                add(&mut state.blocks, user.clone());
            }
            Relationship::Unblock => remove(&mut state.blocks, &user),
            Relationship::Mute => add(&mut state.mutes, user.clone()),
            Relationship::Unmute => remove(&mut state.mutes, &user),
        }

        Ok(user)
    }

    async fn list_users(&self, list: &UserList) -> ApiResult<Vec<ApiUser>> {
        let state = self.begin("list_users")?;

        match list {
            UserList::Followers { screen_name } => {
                state.find_by_name(screen_name)?;
                Ok(state.followers.get(&screen_name.to_lowercase()).cloned().unwrap_or_default())
            }
            UserList::Friends { screen_name } => {
                state.find_by_name(screen_name)?;
                Ok(state.friends.get(&screen_name.to_lowercase()).cloned().unwrap_or_default())
            }
            UserList::Blocks => Ok(state.blocks.clone()),
            UserList::Mutes => Ok(state.mutes.clone()),
        }
    }

    async fn get_direct_message(&self, id: &str) -> ApiResult<ApiDirectMessage> {
        self.begin("get_direct_message")?
            .direct_messages
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                messages: vec!["34 - Sorry, that page does not exist.".to_string()],
            })
    }

    async fn list_direct_messages(&self) -> ApiResult<Vec<ApiDirectMessage>> {
        Ok(self.begin("list_direct_messages")?.direct_messages.clone())
    }
}
