//! reqwest-backed [`TwitterApi`] client for the v1.1 REST API

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::api::{
    ApiDirectMessage, ApiError, ApiResult, ApiUser, Relationship, TwitterApi, UserList,
};
use super::oauth::OAuthSigner;
use super::{DM_PAGE_SIZE, PAGINATION_COUNT};
use crate::config::TwitterConfig;
use crate::types::UserLookup;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RestClient {
    http: Client,
    base_url: String,
    signer: OAuthSigner,
}

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<ApiUser>,
    #[serde(default)]
    next_cursor: i64,
}

#[derive(Deserialize)]
struct DirectMessagePage {
    #[serde(default)]
    events: Vec<ApiDirectMessage>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct DirectMessageEnvelope {
    event: ApiDirectMessage,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

impl RestClient {
    pub fn new(config: &TwitterConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sociaux/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            signer: OAuthSigner::new(config),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let authorization = self.signer.authorization(method.as_str(), &url, params)?;

        debug!(%method, endpoint, "Twitter API request");

        let response = self
            .http
            .request(method, &url)
            .query(params)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), endpoint, "Twitter API error response");
            return Err(ApiError::from_status(status.as_u16(), api_messages(&body)));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
    }

    async fn collect_users(&self, endpoint: &str, params: Vec<(String, String)>) -> ApiResult<Vec<ApiUser>> {
        let mut users = Vec::new();
        let mut cursor: i64 = -1;

        loop {
            let mut page_params = params.clone();
            page_params.push(param("cursor", cursor.to_string()));

            let page: UserPage = self.call(Method::GET, endpoint, &page_params).await?;
            users.extend(page.users);

            if page.next_cursor == 0 {
                break;
            }
            cursor = page.next_cursor;
        }

        Ok(users)
    }
}

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Messages from an error body as "code - message"
fn api_messages(body: &str) -> Vec<String> {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return Vec::new();
    };

    let mut messages: Vec<String> = parsed
        .errors
        .into_iter()
        .map(|e| match e.code {
            Some(code) => format!("{} - {}", code, e.message),
            None => e.message,
        })
        .collect();
    messages.extend(parsed.error);
    messages
}

fn relationship_endpoint(action: Relationship) -> &'static str {
    match action {
        Relationship::Follow => "friendships/create.json",
        Relationship::Unfollow => "friendships/destroy.json",
        Relationship::Block => "blocks/create.json",
        Relationship::Unblock => "blocks/destroy.json",
        Relationship::Mute => "mutes/users/create.json",
        Relationship::Unmute => "mutes/users/destroy.json",
    }
}

#[async_trait]
impl TwitterApi for RestClient {
    async fn verify_credentials(&self) -> ApiResult<ApiUser> {
        self.call(Method::GET, "account/verify_credentials.json", &[param("skip_status", "true")])
            .await
    }

    async fn get_user(&self, lookup: &UserLookup) -> ApiResult<ApiUser> {
        let by = match lookup {
            UserLookup::Username(username) => param("screen_name", username.as_str()),
            UserLookup::Id(id) => param("user_id", id.as_str()),
        };
        self.call(Method::GET, "users/show.json", &[by]).await
    }

    async fn update_relationship(&self, action: Relationship, screen_name: &str) -> ApiResult<ApiUser> {
        self.call(
            Method::POST,
            relationship_endpoint(action),
            &[param("screen_name", screen_name)],
        )
        .await
    }

    async fn list_users(&self, list: &UserList) -> ApiResult<Vec<ApiUser>> {
        let mut params = vec![
            param("skip_status", "true"),
            param("include_user_entities", "false"),
        ];

        let endpoint = match list {
            UserList::Followers { screen_name } | UserList::Friends { screen_name } => {
                params.push(param("screen_name", screen_name.as_str()));
                params.push(param("count", PAGINATION_COUNT.to_string()));
                if matches!(list, UserList::Followers { .. }) {
                    "followers/list.json"
                } else {
                    "friends/list.json"
                }
            }
            UserList::Blocks => "blocks/list.json",
            UserList::Mutes => "mutes/users/list.json",
        };

        self.collect_users(endpoint, params).await
    }

    async fn get_direct_message(&self, id: &str) -> ApiResult<ApiDirectMessage> {
        let envelope: DirectMessageEnvelope = self
            .call(Method::GET, "direct_messages/events/show.json", &[param("id", id)])
            .await?;
        Ok(envelope.event)
    }

    async fn list_direct_messages(&self) -> ApiResult<Vec<ApiDirectMessage>> {
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![param("count", DM_PAGE_SIZE.to_string())];
            if let Some(cursor) = &cursor {
                params.push(param("cursor", cursor.as_str()));
            }

            let page: DirectMessagePage = self
                .call(Method::GET, "direct_messages/events/list.json", &params)
                .await?;
            events.extend(page.events);

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(events)
    }
}
