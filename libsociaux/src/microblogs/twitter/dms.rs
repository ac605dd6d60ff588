use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::api::{ApiDirectMessage, TwitterApi};
use super::users::TwitterUsers;
use super::{map_api_error, Shared};
use crate::error::{MicroBlogError, Result};
use crate::microblogs::MicroBlogDms;
use crate::types::{Dm, UserLookup};

/// Direct-message capability group of the Twitter provider
pub struct TwitterDms<C> {
    shared: Arc<Shared<C>>,
    users: TwitterUsers<C>,
}

impl<C: TwitterApi> TwitterDms<C> {
    pub(crate) fn new(shared: Arc<Shared<C>>) -> Self {
        Self {
            users: TwitterUsers::new(Arc::clone(&shared)),
            shared,
        }
    }

    /// Resolve participants through the cached profile lookup
    async fn to_dm(&self, event: ApiDirectMessage) -> std::result::Result<Dm, MicroBlogError> {
        let message = event.message_create;
        let created_at = parse_created_timestamp(&event.created_timestamp)?;

        let sender = self.users.lookup(UserLookup::Id(message.sender_id)).await?;
        let recipient = self
            .users
            .lookup(UserLookup::Id(message.target.recipient_id))
            .await?;

        Ok(Dm {
            service: self.shared.handle.clone(),
            id: event.id,
            sender,
            recipients: vec![recipient],
            text: message.message_data.text,
            created_at,
            is_read: None,
        })
    }
}

/// `created_timestamp` is epoch milliseconds
fn parse_created_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, MicroBlogError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| MicroBlogError::InvalidResponse(format!("Invalid DM timestamp '{}'", raw)))
}

#[async_trait]
impl<C: TwitterApi> MicroBlogDms for TwitterDms<C> {
    async fn get(&self, dm_id: &str) -> Result<Dm> {
        let dm_id = dm_id.trim();
        if dm_id.is_empty() {
            return Err(MicroBlogError::InvalidRequest("A direct message id is required.".to_string()).into());
        }

        debug!(dm_id, "Fetching Twitter direct message");
        let event = self
            .shared
            .api
            .get_direct_message(dm_id)
            .await
            .map_err(|e| map_api_error(e, "get direct message"))?;

        Ok(self.to_dm(event).await?)
    }

    async fn list_threads(&self, username: Option<&str>) -> Result<Vec<Dm>> {
        debug!("Listing Twitter direct messages");
        let events = self
            .shared
            .api
            .list_direct_messages()
            .await
            .map_err(|e| map_api_error(e, "list direct messages"))?;

        let mut dms = Vec::with_capacity(events.len());
        for event in events {
            dms.push(self.to_dm(event).await?);
        }

        if let Some(username) = username.map(str::trim).filter(|u| !u.is_empty()) {
            dms.retain(|dm| dm.involves(username));
        }

        Ok(dms)
    }
}
