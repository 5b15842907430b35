//! Slack Web API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use slack_api::{ChatResponse, PostMessageRequest, UpdateMessageRequest};
use tracing::{debug, error};

use crate::errors::NotifierError;
use crate::sink::{MessageRef, MessageSink};

/// Default Slack Web API base URL
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// HTTP client for the Slack `chat.*` methods
pub struct SlackClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl SlackClient {
    /// Create a new Slack client
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, NotifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a Web API method with a JSON body
    async fn call<B: Serialize>(&self, method: &str, body: &B) -> Result<ChatResponse, NotifierError> {
        let url = format!("{}/{}", self.base_url, method);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Slack {} failed: {} - {}", method, status, body);
            return Err(NotifierError::SlackError(format!("{}: {} - {}", method, status, body)));
        }

        let body: ChatResponse = response.json().await?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown_error".to_string());
            error!("Slack {} rejected: {}", method, reason);
            return Err(NotifierError::SlackError(format!("{}: {}", method, reason)));
        }

        Ok(body)
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageRef, NotifierError> {
        let request = PostMessageRequest {
            channel: channel.to_string(),
            text: text.to_string(),
            thread_ts: None,
            as_user: Some(true),
        };
        let response = self.call("chat.postMessage", &request).await?;

        match (response.channel, response.ts) {
            (Some(channel_id), Some(ts)) => Ok(MessageRef { channel_id, ts }),
            _ => Err(NotifierError::SlackError(
                "chat.postMessage: response is missing channel or ts".to_string(),
            )),
        }
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        let request = UpdateMessageRequest {
            channel: message.channel_id.clone(),
            ts: message.ts.clone(),
            text: text.to_string(),
        };
        self.call("chat.update", &request).await?;
        Ok(())
    }

    async fn post_thread_reply(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        let request = PostMessageRequest {
            channel: message.channel_id.clone(),
            text: text.to_string(),
            thread_ts: Some(message.ts.clone()),
            as_user: Some(true),
        };
        self.call("chat.postMessage", &request).await?;
        Ok(())
    }
}
