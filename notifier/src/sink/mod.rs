//! Messaging sinks the progress channel writes to

pub mod permalink;
pub mod slack;
pub mod stdout;

use async_trait::async_trait;

use crate::errors::NotifierError;

#[cfg(test)]
pub(crate) use recording::{RecordingSink, SinkWrite};
pub use slack::SlackClient;
pub use stdout::StdoutSink;

/// Identity of a posted message: the channel it lives in and its timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: String,
    pub ts: String,
}

/// A chat backend able to post, edit and thread messages
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Post a new top-level message
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageRef, NotifierError>;

    /// Replace the text of an existing message
    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError>;

    /// Post a reply in the thread under `message`
    async fn post_thread_reply(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError>;
}

#[async_trait]
impl<T: MessageSink + ?Sized> MessageSink for std::sync::Arc<T> {
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageRef, NotifierError> {
        (**self).post_message(channel, text).await
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        (**self).update_message(message, text).await
    }

    async fn post_thread_reply(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        (**self).post_thread_reply(message, text).await
    }
}
