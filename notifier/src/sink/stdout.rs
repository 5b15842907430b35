//! Sink that prints every write instead of talking to Slack

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::errors::NotifierError;
use crate::sink::{MessageRef, MessageSink};

/// Dry-run sink: each write is printed to stdout with a short header
#[derive(Debug, Default)]
pub struct StdoutSink {
    next_ts: AtomicU64,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageSink for StdoutSink {
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageRef, NotifierError> {
        let ts = format!("{}.000000", self.next_ts.fetch_add(1, Ordering::SeqCst));
        println!("--- post {} ({}) ---\n{}", channel, ts, text);
        Ok(MessageRef {
            channel_id: channel.to_string(),
            ts,
        })
    }

    async fn update_message(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        println!("--- update {} ({}) ---\n{}", message.channel_id, message.ts, text);
        Ok(())
    }

    async fn post_thread_reply(&self, message: &MessageRef, text: &str) -> Result<(), NotifierError> {
        println!("--- reply {} ({}) ---\n{}", message.channel_id, message.ts, text);
        Ok(())
    }
}
