//! A single chat message kept in sync with the run's progress

use chrono::Local;
use tracing::debug;

use crate::errors::NotifierError;
use crate::progress::bar::{self, DEFAULT_SUFFIX};
use crate::sink::permalink::ExistingMessage;
use crate::sink::{MessageRef, MessageSink};

/// Progress channel options
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Text printed right after the percentage
    pub suffix: String,

    /// Header line rendered above the bar
    pub prefix: Option<String>,

    /// Attach to this message instead of posting a new one
    pub existing_message: Option<ExistingMessage>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            prefix: None,
            existing_message: None,
        }
    }
}

/// Format one log line as it appears in the message
pub fn format_log_line(timestamp: &str, message: &str) -> String {
    format!("*{}* - [{}]", timestamp, message)
}

/// Owns one live message and re-pushes its full content on every mutation.
///
/// Sink failures are returned as-is; there is no retry at this layer.
pub struct ProgressChannel<S: MessageSink> {
    sink: S,
    message: MessageRef,
    percentage: f64,
    log_lines: Vec<String>,
    suffix: String,
    prefix: Option<String>,
}

impl<S: MessageSink> ProgressChannel<S> {
    /// Post the initial bar, or attach to an existing message without writing
    pub async fn open(
        sink: S,
        channel: &str,
        initial_percentage: f64,
        options: ChannelOptions,
    ) -> Result<Self, NotifierError> {
        let ChannelOptions {
            suffix,
            prefix,
            existing_message,
        } = options;

        let message = match existing_message {
            Some(existing) => {
                let message = MessageRef {
                    channel_id: existing.channel_id.unwrap_or_else(|| channel.to_string()),
                    ts: existing.ts,
                };
                debug!("Attaching to existing message {} in {}", message.ts, message.channel_id);
                message
            }
            None => {
                let text = bar::render(initial_percentage, &[], &suffix, prefix.as_deref());
                sink.post_message(channel, &text).await?
            }
        };

        Ok(Self {
            sink,
            message,
            percentage: initial_percentage,
            log_lines: Vec::new(),
            suffix,
            prefix,
        })
    }

    /// The message this channel edits
    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    /// Current message body
    pub fn render(&self) -> String {
        bar::render(
            self.percentage,
            &self.log_lines,
            &self.suffix,
            self.prefix.as_deref(),
        )
    }

    /// Move the bar; an unchanged value writes nothing
    pub async fn set_percentage(&mut self, value: f64) -> Result<(), NotifierError> {
        if value == self.percentage {
            return Ok(());
        }
        self.percentage = value;
        self.push().await
    }

    /// Append a timestamped line and push, even if the bar did not move
    pub async fn log(&mut self, message: &str) -> Result<(), NotifierError> {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.log_lines.push(format_log_line(&timestamp, message));
        self.push().await
    }

    /// Post `message` as a reply in the message's thread. Each call posts again.
    pub async fn reply_in_thread(&self, message: &str) -> Result<(), NotifierError> {
        self.sink.post_thread_reply(&self.message, message).await
    }

    async fn push(&self) -> Result<(), NotifierError> {
        self.sink.update_message(&self.message, &self.render()).await
    }
}
