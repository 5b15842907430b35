//! Slack permalink parsing for resuming into an existing message

use url::Url;

use crate::errors::NotifierError;

/// A message located from a user-supplied reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingMessage {
    /// Channel id when the reference carried one
    pub channel_id: Option<String>,
    /// Message timestamp in `seconds.micros` form
    pub ts: String,
}

/// Parse either a permalink (`https://x.slack.com/archives/C0123/p1690000000123456`)
/// or a bare message timestamp (`1690000000.123456`).
pub fn parse_message_ref(reference: &str) -> Result<ExistingMessage, NotifierError> {
    let reference = reference.trim();

    if is_message_ts(reference) {
        return Ok(ExistingMessage {
            channel_id: None,
            ts: reference.to_string(),
        });
    }

    let url = Url::parse(reference)
        .map_err(|e| NotifierError::ConfigError(format!("Invalid Slack link {}: {}", reference, e)))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let last = segments
        .last()
        .ok_or_else(|| NotifierError::ConfigError(format!("Slack link has no message id: {}", reference)))?;
    let ts = permalink_id_to_ts(last).ok_or_else(|| {
        NotifierError::ConfigError(format!("Slack link has no message id: {}", reference))
    })?;

    let channel_id = segments
        .iter()
        .position(|seg| *seg == "archives")
        .and_then(|idx| segments.get(idx + 1))
        .filter(|seg| !seg.starts_with('p'))
        .map(|seg| seg.to_string());

    Ok(ExistingMessage { channel_id, ts })
}

/// Whether `channel` is a conversation id (`C024BE91L`) rather than a name
pub fn is_channel_id(channel: &str) -> bool {
    channel.len() >= 9
        && matches!(channel.as_bytes()[0], b'C' | b'G' | b'D')
        && channel
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// `p1690000000123456` -> `1690000000.123456`
fn permalink_id_to_ts(segment: &str) -> Option<String> {
    let digits = segment.strip_prefix('p')?;
    if digits.len() <= 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (secs, micros) = digits.split_at(digits.len() - 6);
    Some(format!("{}.{}", secs, micros))
}

fn is_message_ts(value: &str) -> bool {
    match value.split_once('.') {
        Some((secs, micros)) => {
            !secs.is_empty()
                && micros.len() == 6
                && secs.chars().all(|c| c.is_ascii_digit())
                && micros.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
