//! Initiator attribution: AWS caller -> Slack mention

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::control::CallerIdentity;
use crate::errors::NotifierError;

/// IAM user name -> Slack user id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMapping(HashMap<String, String>);

impl IdentityMapping {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn get(&self, user: &str) -> Option<&str> {
        self.0.get(user).map(String::as_str).filter(|id| !id.is_empty())
    }

    /// Slack mention for a mapped user, otherwise a quoted plain name
    pub fn mention(&self, user: &str) -> String {
        match self.get(user) {
            Some(slack_id) => format!("<@{}>", slack_id),
            None => format!("'AWS User {}'", user),
        }
    }

    /// Merge `other` on top of `self`
    pub fn merged(mut self, other: IdentityMapping) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl FromStr for IdentityMapping {
    type Err = NotifierError;

    /// Parse a JSON object such as `{"jane": "U012AB3CD"}`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str::<HashMap<String, String>>(s)
            .map(Self)
            .map_err(|e| NotifierError::ConfigError(format!("Invalid identity mapping: {}", e)))
    }
}

/// Who started the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initiator {
    /// IAM user (or role session) name
    pub user: String,
    /// Text to put in Slack messages
    pub mention: String,
}

/// User part of an ARN: everything after the first `/`
pub fn user_from_arn(arn: &str) -> &str {
    arn.split_once('/').map(|(_, user)| user).unwrap_or(arn)
}

/// Look up the caller and map it; an unreachable identity service is not fatal
pub async fn resolve_initiator<I>(identity: &I, mapping: &IdentityMapping) -> Initiator
where
    I: CallerIdentity + ?Sized,
{
    match identity.caller_arn().await {
        Ok(arn) => {
            let user = user_from_arn(&arn).to_string();
            Initiator {
                mention: mapping.mention(&user),
                user,
            }
        }
        Err(e) => {
            warn!("Unable to resolve caller identity: {}", e);
            Initiator {
                user: "unknown".to_string(),
                mention: mapping.mention("unknown"),
            }
        }
    }
}
