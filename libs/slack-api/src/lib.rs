//! Slack Web API models
//!
//! Request and response bodies for the `chat.*` methods used by the notifier.

pub mod models;

pub use models::*;
