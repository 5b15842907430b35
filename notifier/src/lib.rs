//! Deploy Notifier Library
//!
//! Follows an AWS CodeBuild build or CodeDeploy deployment and mirrors its
//! progress into one continuously edited Slack message.

pub mod app;
pub mod control;
pub mod errors;
pub mod git;
pub mod identity;
pub mod logs;
pub mod messages;
pub mod progress;
pub mod sink;
pub mod tracker;
pub mod utils;
pub mod workers;
