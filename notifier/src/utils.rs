//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Strip an ARN-like prefix, keeping the part after the last `/`
pub fn short_resource_id(id: &str) -> &str {
    id.rsplit_once('/').map(|(_, tail)| tail).unwrap_or(id)
}
