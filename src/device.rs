//! Device descriptor as seen by the plugin.

use serde::{Deserialize, Serialize};

pub const VENDOR: &str = "Grandstream";

/// A phone known to the provisioning server.
///
/// Built from a User-Agent on the first HTTP request, then completed by the
/// host (IP address, etc.).  Nothing here outlives a single plugin call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Normalized MAC (`aa:bb:cc:dd:ee:ff`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac:     Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model:   Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Device {
    pub fn with_mac(mac: impl Into<String>) -> Self {
        Device { mac: Some(mac.into()), ..Default::default() }
    }
}
