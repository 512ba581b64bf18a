//! Error types for the Grandstream plugin.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Task join: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// The raw config lacks something the plugin cannot work without.
    #[error("Raw config: {0}")]
    RawConfig(String),

    /// The device lacks something the plugin cannot work without.
    #[error("Device: {0}")]
    Device(String),

    #[error("Sync: {0}")]
    Sync(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("Render: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;
