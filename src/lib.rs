//! Grandstream phone provisioning plugin.
//!
//! Identifies Grandstream phones from their HTTP User-Agent, rates how well
//! they are supported and writes their `cfg<mac>.xml` configuration file.
//! Template rendering and device notification belong to the provisioning
//! server and are reached through [`render::TemplateRenderer`] and
//! [`sync::SyncService`].

pub mod assoc;
pub mod config;
pub mod device;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fkeys;
pub mod package;
pub mod plugin;
pub mod raw_config;
pub mod render;
pub mod sync;
pub mod util;

pub use assoc::{PgAssociator, SupportLevel};
pub use config::PluginConfig;
pub use device::Device;
pub use error::{PluginError, Result};
pub use plugin::GrandstreamPlugin;
pub use raw_config::RawConfig;
