//! Plugin configuration file parser.
//!
//! Parses a `key = value` file, one setting per line, `#` for comments.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assoc;
use crate::error::{PluginError, Result};

/// How the plugin asks a phone to fetch its configuration again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Hand the device to the server's standard SIP synchronization.
    #[default]
    Standard,
    /// Send a `check-sync` SIP NOTIFY through an Asterisk AMI sync service.
    Legacy,
}

/// Function key layouts the plugin can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FkeyLayout {
    /// `XX_mpk`, per-model MPK P-values.
    Mpk,
    /// `XX_fkeys`, the older P3xx layout.
    Legacy,
    /// `XX_v2_fkeys`, section based VPK/MPK list.
    V2,
}

/// Full plugin configuration.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Root served over TFTP/HTTP; device files go to `<root>/Grandstream`.
    pub tftpboot_dir:  PathBuf,
    /// Directory searched for per-device / per-model template overrides.
    pub templates_dir: Option<PathBuf>,
    // ── Association ───────────────────────────────────────────────────────────
    pub models:        Vec<String>,
    /// Firmware version prefix giving full support.
    pub version:       String,
    // ── Behaviour ─────────────────────────────────────────────────────────────
    pub sync_mode:     SyncMode,
    pub fkey_layouts:  Vec<FkeyLayout>,
    // ── Process ───────────────────────────────────────────────────────────────
    pub log_syslog:    bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            tftpboot_dir:  PathBuf::from("/var/lib/provd/tftpboot"),
            templates_dir: None,
            models:        assoc::MODELS.iter().map(|m| m.to_string()).collect(),
            version:       assoc::VERSION.to_string(),
            sync_mode:     SyncMode::Standard,
            fkey_layouts:  vec![FkeyLayout::Mpk],
            log_syslog:    true,
        }
    }
}

fn parse_bool(val: &str) -> bool {
    val == "true" || val == "1" || val == "yes"
}

fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_layouts(val: &str) -> Result<Vec<FkeyLayout>> {
    parse_list(val)
        .iter()
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "mpk"    => Ok(FkeyLayout::Mpk),
            "legacy" => Ok(FkeyLayout::Legacy),
            "v2"     => Ok(FkeyLayout::V2),
            other    => Err(PluginError::Config(format!("unknown fkey layout: {other}"))),
        })
        .collect()
}

/// Parse configuration text.  Unknown keys are ignored.
pub fn parse_config(content: &str) -> Result<PluginConfig> {
    let mut cfg = PluginConfig::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, '=');
        let key = match parts.next() {
            Some(k) => k.trim().to_ascii_lowercase(),
            None => continue,
        };
        let val = match parts.next() {
            Some(v) => v.trim().to_string(),
            None => continue,
        };
        if val.is_empty() {
            continue;
        }

        match key.as_str() {
            "tftpboot_dir"  => cfg.tftpboot_dir  = PathBuf::from(&val),
            "templates_dir" => cfg.templates_dir = Some(PathBuf::from(&val)),
            "models"        => cfg.models        = parse_list(&val),
            "version"       => cfg.version       = val,
            "log_syslog"    => cfg.log_syslog    = parse_bool(&val),
            "fkey_layouts"  => cfg.fkey_layouts  = parse_layouts(&val)?,
            "sync_mode" => {
                cfg.sync_mode = match val.to_ascii_lowercase().as_str() {
                    "legacy" | "ami" => SyncMode::Legacy,
                    _                => SyncMode::Standard,
                };
            }
            _ => {} // ignore unknown keys
        }
    }

    Ok(cfg)
}

/// Parse `path` as a plugin configuration file.
pub fn load_config(path: &Path) -> Result<PluginConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| PluginError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_config(&content)
}

/// Validate that required fields are populated.
pub fn validate_config(cfg: &PluginConfig) -> Result<()> {
    if cfg.tftpboot_dir.as_os_str().is_empty() {
        return Err(PluginError::Config("tftpboot_dir is required".into()));
    }
    if cfg.models.is_empty() {
        return Err(PluginError::Config("at least one model is required".into()));
    }
    if cfg.version.is_empty() {
        return Err(PluginError::Config("version is required".into()));
    }
    Ok(())
}
