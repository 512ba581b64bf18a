//! The Grandstream plugin: configure, deconfigure and synchronize devices.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::assoc::{PgAssociator, SupportLevel};
use crate::config::PluginConfig;
use crate::device::Device;
use crate::enrich;
use crate::error::{PluginError, Result};
use crate::extract;
use crate::raw_config::RawConfig;
use crate::render::{self, TemplateRenderer};
use crate::sync::{SyncService, Synchronizer};
use crate::util;

/// Sub-directory of the TFTP root holding Grandstream files.
pub const VENDOR_DIR: &str = "Grandstream";

pub struct GrandstreamPlugin {
    cfg:          PluginConfig,
    tftpboot_dir: PathBuf,
    associator:   PgAssociator,
    renderer:     Arc<dyn TemplateRenderer>,
    synchronizer: Synchronizer,
}

impl GrandstreamPlugin {
    pub fn new(
        cfg:          PluginConfig,
        renderer:     Arc<dyn TemplateRenderer>,
        sync_service: Option<Arc<dyn SyncService>>,
    ) -> Self {
        let tftpboot_dir = cfg.tftpboot_dir.join(VENDOR_DIR);
        let associator = PgAssociator::new(cfg.models.iter().cloned(), cfg.version.clone());
        let synchronizer = Synchronizer::new(cfg.sync_mode, sync_service);
        GrandstreamPlugin { cfg, tftpboot_dir, associator, renderer, synchronizer }
    }

    /// Directory the device files are written to.
    pub fn tftpboot_dir(&self) -> &Path {
        &self.tftpboot_dir
    }

    /// Directory the server's no-listing HTTP file service should serve.
    pub fn http_root(&self) -> &Path {
        &self.cfg.tftpboot_dir
    }

    // ── Identification ────────────────────────────────────────────────────────

    pub fn extract(&self, user_agent: Option<&str>) -> Option<Device> {
        extract::extract(user_agent)
    }

    pub fn associate(&self, device: &Device) -> SupportLevel {
        self.associator.associate(
            device.vendor.as_deref(),
            device.model.as_deref(),
            device.version.as_deref(),
        )
    }

    // ── Device files ──────────────────────────────────────────────────────────

    /// `cfg<mac>.xml`, the name the phone asks for.
    pub fn dev_specific_filename(&self, device: &Device) -> Result<String> {
        let mac = device_mac(device)?;
        Ok(format!("cfg{}.xml", util::format_mac(mac, "", false)?))
    }

    pub fn get_remote_state_trigger_filename(&self, device: &Device) -> Option<String> {
        device.mac.as_ref()?;
        self.dev_specific_filename(device).ok()
    }

    /// Enrich `raw` for `device`, render it and write the device file.
    ///
    /// Returns the path written.
    pub fn configure(&self, device: &Device, raw: &mut RawConfig) -> Result<PathBuf> {
        check_config(raw)?;
        let mac = device_mac(device)?;
        let model = device.model.as_deref();

        enrich::check_lines_password(raw);
        enrich::add_sip_transport(raw);
        enrich::add_timezone(raw);
        enrich::add_locale(raw);
        enrich::add_dtmf_mode(raw);
        enrich::add_fkeys(raw, model, &self.cfg.fkey_layouts);
        enrich::add_dns(raw);
        raw.derived.mac = Some(util::format_mac(mac, "", false)?);

        let filename = self.dev_specific_filename(device)?;
        let template = render::dev_template(&filename, device, self.cfg.templates_dir.as_deref());
        debug!("{filename}: using template {template}");

        let content = self.renderer.render(&template, &raw.to_context()?)?;
        fs::create_dir_all(&self.tftpboot_dir)?;
        let path = self.tftpboot_dir.join(&filename);
        fs::write(&path, content)?;
        info!("configured {mac}: {}", path.display());
        Ok(path)
    }

    /// Remove the device file.  A missing file is only logged.
    pub fn deconfigure(&self, device: &Device) -> Result<()> {
        let path = self.tftpboot_dir.join(self.dev_specific_filename(device)?);
        if let Err(e) = fs::remove_file(&path) {
            info!("error while removing configuration file {}: {e}", path.display());
        }
        Ok(())
    }

    pub async fn synchronize(&self, device: &Device) -> Result<()> {
        self.synchronizer.synchronize(device).await
    }
}

fn check_config(raw: &RawConfig) -> Result<()> {
    if raw.http_port.is_none() {
        return Err(PluginError::RawConfig("only support configuration via HTTP".into()));
    }
    Ok(())
}

fn device_mac(device: &Device) -> Result<&str> {
    device
        .mac
        .as_deref()
        .ok_or_else(|| PluginError::Device("MAC address needed for device configuration".into()))
}
