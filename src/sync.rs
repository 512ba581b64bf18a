//! Asking a phone to re-fetch its configuration.
//!
//! The server owns the actual notification channel; the plugin only picks
//! the path once, from [`SyncMode`], and checks what that path needs.

use std::sync::Arc;

use log::info;

use crate::config::SyncMode;
use crate::device::Device;
use crate::error::{PluginError, Result};

/// SIP NOTIFY event understood by Grandstream phones.
pub const CHECK_SYNC_EVENT: &str = "check-sync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncServiceKind {
    AsteriskAmi,
    Other(String),
}

/// Device synchronization service of the provisioning server.
pub trait SyncService: Send + Sync {
    fn kind(&self) -> SyncServiceKind;

    /// Standard path: the server resolves how to reach the device.
    fn notify_device(&self, device: &Device) -> Result<()>;

    /// Legacy path: blocking SIP NOTIFY to `ip`.
    fn sip_notify(&self, ip: &str, event: &str) -> Result<()>;
}

pub struct Synchronizer {
    mode:    SyncMode,
    service: Option<Arc<dyn SyncService>>,
}

impl Synchronizer {
    pub fn new(mode: SyncMode, service: Option<Arc<dyn SyncService>>) -> Self {
        Synchronizer { mode, service }
    }

    pub async fn synchronize(&self, device: &Device) -> Result<()> {
        match self.mode {
            SyncMode::Standard => {
                let service = self
                    .service
                    .as_ref()
                    .ok_or_else(|| PluginError::Sync("no sync service configured".into()))?;
                service.notify_device(device)
            }
            SyncMode::Legacy => self.legacy_synchronize(device).await,
        }
    }

    async fn legacy_synchronize(&self, device: &Device) -> Result<()> {
        let ip = device
            .ip
            .clone()
            .ok_or_else(|| {
                PluginError::Sync("IP address needed for device synchronization".into())
            })?;

        let service = match &self.service {
            Some(s) if s.kind() == SyncServiceKind::AsteriskAmi => Arc::clone(s),
            Some(s) => {
                return Err(PluginError::Sync(format!("incompatible sync service: {:?}", s.kind())));
            }
            None => return Err(PluginError::Sync("incompatible sync service: none".into())),
        };

        info!("sending {CHECK_SYNC_EVENT} to {ip}");
        tokio::task::spawn_blocking(move || service.sip_notify(&ip, CHECK_SYNC_EVENT)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        ami:      bool,
        notified: Mutex<Vec<String>>,
    }

    impl SyncService for Recorder {
        fn kind(&self) -> SyncServiceKind {
            if self.ami {
                SyncServiceKind::AsteriskAmi
            } else {
                SyncServiceKind::Other("none".into())
            }
        }

        fn notify_device(&self, device: &Device) -> Result<()> {
            let mac = device.mac.as_deref().unwrap_or("");
            self.notified.lock().unwrap().push(format!("device {mac}"));
            Ok(())
        }

        fn sip_notify(&self, ip: &str, event: &str) -> Result<()> {
            self.notified.lock().unwrap().push(format!("{event} {ip}"));
            Ok(())
        }
    }

    fn device_with_ip() -> Device {
        Device { ip: Some("10.0.0.12".into()), ..Device::with_mac("00:0b:82:40:d5:5c") }
    }

    #[tokio::test]
    async fn standard_path_delegates_to_service() {
        let rec = Arc::new(Recorder::default());
        let sync = Synchronizer::new(SyncMode::Standard, Some(rec.clone()));
        sync.synchronize(&device_with_ip()).await.unwrap();
        assert_eq!(*rec.notified.lock().unwrap(), vec!["device 00:0b:82:40:d5:5c"]);
    }

    #[tokio::test]
    async fn legacy_path_sends_check_sync() {
        let rec = Arc::new(Recorder { ami: true, ..Default::default() });
        let sync = Synchronizer::new(SyncMode::Legacy, Some(rec.clone()));
        sync.synchronize(&device_with_ip()).await.unwrap();
        assert_eq!(*rec.notified.lock().unwrap(), vec!["check-sync 10.0.0.12"]);
    }

    #[tokio::test]
    async fn legacy_path_needs_ip() {
        let rec = Arc::new(Recorder { ami: true, ..Default::default() });
        let sync = Synchronizer::new(SyncMode::Legacy, Some(rec.clone()));
        let err = sync.synchronize(&Device::with_mac("00:0b:82:40:d5:5c")).await.unwrap_err();
        assert!(err.to_string().contains("IP address needed"));
        assert!(rec.notified.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_path_needs_ami_service() {
        let sync = Synchronizer::new(SyncMode::Legacy, Some(Arc::new(Recorder::default())));
        let err = sync.synchronize(&device_with_ip()).await.unwrap_err();
        assert!(err.to_string().contains("incompatible sync service"));

        let sync = Synchronizer::new(SyncMode::Legacy, None);
        assert!(sync.synchronize(&device_with_ip()).await.is_err());
    }
}
