use std::fs;
use std::sync::Arc;

use gs_provd::config::parse_config;
use gs_provd::render::GsProvisionRenderer;
use gs_provd::{GrandstreamPlugin, RawConfig, SupportLevel};
use serde_json::json;

#[test]
fn user_agent_to_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = parse_config(&format!("tftpboot_dir = {}\n", dir.path().display())).unwrap();
    let plugin = GrandstreamPlugin::new(cfg, Arc::new(GsProvisionRenderer::new()), None);

    let device = plugin
        .extract(Some("Grandstream Model HW GXP2170 SW 1.0.11.48 DevId c074ad2bd859"))
        .expect("known User-Agent");
    assert_eq!(device.mac.as_deref(), Some("c0:74:ad:2b:d8:59"));
    assert_eq!(plugin.associate(&device), SupportLevel::Full);

    let mut raw: RawConfig = serde_json::from_value(json!({
        "http_port": 8667,
        "sip_lines": {"1": {"password": "autoprov", "username": "anonymous"}},
        "funckeys": {
            "2": {"type": "blf", "line": 1, "value": "1002", "label": "Bob"},
            "1": {"type": "speeddial", "line": 1, "value": "*10"},
        },
        "timezone": "Europe/Paris",
        "locale": "fr_FR",
        "sip_dtmf_mode": "RTP-in-band",
    }))
    .unwrap();

    let path = plugin.configure(&device, &mut raw).unwrap();
    assert_eq!(path, dir.path().join("Grandstream").join("cfgc074ad2bd859.xml"));

    let xml = fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<mac>c074ad2bd859</mac>"));
    assert!(xml.contains("<P64>customize</P64>"));
    assert!(xml.contains("<P246>CET-1CEST-2,M3.5.0/02:00:00,M10.5.0/03:00:00</P246>"));
    assert!(xml.contains("<P1362>fr</P1362>"));
    assert!(xml.contains("<P850>1</P850>"));
    assert!(xml.contains("<P852>0</P852>"));

    // key 1 before key 2, linear block of 5 per key
    let first = xml.find("<P23000>0</P23000>").expect("key 1 mode");
    let second = xml.find("<P23005>1</P23005>").expect("key 2 mode");
    assert!(first < second);
    assert!(xml.contains("<P23003>*10</P23003>"));
    assert!(xml.contains("<P23007>Bob</P23007>"));
    assert!(!xml.contains("<P23002>"));

    assert_eq!(
        plugin.get_remote_state_trigger_filename(&device).as_deref(),
        Some("cfgc074ad2bd859.xml")
    );
    plugin.deconfigure(&device).unwrap();
    assert!(!path.exists());
}
