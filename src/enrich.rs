//! Enrichment steps run by `configure` before rendering.
//!
//! Each step reads a few raw keys and fills its own part of
//! [`Derived`](crate::raw_config::Derived); a step whose input is absent
//! leaves the config untouched.

use log::warn;

use crate::config::FkeyLayout;
use crate::fkeys;
use crate::raw_config::RawConfig;

/// Zone used when the configured timezone is missing or unknown.
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

const TZ_NAMES: &[(&str, &str)] = &[
    ("Europe/Paris", "CET-1CEST-2,M3.5.0/02:00:00,M10.5.0/03:00:00"),
];

const LOCALES: &[(&str, &str)] = &[
    ("de_DE", "de"),
    ("es_ES", "es"),
    ("fr_FR", "fr"),
    ("fr_CA", "fr"),
    ("it_IT", "it"),
    ("nl_NL", "nl"),
    ("en_US", "en"),
];

/// mode: (in audio, in RTP, in SIP)
const DTMF_MODES: &[(&str, (&str, &str, &str))] = &[
    ("RTP-in-band",     ("Yes", "Yes", "No")),
    ("RTP-out-of-band", ("No",  "Yes", "No")),
    ("SIP-INFO",        ("No",  "No",  "Yes")),
];

const SIP_TRANSPORTS: &[(&str, &str)] = &[
    ("udp", "UDP"),
    ("tcp", "TCP"),
    ("tls", "TlsOrTcp"),
];

/// Password the server hands out to phones that are not assigned yet.
const AUTOPROV_PASSWORD: &str = "autoprov";

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn timezone_string(name: &str) -> Option<&'static str> {
    lookup(TZ_NAMES, name)
}

/// Auto-provisioning lines must register without a password.
pub fn check_lines_password(raw: &mut RawConfig) {
    for line in raw.sip_lines.values_mut() {
        if line.password == AUTOPROV_PASSWORD {
            line.password.clear();
        }
    }
}

pub fn add_sip_transport(raw: &mut RawConfig) {
    if let Some(transport) = raw.sip_transport.as_deref() {
        raw.derived.sip_transport = lookup(SIP_TRANSPORTS, transport);
    }
}

pub fn add_timezone(raw: &mut RawConfig) {
    let tz = raw.timezone.as_deref().and_then(timezone_string);
    raw.derived.timezone = tz.or_else(|| timezone_string(DEFAULT_TIMEZONE));
}

pub fn add_locale(raw: &mut RawConfig) {
    if let Some(locale) = raw.locale.as_deref() {
        raw.derived.locale = lookup(LOCALES, locale);
    }
}

pub fn add_dtmf_mode(raw: &mut RawConfig) {
    let Some(mode) = raw.sip_dtmf_mode.as_deref().filter(|m| !m.is_empty()) else { return };
    match lookup(DTMF_MODES, mode) {
        Some((audio, rtp, sip)) => {
            raw.derived.dtmf_in_audio = Some(audio);
            raw.derived.dtmf_in_rtp   = Some(rtp);
            raw.derived.dtmf_in_sip   = Some(sip);
        }
        None => warn!("unsupported DTMF mode: {mode}"),
    }
}

/// Fill the requested function key layouts for `model`.
pub fn add_fkeys(raw: &mut RawConfig, model: Option<&str>, layouts: &[FkeyLayout]) {
    for layout in layouts {
        match layout {
            FkeyLayout::Mpk => {
                raw.derived.mpk = Some(fkeys::mpk_entries(&raw.funckeys, model));
            }
            FkeyLayout::Legacy => {
                raw.derived.fkeys = Some(fkeys::legacy_fkey_entries(&raw.funckeys));
            }
            FkeyLayout::V2 => {
                raw.derived.v2_fkeys =
                    Some(fkeys::v2_fkey_entries(&raw.funckeys, &raw.sip_lines, model));
            }
        }
    }
}

pub fn add_dns(raw: &mut RawConfig) {
    if !raw.dns_enabled {
        return;
    }
    match raw.dns_ip.as_deref() {
        Some(ip) => raw.derived.dns = ip.split('.').map(str::to_string).collect(),
        None => warn!("dns_enabled without dns_ip"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_config::{FuncKey, SipLine};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn autoprov_password_is_cleared() {
        let mut cfg = raw(json!({"sip_lines": {
            "1": {"password": "autoprov"},
            "2": {"password": "s3cret"},
        }}));
        check_lines_password(&mut cfg);
        assert_eq!(cfg.sip_lines["1"].password, "");
        assert_eq!(cfg.sip_lines["2"].password, "s3cret");
    }

    #[test]
    fn sip_transport_names() {
        let cases = [
            ("udp", Some("UDP")),
            ("tcp", Some("TCP")),
            ("tls", Some("TlsOrTcp")),
            ("sctp", None),
        ];
        for (input, expected) in cases {
            let mut cfg = raw(json!({"sip_transport": input}));
            add_sip_transport(&mut cfg);
            assert_eq!(cfg.derived.sip_transport, expected);
        }
        let mut cfg = RawConfig::default();
        add_sip_transport(&mut cfg);
        assert_eq!(cfg.derived.sip_transport, None);
    }

    #[test]
    fn timezone_falls_back_to_paris() {
        let paris = "CET-1CEST-2,M3.5.0/02:00:00,M10.5.0/03:00:00";
        let mut cfg = raw(json!({"timezone": "Europe/Paris"}));
        add_timezone(&mut cfg);
        assert_eq!(cfg.derived.timezone, Some(paris));

        let mut cfg = raw(json!({"timezone": "America/Montreal"}));
        add_timezone(&mut cfg);
        assert_eq!(cfg.derived.timezone, Some(paris));
        assert_eq!(cfg.timezone.as_deref(), Some("America/Montreal"));
    }

    #[test]
    fn locale_codes() {
        let mut cfg = raw(json!({"locale": "fr_CA"}));
        add_locale(&mut cfg);
        assert_eq!(cfg.derived.locale, Some("fr"));

        let mut cfg = raw(json!({"locale": "pt_BR"}));
        add_locale(&mut cfg);
        assert_eq!(cfg.derived.locale, None);
    }

    #[test]
    fn sip_info_dtmf() {
        let mut cfg = raw(json!({"sip_dtmf_mode": "SIP-INFO"}));
        add_dtmf_mode(&mut cfg);
        let ctx = cfg.to_context().unwrap();
        assert_eq!(ctx["XX_dtmf_in_audio"], json!("No"));
        assert_eq!(ctx["XX_dtmf_in_rtp"], json!("No"));
        assert_eq!(ctx["XX_dtmf_in_sip"], json!("Yes"));
    }

    #[test]
    fn unknown_dtmf_mode_is_skipped() {
        let mut cfg = raw(json!({"sip_dtmf_mode": "KPML"}));
        add_dtmf_mode(&mut cfg);
        assert_eq!(cfg.derived.dtmf_in_sip, None);
    }

    #[test]
    fn dns_parts() {
        let mut cfg = raw(json!({"dns_enabled": true, "dns_ip": "192.168.1.53"}));
        add_dns(&mut cfg);
        assert_eq!(cfg.derived.dns, vec!["192", "168", "1", "53"]);

        let mut cfg = raw(json!({"dns_enabled": false, "dns_ip": "192.168.1.53"}));
        add_dns(&mut cfg);
        assert!(cfg.derived.dns.is_empty());
    }

    #[test]
    fn only_requested_layouts_are_filled() {
        let mut cfg = RawConfig::default();
        cfg.funckeys.insert(
            "1".into(),
            FuncKey { kind: "blf".into(), line: 1, label: None, value: "1001".into() },
        );
        cfg.sip_lines.insert("1".into(), SipLine::default());

        add_fkeys(&mut cfg, Some("GXP2160"), &[FkeyLayout::Mpk]);
        assert_eq!(cfg.derived.mpk.as_ref().map(Vec::len), Some(3));
        assert_eq!(cfg.derived.fkeys, None);
        assert_eq!(cfg.derived.v2_fkeys, None);

        add_fkeys(&mut cfg, Some("GXP2160"), &[FkeyLayout::Legacy, FkeyLayout::V2]);
        assert_eq!(cfg.derived.fkeys.as_ref().map(Vec::len), Some(3));
        assert_eq!(cfg.derived.v2_fkeys.as_ref().map(Vec::len), Some(4 + 24));
    }
}
