//! Device identification from the HTTP `User-Agent` header.
//!
//! Known User-Agent shapes:
//!
//! ```text
//! Grandstream Model HW GXP1405 SW 1.0.4.23 DevId 000b8240d55c
//! Grandstream Model HW GXP2200 V2.2A SW 1.0.1.33 DevId 000b82462d97
//! Grandstream Model HW GXV3350  V1.3A SW 1.0.1.8 DevId c074ad150b88
//! Grandstream Model HW HT801 V1.1A SW 1.0.17.5 DevId c074ad273a10
//! Grandstream GXP2000 (gxp2000e.bin:1.2.5.3/boot55e.bin:1.1.6.9) DevId 000b822726c8
//! ```

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::device::{Device, VENDOR};
use crate::util;

static UA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^Grandstream Model HW (\w+)(?:\s+V[^ ]+)? SW ([^ ]+) DevId ([^ ]+)",
        r"^Grandstream (GXP2000) .*:([^ ]+)\) DevId ([^ ]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static User-Agent pattern"))
    .collect()
});

/// Extract a device from an optional `User-Agent` header value.
pub fn extract(user_agent: Option<&str>) -> Option<Device> {
    match user_agent {
        Some(ua) if !ua.is_empty() => extract_from_ua(ua),
        _ => None,
    }
}

/// Match `ua` against the known patterns.
///
/// A pattern whose MAC fails normalization counts as a non-match.
pub fn extract_from_ua(ua: &str) -> Option<Device> {
    for pattern in UA_PATTERNS.iter() {
        let Some(caps) = pattern.captures(ua) else { continue };
        let (model, version, raw_mac) = (&caps[1], &caps[2], &caps[3]);
        match util::norm_mac(raw_mac) {
            Ok(mac) => {
                return Some(Device {
                    mac:     Some(mac),
                    ip:      None,
                    vendor:  Some(VENDOR.to_string()),
                    model:   Some(model.to_string()),
                    version: Some(version.to_string()),
                });
            }
            Err(e) => warn!("could not normalize MAC address \"{raw_mac}\": {e}"),
        }
    }
    None
}
