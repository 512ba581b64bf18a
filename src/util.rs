//! MAC address normalization and formatting.

use crate::error::{PluginError, Result};

// ── MAC address ───────────────────────────────────────────────────────────────

/// Normalize a MAC address to the canonical `aa:bb:cc:dd:ee:ff` form.
///
/// Accepted inputs:
///   000b8240d55c        — 12 bare hex digits
///   00:0B:82:40:D5:5C   — colon separated
///   00-0b-82-40-d5-5c   — dash separated
///   0:b:82:40:d5:5c     — separated groups may drop the leading zero
///
/// Mixed separators are rejected.
pub fn norm_mac(raw: &str) -> Result<String> {
    let invalid = || PluginError::InvalidMac(raw.to_string());

    let sep = if raw.contains(':') {
        Some(':')
    } else if raw.contains('-') {
        Some('-')
    } else {
        None
    };

    let octets: Vec<u8> = match sep {
        Some(sep) => {
            let groups: Vec<&str> = raw.split(sep).collect();
            if groups.len() != 6 {
                return Err(invalid());
            }
            groups
                .iter()
                .map(|g| {
                    if g.is_empty() || g.len() > 2 || !g.bytes().all(|b| b.is_ascii_hexdigit()) {
                        return Err(invalid());
                    }
                    u8::from_str_radix(g, 16).map_err(|_| invalid())
                })
                .collect::<Result<_>>()?
        }
        None => {
            if raw.len() != 12 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            (0..6)
                .map(|i| u8::from_str_radix(&raw[i * 2..i * 2 + 2], 16).map_err(|_| invalid()))
                .collect::<Result<_>>()?
        }
    };

    Ok(format_octets(&octets, ":", false))
}

/// Format a normalized MAC with the given separator and case.
///
/// `format_mac("00:0b:82:40:d5:5c", "", false)` → `"000b8240d55c"`.
pub fn format_mac(mac: &str, separator: &str, uppercase: bool) -> Result<String> {
    let normalized = norm_mac(mac)?;
    let octets: Vec<u8> = normalized
        .split(':')
        .map(|g| u8::from_str_radix(g, 16).map_err(|_| PluginError::InvalidMac(mac.to_string())))
        .collect::<Result<_>>()?;
    Ok(format_octets(&octets, separator, uppercase))
}

fn format_octets(octets: &[u8], separator: &str, uppercase: bool) -> String {
    octets
        .iter()
        .map(|b| if uppercase { format!("{b:02X}") } else { format!("{b:02x}") })
        .collect::<Vec<_>>()
        .join(separator)
}
