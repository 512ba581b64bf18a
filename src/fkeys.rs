//! Function key (BLF / speed dial) to P-value mapping.
//!
//! Grandstream phones address every key setting through numbered P-values.
//! The numbering depends on the model family:
//!
//!   GXP2130, GXP2160   — MPKs in three banks: 1–7, 8–18, 19 and up
//!   GXP2140, GXP2170   — one linear block starting at P23000, 5 per key
//!   GXP2135            — no MPK mapping, keys are left alone
//!
//! Two older layouts are kept as well: the "legacy" P3xx layout and the
//! section-based VPK/MPK layout used by newer templates.

use std::collections::BTreeMap;

use log::{error, info, warn};

use crate::raw_config::{FuncKey, FuncKeyType, ParamEntry, ParamValue, SipLine, V2FuncKey};

// ── Model tables ──────────────────────────────────────────────────────────────

/// Number of virtual (display) and physical programmable keys of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCounts {
    pub vpk: u32,
    pub mpk: u32,
}

const MODEL_KEYS: &[(&str, KeyCounts)] = &[
    ("GXP2130", KeyCounts { vpk: 3,  mpk: 8 }),
    ("GXP2135", KeyCounts { vpk: 6,  mpk: 24 }),
    ("GXP2140", KeyCounts { vpk: 4,  mpk: 160 }),
    ("GXP2160", KeyCounts { vpk: 5,  mpk: 24 }),
    ("GXP2170", KeyCounts { vpk: 6,  mpk: 160 }),
    ("GRP2612", KeyCounts { vpk: 16, mpk: 0 }),
    ("GRP2613", KeyCounts { vpk: 24, mpk: 0 }),
    ("GRP2614", KeyCounts { vpk: 16, mpk: 24 }),
    ("GRP2615", KeyCounts { vpk: 40, mpk: 0 }),
    ("GRP2616", KeyCounts { vpk: 16, mpk: 24 }),
];

pub fn key_counts(model: &str) -> Option<KeyCounts> {
    MODEL_KEYS.iter().find(|(m, _)| *m == model).map(|(_, c)| *c)
}

/// How a model numbers its MPK P-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpkLayout {
    /// Three banks with distinct bases (GXP2130/GXP2160).
    Banked { max_keys: u32 },
    /// `P23000 + 5 * (n - 1)` (GXP2140/GXP2170).
    Linear { max_keys: u32 },
    /// The model has no MPK mapping.
    Unmapped,
}

pub fn mpk_layout(model: &str) -> Option<MpkLayout> {
    match model {
        "GXP2130" | "GXP2160" => Some(MpkLayout::Banked { max_keys: key_counts(model)?.mpk }),
        "GXP2140" | "GXP2170" => Some(MpkLayout::Linear { max_keys: key_counts(model)?.mpk }),
        "GXP2135" => Some(MpkLayout::Unmapped),
        _ => None,
    }
}

// ── MPK P-value arithmetic ───────────────────────────────────────────────────

/// P-value numbers of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParams {
    pub key_mode: u32,
    pub account:  u32,
    pub name:     u32,
    pub value:    u32,
}

impl KeyParams {
    fn block(base: u32) -> Self {
        KeyParams { key_mode: base, account: base + 1, name: base + 2, value: base + 3 }
    }
}

/// P-values of key `index` (1-based), `None` when out of the model's range.
pub fn mpk_params(layout: MpkLayout, index: u32) -> Option<KeyParams> {
    match layout {
        MpkLayout::Banked { max_keys } => {
            if index == 0 || index > max_keys {
                return None;
            }
            let params = match index {
                // every ID advances by one per key in the first bank
                1..=7 => {
                    let n = index - 1;
                    KeyParams {
                        key_mode: 323 + n,
                        account:  301 + n,
                        name:     302 + n,
                        value:    303 + n,
                    }
                }
                8..=18 => KeyParams::block(353 + 4 * (index - 8)),
                _ => KeyParams::block(1440 + 4 * (index - 19)),
            };
            Some(params)
        }
        MpkLayout::Linear { max_keys } => {
            if index == 0 || index > max_keys {
                return None;
            }
            Some(KeyParams::block(23000 + 5 * (index - 1)))
        }
        MpkLayout::Unmapped => None,
    }
}

/// Parse a key number and its type, logging what gets skipped.
fn usable_key(number: &str, key: &FuncKey) -> Option<(u32, FuncKeyType)> {
    let Ok(index) = number.parse::<u32>() else {
        warn!("ignoring function key with non-numeric index {number:?}");
        return None;
    };
    match key.kind.parse::<FuncKeyType>() {
        Ok(kind) => Some((index, kind)),
        Err(e) => {
            warn!("function key {index}: {e}");
            None
        }
    }
}

/// Keys sorted by numeric index, the map itself sorts "10" before "2".
fn sorted_keys(funckeys: &BTreeMap<String, FuncKey>) -> Vec<(u32, FuncKeyType, &FuncKey)> {
    let mut keys: Vec<_> = funckeys
        .iter()
        .filter_map(|(n, k)| usable_key(n, k).map(|(i, t)| (i, t, k)))
        .collect();
    keys.sort_by_key(|(i, _, _)| *i);
    keys
}

fn push_key(lines: &mut Vec<ParamEntry>, codes: [String; 4], kind: FuncKeyType, key: &FuncKey) {
    let [mode, account, name, value] = codes;
    lines.push((mode, ParamValue::Int(kind.code())));
    lines.push((account, ParamValue::Int(key.account())));
    if let Some(label) = &key.label {
        lines.push((name, ParamValue::Text(label.clone())));
    }
    lines.push((value, ParamValue::Text(key.value.clone())));
}

/// MPK entries for `model`, in ascending key order.
pub fn mpk_entries(funckeys: &BTreeMap<String, FuncKey>, model: Option<&str>) -> Vec<ParamEntry> {
    let Some(layout) = model.and_then(mpk_layout) else {
        error!("unable to generate BLF for model {:?}", model.unwrap_or(""));
        return Vec::new();
    };
    let mut lines = Vec::new();
    for (index, kind, key) in sorted_keys(funckeys) {
        let Some(p) = mpk_params(layout, index) else { continue };
        let codes = [p.key_mode, p.account, p.name, p.value].map(|n| format!("P{n}"));
        push_key(&mut lines, codes, kind, key);
    }
    lines
}

// ── Legacy P3xx layout ────────────────────────────────────────────────────────

fn p3_code(n: u32) -> String {
    format!("P3{n:02}")
}

/// Entries of the older layout: mode `P32{n+2}`, then `P3{3n-2}` / `P3{3n-1}` / `P3{3n}`.
pub fn legacy_fkey_entries(funckeys: &BTreeMap<String, FuncKey>) -> Vec<ParamEntry> {
    let mut lines = Vec::new();
    for (index, kind, key) in sorted_keys(funckeys) {
        if index == 0 {
            continue;
        }
        let (Some(mode), Some(top)) = (index.checked_add(2), index.checked_mul(3)) else {
            warn!("function key {index} out of range, skipped");
            continue;
        };
        let codes = [format!("P32{mode}"), p3_code(top - 2), p3_code(top - 1), p3_code(top)];
        push_key(&mut lines, codes, kind, key);
    }
    lines
}

// ── Section (VPK/MPK) layout ──────────────────────────────────────────────────

fn v2_key(section: &'static str, kind: FuncKeyType, key: Option<&FuncKey>) -> V2FuncKey {
    V2FuncKey {
        section,
        kind:  kind.code(),
        label: key.and_then(|k| k.label.clone()).unwrap_or_default(),
        value: key.map(|k| k.value.clone()).unwrap_or_default(),
    }
}

fn key_type(index: u32, key: Option<&FuncKey>) -> Option<FuncKeyType> {
    match key {
        None => Some(FuncKeyType::Disabled),
        Some(k) => match k.kind.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                info!("function key {index}: {e}");
                None
            }
        },
    }
}

/// Every VPK then every MPK of `model`; unset keys come out disabled.
///
/// VPK numbers already used by a SIP line are left to the line.  MPK `n`
/// reads function key `n + vpk`.
pub fn v2_fkey_entries(
    funckeys:  &BTreeMap<String, FuncKey>,
    sip_lines: &BTreeMap<String, SipLine>,
    model:     Option<&str>,
) -> Vec<(u32, V2FuncKey)> {
    let Some(counts) = model.and_then(key_counts) else {
        info!("unknown model: {:?}", model.unwrap_or(""));
        return Vec::new();
    };
    let mut lines = Vec::new();

    for n in 1..=counts.vpk {
        let key = funckeys.get(&n.to_string());
        let Some(kind) = key_type(n, key) else { continue };
        if sip_lines.contains_key(&n.to_string()) {
            info!("function key {n} would conflict with an existing line");
            continue;
        }
        lines.push((n, v2_key("vpk", kind, key)));
    }

    for n in 1..=counts.mpk {
        let key = funckeys.get(&(n + counts.vpk).to_string());
        let Some(kind) = key_type(n + counts.vpk, key) else { continue };
        lines.push((n, v2_key("mpk", kind, key)));
    }

    lines
}
