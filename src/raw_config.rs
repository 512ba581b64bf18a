//! Typed view of the raw configuration handed over by the provisioning server.
//!
//! Only the keys the plugin reads are typed; everything else is kept in
//! `extra` and handed to the renderer unchanged.  Values computed by the
//! enrichment steps live in [`Derived`] and appear in the render context
//! under their `XX_` names.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Raw device configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port:     Option<u16>,
    /// SIP lines keyed by line number ("1", "2", ...).
    #[serde(default)]
    pub sip_lines:     BTreeMap<String, SipLine>,
    /// Function keys keyed by 1-based key number.
    #[serde(default)]
    pub funckeys:      BTreeMap<String, FuncKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone:      Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale:        Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_dtmf_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_transport: Option<String>,
    #[serde(default)]
    pub dns_enabled:   bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_ip:        Option<String>,
    /// Keys the plugin does not interpret.
    #[serde(flatten)]
    pub extra:         Map<String, Value>,
    /// Output of the enrichment steps.
    #[serde(skip)]
    pub derived:       Derived,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SipLine {
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub extra:    Map<String, Value>,
}

/// One function key as configured on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncKey {
    /// Kept as a string: unknown types must be reported, not rejected.
    #[serde(rename = "type")]
    pub kind:  String,
    /// 1-based SIP line the key belongs to.
    #[serde(default = "default_line")]
    pub line:  u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub value: String,
}

fn default_line() -> u32 { 1 }

impl FuncKey {
    /// Zero-based account index used by the phone.
    pub fn account(&self) -> i64 {
        i64::from(self.line) - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKeyType {
    SpeedDial,
    Blf,
    Park,
    Default,
    Disabled,
}

impl FuncKeyType {
    /// Key-mode value understood by the phone firmware.
    pub fn code(self) -> i64 {
        match self {
            FuncKeyType::SpeedDial => 0,
            FuncKeyType::Blf       => 1,
            FuncKeyType::Park      => 9,
            FuncKeyType::Default   => 31,
            FuncKeyType::Disabled  => -1,
        }
    }
}

impl FromStr for FuncKeyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "speeddial" => Ok(FuncKeyType::SpeedDial),
            "blf"       => Ok(FuncKeyType::Blf),
            "park"      => Ok(FuncKeyType::Park),
            "default"   => Ok(FuncKeyType::Default),
            "disabled"  => Ok(FuncKeyType::Disabled),
            other       => Err(format!("unsupported funckey type: {other}")),
        }
    }
}

/// Value of a single P-value setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

/// `(P-code, value)` pair, e.g. `("P323", Int(1))`.
pub type ParamEntry = (String, ParamValue);

/// Function key in the section-based layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct V2FuncKey {
    /// `vpk` (virtual, on the display) or `mpk` (physical).
    pub section: &'static str,
    #[serde(rename = "type")]
    pub kind:    i64,
    pub label:   String,
    pub value:   String,
}

/// Values computed from the raw config, rendered as `XX_*` keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub mac:              Option<String>,
    pub sip_transport:    Option<&'static str>,
    pub timezone:         Option<&'static str>,
    pub locale:           Option<&'static str>,
    pub dtmf_in_audio:    Option<&'static str>,
    pub dtmf_in_rtp:      Option<&'static str>,
    pub dtmf_in_sip:      Option<&'static str>,
    pub fkeys:            Option<Vec<ParamEntry>>,
    pub mpk:              Option<Vec<ParamEntry>>,
    pub v2_fkeys:         Option<Vec<(u32, V2FuncKey)>>,
    /// DNS address split into its dotted parts.
    pub dns:              Vec<String>,
}

impl Derived {
    fn extend_context(&self, ctx: &mut Map<String, Value>) -> Result<()> {
        let scalars = [
            ("XX_sip_transport", self.sip_transport),
            ("XX_timezone",      self.timezone),
            ("XX_locale",        self.locale),
            ("XX_dtmf_in_audio", self.dtmf_in_audio),
            ("XX_dtmf_in_rtp",   self.dtmf_in_rtp),
            ("XX_dtmf_in_sip",   self.dtmf_in_sip),
        ];
        for (key, value) in scalars {
            if let Some(v) = value {
                ctx.insert(key.into(), Value::String(v.into()));
            }
        }
        if let Some(mac) = &self.mac {
            ctx.insert("XX_mac".into(), Value::String(mac.clone()));
        }
        // templates always see both key lists, empty when the layout is off
        let fkeys = self.fkeys.as_deref().unwrap_or_default();
        ctx.insert("XX_fkeys".into(), serde_json::to_value(fkeys)?);
        let v2 = self.v2_fkeys.as_deref().unwrap_or_default();
        ctx.insert("XX_v2_fkeys".into(), serde_json::to_value(v2)?);
        if let Some(mpk) = &self.mpk {
            ctx.insert("XX_mpk".into(), serde_json::to_value(mpk)?);
        }
        for (n, part) in self.dns.iter().enumerate() {
            ctx.insert(format!("XX_dns_{}", n + 1), Value::String(part.clone()));
        }
        Ok(())
    }
}

impl RawConfig {
    /// Build the template context: raw keys plus the derived `XX_*` keys.
    pub fn to_context(&self) -> Result<Value> {
        let mut ctx = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.derived.extend_context(&mut ctx)?;
        Ok(Value::Object(ctx))
    }
}
