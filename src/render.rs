//! Rendering the enriched config into the file a phone downloads.
//!
//! Real deployments plug the server's template engine in through
//! [`TemplateRenderer`].  [`GsProvisionRenderer`] is the built-in fallback:
//! it writes a `gs_provision` XML document holding the function keys and
//! the derived settings as P-values.

use std::io::Cursor;
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::device::Device;
use crate::error::{PluginError, Result};

pub const BASE_TEMPLATE: &str = "base.tpl";

/// Template engine supplied by the provisioning server.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` with `context` (raw config plus `XX_*` keys).
    fn render(&self, template: &str, context: &Value) -> Result<Vec<u8>>;
}

/// Pick the template for a device.
///
/// Lookup order: `<custom>/<filename>.tpl`, `<custom>/<model>.tpl`,
/// `<model>.tpl`, then [`BASE_TEMPLATE`].
pub fn dev_template(filename: &str, device: &Device, custom_dir: Option<&Path>) -> String {
    if let Some(dir) = custom_dir {
        let dev_tpl = dir.join(format!("{filename}.tpl"));
        if dev_tpl.is_file() {
            return dev_tpl.to_string_lossy().into_owned();
        }
        if let Some(model) = &device.model {
            let model_tpl = dir.join(format!("{model}.tpl"));
            if model_tpl.is_file() {
                return model_tpl.to_string_lossy().into_owned();
            }
        }
    }
    match &device.model {
        Some(model) => format!("{model}.tpl"),
        None => BASE_TEMPLATE.to_string(),
    }
}

// ── Built-in gs_provision writer ──────────────────────────────────────────────

/// Scalar `XX_*` keys and the P-value each one is written to.
const SCALAR_PVALUES: &[(&str, &str)] = &[
    ("XX_locale",        "P1362"),
    ("XX_timezone",      "P246"),
    ("XX_dtmf_in_audio", "P850"),
    ("XX_dtmf_in_rtp",   "P851"),
    ("XX_dtmf_in_sip",   "P852"),
    ("XX_dns_1",         "P21"),
    ("XX_dns_2",         "P22"),
    ("XX_dns_3",         "P23"),
    ("XX_dns_4",         "P24"),
];

/// Writes `<gs_provision version="1">` documents without a template engine.
#[derive(Debug, Clone, Default)]
pub struct GsProvisionRenderer;

impl GsProvisionRenderer {
    pub fn new() -> Self {
        Self
    }

    fn pvalues(context: &Value) -> Vec<(String, String)> {
        let mut out = Vec::new();

        if context.get("XX_timezone").is_some() {
            out.push(("P64".to_string(), "customize".to_string()));
        }
        for (key, code) in SCALAR_PVALUES {
            if let Some(v) = context.get(*key).and_then(Value::as_str) {
                let v = match v {
                    "Yes" => "1",
                    "No" => "0",
                    other => other,
                };
                out.push((code.to_string(), v.to_string()));
            }
        }
        if let Some(transport) = context.get("XX_sip_transport").and_then(Value::as_str) {
            let code = match transport {
                "TCP" => "1",
                "TlsOrTcp" => "2",
                _ => "0",
            };
            out.push(("P130".to_string(), code.to_string()));
        }

        for list in ["XX_fkeys", "XX_mpk"] {
            let Some(entries) = context.get(list).and_then(Value::as_array) else { continue };
            for entry in entries {
                let code = entry.get(0).and_then(Value::as_str);
                let (Some(code), Some(value)) = (code, entry.get(1)) else { continue };
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.push((code.to_string(), value));
            }
        }
        out
    }

    fn write_text_element<W: std::io::Write>(
        writer: &mut Writer<W>,
        name:   &str,
        text:   &str,
    ) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesStart::new(name).to_end()))?;
        Ok(())
    }
}

impl TemplateRenderer for GsProvisionRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<Vec<u8>> {
        debug!("rendering {template} with the built-in gs_provision writer");
        let mac = context
            .get("XX_mac")
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::Render("XX_mac missing from context".into()))?;

        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("gs_provision");
        root.push_attribute(("version", "1"));
        writer.write_event(Event::Start(root))?;
        Self::write_text_element(&mut writer, "mac", mac)?;

        let mut config = BytesStart::new("config");
        config.push_attribute(("version", "1"));
        writer.write_event(Event::Start(config))?;
        for (code, value) in Self::pvalues(context) {
            Self::write_text_element(&mut writer, &code, &value)?;
        }
        writer.write_event(Event::End(BytesStart::new("config").to_end()))?;
        writer.write_event(Event::End(BytesStart::new("gs_provision").to_end()))?;

        Ok(writer.into_inner().into_inner())
    }
}
