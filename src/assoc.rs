//! Plugin/device association: how well this plugin supports a device.

use std::fmt;

use crate::device::VENDOR;

/// Models handled by the bundled plugin version.
pub const MODELS: &[&str] = &["GXP2130", "GXP2135", "GXP2140", "GXP2160", "GXP2170"];

/// Firmware version the bundled templates were written for.
pub const VERSION: &str = "1.0.11.48";

/// Support level, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportLevel {
    /// Not a Grandstream device.
    Incompatible,
    /// Grandstream, but a model this plugin does not know.
    Unknown,
    /// Known model running another firmware.
    Partial,
    /// Known model running the expected firmware.
    Full,
}

impl fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SupportLevel::Incompatible => "incompatible",
            SupportLevel::Unknown      => "unknown",
            SupportLevel::Partial      => "partial",
            SupportLevel::Full         => "full",
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgAssociator {
    models:  Vec<String>,
    version: String,
}

impl PgAssociator {
    pub fn new<I, S>(models: I, version: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PgAssociator {
            models:  models.into_iter().map(Into::into).collect(),
            version: version.into(),
        }
    }

    pub fn associate(
        &self,
        vendor:  Option<&str>,
        model:   Option<&str>,
        version: Option<&str>,
    ) -> SupportLevel {
        if vendor != Some(VENDOR) {
            return SupportLevel::Incompatible;
        }
        let Some(model) = model.filter(|m| self.models.iter().any(|known| known == m)) else {
            return SupportLevel::Unknown;
        };
        match version {
            Some(v) if v.starts_with(&self.version) => {
                log::debug!("{model} {v}: full support");
                SupportLevel::Full
            }
            _ => SupportLevel::Partial,
        }
    }
}

impl Default for PgAssociator {
    fn default() -> Self {
        PgAssociator::new(MODELS.iter().copied(), VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(SupportLevel::Incompatible < SupportLevel::Unknown);
        assert!(SupportLevel::Unknown < SupportLevel::Partial);
        assert!(SupportLevel::Partial < SupportLevel::Full);
    }

    #[test]
    fn exact_match_is_full() {
        let a = PgAssociator::default();
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GXP2160"), Some("1.0.11.48")),
            SupportLevel::Full
        );
        // prefix match, not equality
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GXP2130"), Some("1.0.11.48.1")),
            SupportLevel::Full
        );
    }

    #[test]
    fn other_firmware_is_partial() {
        let a = PgAssociator::default();
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GXP2170"), Some("1.0.9.135")),
            SupportLevel::Partial
        );
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GXP2170"), None),
            SupportLevel::Partial
        );
    }

    #[test]
    fn unknown_model() {
        let a = PgAssociator::default();
        assert_eq!(
            a.associate(Some("Grandstream"), Some("HT801"), Some("1.0.11.48")),
            SupportLevel::Unknown
        );
        assert_eq!(a.associate(Some("Grandstream"), None, None), SupportLevel::Unknown);
    }

    #[test]
    fn other_vendor_is_incompatible_whatever_the_model() {
        let a = PgAssociator::default();
        for model in [Some("GXP2160"), Some("T46S"), None] {
            for version in [Some("1.0.11.48"), Some("66.86.0.15"), None] {
                assert_eq!(
                    a.associate(Some("Yealink"), model, version),
                    SupportLevel::Incompatible
                );
                assert_eq!(a.associate(None, model, version), SupportLevel::Incompatible);
            }
        }
    }

    #[test]
    fn custom_model_list() {
        let a = PgAssociator::new(["GRP2614"], "1.0.5");
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GRP2614"), Some("1.0.5.15")),
            SupportLevel::Full
        );
        assert_eq!(
            a.associate(Some("Grandstream"), Some("GXP2160"), Some("1.0.5.15")),
            SupportLevel::Unknown
        );
    }
}
