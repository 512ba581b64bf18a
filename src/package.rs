//! Build step: assemble a distributable plugin directory.
//!
//! The source tree holds a `common/` directory shared by every firmware
//! version and one directory per version.  A package is `common/` overlaid
//! with the version directory, dotfiles excluded.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{PluginError, Result};

pub const PLUGIN_NAME: &str = "wazo-grandstream2";

/// Name of the packaged plugin for `version`.
pub fn target_name(version: &str) -> String {
    format!("{PLUGIN_NAME}-{version}")
}

/// Copy `common/` then `<version>/` from `source_root` into
/// `dest/<plugin>-<version>`.  Returns the package directory.
pub fn package(source_root: &Path, version: &str, dest: &Path) -> Result<PathBuf> {
    let version_dir = source_root.join(version);
    if !version_dir.is_dir() {
        return Err(PluginError::Config(format!(
            "no such plugin version: {}",
            version_dir.display()
        )));
    }
    let target = dest.join(target_name(version));
    fs::create_dir_all(&target)?;

    let common = source_root.join("common");
    if common.is_dir() {
        copy_tree(&common, &target)?;
    }
    copy_tree(&version_dir, &target)?;

    info!("packaged {}", target.display());
    Ok(target)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}
