// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration file loading.
//!
//! This module reads board configuration in YAML or JSON format, chosen by
//! file extension.

use crate::models::config::AppConfig;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load configuration from a `.yaml`, `.yml` or `.json` file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|s| s.to_str());
    let config = match extension {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        _ => bail!("Unsupported config file extension: {:?}", extension),
    }
    .with_context(|| format!("Failed to load config from {}", path.display()))?;

    log::info!(
        "Loaded config from {} ({} drawables)",
        path.display(),
        config.scene.drawables.len()
    );
    Ok(config)
}

/// Import configuration from YAML format.
pub fn import_yaml(path: &Path) -> Result<AppConfig> {
    let yaml = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&yaml)?;
    Ok(config)
}

/// Import configuration from JSON format.
pub fn import_json(path: &Path) -> Result<AppConfig> {
    let json = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&json)?;
    Ok(config)
}
