// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation export and import.
//!
//! This module writes an image's annotations to YAML or JSON files and
//! reads them back.

use crate::models::shape::Shape;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Annotations of one image in file form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub image_id: String,
    pub filename: String,
    pub annotations: Vec<Shape>,
}

/// Export annotation data to YAML format.
pub fn export_yaml(data: &ExportData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export annotation data to JSON format.
pub fn export_json(data: &ExportData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import annotation data from YAML format.
pub fn import_yaml(path: &Path) -> Result<ExportData> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import annotation data from JSON format.
pub fn import_json(path: &Path) -> Result<ExportData> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export by file extension (`yaml`, `yml` or `json`).
pub fn export_auto(data: &ExportData, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import by file extension (`yaml`, `yml` or `json`).
pub fn import_auto(path: &Path) -> Result<ExportData> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}
