// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Locations come from environment variables. Labels and display settings
//! may be overridden by an optional YAML file.

use crate::models::label::{default_labels, Label};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the image store (required).
pub const STORE_DIR_VAR: &str = "ANNOTATOR_STORE_DIR";
/// Directory holding model runs (optional; inference is disabled without it).
pub const MODEL_DIR_VAR: &str = "ANNOTATOR_MODEL_DIR";
/// Path of an optional YAML settings file.
pub const CONFIG_FILE_VAR: &str = "ANNOTATOR_CONFIG";

/// Settings that may come from the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Annotation labels offered in the label table
    #[serde(default = "default_labels")]
    pub labels: Vec<Label>,

    /// Height in pixels images are displayed at, keeping the aspect ratio
    #[serde(default = "default_display_height")]
    pub display_height: u32,

    /// Maximum number of images listed in the browser
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,

    /// Distance in image pixels within which a click closes a polygon
    #[serde(default = "default_close_tolerance")]
    pub close_tolerance: f64,
}

fn default_display_height() -> u32 {
    512
}

fn default_query_limit() -> usize {
    100
}

fn default_close_tolerance() -> f64 {
    8.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            display_height: default_display_height(),
            query_limit: default_query_limit(),
            close_tolerance: default_close_tolerance(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(settings)
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub model_dir: Option<PathBuf>,
    pub settings: Settings,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store_dir = non_empty(STORE_DIR_VAR)
            .map(PathBuf::from)
            .with_context(|| format!("Please set the environment variable {}", STORE_DIR_VAR))?;
        let model_dir = non_empty(MODEL_DIR_VAR).map(PathBuf::from);

        let settings = match non_empty(CONFIG_FILE_VAR) {
            Some(path) => Settings::load(Path::new(&path))?,
            None => Settings::default(),
        };

        Ok(Self {
            store_dir,
            model_dir,
            settings,
        })
    }
}
