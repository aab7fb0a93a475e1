// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::project_dirs;
use crate::models::Pocket;

pub const ENV_API_URL: &str = "POCKETCLIP_API_URL";
pub const ENV_CONFIG: &str = "POCKETCLIP_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub auth_path: String,
    pub api_path: String,
    pub timeout_secs: u64,
    /// Pocket debited by expenses whose category is not itself a pocket.
    pub expense_pocket: Pocket,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://duatduitbackend-production.up.railway.app".to_string(),
            auth_path: "/auth".to_string(),
            api_path: "/api".to_string(),
            timeout_secs: 15,
            expense_pocket: Pocket::UangJajan,
            log_filter: "warn".to_string(),
            log_json: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(p));
    }
    let proj = project_dirs()?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Read the config file if present, then apply environment overrides.
pub fn load() -> Result<Config> {
    let path = config_path()?;
    let mut cfg = if path.exists() {
        read_config(&path)?
    } else {
        Config::default()
    };
    if let Ok(url) = std::env::var(ENV_API_URL) {
        if !url.trim().is_empty() {
            cfg.api_base_url = url.trim().to_string();
        }
    }
    Ok(cfg)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse config {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(contents)?;
    if cfg.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be greater than zero");
    }
    Ok(cfg)
}
