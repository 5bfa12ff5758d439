// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Optional `parley.toml` settings.
//!
//! Every key is optional. Missing files yield [`Config::default`]; unknown keys are rejected so
//! typos surface instead of silently falling back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::query::calendar::WeekStart;
use crate::query::table::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const CONFIG_FILE_NAME: &str = "parley.toml";
pub const DEFAULT_ROADMAP_DAYS: u32 = 90;
pub const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
pub const MAX_ROADMAP_DAYS: u32 = 3660;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub page_size: usize,
    pub roadmap_days: u32,
    pub week_start: WeekStart,
    pub mcp_http_port: u16,
    pub durable_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            roadmap_days: DEFAULT_ROADMAP_DAYS,
            week_start: WeekStart::Monday,
            mcp_http_port: DEFAULT_MCP_HTTP_PORT,
            durable_writes: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.normalize();
        Ok(config)
    }

    /// Reads `path`; a missing file is not an error unless `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        let config = Self::from_toml_str(path, &raw)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn load_for_workspace(workspace_dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&workspace_dir.join(CONFIG_FILE_NAME), false)
    }

    pub fn normalize(&mut self) {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.roadmap_days = self.roadmap_days.clamp(1, MAX_ROADMAP_DAYS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Config, ConfigError> {
        Config::from_toml_str(Path::new("parley.toml"), raw)
    }

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse("").expect("parse"), Config::default());
    }

    #[test]
    fn reads_all_keys() {
        let config = parse(
            "page_size = 10\nroadmap_days = 30\nweek_start = \"sunday\"\nmcp_http_port = 0\ndurable_writes = true\n",
        )
        .expect("parse");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.roadmap_days, 30);
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert_eq!(config.mcp_http_port, 0);
        assert!(config.durable_writes);
    }

    #[test]
    fn clamps_page_size() {
        assert_eq!(parse("page_size = 0").expect("parse").page_size, 1);
        assert_eq!(parse("page_size = 100000").expect("parse").page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse("page_sise = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_bad_week_start() {
        parse("week_start = \"friday\"").unwrap_err();
    }

    #[test]
    fn missing_optional_file_is_default() {
        let path = std::env::temp_dir()
            .join(format!("parley-config-missing-{}", std::process::id()))
            .join(CONFIG_FILE_NAME);
        assert_eq!(Config::load(&path, false).expect("load"), Config::default());
        assert!(matches!(Config::load(&path, true), Err(ConfigError::Io { .. })));
    }
}
