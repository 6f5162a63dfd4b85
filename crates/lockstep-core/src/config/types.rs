//! Configuration types

use serde::{Deserialize, Serialize};

use crate::monorepo::forced::ForcePublish;

/// Main configuration for lockstep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Package directory globs, relative to the config root
    pub packages: Vec<String>,

    /// Change detection configuration
    pub changes: ChangesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: None,
            packages: vec!["packages/*".to_string()],
            changes: ChangesConfig::default(),
        }
    }
}

/// Change detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesConfig {
    /// Files matching these globs never mark a package as changed
    pub ignore: Vec<String>,

    /// Packages to treat as changed regardless of history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_publish: Option<ForcePublish>,

    /// Default comparison point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// Default bump type token (e.g. "patch", "prerelease")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cd_version: Option<String>,

    /// Whether dev dependencies count as dependency edges
    pub include_dev_dependencies: bool,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            force_publish: None,
            since: None,
            cd_version: None,
            include_dev_dependencies: true,
        }
    }
}
