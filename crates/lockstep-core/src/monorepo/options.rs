//! User options for one changed-package computation

use serde::{Deserialize, Serialize};

use crate::config::ChangesConfig;

use super::forced::ForcePublish;

/// Options recognized by the updated-packages computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Explicit comparison point
    pub since: Option<String>,
    /// Canary mode: every package is included and diffs cover HEAD's own commits
    pub canary: bool,
    /// Packages treated as changed regardless of history
    pub force_publish: Option<ForcePublish>,
    /// Requested bump type token
    pub cd_version: Option<String>,
    /// Globs for changed files that do not count
    pub ignore: Vec<String>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults taken from the `changes` config section
    pub fn from_config(config: &ChangesConfig) -> Self {
        Self {
            since: config.since.clone(),
            canary: false,
            force_publish: config.force_publish.clone(),
            cd_version: config.cd_version.clone(),
            ignore: config.ignore.clone(),
        }
    }

    pub fn with_since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn with_canary(mut self, canary: bool) -> Self {
        self.canary = canary;
        self
    }

    pub fn with_force_publish(mut self, force_publish: ForcePublish) -> Self {
        self.force_publish = Some(force_publish);
        self
    }

    pub fn with_cd_version(mut self, cd_version: impl Into<String>) -> Self {
        self.cd_version = Some(cd_version.into());
        self
    }

    pub fn with_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    /// Overlay values set in `overrides`; ignore patterns accumulate
    pub fn merge(mut self, overrides: UpdateOptions) -> Self {
        if overrides.since.is_some() {
            self.since = overrides.since;
        }
        self.canary |= overrides.canary;
        if overrides.force_publish.is_some() {
            self.force_publish = overrides.force_publish;
        }
        if overrides.cd_version.is_some() {
            self.cd_version = overrides.cd_version;
        }
        for pattern in overrides.ignore {
            if !self.ignore.contains(&pattern) {
                self.ignore.push(pattern);
            }
        }
        self
    }
}
