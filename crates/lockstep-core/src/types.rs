//! Core types for lockstep

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A package in the monorepo
///
/// Owned by the caller; the decision engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, unique within the repository
    pub name: String,
    /// Current version (semver)
    pub version: String,
    /// Package directory
    pub location: PathBuf,
}

impl Package {
    /// Create a new package
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            location: location.into(),
        }
    }

    /// Get the package directory
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// Why a package needs a new version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "via", rename_all = "snake_case")]
pub enum UpdateReason {
    /// Named by force-publish, or everything was forced with `*`
    Forced,
    /// Qualifying file changes, or no comparison point exists
    Changed,
    /// Version already carries a prerelease component
    Prerelease,
    /// Transitively depends on a changed or prereleased package
    DependencyChanged(String),
    /// Canary mode includes every package
    Canary,
}

impl std::fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forced => write!(f, "forced"),
            Self::Changed => write!(f, "changed"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::DependencyChanged(dep) => write!(f, "dependency '{}' changed", dep),
            Self::Canary => write!(f, "canary"),
        }
    }
}

/// A package that requires a new version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update<'a> {
    /// The package to bump
    #[serde(flatten)]
    pub package: &'a Package,
    /// Why it was included
    pub reason: UpdateReason,
}

impl<'a> Update<'a> {
    /// Create a new update
    pub fn new(package: &'a Package, reason: UpdateReason) -> Self {
        Self { package, reason }
    }

    /// Name of the wrapped package
    pub fn name(&self) -> &str {
        &self.package.name
    }
}
