//! Package discovery in monorepos

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use glob::glob;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DiscoveryError, Result};
use crate::types::Package;

/// npm manifest file name
pub const NPM_MANIFEST: &str = "package.json";

/// Cargo manifest file name
pub const CARGO_MANIFEST: &str = "Cargo.toml";

/// A discovered package in the workspace
#[derive(Debug, Clone)]
pub struct DiscoveredPackage {
    /// Name, version and location
    pub package: Package,
    /// Path to the manifest file
    pub manifest_path: PathBuf,
    /// Whether this is a private package
    pub private: bool,
    /// Runtime dependencies on other workspace packages
    pub dependencies: Vec<String>,
    /// Development-only dependencies on other workspace packages
    pub dev_dependencies: Vec<String>,
}

/// Dependency names read from a manifest, before filtering to workspace packages
struct Manifest {
    package: Package,
    private: bool,
    dependencies: Vec<String>,
    dev_dependencies: Vec<String>,
}

/// Package discovery for workspaces
pub struct PackageDiscovery {
    root: PathBuf,
    patterns: Vec<String>,
}

impl PackageDiscovery {
    /// Create a new package discovery instance
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            root: root.into(),
            patterns,
        }
    }

    /// Discover all packages, in pattern order and then path order
    pub fn discover(&self) -> Result<Vec<DiscoveredPackage>> {
        debug!(
            root = %self.root.display(),
            patterns = self.patterns.len(),
            "discovering packages"
        );
        let mut manifests: Vec<(PathBuf, Manifest)> = Vec::new();
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut seen_names: HashMap<String, PathBuf> = HashMap::new();

        for pattern in &self.patterns {
            let full_pattern = if pattern == "." {
                self.root.to_string_lossy().to_string()
            } else {
                self.root.join(pattern).to_string_lossy().to_string()
            };

            let entries = glob(&full_pattern).map_err(|e| DiscoveryError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

            for entry in entries {
                let path = entry.map_err(|e| DiscoveryError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;

                let dir = if path.is_dir() {
                    path
                } else if path
                    .file_name()
                    .is_some_and(|f| f == NPM_MANIFEST || f == CARGO_MANIFEST)
                {
                    path.parent().unwrap_or(Path::new(".")).to_path_buf()
                } else {
                    continue;
                };

                if !seen_dirs.insert(dir.clone()) {
                    continue;
                }

                let Some((manifest_path, manifest)) = Self::read_manifest(&dir)? else {
                    continue;
                };

                if let Some(first) = seen_names.get(&manifest.package.name) {
                    return Err(DiscoveryError::DuplicatePackage {
                        name: manifest.package.name,
                        first: first.clone(),
                        second: dir,
                    }
                    .into());
                }
                seen_names.insert(manifest.package.name.clone(), dir);
                manifests.push((manifest_path, manifest));
            }
        }

        let packages: Vec<DiscoveredPackage> = manifests
            .into_iter()
            .map(|(manifest_path, m)| DiscoveredPackage {
                package: m.package,
                manifest_path,
                private: m.private,
                dependencies: local_only(m.dependencies, &seen_names),
                dev_dependencies: local_only(m.dev_dependencies, &seen_names),
            })
            .collect();

        info!(count = packages.len(), "discovered packages");
        Ok(packages)
    }

    /// Read whichever manifest the directory has; npm wins over Cargo
    fn read_manifest(dir: &Path) -> Result<Option<(PathBuf, Manifest)>> {
        let npm = dir.join(NPM_MANIFEST);
        if npm.exists() {
            return Ok(parse_npm_manifest(&npm)?.map(|m| (npm, m)));
        }

        let cargo = dir.join(CARGO_MANIFEST);
        if cargo.exists() {
            return Ok(parse_cargo_manifest(&cargo)?.map(|m| (cargo, m)));
        }

        Ok(None)
    }
}

/// Extract the plain packages, keeping discovery order
pub fn packages_of(discovered: &[DiscoveredPackage]) -> Vec<Package> {
    discovered.iter().map(|d| d.package.clone()).collect()
}

fn local_only(mut names: Vec<String>, workspace: &HashMap<String, PathBuf>) -> Vec<String> {
    names.retain(|name| workspace.contains_key(name));
    names.sort();
    names.dedup();
    names
}

fn manifest_error(path: &Path, message: impl ToString) -> DiscoveryError {
    DiscoveryError::ManifestParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Parse an npm package; manifests without name or version are skipped
fn parse_npm_manifest(manifest_path: &Path) -> Result<Option<Manifest>> {
    let content = std::fs::read_to_string(manifest_path)?;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct PackageJson {
        name: Option<String>,
        version: Option<String>,
        private: Option<bool>,
        dependencies: Option<BTreeMap<String, serde_json::Value>>,
        dev_dependencies: Option<BTreeMap<String, serde_json::Value>>,
        peer_dependencies: Option<BTreeMap<String, serde_json::Value>>,
        optional_dependencies: Option<BTreeMap<String, serde_json::Value>>,
    }

    let pkg: PackageJson =
        serde_json::from_str(&content).map_err(|e| manifest_error(manifest_path, e))?;

    let (Some(name), Some(version)) = (pkg.name, pkg.version) else {
        debug!(path = %manifest_path.display(), "skipping manifest without name or version");
        return Ok(None);
    };

    let dependencies = [
        pkg.dependencies,
        pkg.peer_dependencies,
        pkg.optional_dependencies,
    ]
    .into_iter()
    .flatten()
    .flat_map(BTreeMap::into_keys)
    .collect();

    let dev_dependencies = pkg
        .dev_dependencies
        .map(|d| d.into_keys().collect())
        .unwrap_or_default();

    Ok(Some(Manifest {
        package: Package::new(name, version, manifest_dir(manifest_path)),
        private: pkg.private.unwrap_or(false),
        dependencies,
        dev_dependencies,
    }))
}

/// Parse a Cargo package; workspace-only manifests are skipped
fn parse_cargo_manifest(manifest_path: &Path) -> Result<Option<Manifest>> {
    let content = std::fs::read_to_string(manifest_path)?;

    #[derive(Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct CargoToml {
        package: Option<PackageSection>,
        dependencies: Option<BTreeMap<String, toml::Value>>,
        dev_dependencies: Option<BTreeMap<String, toml::Value>>,
        build_dependencies: Option<BTreeMap<String, toml::Value>>,
    }

    #[derive(Deserialize)]
    struct PackageSection {
        name: String,
        version: Option<toml::Value>,
        publish: Option<toml::Value>,
    }

    let cargo: CargoToml =
        toml::from_str(&content).map_err(|e| manifest_error(manifest_path, e))?;

    let Some(package) = cargo.package else {
        return Ok(None);
    };

    // `version.workspace = true` and missing versions are not semver strings
    let version = match package.version {
        Some(toml::Value::String(v)) => v,
        _ => "0.0.0".to_string(),
    };
    let private = matches!(package.publish, Some(toml::Value::Boolean(false)));

    let dependencies = [cargo.dependencies, cargo.build_dependencies]
        .into_iter()
        .flatten()
        .flat_map(BTreeMap::into_keys)
        .collect();

    let dev_dependencies = cargo
        .dev_dependencies
        .map(|d| d.into_keys().collect())
        .unwrap_or_default();

    Ok(Some(Manifest {
        package: Package::new(package.name, version, manifest_dir(manifest_path)),
        private,
        dependencies,
        dev_dependencies,
    }))
}

fn manifest_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf()
}
