//! Detection of packages already on a prerelease version

use semver::Version;
use tracing::{debug, warn};

use crate::types::Package;

use super::PackageMap;

/// Bump tokens starting with this prefix request a prerelease increment
pub const PRERELEASE_BUMP_PREFIX: &str = "pre";

/// Whether the requested bump is a prerelease increment (premajor, prerelease, ...)
pub fn is_prerelease_bump(cd_version: Option<&str>) -> bool {
    cd_version.is_some_and(|v| v.starts_with(PRERELEASE_BUMP_PREFIX))
}

/// Whether a version string carries a prerelease component
///
/// Unparseable versions are reported as not prereleased.
pub fn has_prerelease(version: &str) -> bool {
    match Version::parse(version) {
        Ok(v) => !v.pre.is_empty(),
        Err(e) => {
            warn!(version, error = %e, "skipping unparseable version");
            false
        }
    }
}

/// Packages whose current version is a prerelease
///
/// Empty when the requested bump is itself a prerelease increment.
pub fn detect_prereleased<'p>(packages: &'p [Package], cd_version: Option<&str>) -> PackageMap<'p> {
    if is_prerelease_bump(cd_version) {
        debug!(cd_version = ?cd_version, "prerelease bump requested, skipping prerelease detection");
        return PackageMap::new();
    }

    let prereleased: PackageMap<'p> = packages
        .iter()
        .filter(|pkg| has_prerelease(&pkg.version))
        .map(|pkg| (pkg.name.as_str(), pkg))
        .collect();

    debug!(prereleased = prereleased.len(), "prerelease detection complete");
    prereleased
}
