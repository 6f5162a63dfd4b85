//! lockstep git - read-only git history for changed-package detection
//!
//! This crate wraps a git2 repository and implements the core's `History`
//! trait: tag presence, the current revision, the latest reachable tag, and
//! path-scoped diffs.

mod diff;
mod history;
mod repository;
mod tags;

#[cfg(test)]
pub(crate) mod test_support;

pub use repository::{GitRepo, Result};
