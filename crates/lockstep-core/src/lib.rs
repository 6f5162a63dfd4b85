//! lockstep core - changed-package detection for coordinated monorepo releases
//!
//! This crate provides the package and update types, error handling,
//! configuration, and the decision engine that picks which packages of a
//! monorepo need a new version.

pub mod config;
pub mod error;
pub mod monorepo;
pub mod types;

pub use error::{ConfigError, DiscoveryError, GitError, LockstepError, Result};
pub use monorepo::{History, UpdateOptions, UpdatedPackagesCollector};
pub use types::{Package, Update, UpdateReason};
