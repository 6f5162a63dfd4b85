//! Force-publish option normalization

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Token that forces every package
pub const WILDCARD: &str = "*";

/// The force-publish option as it appears in config or on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForcePublish {
    /// `true` forces every package, `false` forces nothing
    Flag(bool),
    /// Comma-separated package names, or `*`
    Names(String),
    /// Explicit list of package names
    List(Vec<String>),
}

impl ForcePublish {
    /// Parse a command-line value: an empty value means "everything"
    pub fn from_arg(value: &str) -> Self {
        if value.is_empty() {
            Self::Flag(true)
        } else {
            Self::Names(value.to_string())
        }
    }
}

/// Canonical set of forced package names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedSet {
    names: BTreeSet<String>,
}

impl ForcedSet {
    /// Normalize the option into a set. Absent means empty.
    ///
    /// A comma-separated string is split verbatim, so an empty string yields
    /// a single empty token; callers reject empty input before this point.
    pub fn resolve(option: Option<&ForcePublish>) -> Self {
        let names = match option {
            Some(ForcePublish::Flag(true)) => BTreeSet::from([WILDCARD.to_string()]),
            Some(ForcePublish::Flag(false)) | None => BTreeSet::new(),
            Some(ForcePublish::Names(names)) => names.split(',').map(str::to_string).collect(),
            Some(ForcePublish::List(list)) => list.iter().cloned().collect(),
        };
        Self { names }
    }

    /// Whether the wildcard token is present
    pub fn is_all(&self) -> bool {
        self.names.contains(WILDCARD)
    }

    /// Whether the package is forced, by name or by wildcard
    pub fn forces(&self, name: &str) -> bool {
        self.is_all() || self.names.contains(name)
    }

    /// Whether the exact token is in the set
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
