//! Tag lookups

use git2::{DescribeFormatOptions, DescribeOptions, ErrorCode};
use tracing::{debug, instrument};

use lockstep_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Names of every tag in the repository
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        Ok(names.iter().flatten().map(String::from).collect())
    }

    /// Whether the repository has at least one tag
    pub fn has_tags(&self) -> Result<bool> {
        let count = self.repo.tag_names(None)?.len();
        debug!(count, "counted tags");
        Ok(count > 0)
    }

    /// Most recent tag reachable from HEAD, by name only
    ///
    /// Lightweight and annotated tags both count.
    #[instrument(skip(self))]
    pub fn latest_tag(&self) -> Result<String> {
        let mut opts = DescribeOptions::new();
        opts.describe_tags();

        let describe = match self.repo.describe(&opts) {
            Ok(describe) => describe,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(GitError::NoTags),
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        let tag = describe.format(Some(&format))?;

        debug!(tag = %tag, "found latest tag");
        Ok(tag)
    }
}
