//! Exit codes for the CLI

use lockstep_core::{ConfigError, DiscoveryError, GitError, LockstepError};

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Git error
pub const GIT_ERROR: u8 = 3;

/// Package discovery error
pub const DISCOVERY_ERROR: u8 = 4;

/// Pick the exit code for the first recognized error in the chain
pub fn for_error(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<LockstepError>() {
            match err {
                LockstepError::Config(_) => return CONFIG_ERROR,
                LockstepError::Git(_) => return GIT_ERROR,
                LockstepError::Discovery(_) => return DISCOVERY_ERROR,
                _ => {}
            }
        }
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<GitError>() {
            return GIT_ERROR;
        }
        if cause.is::<DiscoveryError>() {
            return DISCOVERY_ERROR;
        }
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors() {
        let err = anyhow::Error::new(LockstepError::from(GitError::NoTags));
        assert_eq!(for_error(&err), GIT_ERROR);

        let err = anyhow::Error::new(LockstepError::from(ConfigError::InvalidValue {
            field: "packages".into(),
            message: "must not be empty".into(),
        }));
        assert_eq!(for_error(&err), CONFIG_ERROR);
    }

    #[test]
    fn test_bare_git_error() {
        let err = anyhow::Error::new(GitError::NoCommits);
        assert_eq!(for_error(&err), GIT_ERROR);
    }

    #[test]
    fn test_context_does_not_hide_cause() {
        let err = anyhow::Error::new(LockstepError::from(DiscoveryError::InvalidPattern {
            pattern: "[".into(),
            message: "unclosed".into(),
        }))
        .context("discovering packages");
        assert_eq!(for_error(&err), DISCOVERY_ERROR);
    }

    #[test]
    fn test_other_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(for_error(&err), ERROR);

        let err = anyhow::Error::new(LockstepError::other("boom"));
        assert_eq!(for_error(&err), ERROR);
    }
}
