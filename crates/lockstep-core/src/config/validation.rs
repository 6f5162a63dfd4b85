//! Configuration validation

use globset::Glob;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::monorepo::forced::ForcePublish;

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_packages(config)?;
    validate_changes(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_packages(config: &Config) -> Result<()> {
    if config.packages.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "packages".to_string(),
            message: "at least one package pattern is required".to_string(),
        }
        .into());
    }

    for (i, pattern) in config.packages.iter().enumerate() {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("packages[{}]", i),
                message: "pattern cannot be empty".to_string(),
            }
            .into());
        }

        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(ConfigError::InvalidValue {
                field: format!("packages[{}]", i),
                message: e.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_changes(config: &Config) -> Result<()> {
    validate_ignore_patterns(&config.changes.ignore)?;

    if let Some(ForcePublish::Names(names)) = &config.changes.force_publish {
        if names.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "changes.force_publish".to_string(),
                message: "must name at least one package".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

/// Check that every ignore pattern compiles
pub fn validate_ignore_patterns(patterns: &[String]) -> Result<()> {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Err(e) = Glob::new(pattern) {
            return Err(ConfigError::InvalidValue {
                field: format!("changes.ignore[{}]", i),
                message: e.kind().to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_no_package_patterns() {
        let mut config = Config::default();
        config.packages.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_ignore_glob() {
        let mut config = Config::default();
        config.changes.ignore = vec!["src/[".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_force_publish_string() {
        let mut config = Config::default();
        config.changes.force_publish = Some(ForcePublish::Names(" ".to_string()));
        assert!(validate_config(&config).is_err());
    }
}
