//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "lockstep.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "lockstep.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".lockstep.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".lockstep.toml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# lockstep configuration

# Package directories, relative to this file
packages:
  - "packages/*"

changes:
  # Changed files matching these globs do not mark a package as changed.
  # Patterns are matched against the package-relative path and the file name.
  ignore:
    - "*.md"
  # true, "pkg-a,pkg-b", or a list of package names
  # force_publish: false
  # since: v1.0.0
  # cd_version: patch
  include_dev_dependencies: true
"#;
