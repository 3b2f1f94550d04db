//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::RedirectorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Config file location used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "redirectd.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RedirectorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RedirectorConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the named config file, or fall back to the default location.
///
/// An explicitly named file must exist. The default location is optional;
/// built-in defaults apply when it is absent.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<RedirectorConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_config(path)
            } else {
                Ok(RedirectorConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redirectd.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_loads_full_config() {
        let (_dir, path) = write_config(
            r#"
[listener]
bind_address = "127.0.0.1:9000"

[rules]
file = "/var/lib/redirectd/rules.json"
poll_interval_ms = 250

[admin]
enabled = true
bind_address = "127.0.0.1:9001"
api_key = "secret"

[timeouts]
request_secs = 5

[observability]
log_level = "debug"
metrics_enabled = false
"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.rules.file, "/var/lib/redirectd/rules.json");
        assert_eq!(config.rules.poll_interval_ms, 250);
        assert!(config.admin.enabled);
        assert_eq!(config.admin.api_key, "secret");
        assert_eq!(config.timeouts.request_secs, 5);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let (_dir, path) = write_config("");

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rules.file, "rules.json");
        assert_eq!(config.rules.poll_interval_ms, 5000);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let (_dir, path) = write_config("[listener\nbind_address = ");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_semantic_problems_are_validation_errors() {
        let (_dir, path) = write_config("[rules]\npoll_interval_ms = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("rules.poll_interval_ms"));
    }

    #[test]
    fn test_explicit_missing_file_fails_but_absent_flag_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(load_config_or_default(Some(&missing)).is_err());

        let config = load_config_or_default(None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
