//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: file (if any), then the port override.
///
/// Validation runs once, after the override, so every problem with the
/// final configuration comes back in a single `ConfigError::Validation`.
pub fn resolve_config(path: Option<&Path>, port: Option<u16>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(port) = port {
        apply_port_override(&mut config, port);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Replace the port of the listener's bind address.
///
/// An unparsable address is left as is; validation reports it.
pub fn apply_port_override(config: &mut ProxyConfig, port: u16) {
    if let Ok(mut addr) = config.listener.bind_address.parse::<SocketAddr>() {
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_port_override() {
        let mut config = ProxyConfig::default();
        apply_port_override(&mut config, 8088);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let config = resolve_config(None, None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");

        let config = resolve_config(None, Some(6000)).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:6000");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"127.0.0.1:7000\"\n\n[timeouts]\nupstream_secs = 3"
        )
        .unwrap();

        let config = resolve_config(Some(file.path()), Some(7001)).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:7001");
        assert_eq!(config.timeouts.upstream_secs, 3);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[routing]\nsubdomain_offset = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::SubdomainOffset]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_port_override_on_bad_address_fails_validation() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        apply_port_override(&mut config, 8088);
        assert_eq!(config.listener.bind_address, "not-an-address");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"not-an-address\"\n\n[routing]\nsubdomain_offset = 0"
        )
        .unwrap();

        match resolve_config(Some(file.path()), Some(8088)) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
                assert!(errors.contains(&ValidationError::SubdomainOffset));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
