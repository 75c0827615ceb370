//! Configuration file for rctsync.
//!
//! Settings live in an INI file under the user's configuration directory:
//!
//! ```ini
//! [service]
//! base_url = https://hyperv01:6677
//! auth_key = ...
//! cert_path = /etc/rctsync/server.pem
//! insecure = false
//! timeout = 300
//!
//! [transfer]
//! max_bytes_per_request = 20971520
//! chunk_size = 10485760
//!
//! [logging]
//! level = info
//! file = /var/log/rctsync.log
//! ```
//!
//! Command-line arguments take precedence over the file; missing keys fall
//! back to built-in defaults.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::transfer::DEFAULT_MAX_BYTES_PER_REQUEST;

/// Directory name under the platform configuration directory.
const CONFIG_DIR_NAME: &str = "rctsync";

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Log levels accepted by `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Errors from loading, saving or editing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("failed to read {}: {}", .path.display(), .reason)]
    ReadFailed { path: PathBuf, reason: String },

    /// The file could not be written.
    #[error("failed to write {}: {}", .path.display(), .source)]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value could not be parsed for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[service]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub base_url: String,
    pub auth_key: Option<String>,
    pub cert_path: Option<PathBuf>,
    pub insecure: bool,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_key: None,
            cert_path: None,
            insecure: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[transfer]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub max_bytes_per_request: u64,
    pub chunk_size: usize,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            max_bytes_per_request: DEFAULT_MAX_BYTES_PER_REQUEST,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    /// Also write logs to this file when set.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub service: ServiceSettings,
    pub transfer: TransferSettings,
    pub logging: LoggingSettings,
}

/// Path of the configuration file.
///
/// Falls back to the current directory when the platform has no
/// configuration directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

impl ConfigFile {
    /// Load the configuration from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load the configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if !path.exists() {
            return Ok(config);
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save the configuration to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save the configuration to `path`, creating parent directories.
    ///
    /// Unset optional values are omitted.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |source: io::Error| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        ini.write_to_file(path).map_err(write_failed)
    }
}

/// A configuration setting addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServiceBaseUrl,
    ServiceAuthKey,
    ServiceCertPath,
    ServiceInsecure,
    ServiceTimeout,
    TransferMaxBytesPerRequest,
    TransferChunkSize,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServiceBaseUrl,
            ConfigKey::ServiceAuthKey,
            ConfigKey::ServiceCertPath,
            ConfigKey::ServiceInsecure,
            ConfigKey::ServiceTimeout,
            ConfigKey::TransferMaxBytesPerRequest,
            ConfigKey::TransferChunkSize,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section holding the key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ServiceBaseUrl
            | ConfigKey::ServiceAuthKey
            | ConfigKey::ServiceCertPath
            | ConfigKey::ServiceInsecure
            | ConfigKey::ServiceTimeout => "service",
            ConfigKey::TransferMaxBytesPerRequest | ConfigKey::TransferChunkSize => "transfer",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ServiceBaseUrl => "base_url",
            ConfigKey::ServiceAuthKey => "auth_key",
            ConfigKey::ServiceCertPath => "cert_path",
            ConfigKey::ServiceInsecure => "insecure",
            ConfigKey::ServiceTimeout => "timeout",
            ConfigKey::TransferMaxBytesPerRequest => "max_bytes_per_request",
            ConfigKey::TransferChunkSize => "chunk_size",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServiceBaseUrl => config.service.base_url.clone(),
            ConfigKey::ServiceAuthKey => config.service.auth_key.clone().unwrap_or_default(),
            ConfigKey::ServiceCertPath => path_string(config.service.cert_path.as_deref()),
            ConfigKey::ServiceInsecure => config.service.insecure.to_string(),
            ConfigKey::ServiceTimeout => config.service.timeout.to_string(),
            ConfigKey::TransferMaxBytesPerRequest => {
                config.transfer.max_bytes_per_request.to_string()
            }
            ConfigKey::TransferChunkSize => config.transfer.chunk_size.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => path_string(config.logging.file.as_deref()),
        }
    }

    /// Parse and store `value`. An empty value clears optional settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::ServiceBaseUrl => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.service.base_url = value.to_string();
            }
            ConfigKey::ServiceAuthKey => config.service.auth_key = optional(value),
            ConfigKey::ServiceCertPath => {
                config.service.cert_path = optional(value).map(PathBuf::from)
            }
            ConfigKey::ServiceInsecure => config.service.insecure = self.parse_bool(value)?,
            ConfigKey::ServiceTimeout => config.service.timeout = self.parse_number(value)?,
            ConfigKey::TransferMaxBytesPerRequest => {
                config.transfer.max_bytes_per_request = self.parse_number(value)?
            }
            ConfigKey::TransferChunkSize => {
                let size: usize = self.parse_number(value)?;
                if size == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                config.transfer.chunk_size = size;
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    let reason = format!("expected one of {}", LOG_LEVELS.join(", "));
                    return Err(self.invalid(value, &reason));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingFile => config.logging.file = optional(value).map(PathBuf::from),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigError>
    where
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, &e.to_string()))
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn path_string(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.service.base_url, "https://localhost:6677");
        assert_eq!(config.service.timeout, 300);
        assert!(!config.service.insecure);
        assert_eq!(config.transfer.max_bytes_per_request, 20 * 1024 * 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[service]\nbase_url = https://hyperv01:6677\nauth_key = s3cret\n\n[transfer]\nmax_bytes_per_request = 0\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.service.base_url, "https://hyperv01:6677");
        assert_eq!(config.service.auth_key.as_deref(), Some("s3cret"));
        assert_eq!(config.transfer.max_bytes_per_request, 0);
        assert_eq!(config.transfer.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_load_rejects_bad_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[service]\ntimeout = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("service.timeout"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.service.cert_path = Some(PathBuf::from("/etc/rctsync/server.pem"));
        config.transfer.max_bytes_per_request = 1048576;
        config.logging.level = "debug".to_string();
        config.save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[transfer]"));
        assert!(!text.contains("auth_key"));

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
            assert_eq!(key.to_string(), key.name());
        }
        assert!(matches!(
            "service.password".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_values() {
        let mut config = ConfigFile::default();

        ConfigKey::ServiceInsecure.set(&mut config, "yes").unwrap();
        assert!(config.service.insecure);

        ConfigKey::ServiceAuthKey.set(&mut config, "abc").unwrap();
        ConfigKey::ServiceAuthKey.set(&mut config, "").unwrap();
        assert!(config.service.auth_key.is_none());

        ConfigKey::LoggingLevel.set(&mut config, "WARN").unwrap();
        assert_eq!(ConfigKey::LoggingLevel.get(&config), "warn");

        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
        assert!(ConfigKey::TransferChunkSize.set(&mut config, "0").is_err());
        assert!(ConfigKey::ServiceBaseUrl.set(&mut config, " ").is_err());
        assert!(ConfigKey::TransferMaxBytesPerRequest
            .set(&mut config, "-1")
            .is_err());
    }

    #[test]
    fn test_config_file_path_name() {
        let path = config_file_path();
        assert!(path.ends_with("rctsync/config.ini"));
    }
}
