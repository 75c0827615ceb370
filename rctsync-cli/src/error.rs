//! CLI error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use rctsync::config::ConfigError;
use rctsync::logging::LoggingError;
use rctsync::RctError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Missing or conflicting settings.
    Config(String),

    /// The configuration file could not be read or written.
    ConfigFile(ConfigError),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// A service call or transfer failed.
    Transfer(RctError),

    /// The service did not apply a change tracking update.
    TrackingNotApplied { disk_path: String, enabled: bool },

    /// The local disk image could not be opened or flushed.
    Output { path: PathBuf, source: io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to set up logging: {}", e),
            CliError::Transfer(e) => write!(f, "{}", e),
            CliError::TrackingNotApplied { disk_path, enabled } => write!(
                f,
                "RCT still {} for disk {} after the update",
                if *enabled { "enabled" } else { "disabled" },
                disk_path
            ),
            CliError::Output { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Transfer(e) => Some(e),
            CliError::TrackingNotApplied { .. } => None,
            CliError::Output { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RctError> for CliError {
    fn from(e: RctError) -> Self {
        CliError::Transfer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Config("missing auth key".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing auth key"));
    }

    #[test]
    fn test_cli_error_from_rct_error() {
        let err: CliError = RctError::TrackingDisabled {
            disk_path: "disk.vhdx".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Transfer(_)));
        assert_eq!(err.to_string(), "RCT not enabled for disk disk.vhdx");
    }

    #[test]
    fn test_tracking_not_applied_display() {
        let err = CliError::TrackingNotApplied {
            disk_path: "disk.vhdx".to_string(),
            enabled: false,
        };
        assert_eq!(err.to_string(), "RCT still disabled for disk disk.vhdx after the update");
        assert!(std::error::Error::source(&err).is_none());
    }
}
