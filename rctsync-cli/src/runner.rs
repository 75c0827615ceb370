//! Shared setup for commands that talk to the service.

use rctsync::client::HttpRctClient;
use rctsync::config::ConfigFile;
use rctsync::logging::{init_logging, LoggingGuard};
use tracing::debug;

use crate::commands::common::{resolve_service_config, ServiceArgs};
use crate::error::CliError;

/// Loads configuration and installs logging for the life of a command.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the configuration file and start logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(&config.logging, verbose)?;
        Ok(Self {
            config,
            _logging: logging,
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being started.
    pub fn log_startup(&self, command: &str) {
        debug!(version = env!("CARGO_PKG_VERSION"), command, "rctsync starting");
    }

    /// Build a service client from CLI arguments and configuration.
    pub fn service_client(&self, args: &ServiceArgs) -> Result<HttpRctClient, CliError> {
        let service_config = resolve_service_config(args, &self.config)?;
        Ok(HttpRctClient::new(service_config)?)
    }
}
