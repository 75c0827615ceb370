//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use rctsync::client::{ServiceConfig, TlsVerification};
use rctsync::config::ConfigFile;

use crate::error::CliError;

/// Service connection arguments accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct ServiceArgs {
    /// Base RCT service URL [default: https://localhost:6677]
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Auth key for the RCT service
    #[arg(long, global = true, value_name = "KEY")]
    pub auth_key: Option<String>,

    /// X509 server certificate (PEM) to verify the service against
    #[arg(long, global = true, value_name = "PEM")]
    pub cert_path: Option<PathBuf>,

    /// Do not verify the server certificate
    #[arg(long, global = true, conflicts_with = "cert_path")]
    pub insecure: bool,

    /// HTTP timeout in seconds [default: 300]
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Resolve certificate verification: CLI flags first, then config.
pub fn resolve_tls(args: &ServiceArgs, config: &ConfigFile) -> TlsVerification {
    if let Some(path) = &args.cert_path {
        TlsVerification::Certificate(path.clone())
    } else if args.insecure {
        TlsVerification::Disabled
    } else if let Some(path) = &config.service.cert_path {
        TlsVerification::Certificate(path.clone())
    } else if config.service.insecure {
        TlsVerification::Disabled
    } else {
        TlsVerification::System
    }
}

/// Resolve service settings from CLI args and config.
pub fn resolve_service_config(
    args: &ServiceArgs,
    config: &ConfigFile,
) -> Result<ServiceConfig, CliError> {
    let auth_key = args
        .auth_key
        .clone()
        .or_else(|| config.service.auth_key.clone())
        .ok_or_else(|| {
            CliError::Config(
                "No auth key specified. Use --auth-key or set auth_key in config.ini [service] section."
                    .to_string(),
            )
        })?;

    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.service.base_url.clone());
    let timeout_secs = args.timeout.unwrap_or(config.service.timeout);

    Ok(ServiceConfig::new(base_url, auth_key)
        .with_tls(resolve_tls(args, config))
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_chunk_size(config.transfer.chunk_size))
}

/// Resolve the per-request byte budget from CLI args and config.
pub fn resolve_max_bytes_per_request(cli_value: Option<u64>, config: &ConfigFile) -> u64 {
    cli_value.unwrap_or(config.transfer.max_bytes_per_request)
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
