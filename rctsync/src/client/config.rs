//! Connection settings for the RCT service.

use std::path::PathBuf;
use std::time::Duration;

use super::chunks::DEFAULT_CHUNK_SIZE;

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://localhost:6677";

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// How the server certificate is verified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Verify against the built-in web PKI roots.
    #[default]
    System,
    /// Trust only the PEM certificate at this path.
    Certificate(PathBuf),
    /// Accept any certificate.
    Disabled,
}

/// Configuration for [`HttpRctClient`](super::HttpRctClient).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the service, without a trailing path.
    pub base_url: String,

    /// Value of the `auth_key` header sent with every request.
    pub auth_key: String,

    /// Server certificate verification.
    pub tls: TlsVerification,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Upper bound on the size of content chunks handed to the demultiplexer.
    pub chunk_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_key: String::new(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration for the given endpoint and auth key.
    pub fn new(base_url: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_key: auth_key.into(),
            ..Default::default()
        }
    }

    /// Set certificate verification.
    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum content chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
