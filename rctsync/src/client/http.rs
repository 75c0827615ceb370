//! RCT service client over HTTP.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation            | Request                                   |
//! |----------------------|-------------------------------------------|
//! | disk info            | `GET  vdisk/{disk}/info`                  |
//! | tracking status      | `GET  vdisk/{disk}/rct`                   |
//! | enable/disable       | `PUT  vdisk/{disk}/rct?enabled={bool}`    |
//! | changed ranges       | `GET  vdisk/{disk}/rct/{rct_id}/changes`  |
//! | range content        | `POST vdisk/{disk}/content` (JSON ranges) |
//!
//! Every request carries the `auth_key` header.

use std::fs;

use reqwest::blocking::{Client, Response};
use reqwest::{Certificate, Method, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::chunks::ReadChunks;
use super::config::{ServiceConfig, TlsVerification};
use super::types::{DiskInfo, TrackingStatus};
use super::{ChunkStream, RctService};
use crate::error::{RctError, RctResult};
use crate::range::{ChangeSet, DiskRange};

/// Header carrying the service auth key.
const AUTH_KEY_HEADER: &str = "auth_key";

/// Blocking HTTP implementation of [`RctService`].
#[derive(Debug)]
pub struct HttpRctClient {
    client: Client,
    base_url: Url,
    auth_key: String,
    chunk_size: usize,
    timeout_secs: u64,
}

impl HttpRctClient {
    /// Create a client from the given configuration.
    ///
    /// Fails if the base URL is invalid or the certificate cannot be loaded.
    pub fn new(config: ServiceConfig) -> RctResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RctError::InvalidConfig(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RctError::InvalidConfig(format!(
                "invalid base URL '{}'",
                config.base_url
            )));
        }

        let builder = Client::builder().timeout(config.timeout);
        let builder = match &config.tls {
            TlsVerification::System => builder,
            TlsVerification::Certificate(path) => {
                let pem = fs::read(path).map_err(|e| {
                    RctError::InvalidConfig(format!(
                        "failed to read certificate {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let cert = Certificate::from_pem(&pem).map_err(|e| {
                    RctError::InvalidConfig(format!(
                        "invalid certificate {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(cert)
            }
            TlsVerification::Disabled => builder.danger_accept_invalid_certs(true),
        };

        let client = builder.build().map_err(|e| {
            RctError::InvalidConfig(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            auth_key: config.auth_key,
            chunk_size: config.chunk_size,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/vdisk/{disk_path}/{tail...}`.
    ///
    /// The disk path keeps its `/` separators; every other reserved
    /// character, including `\` in Windows paths, is percent-encoded.
    fn disk_url(&self, disk_path: &str, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("vdisk")
                .extend(disk_path.split('/'))
                .extend(tail);
        }
        url
    }

    fn send(
        &self,
        method: Method,
        url: &Url,
        ranges: Option<&[DiskRange]>,
    ) -> RctResult<Response> {
        debug!(%method, %url, "RCT service request");

        let mut request = self
            .client
            .request(method, url.clone())
            .header(AUTH_KEY_HEADER, &self.auth_key);
        if let Some(ranges) = ranges {
            request = request.json(ranges);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                RctError::request_failed(
                    url.as_str(),
                    format!("timed out after {}s", self.timeout_secs),
                )
            } else {
                RctError::request_failed(url.as_str(), e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RctError::request_failed(
                url.as_str(),
                format!("HTTP {}", status),
            ));
        }

        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> RctResult<T> {
        self.send(Method::GET, url, None)?
            .json()
            .map_err(|e| RctError::request_failed(url.as_str(), format!("invalid response: {}", e)))
    }
}

impl RctService for HttpRctClient {
    fn disk_info(&self, disk_path: &str) -> RctResult<DiskInfo> {
        self.get_json(&self.disk_url(disk_path, &["info"]))
    }

    fn tracking_status(&self, disk_path: &str) -> RctResult<TrackingStatus> {
        self.get_json(&self.disk_url(disk_path, &["rct"]))
    }

    fn set_tracking(&self, disk_path: &str, enabled: bool) -> RctResult<()> {
        let mut url = self.disk_url(disk_path, &["rct"]);
        url.query_pairs_mut()
            .append_pair("enabled", if enabled { "true" } else { "false" });
        self.send(Method::PUT, &url, None).map(|_| ())
    }

    fn changes(&self, disk_path: &str, rct_id: &str) -> RctResult<ChangeSet> {
        let ranges: Vec<DiskRange> =
            self.get_json(&self.disk_url(disk_path, &["rct", rct_id, "changes"]))?;
        Ok(ChangeSet::from(ranges))
    }

    fn range_content(&self, disk_path: &str, ranges: &[DiskRange]) -> RctResult<ChunkStream> {
        if ranges.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }

        let url = self.disk_url(disk_path, &["content"]);
        let response = self.send(Method::POST, &url, Some(ranges))?;
        Ok(Box::new(ReadChunks::new(
            response,
            self.chunk_size,
            url.as_str(),
        )))
    }
}
