//! Response types returned by the RCT service.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Virtual disk metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Size of the virtual disk in bytes.
    pub virtual_size: u64,
    /// Remaining fields reported by the service, kept for display.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DiskInfo {
    /// Disk info with only a virtual size.
    pub fn new(virtual_size: u64) -> Self {
        Self {
            virtual_size,
            extra: BTreeMap::new(),
        }
    }
}

/// Change tracking status of a virtual disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStatus {
    /// Whether resilient change tracking is enabled.
    pub enabled: bool,
    /// Remaining fields reported by the service, such as the current RCT id.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TrackingStatus {
    /// Tracking status with only the enabled flag.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            extra: BTreeMap::new(),
        }
    }
}

/// Text of an extra response field: strings unquoted, anything else as JSON.
pub fn field_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

fn write_extra(f: &mut fmt::Formatter<'_>, extra: &BTreeMap<String, Value>) -> fmt::Result {
    for (key, value) in extra {
        write!(f, ", {}: {}", key, field_text(value))?;
    }
    Ok(())
}

impl fmt::Display for DiskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "virtual_size: {}", self.virtual_size)?;
        write_extra(f, &self.extra)
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enabled: {}", self.enabled)?;
        write_extra(f, &self.extra)
    }
}
