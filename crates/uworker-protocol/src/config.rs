//! Runtime configuration for the uworker I/O layer.
//!
//! Environment variables:
//! - UWORKER_IO_BUCKET (optional, default: "uworker-io") - bucket for I/O blobs
//! - UWORKER_LOG_FORMAT (optional, default: "text") - "text" or "json"

use std::str::FromStr;

use crate::error::{ProtocolError, Result};

pub const DEFAULT_IO_BUCKET: &str = "uworker-io";

/// Log line format for [`crate::telemetry::init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ProtocolError::Config(format!(
                "UWORKER_LOG_FORMAT must be text or json, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoConfig {
    /// Bucket that input and output envelopes are written to.
    pub bucket: String,
    pub log_format: LogFormat,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_IO_BUCKET.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl IoConfig {
    pub fn new(bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        validate_bucket(&bucket)?;
        Ok(Self {
            bucket,
            ..Self::default()
        })
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bucket = lookup("UWORKER_IO_BUCKET").unwrap_or_else(|| DEFAULT_IO_BUCKET.to_string());
        validate_bucket(&bucket)?;
        let log_format = match lookup("UWORKER_LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::Text,
        };
        Ok(Self { bucket, log_format })
    }
}

fn validate_bucket(bucket: &str) -> Result<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(ProtocolError::Config(format!(
            "invalid UWORKER_IO_BUCKET: {bucket:?}"
        )));
    }
    Ok(())
}
