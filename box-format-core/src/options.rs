//! Canonical options document produced by every migration strategy.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inbound::Inbound;
use crate::outbound::Outbound;
use crate::rule::{DnsOptions, RouteOptions};

/// Errors that can occur while serializing or writing an options document.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize the document as JSON.
    #[error("failed to serialize options: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to write the output file.
    #[error("failed to write options file: {0}")]
    Io(#[from] std::io::Error),
}

/// Root of the canonical configuration document.
///
/// Sequence order is significant and preserved through serialization:
/// inbound/outbound identity is the unique tag, and route rules are
/// evaluated first-match-wins at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsOptions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbounds: Vec<Inbound>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outbounds: Vec<Outbound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteOptions>,
}

impl Options {
    /// Render the document as 2-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, WriteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serialize an [`Options`] document and write it to `path`.
pub fn write_file(options: &Options, path: &Path) -> Result<(), WriteError> {
    let mut rendered = options.to_json_pretty()?;
    rendered.push('\n');
    fs::write(path, rendered)?;
    Ok(())
}
