//! Stream transport records layered beneath TLS.
//!
//! Absence of a transport record means bare TCP; there is no `none` variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transport {
    Http(HttpTransport),
    Ws(WsTransport),
    Grpc(GrpcTransport),
    Quic(QuicTransport),
}

/// HTTP camouflage transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTransport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// WebSocket transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsTransport {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u32")]
    pub max_early_data: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub early_data_header_name: String,
}

/// gRPC-style multiplexed stream transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcTransport {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
}

/// QUIC transport; carries no extra fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuicTransport {}
