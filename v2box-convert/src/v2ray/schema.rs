//! Typed view of the v2ray v4 JSON document, limited to the migrated fields.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::dns::RawDns;
use crate::stream::{TlsSettings, TransportSettings};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub inbounds: Vec<InboundConfig>,
    pub outbounds: Vec<OutboundConfig>,
    pub dns: Option<RawDns>,
    pub routing: Option<RoutingConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    pub rules: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundConfig {
    pub tag: String,
    pub listen: String,
    pub port: Option<PortSpec>,
    pub protocol: String,
    pub settings: Option<Box<RawValue>>,
    pub stream_settings: Option<StreamSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutboundConfig {
    pub tag: String,
    pub protocol: String,
    pub settings: Option<Box<RawValue>>,
    pub stream_settings: Option<StreamSettings>,
}

/// Listener port spec: a bare number or a `"from-to"` range; only the first
/// port is carried over.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Number(u16),
    Text(String),
}

impl PortSpec {
    pub fn first_port(&self) -> u16 {
        match self {
            PortSpec::Number(port) => *port,
            PortSpec::Text(text) => text
                .split([',', '-'])
                .next()
                .and_then(|port| port.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

/// v2ray stream settings: the shared transport payloads plus the v2ray
/// flavor of socket options.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamSettings {
    pub network: String,
    pub security: String,
    pub tls_settings: Option<TlsSettings>,
    #[serde(flatten)]
    pub transport: TransportSettings,
    pub sockopt: Option<Sockopt>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sockopt {
    pub mark: i64,
    pub tcp_fast_open: Option<bool>,
    pub tproxy: String,
    pub accept_proxy_protocol: bool,
    pub bind_to_device: String,
}
