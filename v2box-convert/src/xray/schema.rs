//! Typed view of the xray JSON document, limited to the migrated fields.
//!
//! Differences from the v2ray flavor: port lists instead of a single range,
//! `tcpFastOpen` as bool-or-queue-length, the bound interface key, and the
//! `reality` security block.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::dns::RawDns;
use crate::stream::{TlsSettings, TransportSettings};

use super::reality::RealitySettings;

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
    pub port: Option<PortList>,
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

/// Listener port list: a bare number or a `"443,1000-2000"` string; only
/// the first port is carried over.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortList {
    Number(u16),
    Text(String),
}

impl PortList {
    pub fn first_port(&self) -> u16 {
        match self {
            PortList::Number(port) => *port,
            PortList::Text(text) => text
                .split([',', '-'])
                .next()
                .and_then(|port| port.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamSettings {
    pub network: String,
    pub security: String,
    pub tls_settings: Option<TlsSettings>,
    pub reality_settings: Option<RealitySettings>,
    #[serde(flatten)]
    pub transport: TransportSettings,
    pub sockopt: Option<Sockopt>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sockopt {
    pub mark: i64,
    pub tcp_fast_open: Option<TfoValue>,
    pub tproxy: String,
    pub accept_proxy_protocol: bool,
    pub interface: String,
}

/// xray spells TCP fast open as a bool or a queue length, where `-1`
/// disables it.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum TfoValue {
    Flag(bool),
    QueueLength(i64),
}

impl TfoValue {
    pub fn enabled(self) -> bool {
        match self {
            TfoValue::Flag(flag) => flag,
            TfoValue::QueueLength(length) => length != -1,
        }
    }
}
