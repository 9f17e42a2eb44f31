//! Dialer-side endpoint kinds.

use serde::{Deserialize, Serialize};

use crate::shared::{Dial, DomainStrategy};
use crate::tls::OutboundTlsOptions;
use crate::transport::Transport;

/// A single dialer definition: unique tag plus exactly one concrete kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(flatten)]
    pub kind: OutboundKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundKind {
    Direct(DirectOutbound),
    Block(BlockOutbound),
    Dns(DnsOutbound),
    Http(HttpOutbound),
    Socks(SocksOutbound),
    Shadowsocks(ShadowsocksOutbound),
    Vmess(VmessOutbound),
    Vless(VlessOutbound),
    Trojan(TrojanOutbound),
    Wireguard(WireguardOutbound),
}

impl OutboundKind {
    /// Canonical `type` name of this kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            OutboundKind::Direct(_) => "direct",
            OutboundKind::Block(_) => "block",
            OutboundKind::Dns(_) => "dns",
            OutboundKind::Http(_) => "http",
            OutboundKind::Socks(_) => "socks",
            OutboundKind::Shadowsocks(_) => "shadowsocks",
            OutboundKind::Vmess(_) => "vmess",
            OutboundKind::Vless(_) => "vless",
            OutboundKind::Trojan(_) => "trojan",
            OutboundKind::Wireguard(_) => "wireguard",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub override_address: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub override_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_strategy: Option<DomainStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockOutbound {}

/// Answers intercepted DNS queries instead of forwarding traffic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsOutbound {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocksOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    /// SOCKS protocol version; empty means 5.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowsocksOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub udp_over_tcp: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmessOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub security: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub alter_id: u16,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub authenticated_length: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VlessOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrojanOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<OutboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireguardOutbound {
    #[serde(flatten)]
    pub dial: Dial,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub server_port: u16,
    /// Tunnel-local addresses in CIDR form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_address: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub peer_public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pre_shared_key: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u32")]
    pub mtu: u32,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u32")]
    pub workers: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<u8>,
}
