//! Socket-level records and user credentials shared across endpoint kinds.

use serde::{Deserialize, Serialize};

pub(crate) fn is_zero_u16(value: &u16) -> bool {
    *value == 0
}

pub(crate) fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

/// Listener socket options, flattened into every listener kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listen {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub listen: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub listen_port: u16,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tcp_fast_open: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub proxy_protocol: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub proxy_protocol_accept_no_header: bool,
}

/// Dialer socket options, flattened into every dialer kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dial {
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u32")]
    pub routing_mark: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tcp_fast_open: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bind_interface: String,
}

/// How hostnames are resolved when dialing. Omitted when the source keeps
/// addresses as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStrategy {
    PreferIpv4,
    PreferIpv6,
    Ipv4Only,
    Ipv6Only,
}

/// Username/password credential used by HTTP and SOCKS endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmessUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub alter_id: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlessUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrojanUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowsocksUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}
