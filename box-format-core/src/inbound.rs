//! Listener-side endpoint kinds.

use serde::{Deserialize, Serialize};

use crate::shared::{AuthUser, Listen, ShadowsocksUser, TrojanUser, VlessUser, VmessUser};
use crate::tls::InboundTlsOptions;
use crate::transport::Transport;

/// A single listener definition: unique tag plus exactly one concrete kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inbound {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(flatten)]
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundKind {
    Direct(DirectInbound),
    Redirect(RedirectInbound),
    Tproxy(TproxyInbound),
    Http(HttpInbound),
    Socks(SocksInbound),
    Shadowsocks(ShadowsocksInbound),
    Vmess(VmessInbound),
    Vless(VlessInbound),
    Trojan(TrojanInbound),
}

impl InboundKind {
    /// Canonical `type` name of this kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InboundKind::Direct(_) => "direct",
            InboundKind::Redirect(_) => "redirect",
            InboundKind::Tproxy(_) => "tproxy",
            InboundKind::Http(_) => "http",
            InboundKind::Socks(_) => "socks",
            InboundKind::Shadowsocks(_) => "shadowsocks",
            InboundKind::Vmess(_) => "vmess",
            InboundKind::Vless(_) => "vless",
            InboundKind::Trojan(_) => "trojan",
        }
    }
}

/// Forwards accepted connections to a fixed destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub override_address: String,
    #[serde(default, skip_serializing_if = "crate::shared::is_zero_u16")]
    pub override_port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectInbound {
    #[serde(flatten)]
    pub listen: Listen,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TproxyInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<AuthUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<InboundTlsOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocksInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<AuthUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowsocksInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ShadowsocksUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmessInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<VmessUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<InboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VlessInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<VlessUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<InboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrojanInbound {
    #[serde(flatten)]
    pub listen: Listen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<TrojanUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<InboundTlsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}
