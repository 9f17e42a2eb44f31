//! Protocol payload decoding.
//!
//! The legacy engines resolved payload types at runtime by registry name;
//! here each direction is a closed tagged union over the known protocol set,
//! selected by the declared protocol name. Unknown names are a typed error
//! naming the protocol, not a downcast failure.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::ItemError;
use crate::listable::Listable;

/// Which source schema is asking; the outbound protocol sets diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    V2ray,
    Xray,
}

#[derive(Debug)]
pub enum InboundSettings {
    Dokodemo(DokodemoSettings),
    Http(HttpInboundSettings),
    Socks(SocksInboundSettings),
    Shadowsocks(ShadowsocksInboundSettings),
    Vmess(VmessInboundSettings),
    Vless(VlessInboundSettings),
    Trojan(TrojanInboundSettings),
}

#[derive(Debug)]
pub enum OutboundSettings {
    Freedom(FreedomSettings),
    Blackhole,
    Dns,
    Http(HttpOutboundSettings),
    Socks(SocksOutboundSettings),
    Shadowsocks(ShadowsocksOutboundSettings),
    Vmess(VmessOutboundSettings),
    Vless(VlessOutboundSettings),
    Trojan(TrojanOutboundSettings),
    Wireguard(WireguardSettings),
}

/// Decode the payload for one inbound protocol by name.
pub fn load_inbound(
    protocol: &str,
    raw: Option<&RawValue>,
    _schema: Schema,
) -> Result<InboundSettings, ItemError> {
    let raw = raw.map(RawValue::get).unwrap_or("{}");
    Ok(match protocol {
        "dokodemo-door" => InboundSettings::Dokodemo(decode(protocol, raw)?),
        "http" => InboundSettings::Http(decode(protocol, raw)?),
        "socks" => InboundSettings::Socks(decode(protocol, raw)?),
        "shadowsocks" => InboundSettings::Shadowsocks(decode(protocol, raw)?),
        "vmess" => InboundSettings::Vmess(decode(protocol, raw)?),
        "vless" => InboundSettings::Vless(decode(protocol, raw)?),
        "trojan" => InboundSettings::Trojan(decode(protocol, raw)?),
        other => return Err(ItemError::UnsupportedInbound(other.to_string())),
    })
}

/// Decode the payload for one outbound protocol by name.
///
/// `loopback` parses under both schemas but is rejected on purpose: the
/// canonical schema expresses the same wiring with a detour reference.
pub fn load_outbound(
    protocol: &str,
    raw: Option<&RawValue>,
    schema: Schema,
) -> Result<OutboundSettings, ItemError> {
    let raw = raw.map(RawValue::get).unwrap_or("{}");
    Ok(match protocol {
        "freedom" => OutboundSettings::Freedom(decode(protocol, raw)?),
        "blackhole" => OutboundSettings::Blackhole,
        "dns" => OutboundSettings::Dns,
        "loopback" => return Err(ItemError::LoopbackOutbound),
        "http" => OutboundSettings::Http(decode(protocol, raw)?),
        "socks" => OutboundSettings::Socks(decode(protocol, raw)?),
        "shadowsocks" => OutboundSettings::Shadowsocks(decode(protocol, raw)?),
        "vmess" => OutboundSettings::Vmess(decode(protocol, raw)?),
        "vless" => OutboundSettings::Vless(decode(protocol, raw)?),
        "trojan" => OutboundSettings::Trojan(decode(protocol, raw)?),
        "wireguard" if schema == Schema::Xray => {
            OutboundSettings::Wireguard(decode(protocol, raw)?)
        }
        other => return Err(ItemError::UnsupportedOutbound(other.to_string())),
    })
}

fn decode<'a, T: Deserialize<'a>>(protocol: &str, raw: &'a str) -> Result<T, ItemError> {
    serde_json::from_str(raw).map_err(|source| ItemError::InvalidSettings {
        protocol: protocol.to_string(),
        source,
    })
}

// Inbound payloads.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DokodemoSettings {
    pub address: String,
    pub port: u16,
    pub network: Listable<String>,
    pub follow_redirect: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpInboundSettings {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocksInboundSettings {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowsocksClient {
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowsocksInboundSettings {
    pub method: String,
    pub password: String,
    pub network: Listable<String>,
    /// Multi-user form used by the 2022 ciphers.
    pub clients: Vec<ShadowsocksClient>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmessClient {
    pub id: String,
    pub alter_id: u16,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmessInboundSettings {
    pub clients: Vec<VmessClient>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlessClient {
    pub id: String,
    pub flow: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlessInboundSettings {
    pub clients: Vec<VlessClient>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrojanClient {
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrojanInboundSettings {
    pub clients: Vec<TrojanClient>,
}

// Outbound payloads.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreedomSettings {
    pub domain_strategy: String,
    /// `"host:port"` destination override.
    pub redirect: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerEndpoint {
    pub address: String,
    pub port: u16,
    pub users: Vec<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpOutboundSettings {
    pub servers: Vec<ServerEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocksOutboundSettings {
    pub servers: Vec<ServerEndpoint>,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowsocksServer {
    pub address: String,
    pub port: u16,
    pub method: String,
    pub password: String,
    pub uot: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowsocksOutboundSettings {
    pub servers: Vec<ShadowsocksServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmessUserSettings {
    pub id: String,
    pub alter_id: u16,
    pub security: String,
    pub tests_enabled: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmessServer {
    pub address: String,
    pub port: u16,
    pub users: Vec<VmessUserSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmessOutboundSettings {
    pub vnext: Vec<VmessServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlessUserSettings {
    pub id: String,
    pub flow: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlessServer {
    pub address: String,
    pub port: u16,
    pub users: Vec<VlessUserSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VlessOutboundSettings {
    pub vnext: Vec<VlessServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrojanServer {
    pub address: String,
    pub port: u16,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrojanOutboundSettings {
    pub servers: Vec<TrojanServer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireguardPeer {
    pub endpoint: String,
    pub public_key: String,
    pub pre_shared_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireguardSettings {
    pub secret_key: String,
    pub address: Listable<String>,
    pub peers: Vec<WireguardPeer>,
    pub mtu: u32,
    pub workers: u32,
    pub reserved: Vec<u8>,
}
