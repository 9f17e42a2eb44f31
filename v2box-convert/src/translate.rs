//! Shared endpoint builders: decoded payloads into canonical records.
//!
//! The schema modules parse their own socket/stream flavors, then hand the
//! pieces here; everything below the stream layer is identical between the
//! two source schemas.

use box_format_core::{
    AuthUser, BlockOutbound, Dial, DirectInbound, DirectOutbound, DnsOutbound, DomainStrategy,
    HttpInbound, HttpOutbound, Inbound, InboundKind, InboundTlsOptions, Listen, Outbound,
    OutboundKind, OutboundTlsOptions, RedirectInbound, ShadowsocksInbound, ShadowsocksOutbound,
    ShadowsocksUser, SocksInbound, SocksOutbound, TproxyInbound, Transport, TrojanInbound,
    TrojanOutbound, TrojanUser, VlessInbound, VlessOutbound, VlessUser, VmessInbound,
    VmessOutbound, VmessUser, WireguardOutbound,
};

use crate::classify::single_network;
use crate::settings::{InboundSettings, OutboundSettings, ServerEndpoint};

/// Hostnames discovered while translating outbounds. They end up in a DNS
/// rule routed through the local resolver, so proxy-server names resolve
/// before any proxy is usable.
#[derive(Debug, Default)]
pub struct DnsHints {
    pub server_domains: Vec<String>,
}

impl DnsHints {
    /// Record a dial target when it is a hostname rather than an IP literal.
    pub fn record_server(&mut self, address: &str) {
        if address.is_empty() || address.parse::<std::net::IpAddr>().is_ok() {
            return;
        }
        self.server_domains.push(address.to_string());
    }
}

/// Warning label for one document item: its tag, or its index when untagged.
pub(crate) fn item_label(tag: &str, index: usize) -> String {
    if tag.is_empty() {
        index.to_string()
    } else {
        tag.to_string()
    }
}

/// Canonical AEAD method for a legacy shadowsocks cipher spelling.
///
/// Unknown spellings map to the `"none"` sentinel instead of failing the
/// endpoint; this mirrors the legacy engines' default arm. The 2022 ciphers
/// pass through untouched.
pub fn shadowsocks_method(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    match lower.as_str() {
        "aes-128-gcm" | "aead_aes_128_gcm" => "aes-128-gcm".to_string(),
        "aes-256-gcm" | "aead_aes_256_gcm" => "aes-256-gcm".to_string(),
        "chacha20-poly1305" | "chacha20-ietf-poly1305" | "aead_chacha20_poly1305" => {
            "chacha20-ietf-poly1305".to_string()
        }
        _ if lower.starts_with("2022-") => lower,
        _ => "none".to_string(),
    }
}

/// Canonical VMess security name. Values outside the fixed table come back
/// empty and are omitted from output, matching the legacy default arm.
pub fn vmess_security(raw: &str) -> String {
    match raw.to_ascii_lowercase().as_str() {
        "aes-128-gcm" => "aes-128-gcm",
        "chacha20-poly1305" => "chacha20-poly1305",
        "none" => "none",
        "zero" => "zero",
        _ => "",
    }
    .to_string()
}

fn freedom_strategy(raw: &str) -> Option<DomainStrategy> {
    match raw.to_ascii_lowercase().as_str() {
        "useip" => Some(DomainStrategy::PreferIpv4),
        "useip4" | "useipv4" => Some(DomainStrategy::Ipv4Only),
        "useip6" | "useipv6" => Some(DomainStrategy::Ipv6Only),
        _ => None,
    }
}

/// Split a `"host:port"` literal, tolerating bracketed IPv6 and bare hosts.
pub(crate) fn split_host_port(value: &str) -> (String, u16) {
    if let Some(rest) = value.strip_prefix('[') {
        if let Some((host, port)) = rest.split_once(']') {
            let port = port
                .strip_prefix(':')
                .and_then(|port| port.parse().ok())
                .unwrap_or(0);
            return (host.to_string(), port);
        }
    }
    match value.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (value.to_string(), 0),
        },
        _ => (value.to_string(), 0),
    }
}

fn first_endpoint(servers: Vec<ServerEndpoint>) -> ServerEndpoint {
    servers.into_iter().next().unwrap_or_default()
}

/// Assemble one canonical inbound from its translated parts.
pub fn build_inbound(
    tag: String,
    listen: Listen,
    tls: Option<InboundTlsOptions>,
    transport: Option<Transport>,
    tproxy: Option<&str>,
    settings: InboundSettings,
) -> Inbound {
    let kind = match settings {
        InboundSettings::Dokodemo(dokodemo) => {
            if dokodemo.follow_redirect || tproxy == Some("redirect") {
                InboundKind::Redirect(RedirectInbound { listen })
            } else if tproxy == Some("tproxy") {
                InboundKind::Tproxy(TproxyInbound {
                    listen,
                    network: single_network(&dokodemo.network),
                })
            } else {
                InboundKind::Direct(DirectInbound {
                    listen,
                    network: single_network(&dokodemo.network),
                    override_address: dokodemo.address,
                    override_port: dokodemo.port,
                })
            }
        }
        InboundSettings::Http(http) => InboundKind::Http(HttpInbound {
            listen,
            users: http
                .accounts
                .into_iter()
                .map(|account| AuthUser {
                    username: account.user,
                    password: account.pass,
                })
                .collect(),
            tls,
        }),
        InboundSettings::Socks(socks) => InboundKind::Socks(SocksInbound {
            listen,
            users: socks
                .accounts
                .into_iter()
                .map(|account| AuthUser {
                    username: account.user,
                    password: account.pass,
                })
                .collect(),
        }),
        InboundSettings::Shadowsocks(shadowsocks) => InboundKind::Shadowsocks(ShadowsocksInbound {
            listen,
            network: single_network(&shadowsocks.network),
            method: shadowsocks_method(&shadowsocks.method),
            password: shadowsocks.password,
            users: shadowsocks
                .clients
                .into_iter()
                .map(|client| ShadowsocksUser {
                    name: client.email,
                    password: client.password,
                })
                .collect(),
        }),
        InboundSettings::Vmess(vmess) => InboundKind::Vmess(VmessInbound {
            listen,
            users: vmess
                .clients
                .into_iter()
                .map(|client| VmessUser {
                    name: client.email,
                    uuid: client.id,
                    alter_id: client.alter_id,
                })
                .collect(),
            tls,
            transport,
        }),
        InboundSettings::Vless(vless) => InboundKind::Vless(VlessInbound {
            listen,
            users: vless
                .clients
                .into_iter()
                .map(|client| VlessUser {
                    name: client.email,
                    uuid: client.id,
                    flow: client.flow,
                })
                .collect(),
            tls,
            transport,
        }),
        InboundSettings::Trojan(trojan) => InboundKind::Trojan(TrojanInbound {
            listen,
            users: trojan
                .clients
                .into_iter()
                .map(|client| TrojanUser {
                    name: client.email,
                    password: client.password,
                })
                .collect(),
            tls,
            transport,
        }),
    };
    Inbound { tag, kind }
}

/// Assemble one canonical outbound from its translated parts, recording any
/// hostname dial target into `hints`.
pub fn build_outbound(
    tag: String,
    dial: Dial,
    tls: Option<OutboundTlsOptions>,
    transport: Option<Transport>,
    settings: OutboundSettings,
    hints: &mut DnsHints,
) -> Outbound {
    let kind = match settings {
        OutboundSettings::Blackhole => OutboundKind::Block(BlockOutbound::default()),
        OutboundSettings::Dns => OutboundKind::Dns(DnsOutbound::default()),
        OutboundSettings::Freedom(freedom) => {
            let mut direct = DirectOutbound {
                dial,
                domain_strategy: freedom_strategy(&freedom.domain_strategy),
                ..Default::default()
            };
            if !freedom.redirect.is_empty() {
                let (address, port) = split_host_port(&freedom.redirect);
                direct.override_address = address;
                direct.override_port = port;
            }
            OutboundKind::Direct(direct)
        }
        OutboundSettings::Http(http) => {
            let server = first_endpoint(http.servers);
            hints.record_server(&server.address);
            let mut outbound = HttpOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                tls,
                ..Default::default()
            };
            if let Some(account) = server.users.into_iter().next() {
                outbound.username = account.user;
                outbound.password = account.pass;
            }
            OutboundKind::Http(outbound)
        }
        OutboundSettings::Socks(socks) => {
            let version = match socks.version.as_str() {
                "4" => "4",
                "4a" => "4a",
                _ => "",
            }
            .to_string();
            let server = first_endpoint(socks.servers);
            hints.record_server(&server.address);
            let mut outbound = SocksOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                version,
                ..Default::default()
            };
            if let Some(account) = server.users.into_iter().next() {
                outbound.username = account.user;
                outbound.password = account.pass;
            }
            OutboundKind::Socks(outbound)
        }
        OutboundSettings::Shadowsocks(shadowsocks) => {
            let server = shadowsocks.servers.into_iter().next().unwrap_or_default();
            hints.record_server(&server.address);
            OutboundKind::Shadowsocks(ShadowsocksOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                method: shadowsocks_method(&server.method),
                password: server.password,
                udp_over_tcp: server.uot,
            })
        }
        OutboundSettings::Vmess(vmess) => {
            let server = vmess.vnext.into_iter().next().unwrap_or_default();
            hints.record_server(&server.address);
            let mut outbound = VmessOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                tls,
                transport,
                ..Default::default()
            };
            if let Some(user) = server.users.into_iter().next() {
                outbound.uuid = user.id;
                outbound.security = vmess_security(&user.security);
                outbound.alter_id = user.alter_id;
                outbound.authenticated_length = user.tests_enabled.contains("AuthenticatedLength");
            }
            OutboundKind::Vmess(outbound)
        }
        OutboundSettings::Vless(vless) => {
            let server = vless.vnext.into_iter().next().unwrap_or_default();
            hints.record_server(&server.address);
            let mut outbound = VlessOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                tls,
                transport,
                ..Default::default()
            };
            if let Some(user) = server.users.into_iter().next() {
                outbound.uuid = user.id;
                outbound.flow = user.flow;
            }
            OutboundKind::Vless(outbound)
        }
        OutboundSettings::Trojan(trojan) => {
            let server = trojan.servers.into_iter().next().unwrap_or_default();
            hints.record_server(&server.address);
            OutboundKind::Trojan(TrojanOutbound {
                dial,
                server: server.address,
                server_port: server.port,
                password: server.password,
                tls,
                transport,
            })
        }
        OutboundSettings::Wireguard(wireguard) => {
            let mut outbound = WireguardOutbound {
                dial,
                private_key: wireguard.secret_key,
                local_address: wireguard
                    .address
                    .iter()
                    .map(|address| local_prefix(address))
                    .collect(),
                mtu: wireguard.mtu,
                workers: wireguard.workers,
                reserved: wireguard.reserved,
                ..Default::default()
            };
            if let Some(peer) = wireguard.peers.into_iter().next() {
                let (server, port) = split_host_port(&peer.endpoint);
                outbound.server = server;
                outbound.server_port = port;
                outbound.peer_public_key = peer.public_key;
                outbound.pre_shared_key = peer.pre_shared_key;
            }
            OutboundKind::Wireguard(outbound)
        }
    };
    Outbound { tag, kind }
}

/// Tunnel-local address as a full-length prefix when the source omitted one.
fn local_prefix(address: &str) -> String {
    if address.contains('/') {
        return address.to_string();
    }
    match address.parse::<std::net::IpAddr>() {
        Ok(std::net::IpAddr::V4(_)) => format!("{address}/32"),
        Ok(std::net::IpAddr::V6(_)) => format!("{address}/128"),
        Err(_) => address.to_string(),
    }
}
