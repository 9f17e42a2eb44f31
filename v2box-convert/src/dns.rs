//! DNS block migration shared by both source schemas.
//!
//! The canonical resolver layout is fixed: a remote DoT server and a local
//! server detoured through the direct outbound. The source block only
//! influences the query strategy and whether a `geosite:cn` split rule is
//! emitted.

use serde::Deserialize;

use box_format_core::{
    DirectOutbound, DnsOptions, DnsRule, DnsServer, DomainStrategy, Options, Outbound,
    OutboundKind,
};

use crate::listable::Listable;

/// Source `dns` block, shared spelling across both schemas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDns {
    pub servers: Vec<RawDnsServer>,
    pub query_strategy: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDnsServer {
    Address(String),
    Object(RawDnsServerObject),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDnsServerObject {
    pub address: String,
    pub port: u16,
    pub domains: Listable<String>,
    #[serde(rename = "expectIPs", alias = "expectIps")]
    pub expect_ips: Listable<String>,
}

/// Derive the canonical DNS configuration and attach it to `options`.
///
/// Also guarantees a `direct` outbound exists, since the local server
/// detours through it.
pub fn migrate_dns(dns: &RawDns, options: &mut Options) {
    let mut dns_options = DnsOptions {
        servers: vec![
            DnsServer {
                tag: "remote".to_string(),
                address: "tls://8.8.8.8".to_string(),
                ..Default::default()
            },
            DnsServer {
                tag: "local".to_string(),
                address: "local".to_string(),
                detour: "direct".to_string(),
            },
        ],
        strategy: parse_strategy(&dns.query_strategy),
        ..Default::default()
    };
    if dns.servers.iter().any(server_handles_cn_domains) {
        dns_options.rules.push(DnsRule {
            geosite: vec!["cn".to_string()],
            server: "local".to_string(),
            ..Default::default()
        });
    }
    if !options.outbounds.iter().any(|outbound| outbound.tag == "direct") {
        options.outbounds.push(Outbound {
            tag: "direct".to_string(),
            kind: OutboundKind::Direct(DirectOutbound::default()),
        });
    }
    options.dns = Some(dns_options);
}

fn server_handles_cn_domains(server: &RawDnsServer) -> bool {
    match server {
        RawDnsServer::Address(_) => false,
        RawDnsServer::Object(object) => {
            object.domains.iter().any(|domain| domain.ends_with("cn"))
        }
    }
}

fn parse_strategy(raw: &str) -> Option<DomainStrategy> {
    match raw.to_ascii_lowercase().as_str() {
        "useip4" | "useipv4" | "use_ip4" | "use_ipv4" | "use_ip_v4" | "use-ip4" | "use-ipv4"
        | "use-ip-v4" => Some(DomainStrategy::Ipv4Only),
        "useip6" | "useipv6" | "use_ip6" | "use_ipv6" | "use_ip_v6" | "use-ip6" | "use-ipv6"
        | "use-ip-v6" => Some(DomainStrategy::Ipv6Only),
        _ => None,
    }
}
