//! Migration strategy for the v2ray v4 JSON schema.

mod inbound;
mod outbound;
pub mod schema;

use box_format_core::{DnsRule, RouteOptions};

use crate::error::MigrateError;
use crate::registry::MigrationReport;
use crate::translate::{item_label, DnsHints};
use crate::{classify, decode, dns};

/// Version label reported for this strategy.
pub const VERSION: &str = "v2fly/v2ray-core v4 configuration format";

/// Translate one complete v2ray document, dropping untranslatable items with
/// a warning each.
pub fn migrate(content: &[u8]) -> Result<MigrationReport, MigrateError> {
    let document: schema::Document = decode::from_jsonc(content)?;
    let mut report = MigrationReport::default();
    let mut hints = DnsHints::default();

    for (index, inbound_config) in document.inbounds.iter().enumerate() {
        match inbound::migrate_inbound(inbound_config) {
            Ok(inbound) => report.options.inbounds.push(inbound),
            Err(err) => report.warnings.push(format!(
                "ignoring inbound {}: {err}",
                item_label(&inbound_config.tag, index)
            )),
        }
    }
    for (index, outbound_config) in document.outbounds.iter().enumerate() {
        match outbound::migrate_outbound(outbound_config, &mut hints) {
            Ok(outbound) => report.options.outbounds.push(outbound),
            Err(err) => report.warnings.push(format!(
                "ignoring outbound {}: {err}",
                item_label(&outbound_config.tag, index)
            )),
        }
    }

    let raw_dns = document.dns.clone().unwrap_or_default();
    dns::migrate_dns(&raw_dns, &mut report.options);
    if !hints.server_domains.is_empty() {
        if let Some(dns_options) = report.options.dns.as_mut() {
            dns_options.rules.push(DnsRule {
                domain: hints.server_domains,
                server: "local".to_string(),
                ..Default::default()
            });
        }
    }

    if let Some(routing) = &document.routing {
        for (index, raw_rule) in routing.rules.iter().enumerate() {
            match classify::migrate_rule(raw_rule) {
                Ok(rule) => report
                    .options
                    .route
                    .get_or_insert_with(RouteOptions::default)
                    .rules
                    .push(rule),
                Err(err) => report
                    .warnings
                    .push(format!("ignoring rule {index}: {err}")),
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use box_format_core::{InboundKind, OutboundKind, Transport};
    use pretty_assertions::assert_eq;

    #[test]
    fn socks_inbound_round_trips_tag_address_and_port() {
        let report = migrate(
            br#"{
                "inbounds": [
                    {
                        "tag": "socks-in",
                        "listen": "127.0.0.1",
                        "port": 1080,
                        "protocol": "socks",
                        "settings": { "accounts": [ { "user": "me", "pass": "secret" } ] }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        assert!(report.warnings.is_empty());
        assert_eq!(report.options.inbounds.len(), 1);
        let inbound = &report.options.inbounds[0];
        assert_eq!(inbound.tag, "socks-in");
        let InboundKind::Socks(socks) = &inbound.kind else {
            panic!("expected socks inbound");
        };
        assert_eq!(socks.listen.listen, "127.0.0.1");
        assert_eq!(socks.listen.listen_port, 1080);
        assert_eq!(socks.users[0].username, "me");
    }

    #[test]
    fn dokodemo_with_tproxy_sockopt_becomes_tproxy_inbound() {
        let report = migrate(
            br#"{
                "inbounds": [
                    {
                        "tag": "transparent",
                        "listen": "0.0.0.0",
                        "port": 12345,
                        "protocol": "dokodemo-door",
                        "settings": { "network": "tcp,udp" },
                        "streamSettings": { "sockopt": { "tproxy": "tproxy" } }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        let InboundKind::Tproxy(tproxy) = &report.options.inbounds[0].kind else {
            panic!("expected tproxy inbound");
        };
        assert_eq!(tproxy.listen.listen_port, 12345);
        // tcp,udp collapses to unconstrained.
        assert_eq!(tproxy.network, "");
    }

    #[test]
    fn vmess_outbound_carries_stream_and_cipher_mapping() {
        let report = migrate(
            br#"{
                "outbounds": [
                    {
                        "tag": "proxy",
                        "protocol": "vmess",
                        "settings": {
                            "vnext": [
                                {
                                    "address": "vmess.example.com",
                                    "port": 443,
                                    "users": [ { "id": "b831381d-6324-4d53-ad4f-8cda48b30811", "alterId": 0, "security": "auto" } ]
                                }
                            ]
                        },
                        "streamSettings": {
                            "network": "ws",
                            "security": "tls",
                            "tlsSettings": { "serverName": "vmess.example.com" },
                            "wsSettings": { "path": "/ws" }
                        }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        assert!(report.warnings.is_empty());
        let outbound = &report.options.outbounds[0];
        let OutboundKind::Vmess(vmess) = &outbound.kind else {
            panic!("expected vmess outbound");
        };
        assert_eq!(vmess.server, "vmess.example.com");
        assert_eq!(vmess.server_port, 443);
        assert_eq!(vmess.uuid, "b831381d-6324-4d53-ad4f-8cda48b30811");
        // "auto" is outside the fixed security table and is omitted.
        assert_eq!(vmess.security, "");
        assert!(vmess.tls.as_ref().is_some_and(|tls| tls.enabled));
        assert!(matches!(vmess.transport, Some(Transport::Ws(_))));

        // The hostname must be routed through the local resolver.
        let dns = report.options.dns.expect("dns options");
        let hint_rule = dns.rules.last().expect("hint rule");
        assert_eq!(hint_rule.domain, ["vmess.example.com".to_string()]);
        assert_eq!(hint_rule.server, "local");
    }

    #[test]
    fn wireguard_outbound_is_unsupported_under_v2ray() {
        let report = migrate(
            br#"{
                "outbounds": [
                    { "tag": "wg", "protocol": "wireguard", "settings": {} }
                ]
            }"#,
        )
        .expect("migrate document");
        assert!(report.options.outbounds.iter().all(|outbound| outbound.tag != "wg"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("wireguard"));
    }

    #[test]
    fn one_bad_outbound_of_ten_leaves_nine_and_one_warning() {
        let mut outbounds = Vec::new();
        for index in 0..9 {
            outbounds.push(format!(
                r#"{{ "tag": "out-{index}", "protocol": "freedom" }}"#
            ));
        }
        outbounds.push(r#"{ "tag": "relay", "protocol": "loopback" }"#.to_string());
        let document = format!(r#"{{ "outbounds": [ {} ] }}"#, outbounds.join(", "));

        let report = migrate(document.as_bytes()).expect("migrate document");
        // Nine translated outbounds plus the synthesized direct for DNS.
        let translated = report
            .options
            .outbounds
            .iter()
            .filter(|outbound| outbound.tag.starts_with("out-"))
            .count();
        assert_eq!(translated, 9);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("relay"));
        assert!(report.warnings[0].contains("loopback"));
    }

    #[test]
    fn rules_keep_source_order() {
        let report = migrate(
            br#"{
                "routing": {
                    "rules": [
                        { "type": "field", "outboundTag": "first", "domain": ["full:a.example"] },
                        { "type": "field", "outboundTag": "second", "domain": ["full:b.example"] }
                    ]
                }
            }"#,
        )
        .expect("migrate document");
        let route = report.options.route.expect("route options");
        let outbounds: Vec<&str> = route.rules.iter().map(|rule| rule.outbound.as_str()).collect();
        assert_eq!(outbounds, ["first", "second"]);
    }
}
