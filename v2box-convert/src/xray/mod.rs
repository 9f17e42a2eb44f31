//! Migration strategy for the xray JSON schema.

mod inbound;
mod outbound;
mod reality;
pub mod schema;

use box_format_core::{DnsRule, RouteOptions};

use crate::error::MigrateError;
use crate::registry::MigrationReport;
use crate::translate::{item_label, DnsHints};
use crate::{classify, decode, dns};

/// Version label reported for this strategy.
pub const VERSION: &str = "xtls/xray-core configuration format";

/// Translate one complete xray document, dropping untranslatable items with
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
    use box_format_core::{InboundKind, OutboundKind};

    #[test]
    fn vless_inbound_with_reality_keeps_handshake_material() {
        let report = migrate(
            br#"{
                "inbounds": [
                    {
                        "tag": "vless-in",
                        "listen": "0.0.0.0",
                        "port": 443,
                        "protocol": "vless",
                        "settings": {
                            "clients": [ { "id": "uuid-1", "flow": "xtls-rprx-vision" } ]
                        },
                        "streamSettings": {
                            "network": "tcp",
                            "security": "reality",
                            "realitySettings": {
                                "dest": "www.example.com:443",
                                "serverNames": ["www.example.com"],
                                "privateKey": "PRIVATE",
                                "shortIds": ["01ab"],
                                "maxTimeDiff": 60000
                            }
                        }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        assert!(report.warnings.is_empty());
        let InboundKind::Vless(vless) = &report.options.inbounds[0].kind else {
            panic!("expected vless inbound");
        };
        assert_eq!(vless.users[0].flow, "xtls-rprx-vision");
        let tls = vless.tls.as_ref().expect("tls options");
        let reality = tls.reality.as_ref().expect("reality options");
        assert_eq!(reality.handshake.server, "www.example.com");
        assert_eq!(reality.max_time_difference, "60000ms");
    }

    #[test]
    fn wireguard_outbound_translates_first_peer() {
        let report = migrate(
            br#"{
                "outbounds": [
                    {
                        "tag": "wg",
                        "protocol": "wireguard",
                        "settings": {
                            "secretKey": "SECRET",
                            "address": ["10.14.0.2", "fd00::2/128"],
                            "peers": [
                                {
                                    "endpoint": "wg.example.com:51820",
                                    "publicKey": "PUBLIC",
                                    "preSharedKey": "PSK"
                                }
                            ],
                            "mtu": 1420,
                            "reserved": [1, 2, 3]
                        }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        assert!(report.warnings.is_empty());
        let OutboundKind::Wireguard(wireguard) = &report.options.outbounds[0].kind else {
            panic!("expected wireguard outbound");
        };
        assert_eq!(wireguard.server, "wg.example.com");
        assert_eq!(wireguard.server_port, 51820);
        assert_eq!(wireguard.private_key, "SECRET");
        assert_eq!(wireguard.peer_public_key, "PUBLIC");
        assert_eq!(wireguard.pre_shared_key, "PSK");
        assert_eq!(
            wireguard.local_address,
            ["10.14.0.2/32".to_string(), "fd00::2/128".to_string()]
        );
        assert_eq!(wireguard.mtu, 1420);
        assert_eq!(wireguard.reserved, [1, 2, 3]);
    }

    #[test]
    fn shadowsocks_2022_multi_user_keeps_user_list() {
        let report = migrate(
            br#"{
                "inbounds": [
                    {
                        "tag": "ss-in",
                        "listen": "0.0.0.0",
                        "port": "8388",
                        "protocol": "shadowsocks",
                        "settings": {
                            "method": "2022-blake3-aes-128-gcm",
                            "password": "SERVERKEY",
                            "clients": [
                                { "email": "alice", "password": "ALICEKEY" },
                                { "email": "bob", "password": "BOBKEY" }
                            ]
                        }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        let InboundKind::Shadowsocks(shadowsocks) = &report.options.inbounds[0].kind else {
            panic!("expected shadowsocks inbound");
        };
        assert_eq!(shadowsocks.listen.listen_port, 8388);
        assert_eq!(shadowsocks.method, "2022-blake3-aes-128-gcm");
        assert_eq!(shadowsocks.password, "SERVERKEY");
        assert_eq!(shadowsocks.users.len(), 2);
        assert_eq!(shadowsocks.users[0].name, "alice");
    }

    #[test]
    fn numeric_tfo_queue_length_enables_fast_open() {
        let report = migrate(
            br#"{
                "outbounds": [
                    {
                        "tag": "out",
                        "protocol": "freedom",
                        "streamSettings": { "sockopt": { "tcpFastOpen": 256, "mark": 255, "interface": "eth0" } }
                    }
                ]
            }"#,
        )
        .expect("migrate document");
        let OutboundKind::Direct(direct) = &report.options.outbounds[0].kind else {
            panic!("expected direct outbound");
        };
        assert!(direct.dial.tcp_fast_open);
        assert_eq!(direct.dial.routing_mark, 255);
        assert_eq!(direct.dial.bind_interface, "eth0");
    }
}
