//! Stream-settings mapping: transport payloads and TLS blocks.
//!
//! The transport payload blocks are spelled identically in both source
//! schemas, so the structs and the mapper live here once; each schema module
//! layers its own socket options and security extensions on top.

use std::collections::BTreeMap;

use serde::Deserialize;

use box_format_core::{
    GrpcTransport, HttpTransport, InboundTlsOptions, OutboundTlsOptions, QuicTransport, Transport,
    UtlsOptions, WsTransport,
};

use crate::error::ItemError;
use crate::listable::Listable;

/// Transport payload blocks of a `streamSettings` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportSettings {
    pub tcp_settings: Option<TcpSettings>,
    pub http_settings: Option<HttpSettings>,
    pub ws_settings: Option<WsSettings>,
    pub grpc_settings: Option<GrpcSettings>,
    pub gun_settings: Option<GrpcSettings>,
    pub quic_settings: Option<QuicSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TcpSettings {
    pub header: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    pub host: Listable<String>,
    pub path: String,
    pub method: String,
    pub headers: BTreeMap<String, Listable<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WsSettings {
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub max_early_data: u32,
    pub early_data_header_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrpcSettings {
    pub service_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuicSettings {}

/// `tlsSettings` block. Both schemas share the spelling; `fingerprint` only
/// ever appears in xray documents and `allowInsecure` only matters for
/// dialers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsSettings {
    pub server_name: String,
    pub alpn: Listable<String>,
    pub certificates: Vec<CertificateObject>,
    pub allow_insecure: bool,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateObject {
    pub usage: String,
    pub certificate_file: String,
    pub key_file: String,
    pub certificate: Listable<String>,
    pub key: Listable<String>,
}

/// Map the declared network name to a canonical transport record.
///
/// No network means bare TCP, which is also what plain `tcp` maps to as long
/// as no header obfuscation is configured.
pub fn map_transport(
    network: Option<&str>,
    settings: &TransportSettings,
) -> Result<Option<Transport>, ItemError> {
    let Some(network) = network else {
        return Ok(None);
    };
    match network {
        "tcp" => {
            if settings
                .tcp_settings
                .as_ref()
                .is_some_and(|tcp| tcp.header.is_some())
            {
                return Err(ItemError::TcpHeaderObfuscation);
            }
            Ok(None)
        }
        "http" => {
            let mut transport = HttpTransport::default();
            if let Some(http) = &settings.http_settings {
                transport.host = http.host.to_vec();
                transport.path = http.path.clone();
                transport.method = http.method.clone();
                for (key, values) in &http.headers {
                    if let Some(value) = values.first() {
                        transport.headers.insert(key.clone(), value.clone());
                    }
                }
            }
            Ok(Some(Transport::Http(transport)))
        }
        "ws" => {
            let mut transport = WsTransport::default();
            if let Some(ws) = &settings.ws_settings {
                transport.path = ws.path.clone();
                transport.headers = ws.headers.clone();
                transport.max_early_data = ws.max_early_data;
                transport.early_data_header_name = ws.early_data_header_name.clone();
            }
            Ok(Some(Transport::Ws(transport)))
        }
        "grpc" | "gun" => {
            let mut transport = GrpcTransport::default();
            if let Some(grpc) = settings
                .grpc_settings
                .as_ref()
                .or(settings.gun_settings.as_ref())
            {
                transport.service_name = grpc.service_name.clone();
            }
            Ok(Some(Transport::Grpc(transport)))
        }
        "quic" => Ok(Some(Transport::Quic(QuicTransport::default()))),
        other => Err(ItemError::UnsupportedTransport(other.to_string())),
    }
}

/// Listener-side TLS record from a `tlsSettings` block.
pub fn inbound_tls(settings: &TlsSettings) -> InboundTlsOptions {
    let mut tls = InboundTlsOptions {
        enabled: true,
        server_name: settings.server_name.clone(),
        ..Default::default()
    };
    for cert in &settings.certificates {
        // Only serving certificates; verification/issue-only entries are
        // skipped.
        if !cert.usage.is_empty() && cert.usage != "encipherment" {
            continue;
        }
        if !cert.certificate.is_empty() {
            tls.certificate = cert.certificate.join("\n");
        }
        if !cert.key.is_empty() {
            tls.key = cert.key.join("\n");
        }
        tls.certificate_path = cert.certificate_file.clone();
        tls.key_path = cert.key_file.clone();
    }
    if !settings.alpn.is_empty() {
        tls.alpn = settings.alpn.to_vec();
    }
    tls
}

/// Dialer-side TLS record from a `tlsSettings` block.
pub fn outbound_tls(settings: &TlsSettings) -> OutboundTlsOptions {
    let mut tls = OutboundTlsOptions {
        enabled: true,
        insecure: settings.allow_insecure,
        server_name: settings.server_name.clone(),
        ..Default::default()
    };
    for cert in &settings.certificates {
        if !cert.usage.is_empty() && cert.usage != "encipherment" {
            continue;
        }
        if !cert.certificate.is_empty() {
            tls.certificate = cert.certificate.join("\n");
        }
        tls.certificate_path = cert.certificate_file.clone();
    }
    if !settings.alpn.is_empty() {
        tls.alpn = settings.alpn.to_vec();
    }
    if !settings.fingerprint.is_empty() {
        tls.utls = Some(UtlsOptions {
            enabled: true,
            fingerprint: settings.fingerprint.clone(),
        });
    }
    tls
}

pub(crate) fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_network_means_bare_tcp() {
        let transport =
            map_transport(None, &TransportSettings::default()).expect("map transport");
        assert_eq!(transport, None);
    }

    #[test]
    fn tcp_with_header_config_is_rejected() {
        let settings: TransportSettings = serde_json::from_str(
            r#"{ "tcpSettings": { "header": { "type": "http" } } }"#,
        )
        .expect("decode settings");
        assert!(matches!(
            map_transport(Some("tcp"), &settings),
            Err(ItemError::TcpHeaderObfuscation)
        ));
    }

    #[test]
    fn gun_is_an_alias_for_grpc() {
        let settings: TransportSettings =
            serde_json::from_str(r#"{ "gunSettings": { "serviceName": "tunnel" } }"#)
                .expect("decode settings");
        let transport = map_transport(Some("gun"), &settings).expect("map transport");
        assert_eq!(
            transport,
            Some(Transport::Grpc(GrpcTransport {
                service_name: "tunnel".to_string(),
            }))
        );
    }

    #[test]
    fn multi_value_http_headers_keep_the_first_value() {
        let settings: TransportSettings = serde_json::from_str(
            r#"{ "httpSettings": { "path": "/h2", "headers": { "X-Pad": ["a", "b"] } } }"#,
        )
        .expect("decode settings");
        let Some(Transport::Http(http)) =
            map_transport(Some("http"), &settings).expect("map transport")
        else {
            panic!("expected http transport");
        };
        assert_eq!(http.path, "/h2");
        assert_eq!(http.headers.get("X-Pad").map(String::as_str), Some("a"));
    }

    #[test]
    fn unknown_network_names_are_rejected() {
        let err = map_transport(Some("kcp"), &TransportSettings::default())
            .expect_err("kcp is unsupported");
        assert!(matches!(err, ItemError::UnsupportedTransport(name) if name == "kcp"));
    }

    #[test]
    fn certificate_usage_filter_skips_non_serving_entries() {
        let settings: TlsSettings = serde_json::from_str(
            r#"{
                "serverName": "proxy.example.com",
                "alpn": ["h2", "http/1.1"],
                "certificates": [
                    { "usage": "verify", "certificate": ["IGNORED"] },
                    { "certificate": ["LINE1", "LINE2"], "key": ["KEY1"], "certificateFile": "/etc/cert.pem", "keyFile": "/etc/key.pem" }
                ]
            }"#,
        )
        .expect("decode settings");
        let tls = inbound_tls(&settings);
        assert!(tls.enabled);
        assert_eq!(tls.server_name, "proxy.example.com");
        assert_eq!(tls.certificate, "LINE1\nLINE2");
        assert_eq!(tls.key, "KEY1");
        assert_eq!(tls.certificate_path, "/etc/cert.pem");
        assert_eq!(tls.key_path, "/etc/key.pem");
        assert_eq!(tls.alpn, ["h2".to_string(), "http/1.1".to_string()]);
    }

    #[test]
    fn outbound_tls_carries_insecure_and_fingerprint() {
        let settings: TlsSettings = serde_json::from_str(
            r#"{ "allowInsecure": true, "fingerprint": "chrome" }"#,
        )
        .expect("decode settings");
        let tls = outbound_tls(&settings);
        assert!(tls.insecure);
        assert_eq!(
            tls.utls,
            Some(UtlsOptions {
                enabled: true,
                fingerprint: "chrome".to_string(),
            })
        );
    }
}
