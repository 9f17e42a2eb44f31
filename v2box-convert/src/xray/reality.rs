//! SNI-spoofing security block, only spelled by the xray schema.

use serde::Deserialize;
use serde_json::Value;

use box_format_core::{
    InboundRealityOptions, InboundTlsOptions, OutboundRealityOptions, OutboundTlsOptions,
    RealityHandshake, UtlsOptions,
};

use crate::listable::Listable;
use crate::translate::split_host_port;

/// `realitySettings` block; the inbound and outbound forms share one
/// spelling with disjoint field sets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealitySettings {
    pub dest: Option<Value>,
    pub server_names: Listable<String>,
    pub private_key: String,
    pub short_ids: Listable<String>,
    /// Accepted clock skew in milliseconds.
    pub max_time_diff: u64,
    pub server_name: String,
    pub public_key: String,
    pub short_id: String,
    pub fingerprint: String,
}

pub(super) fn inbound_reality(settings: &RealitySettings) -> InboundTlsOptions {
    let mut tls = InboundTlsOptions {
        enabled: true,
        ..Default::default()
    };
    if let Some(name) = settings.server_names.first() {
        tls.server_name = name.clone();
    }
    let mut reality = InboundRealityOptions {
        enabled: true,
        private_key: settings.private_key.clone(),
        short_id: settings.short_ids.to_vec(),
        ..Default::default()
    };
    if settings.max_time_diff > 0 {
        reality.max_time_difference = format!("{}ms", settings.max_time_diff);
    }
    match &settings.dest {
        Some(Value::String(destination)) => {
            let (server, server_port) = split_host_port(destination);
            reality.handshake = RealityHandshake {
                server,
                server_port,
            };
        }
        // A bare port means the handshake target runs on this host.
        Some(Value::Number(port)) => {
            if let Some(port) = port.as_u64() {
                reality.handshake = RealityHandshake {
                    server: "127.0.0.1".to_string(),
                    server_port: port as u16,
                };
            }
        }
        _ => {}
    }
    tls.reality = Some(reality);
    tls
}

pub(super) fn outbound_reality(settings: &RealitySettings) -> OutboundTlsOptions {
    OutboundTlsOptions {
        enabled: true,
        server_name: settings.server_name.clone(),
        utls: Some(UtlsOptions {
            enabled: true,
            fingerprint: settings.fingerprint.clone(),
        }),
        reality: Some(OutboundRealityOptions {
            enabled: true,
            public_key: settings.public_key.clone(),
            short_id: settings.short_id.clone(),
        }),
        ..Default::default()
    }
}
