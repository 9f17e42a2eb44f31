use box_format_core::{Inbound, Listen};

use crate::error::ItemError;
use crate::settings::{self, Schema};
use crate::stream::{self, non_empty};
use crate::translate;

use super::schema::InboundConfig;

pub(super) fn migrate_inbound(config: &InboundConfig) -> Result<Inbound, ItemError> {
    let mut listen = Listen {
        listen: config.listen.clone(),
        ..Default::default()
    };
    if let Some(port) = &config.port {
        listen.listen_port = port.first_port();
    }

    let mut tls = None;
    let mut transport = None;
    let mut tproxy = None;

    if let Some(stream_settings) = &config.stream_settings {
        if let Some(sockopt) = &stream_settings.sockopt {
            if let Some(fast_open) = sockopt.tcp_fast_open {
                listen.tcp_fast_open = fast_open;
            }
            if !sockopt.tproxy.is_empty() {
                tproxy = Some(sockopt.tproxy.as_str());
            }
            if sockopt.accept_proxy_protocol {
                listen.proxy_protocol = true;
                listen.proxy_protocol_accept_no_header = true;
            }
        }
        transport = stream::map_transport(
            non_empty(&stream_settings.network),
            &stream_settings.transport,
        )?;
        if stream_settings.security == "tls" {
            let tls_settings = stream_settings.tls_settings.clone().unwrap_or_default();
            tls = Some(stream::inbound_tls(&tls_settings));
        }
    }

    let payload = settings::load_inbound(&config.protocol, config.settings.as_deref(), Schema::V2ray)?;
    Ok(translate::build_inbound(
        config.tag.clone(),
        listen,
        tls,
        transport,
        tproxy,
        payload,
    ))
}
