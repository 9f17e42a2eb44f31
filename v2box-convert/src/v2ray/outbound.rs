use box_format_core::{Dial, Outbound};

use crate::error::ItemError;
use crate::settings::{self, Schema};
use crate::stream::{self, non_empty};
use crate::translate::{self, DnsHints};

use super::schema::OutboundConfig;

pub(super) fn migrate_outbound(
    config: &OutboundConfig,
    hints: &mut DnsHints,
) -> Result<Outbound, ItemError> {
    let mut dial = Dial::default();
    let mut tls = None;
    let mut transport = None;

    if let Some(stream_settings) = &config.stream_settings {
        if let Some(sockopt) = &stream_settings.sockopt {
            if sockopt.mark > 0 {
                dial.routing_mark = sockopt.mark as u32;
            }
            if let Some(fast_open) = sockopt.tcp_fast_open {
                dial.tcp_fast_open = fast_open;
            }
            dial.bind_interface = sockopt.bind_to_device.clone();
        }
        transport = stream::map_transport(
            non_empty(&stream_settings.network),
            &stream_settings.transport,
        )?;
        if stream_settings.security == "tls" {
            let tls_settings = stream_settings.tls_settings.clone().unwrap_or_default();
            tls = Some(stream::outbound_tls(&tls_settings));
        }
    }

    let payload =
        settings::load_outbound(&config.protocol, config.settings.as_deref(), Schema::V2ray)?;
    Ok(translate::build_outbound(
        config.tag.clone(),
        dial,
        tls,
        transport,
        payload,
        hints,
    ))
}
