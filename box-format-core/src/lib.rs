//! Format primitives for sing-box style tooling: the canonical options
//! document plus the two binary geo databases consumed by rule matching at
//! proxy runtime.

pub mod geoip;
pub mod geosite;
pub mod inbound;
pub mod options;
pub mod outbound;
pub mod rule;
pub mod shared;
pub mod tls;
pub mod transport;

pub use geoip::{GeoIpDatabase, GeoIpError, GeoIpWriter};
pub use geosite::{GeositeDatabase, GeositeError};
pub use inbound::{
    DirectInbound, HttpInbound, Inbound, InboundKind, RedirectInbound, ShadowsocksInbound,
    SocksInbound, TproxyInbound, TrojanInbound, VlessInbound, VmessInbound,
};
pub use options::{write_file, Options, WriteError};
pub use outbound::{
    BlockOutbound, DirectOutbound, DnsOutbound, HttpOutbound, Outbound, OutboundKind,
    ShadowsocksOutbound, SocksOutbound, TrojanOutbound, VlessOutbound, VmessOutbound,
    WireguardOutbound,
};
pub use rule::{DnsOptions, DnsRule, DnsServer, RouteOptions, Rule};
pub use shared::{AuthUser, Dial, DomainStrategy, Listen, ShadowsocksUser, TrojanUser, VlessUser, VmessUser};
pub use tls::{
    InboundRealityOptions, InboundTlsOptions, OutboundRealityOptions, OutboundTlsOptions,
    RealityHandshake, UtlsOptions,
};
pub use transport::{GrpcTransport, HttpTransport, QuicTransport, Transport, WsTransport};
