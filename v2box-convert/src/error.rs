//! Error taxonomy: document-fatal migration errors, item-recoverable
//! translation errors, and geo compilation errors.

use thiserror::Error;

/// Fatal, whole-document failures. No partial output is produced when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("unknown configuration schema: {0}")]
    UnknownSchema(String),
    #[error("failed to detect configuration schema")]
    UndetectedSchema,
    #[error("failed to decode configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Recoverable, single-item failures: the offending inbound/outbound/rule is
/// dropped with a warning naming the construct, and the rest of the document
/// is still translated.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("unsupported inbound protocol: {0}")]
    UnsupportedInbound(String),
    #[error("unsupported outbound protocol: {0}")]
    UnsupportedOutbound(String),
    #[error("loopback is not supported, rewrite the config with a detour reference instead")]
    LoopbackOutbound,
    #[error("invalid {protocol} settings: {source}")]
    InvalidSettings {
        protocol: String,
        source: serde_json::Error,
    },
    #[error("unsupported transport type: {0}")]
    UnsupportedTransport(String),
    #[error("TCP transport with header obfuscation is not supported")]
    TcpHeaderObfuscation,
    #[error("invalid rule: {0}")]
    InvalidRule(serde_json::Error),
    #[error("balancer rule is not supported")]
    BalancerRule,
    #[error("unknown router rule type: {0}")]
    UnknownRuleType(String),
    #[error("attribute-filtered rule is not supported")]
    AttributeRule,
    #[error("loading external geosite files is not supported")]
    ExternalGeosite,
    #[error("loading external geoip files is not supported")]
    ExternalGeoip,
    #[error("negated geoip match is not supported, rewrite the rule with rule.invert")]
    NegatedGeoip,
    #[error("invalid port value: {0}")]
    InvalidPort(String),
}

/// Geo resource compilation failures; always fatal for the whole file, since
/// the binary output formats require internal consistency.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to decode geo resource: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("invalid CIDR address of {0} bytes")]
    InvalidCidr(usize),
    #[error(transparent)]
    GeoIp(#[from] box_format_core::GeoIpError),
    #[error(transparent)]
    Geosite(#[from] box_format_core::GeositeError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
