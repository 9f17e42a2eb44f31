//! Routing-rule classification shared by both source schemas.
//!
//! Both schemas spell `"type": "field"` rules identically, so one raw type
//! and one classifier cover them. Domain and address literals dispatch on a
//! prefix tag; port specs are split into exact values and ranges here, at
//! classification time.

use serde::Deserialize;
use serde_json::Value;

use box_format_core::Rule;

use crate::error::ItemError;
use crate::listable::Listable;

/// Raw `"type": "field"` routing rule as spelled by both source schemas.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub balancer_tag: String,
    pub outbound_tag: String,
    pub domain: Listable<String>,
    pub domains: Listable<String>,
    pub ip: Listable<String>,
    pub source: Listable<String>,
    pub port: Option<PortValue>,
    pub source_port: Option<PortValue>,
    pub network: Listable<String>,
    pub user: Listable<String>,
    pub inbound_tag: Listable<String>,
    pub protocol: Listable<String>,
    pub attrs: Option<Value>,
}

/// Port spec: a bare number or a `"443,1000-2000"` style string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u32),
    Text(String),
}

/// Translate one raw routing rule into a canonical rule.
pub fn migrate_rule(raw: &Value) -> Result<Rule, ItemError> {
    let field: FieldRule = FieldRule::deserialize(raw).map_err(ItemError::InvalidRule)?;
    if !field.balancer_tag.is_empty() {
        return Err(ItemError::BalancerRule);
    }
    if field.rule_type != "field" {
        return Err(ItemError::UnknownRuleType(field.rule_type));
    }

    let mut rule = Rule {
        outbound: field.outbound_tag,
        ..Default::default()
    };
    for domain in field.domain.iter().chain(field.domains.iter()) {
        classify_domain(domain, &mut rule)?;
    }
    for address in field.ip.iter() {
        classify_address(address, false, &mut rule)?;
    }
    for address in field.source.iter() {
        classify_address(address, true, &mut rule)?;
    }
    if let Some(ports) = &field.port {
        let (exact, ranges) = classify_ports(ports)?;
        rule.port = exact;
        rule.port_range = ranges;
    }
    if let Some(ports) = &field.source_port {
        let (exact, ranges) = classify_ports(ports)?;
        rule.source_port = exact;
        rule.source_port_range = ranges;
    }
    rule.network = single_network(&field.network);
    rule.auth_user = field.user.into_vec();
    rule.inbound = field.inbound_tag.into_vec();
    rule.protocol = field.protocol.into_vec();
    if field.attrs.as_ref().is_some_and(attrs_present) {
        return Err(ItemError::AttributeRule);
    }
    Ok(rule)
}

/// Classify one domain literal into the matching rule axis.
pub fn classify_domain(domain: &str, rule: &mut Rule) -> Result<(), ItemError> {
    if domain.starts_with("ext:") || domain.starts_with("ext-domain:") {
        return Err(ItemError::ExternalGeosite);
    }
    if let Some(category) = domain.strip_prefix("geosite:") {
        rule.geosite.push(category.to_string());
    } else if let Some(pattern) = domain.strip_prefix("regexp:") {
        rule.domain_regex.push(pattern.to_string());
    } else if let Some(name) = domain.strip_prefix("domain:") {
        // Subdomain match: the name itself and every name beneath it.
        rule.domain.push(name.to_string());
        rule.domain_suffix.push(format!(".{name}"));
    } else if let Some(name) = domain.strip_prefix("full:") {
        rule.domain.push(name.to_string());
    } else if let Some(keyword) = domain.strip_prefix("keyword:") {
        rule.domain_keyword.push(keyword.to_string());
    } else if let Some(suffix) = domain.strip_prefix("dotless:") {
        if suffix.is_empty() {
            rule.domain_regex.push("^[^.]*$".to_string());
        } else {
            rule.domain_regex.push(format!("^[^.]*{suffix}[^.]*$"));
        }
    } else {
        // Bare values were substring matches in the legacy schemas.
        rule.domain_keyword.push(domain.to_string());
    }
    Ok(())
}

/// Classify one address literal into the matching rule axis.
pub fn classify_address(address: &str, is_source: bool, rule: &mut Rule) -> Result<(), ItemError> {
    if address.starts_with("ext:") || address.starts_with("ext-ip:") {
        return Err(ItemError::ExternalGeoip);
    }
    if address.starts_with("geoip:!") {
        return Err(ItemError::NegatedGeoip);
    }
    if let Some(category) = address.strip_prefix("geoip:") {
        if is_source {
            rule.source_geoip.push(category.to_string());
        } else {
            rule.geoip.push(category.to_string());
        }
    } else if is_source {
        rule.source_ip_cidr.push(address.to_string());
    } else {
        rule.ip_cidr.push(address.to_string());
    }
    Ok(())
}

/// Split a port spec into exact values and `"low:high"` ranges.
pub fn classify_ports(value: &PortValue) -> Result<(Vec<u16>, Vec<String>), ItemError> {
    let mut exact = Vec::new();
    let mut ranges = Vec::new();
    match value {
        PortValue::Number(number) => exact.push(parse_port(&number.to_string())?),
        PortValue::Text(text) => {
            for part in text.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                if let Some((low, high)) = part.split_once('-') {
                    let low = parse_port(low)?;
                    let high = parse_port(high)?;
                    if low > high {
                        return Err(ItemError::InvalidPort(part.to_string()));
                    }
                    if low == high {
                        exact.push(low);
                    } else {
                        ranges.push(format!("{low}:{high}"));
                    }
                } else {
                    exact.push(parse_port(part)?);
                }
            }
        }
    }
    Ok((exact, ranges))
}

fn parse_port(raw: &str) -> Result<u16, ItemError> {
    raw.trim()
        .parse()
        .map_err(|_| ItemError::InvalidPort(raw.to_string()))
}

/// Reduce a network list to the single canonical value, when exactly one of
/// tcp/udp survives filtering.
pub fn single_network(networks: &[String]) -> String {
    let mut filtered = networks
        .iter()
        .flat_map(|network| network.split(','))
        .map(str::trim)
        .filter(|network| *network == "tcp" || *network == "udp");
    match (filtered.next(), filtered.next()) {
        (Some(network), None) => network.to_string(),
        _ => String::new(),
    }
}

fn attrs_present(attrs: &Value) -> bool {
    match attrs {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(values) => !values.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_prefix_dual_inserts_exact_and_suffix() {
        let mut rule = Rule::default();
        classify_domain("domain:example.com", &mut rule).expect("classify");
        assert_eq!(rule.domain, ["example.com".to_string()]);
        assert_eq!(rule.domain_suffix, [".example.com".to_string()]);
    }

    #[test]
    fn full_prefix_inserts_exact_only() {
        let mut rule = Rule::default();
        classify_domain("full:example.com", &mut rule).expect("classify");
        assert_eq!(rule.domain, ["example.com".to_string()]);
        assert!(rule.domain_suffix.is_empty());
    }

    #[test]
    fn bare_domain_defaults_to_keyword() {
        let mut rule = Rule::default();
        classify_domain("sina.com", &mut rule).expect("classify");
        assert_eq!(rule.domain_keyword, ["sina.com".to_string()]);
    }

    #[test]
    fn dotless_synthesizes_anchored_regex() {
        let mut rule = Rule::default();
        classify_domain("dotless:", &mut rule).expect("classify");
        classify_domain("dotless:local", &mut rule).expect("classify");
        assert_eq!(
            rule.domain_regex,
            ["^[^.]*$".to_string(), "^[^.]*local[^.]*$".to_string()]
        );
    }

    #[test]
    fn external_references_fail() {
        let mut rule = Rule::default();
        assert!(matches!(
            classify_domain("ext:geosite.dat:cn", &mut rule),
            Err(ItemError::ExternalGeosite)
        ));
        assert!(matches!(
            classify_address("ext-ip:geoip.dat:cn", false, &mut rule),
            Err(ItemError::ExternalGeoip)
        ));
    }

    #[test]
    fn negated_geoip_always_fails() {
        for literal in ["geoip:!cn", "geoip:!us", "geoip:!private"] {
            let mut rule = Rule::default();
            assert!(matches!(
                classify_address(literal, false, &mut rule),
                Err(ItemError::NegatedGeoip)
            ));
        }
    }

    #[test]
    fn geoip_reference_lands_on_the_requested_side() {
        let mut rule = Rule::default();
        classify_address("geoip:cn", false, &mut rule).expect("classify");
        classify_address("geoip:us", true, &mut rule).expect("classify");
        classify_address("10.0.0.0/8", true, &mut rule).expect("classify");
        assert_eq!(rule.geoip, ["cn".to_string()]);
        assert_eq!(rule.source_geoip, ["us".to_string()]);
        assert_eq!(rule.source_ip_cidr, ["10.0.0.0/8".to_string()]);
    }

    #[test]
    fn port_specs_split_into_exact_and_ranges() {
        let (exact, ranges) =
            classify_ports(&PortValue::Text("443, 1000-2000, 53-53".to_string())).expect("ports");
        assert_eq!(exact, [443, 53]);
        assert_eq!(ranges, ["1000:2000".to_string()]);

        let (exact, ranges) = classify_ports(&PortValue::Number(8080)).expect("ports");
        assert_eq!(exact, [8080]);
        assert!(ranges.is_empty());

        assert!(matches!(
            classify_ports(&PortValue::Text("90000".to_string())),
            Err(ItemError::InvalidPort(_))
        ));
    }

    #[test]
    fn field_rule_with_attrs_fails() {
        let raw = json!({
            "type": "field",
            "outboundTag": "proxy",
            "domain": ["full:example.com"],
            "attrs": "attr.cn"
        });
        assert!(matches!(migrate_rule(&raw), Err(ItemError::AttributeRule)));
    }

    #[test]
    fn balancer_and_unknown_rule_types_fail() {
        let balancer = json!({ "type": "field", "balancerTag": "pool" });
        assert!(matches!(migrate_rule(&balancer), Err(ItemError::BalancerRule)));

        let chinaip = json!({ "type": "chinaip", "outboundTag": "direct" });
        assert!(matches!(
            migrate_rule(&chinaip),
            Err(ItemError::UnknownRuleType(kind)) if kind == "chinaip"
        ));
    }

    #[test]
    fn complete_field_rule_translates_every_axis() {
        let raw = json!({
            "type": "field",
            "outboundTag": "proxy",
            "domain": ["geosite:google", "regexp:\\.goo.*\\.com$"],
            "domains": ["keyword:sina"],
            "ip": ["geoip:cn", "8.8.8.8/32"],
            "source": ["192.168.0.0/16"],
            "port": "443,1000-2000",
            "sourcePort": 5353,
            "network": "tcp",
            "user": ["user@example.com"],
            "inboundTag": ["socks-in"],
            "protocol": ["tls"]
        });
        let rule = migrate_rule(&raw).expect("translate rule");
        assert_eq!(rule.outbound, "proxy");
        assert_eq!(rule.geosite, ["google".to_string()]);
        assert_eq!(rule.domain_regex, ["\\.goo.*\\.com$".to_string()]);
        assert_eq!(rule.domain_keyword, ["sina".to_string()]);
        assert_eq!(rule.geoip, ["cn".to_string()]);
        assert_eq!(rule.ip_cidr, ["8.8.8.8/32".to_string()]);
        assert_eq!(rule.source_ip_cidr, ["192.168.0.0/16".to_string()]);
        assert_eq!(rule.port, [443]);
        assert_eq!(rule.port_range, ["1000:2000".to_string()]);
        assert_eq!(rule.source_port, [5353]);
        assert_eq!(rule.network, "tcp");
        assert_eq!(rule.auth_user, ["user@example.com".to_string()]);
        assert_eq!(rule.inbound, ["socks-in".to_string()]);
        assert_eq!(rule.protocol, ["tls".to_string()]);
    }
}
