//! Geo resource compilation: legacy protobuf lists into the runtime binary
//! databases.
//!
//! Both compilers are total over well-formed input; a single malformed entry
//! is a fatal decode error, since the binary outputs require internal
//! consistency. There is no item-recoverable tier here.

pub mod proto;

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use prost::Message;

use box_format_core::geosite::{Item, RuleKind};
use box_format_core::GeoIpWriter;

use crate::error::GeoError;

/// Counts reported after a geoip compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoIpSummary {
    pub categories: usize,
    pub networks: usize,
}

/// Counts reported after a geosite compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeositeSummary {
    pub categories: usize,
    pub entries: usize,
}

/// Compile a legacy per-country IP range list into the trie database.
pub fn compile_geoip(input: &[u8], output: &mut impl Write) -> Result<GeoIpSummary, GeoError> {
    let list = proto::GeoIpList::decode(input)?;
    let mut writer = GeoIpWriter::new();
    let mut summary = GeoIpSummary {
        categories: list.entry.len(),
        networks: 0,
    };
    for entry in &list.entry {
        for cidr in &entry.cidr {
            let address = decode_address(&cidr.ip)?;
            writer.insert(address, cidr.prefix as u8, &entry.country_code)?;
            summary.networks += 1;
        }
    }
    writer.write_to(output)?;
    Ok(summary)
}

/// Compile a legacy per-category domain list into the indexed database.
///
/// Attribute-tagged entries are additionally inserted into synthetic
/// `<code>@<attribute>` categories, and every category list is deduplicated
/// before writing.
pub fn compile_geosite(input: &[u8], output: &mut impl Write) -> Result<GeositeSummary, GeoError> {
    let list = proto::GeoSiteList::decode(input)?;
    let mut categories: BTreeMap<String, Vec<Item>> = BTreeMap::new();
    for entry in &list.entry {
        let code = entry.country_code.to_lowercase();
        let mut items = Vec::with_capacity(entry.domain.len() * 2);
        let mut attributes: BTreeMap<&str, Vec<&proto::Domain>> = BTreeMap::new();
        for domain in &entry.domain {
            for attribute in &domain.attribute {
                attributes
                    .entry(attribute.key.as_str())
                    .or_default()
                    .push(domain);
            }
            classify_entry(domain, &mut items);
        }
        categories.insert(code.clone(), dedup(items));
        for (attribute, domains) in attributes {
            let mut scoped = Vec::with_capacity(domains.len() * 2);
            for domain in domains {
                classify_entry(domain, &mut scoped);
            }
            categories.insert(format!("{code}@{attribute}"), dedup(scoped));
        }
    }
    let summary = GeositeSummary {
        categories: categories.len(),
        entries: categories.values().map(Vec::len).sum(),
    };
    box_format_core::geosite::write(output, &categories)?;
    Ok(summary)
}

/// Fixed classification of one legacy domain entry into matcher items.
fn classify_entry(domain: &proto::Domain, items: &mut Vec<Item>) {
    match proto::domain::Type::try_from(domain.r#type) {
        Ok(proto::domain::Type::Plain) => items.push(Item {
            kind: RuleKind::DomainKeyword,
            value: domain.value.clone(),
        }),
        Ok(proto::domain::Type::Regex) => items.push(Item {
            kind: RuleKind::DomainRegex,
            value: domain.value.clone(),
        }),
        Ok(proto::domain::Type::RootDomain) => {
            // Dotless root entries (bare TLDs) only make sense as suffixes.
            if domain.value.contains('.') {
                items.push(Item {
                    kind: RuleKind::Domain,
                    value: domain.value.clone(),
                });
            }
            items.push(Item {
                kind: RuleKind::DomainSuffix,
                value: format!(".{}", domain.value),
            });
        }
        Ok(proto::domain::Type::Full) => items.push(Item {
            kind: RuleKind::Domain,
            value: domain.value.clone(),
        }),
        // Unknown entry kinds are skipped, matching the legacy reader.
        Err(_) => {}
    }
}

fn dedup(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn decode_address(bytes: &[u8]) -> Result<IpAddr, GeoError> {
    match bytes.len() {
        4 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(bytes);
            Ok(IpAddr::V4(Ipv4Addr::from(raw)))
        }
        16 => {
            let mut raw = [0u8; 16];
            raw.copy_from_slice(bytes);
            Ok(IpAddr::V6(Ipv6Addr::from(raw)))
        }
        other => Err(GeoError::InvalidCidr(other)),
    }
}
