use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};

use box_format_core::geosite::{self, Item, RuleKind};
use box_format_core::{GeoIpDatabase, GeoIpWriter, GeositeDatabase};
use tempfile::tempdir;

#[test]
fn geoip_database_survives_a_file_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("geoip.db");

    let mut writer = GeoIpWriter::new();
    writer
        .insert(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8, "A")
        .expect("insert /8");
    writer
        .insert(IpAddr::V4(Ipv4Addr::new(10, 1, 0, 0)), 16, "B")
        .expect("insert /16");
    let mut blob = Vec::new();
    writer.write_to(&mut blob).expect("serialize database");
    fs::write(&path, &blob).expect("write database file");

    let bytes = fs::read(&path).expect("read database file");
    let db = GeoIpDatabase::from_bytes(&bytes).expect("parse database");
    assert_eq!(db.lookup(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))), Some("B"));
    assert_eq!(db.lookup(IpAddr::V4(Ipv4Addr::new(10, 2, 0, 0))), Some("A"));
}

#[test]
fn geoip_rejects_truncated_input() {
    let mut writer = GeoIpWriter::new();
    writer
        .insert(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8, "A")
        .expect("insert");
    let mut blob = Vec::new();
    writer.write_to(&mut blob).expect("serialize database");
    blob.truncate(blob.len() - 1);
    assert!(GeoIpDatabase::from_bytes(&blob).is_err());
}

#[test]
fn geosite_category_lookup_is_isolated_per_code() {
    let mut categories = BTreeMap::new();
    categories.insert(
        "google".to_string(),
        vec![
            Item {
                kind: RuleKind::Domain,
                value: "google.com".to_string(),
            },
            Item {
                kind: RuleKind::DomainSuffix,
                value: ".google.com".to_string(),
            },
        ],
    );
    categories.insert(
        "google@ads".to_string(),
        vec![Item {
            kind: RuleKind::DomainKeyword,
            value: "doubleclick".to_string(),
        }],
    );

    let mut blob = Vec::new();
    geosite::write(&mut blob, &categories).expect("write database");
    let db = GeositeDatabase::from_bytes(&blob).expect("parse database");

    assert_eq!(db.len(), 2);
    let base = db.read_category("google").expect("read base").expect("present");
    assert_eq!(base.len(), 2);
    let scoped = db
        .read_category("google@ads")
        .expect("read scoped")
        .expect("present");
    assert_eq!(scoped[0].value, "doubleclick");
    assert_eq!(db.read_category("google@tracking").expect("read missing"), None);
}
