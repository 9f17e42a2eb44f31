use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn run_success(args: &[&str]) -> (String, String) {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("v2box-convert"))
        .args(args)
        .output()
        .expect("command output");
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn migrate_auto_emits_canonical_document_on_stdout() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{
            // client listener
            "inbounds": [
                { "tag": "socks-in", "listen": "127.0.0.1", "port": 1080, "protocol": "socks" }
            ],
            "outbounds": [
                {
                    "tag": "proxy",
                    "protocol": "trojan",
                    "settings": {
                        "servers": [ { "address": "trojan.example.com", "port": 443, "password": "hunter2" } ]
                    },
                    "streamSettings": { "network": "tcp", "security": "tls" }
                }
            ]
        }"#,
    )
    .expect("write config");

    let (stdout, stderr) = run_success(&["migrate", config.to_str().expect("utf8 path")]);
    assert!(stderr.is_empty(), "unexpected warnings: {stderr}");

    let document: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    assert_eq!(document["inbounds"][0]["type"], "socks");
    assert_eq!(document["inbounds"][0]["tag"], "socks-in");
    assert_eq!(document["outbounds"][0]["type"], "trojan");
    assert_eq!(document["outbounds"][0]["server"], "trojan.example.com");
    assert_eq!(document["outbounds"][0]["server_port"], 443);
    // The trojan hostname must be routed through the local resolver.
    assert_eq!(document["dns"]["rules"][0]["domain"][0], "trojan.example.com");
}

#[test]
fn migrate_warns_and_continues_on_unsupported_items() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{
            "outbounds": [
                { "tag": "good", "protocol": "freedom" },
                { "tag": "relay", "protocol": "loopback" }
            ]
        }"#,
    )
    .expect("write config");

    let (stdout, stderr) = run_success(&[
        "migrate",
        config.to_str().expect("utf8 path"),
        "--schema",
        "v2ray",
    ]);
    assert!(stderr.contains("warning:"), "{stderr}");
    assert!(stderr.contains("relay"), "{stderr}");
    let document: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    let tags: Vec<&str> = document["outbounds"]
        .as_array()
        .expect("outbounds array")
        .iter()
        .filter_map(|outbound| outbound["tag"].as_str())
        .collect();
    assert!(tags.contains(&"good"));
    assert!(!tags.contains(&"relay"));
}

#[test]
fn migrate_with_unknown_schema_name_fails() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").expect("write config");

    Command::new(assert_cmd::cargo::cargo_bin!("v2box-convert"))
        .args(["migrate", config.to_str().expect("utf8 path"), "--schema", "v2ray"])
        .assert()
        .success();

    // clap rejects values outside the schema enum before the registry runs.
    Command::new(assert_cmd::cargo::cargo_bin!("v2box-convert"))
        .args(["migrate", config.to_str().expect("utf8 path"), "--schema", "surge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("surge"));
}

#[test]
fn migrate_undetectable_document_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    fs::write(&config, "not json at all").expect("write config");

    Command::new(assert_cmd::cargo::cargo_bin!("v2box-convert"))
        .args(["migrate", config.to_str().expect("utf8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to detect configuration schema"));
}

#[test]
fn migrate_writes_output_file_when_requested() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    let output = dir.path().join("out.json");
    fs::write(
        &config,
        r#"{ "inbounds": [ { "tag": "http-in", "listen": "0.0.0.0", "port": 8080, "protocol": "http" } ] }"#,
    )
    .expect("write config");

    run_success(&[
        "migrate",
        config.to_str().expect("utf8 path"),
        "-o",
        output.to_str().expect("utf8 path"),
    ]);
    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).expect("read output"))
            .expect("output is JSON");
    assert_eq!(document["inbounds"][0]["type"], "http");
}

#[test]
fn version_lists_schemas_in_detection_order() {
    let (stdout, _) = run_success(&["version"]);
    let v2ray_at = stdout.find("v2ray:").expect("v2ray line");
    let xray_at = stdout.find("xray:").expect("xray line");
    assert!(v2ray_at < xray_at, "{stdout}");
}
