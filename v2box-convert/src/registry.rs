//! Named migration strategies with deterministic auto-detection.
//!
//! The registry is an explicit value built once at startup and never mutated
//! afterward; tests construct isolated registries. `"auto"` tries strategies
//! in registration order, which [`Registry::with_defaults`] fixes as `v2ray`
//! first, then `xray`, so detection is deterministic run to run.

use box_format_core::Options;

use crate::error::MigrateError;
use crate::{v2ray, xray};

/// Strategy entry point: full document bytes to a best-effort report.
pub type MigrationFn = fn(&[u8]) -> Result<MigrationReport, MigrateError>;

/// Outcome of one migration run: the canonical document plus one warning per
/// dropped item.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub options: Options,
    pub warnings: Vec<String>,
}

struct Entry {
    name: String,
    version: String,
    run: MigrationFn,
}

pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry with the built-in strategies in their documented
    /// auto-detection order.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("v2ray", v2ray::VERSION, v2ray::migrate);
        registry.register("xray", xray::VERSION, xray::migrate);
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        run: MigrationFn,
    ) {
        self.entries.push(Entry {
            name: name.into(),
            version: version.into(),
            run,
        });
    }

    /// Run the named strategy, or each registered strategy in order for
    /// `"auto"`.
    ///
    /// Auto selection takes the first strategy whose top-level decode
    /// succeeds; per-item warnings inside a strategy never disqualify it.
    pub fn migrate(&self, schema: &str, content: &[u8]) -> Result<MigrationReport, MigrateError> {
        if schema == "auto" {
            for entry in &self.entries {
                if let Ok(report) = (entry.run)(content) {
                    return Ok(report);
                }
            }
            return Err(MigrateError::UndetectedSchema);
        }
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == schema)
            .ok_or_else(|| MigrateError::UnknownSchema(schema.to_string()))?;
        (entry.run)(content)
    }

    /// Version string of one schema; `"auto"` reports the first registered.
    pub fn version(&self, schema: &str) -> Option<&str> {
        if schema == "auto" {
            return self.entries.first().map(|entry| entry.version.as_str());
        }
        self.entries
            .iter()
            .find(|entry| entry.name == schema)
            .map(|entry| entry.version.as_str())
    }

    /// Registered `(name, version)` pairs in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.version.as_str()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(_: &[u8]) -> Result<MigrationReport, MigrateError> {
        Err(MigrateError::UndetectedSchema)
    }

    fn succeed(_: &[u8]) -> Result<MigrationReport, MigrateError> {
        Ok(MigrationReport::default())
    }

    #[test]
    fn explicit_unknown_schema_is_fatal() {
        let registry = Registry::with_defaults();
        let err = registry.migrate("surge", b"{}").expect_err("unknown schema");
        assert!(matches!(err, MigrateError::UnknownSchema(name) if name == "surge"));
    }

    #[test]
    fn auto_takes_the_first_strategy_that_decodes() {
        let mut registry = Registry::new();
        registry.register("first", "1", fail);
        registry.register("second", "2", succeed);
        assert!(registry.migrate("auto", b"{}").is_ok());
    }

    #[test]
    fn auto_fails_when_every_strategy_fails() {
        let mut registry = Registry::new();
        registry.register("first", "1", fail);
        registry.register("second", "2", fail);
        let err = registry.migrate("auto", b"{}").expect_err("undetected");
        assert!(matches!(err, MigrateError::UndetectedSchema));
    }

    #[test]
    fn default_registration_order_prefers_v2ray() {
        let registry = Registry::with_defaults();
        let names: Vec<&str> = registry.schemas().map(|(name, _)| name).collect();
        assert_eq!(names, ["v2ray", "xray"]);
        assert_eq!(registry.version("auto"), registry.version("v2ray"));
        assert_eq!(registry.version("surge"), None);
    }

    #[test]
    fn auto_detects_a_valid_document() {
        let registry = Registry::with_defaults();
        let report = registry
            .migrate("auto", br#"{ "outbounds": [ { "tag": "out", "protocol": "freedom" } ] }"#)
            .expect("auto migrate");
        assert!(report
            .options
            .outbounds
            .iter()
            .any(|outbound| outbound.tag == "out"));
    }
}
