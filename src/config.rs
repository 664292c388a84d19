//! Layered host configuration.
//!
//! Values come from a list of [`ConfigSource`]s queried in priority order:
//! environment variables first, then an optional JSON file, then the defaults
//! baked into [`HostConfig::load`].

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{DiError, DiResult};

/// Prefix for the environment variables read by [`ConfigProvider::for_host`].
pub const ENV_PREFIX: &str = "LIFETIMES";

/// A configuration value that can be various types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<ConfigValue>),
    Object(HashMap<String, ConfigValue>),
    /// JSON `null`; treated as unset
    Null,
}

impl ConfigValue {
    /// Parses a raw environment value, trying integer, float and bool before
    /// falling back to a string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            ConfigValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            ConfigValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            ConfigValue::Boolean(bool_val)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    pub fn as_string(&self) -> DiResult<&str> {
        match self {
            ConfigValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("Config value is not a string")),
        }
    }

    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ConfigValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("Config value is not an integer")),
        }
    }

    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ConfigValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("Config value is not a boolean")),
        }
    }
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Get a configuration value by dotted key, e.g. `host.bind`
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// List all available keys
    fn keys(&self) -> Vec<String>;
}

/// Environment variable configuration source.
///
/// A key maps to an upper-case variable name with `.` replaced by `_`, so
/// `host.bind` under the prefix `LIFETIMES` reads `LIFETIMES_HOST_BIND`.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn var_name(&self, key: &str) -> String {
        let key = key.replace('.', "_").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key),
            None => key,
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        env::var(self.var_name(key))
            .ok()
            .map(|value| ConfigValue::parse(&value))
    }

    fn keys(&self) -> Vec<String> {
        env::vars()
            .filter_map(|(key, _)| match &self.prefix {
                Some(prefix) => {
                    let prefix = format!("{}_", prefix.to_uppercase());
                    key.strip_prefix(&prefix).map(str::to_lowercase)
                }
                None => Some(key.to_lowercase()),
            })
            .collect()
    }
}

/// JSON file configuration source.
///
/// The file holds one JSON object. Nested objects are flattened into dotted
/// keys, so `{"host": {"bind": "0.0.0.0:80"}}` and `{"host.bind": "0.0.0.0:80"}`
/// are equivalent. When both spell the same key, the one with fewer nesting
/// levels wins (`"host.bind"` beats `{"host": {"bind": ..}}`). `null` values
/// are skipped. The file is read on first access; call
/// [`reload`](Self::reload) to surface read or parse errors eagerly.
#[derive(Debug)]
pub struct JsonConfigSource {
    file_path: PathBuf,
    config: RwLock<Option<HashMap<String, ConfigValue>>>,
}

impl JsonConfigSource {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            config: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Reload configuration from file
    pub fn reload(&self) -> DiResult<()> {
        let content = std::fs::read_to_string(&self.file_path).map_err(|e| {
            DiError::Config(format!("cannot read {}: {}", self.file_path.display(), e))
        })?;

        let parsed: HashMap<String, ConfigValue> = serde_json::from_str(&content).map_err(|e| {
            DiError::Config(format!("invalid JSON in {}: {}", self.file_path.display(), e))
        })?;

        let mut flat = HashMap::new();
        flatten_into(&mut flat, None, 0, parsed);
        let flat: HashMap<String, ConfigValue> =
            flat.into_iter().map(|(key, (_, value))| (key, value)).collect();
        tracing::debug!(path = %self.file_path.display(), keys = flat.len(), "loaded configuration file");

        *self.config.write() = Some(flat);
        Ok(())
    }
}

// Values are tagged with their nesting depth; the shallowest spelling of a
// key wins, ties go to the later key in sorted order.
fn flatten_into(
    out: &mut HashMap<String, (usize, ConfigValue)>,
    prefix: Option<&str>,
    depth: usize,
    values: HashMap<String, ConfigValue>,
) {
    let mut entries: Vec<_> = values.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in entries {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };
        match value {
            ConfigValue::Null => {}
            ConfigValue::Object(nested) => flatten_into(out, Some(&key), depth + 1, nested),
            other => match out.get(&key) {
                Some((existing, _)) if *existing < depth => {}
                _ => {
                    out.insert(key, (depth, other));
                }
            },
        }
    }
}

impl JsonConfigSource {
    /// Loads the file on first use; false if it cannot be read.
    fn ensure_loaded(&self) -> bool {
        if self.config.read().is_some() {
            return true;
        }
        match self.reload() {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "configuration file unavailable");
                false
            }
        }
    }
}

impl ConfigSource for JsonConfigSource {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        if !self.ensure_loaded() {
            return None;
        }

        self.config.read().as_ref()?.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        if !self.ensure_loaded() {
            return Vec::new();
        }

        self.config
            .read()
            .as_ref()
            .map(|cfg| cfg.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Configuration provider querying its sources in priority order
#[derive(Debug, Default)]
pub struct ConfigProvider {
    /// Sources in priority order; the first one with a value wins
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Environment variables under [`ENV_PREFIX`], then `json_file` if given.
    pub fn for_host(json_file: Option<&Path>) -> DiResult<Self> {
        let mut provider = Self::new();
        provider.add_source(Box::new(EnvironmentConfigSource::with_prefix(ENV_PREFIX)));
        if let Some(path) = json_file {
            let source = JsonConfigSource::new(path);
            source.reload()?;
            provider.add_source(Box::new(source));
        }
        Ok(provider)
    }

    /// Add a configuration source (higher priority sources should be added first)
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        self.sources.push(source);
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    pub fn get_string(&self, key: &str) -> DiResult<String> {
        self.get(key)
            .ok_or(DiError::NotFound("Configuration key not found"))?
            .as_string()
            .map(|s| s.to_string())
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> DiResult<i64> {
        self.get(key)
            .ok_or(DiError::NotFound("Configuration key not found"))?
            .as_i64()
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> DiResult<bool> {
        self.get(key)
            .ok_or(DiError::NotFound("Configuration key not found"))?
            .as_bool()
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Get all configuration keys from all sources
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sources.iter().flat_map(|s| s.keys()).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Settings for the `lifetimes` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Listen address for `serve`
    pub bind: String,
    /// Number of scopes opened by `simulate`
    pub requests: usize,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl HostConfig {
    pub const DEFAULT_BIND: &'static str = "127.0.0.1:3000";
    pub const DEFAULT_REQUESTS: usize = 2;
    pub const DEFAULT_LOG_FILTER: &'static str = "info";

    pub fn load(config: &ConfigProvider) -> Self {
        let requests = config
            .get_i64("host.requests")
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(Self::DEFAULT_REQUESTS);

        Self {
            bind: config.get_string_or("host.bind", Self::DEFAULT_BIND),
            requests,
            log_filter: config.get_string_or("log.filter", Self::DEFAULT_LOG_FILTER),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::load(&ConfigProvider::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[derive(Debug)]
    struct MapSource(HashMap<String, ConfigValue>);

    impl MapSource {
        fn new(entries: &[(&str, ConfigValue)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )
        }
    }

    impl ConfigSource for MapSource {
        fn get(&self, key: &str) -> Option<ConfigValue> {
            self.0.get(key).cloned()
        }

        fn keys(&self) -> Vec<String> {
            self.0.keys().cloned().collect()
        }
    }

    fn json_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_tries_number_then_bool_then_string() {
        assert_eq!(ConfigValue::parse("42"), ConfigValue::Integer(42));
        assert_eq!(ConfigValue::parse("1.5"), ConfigValue::Float(1.5));
        assert_eq!(ConfigValue::parse("true"), ConfigValue::Boolean(true));
        assert_eq!(
            ConfigValue::parse("127.0.0.1:3000"),
            ConfigValue::String("127.0.0.1:3000".to_string())
        );
    }

    #[test]
    #[serial]
    fn environment_source_maps_dotted_keys() {
        env::set_var("LIFETIMESTEST_HOST_BIND", "0.0.0.0:8080");
        env::set_var("LIFETIMESTEST_HOST_REQUESTS", "5");

        let source = EnvironmentConfigSource::with_prefix("lifetimestest");
        assert_eq!(
            source.get("host.bind"),
            Some(ConfigValue::String("0.0.0.0:8080".to_string()))
        );
        assert_eq!(source.get("host.requests"), Some(ConfigValue::Integer(5)));
        assert_eq!(source.get("log.filter"), None);
        assert!(source.keys().contains(&"host_bind".to_string()));

        env::remove_var("LIFETIMESTEST_HOST_BIND");
        env::remove_var("LIFETIMESTEST_HOST_REQUESTS");
    }

    #[test]
    fn json_source_flattens_nested_objects() {
        let file = json_file(r#"{ "host": { "bind": "0.0.0.0:9000", "requests": 4 }, "log.filter": "debug" }"#);
        let source = JsonConfigSource::new(file.path());

        assert_eq!(
            source.get("host.bind"),
            Some(ConfigValue::String("0.0.0.0:9000".to_string()))
        );
        assert_eq!(source.get("host.requests"), Some(ConfigValue::Integer(4)));
        assert_eq!(source.get("log.filter"), Some(ConfigValue::String("debug".to_string())));
        assert_eq!(source.keys().len(), 3);
    }

    #[test]
    fn json_source_skips_nulls() {
        let file = json_file(r#"{ "host": { "bind": "0.0.0.0:9000", "requests": null }, "note": null }"#);
        let provider = ConfigProvider::for_host(Some(file.path())).unwrap();

        assert_eq!(provider.get_string("host.bind").unwrap(), "0.0.0.0:9000");
        assert_eq!(provider.get("host.requests"), None);
        assert_eq!(provider.get("note"), None);
    }

    #[test]
    fn json_source_prefers_dotted_keys_over_nested_ones() {
        for content in [
            r#"{ "host": { "bind": "nested" }, "host.bind": "dotted" }"#,
            r#"{ "host.bind": "dotted", "host": { "bind": "nested" } }"#,
        ] {
            let file = json_file(content);
            let source = JsonConfigSource::new(file.path());
            assert_eq!(source.get("host.bind"), Some(ConfigValue::String("dotted".to_string())));
        }
    }

    #[test]
    fn json_source_lists_keys_before_first_read() {
        let file = json_file(r#"{ "host": { "bind": "0.0.0.0:9000" }, "log.filter": "debug" }"#);
        let mut provider = ConfigProvider::new();
        provider.add_source(Box::new(JsonConfigSource::new(file.path())));

        assert_eq!(provider.all_keys(), ["host.bind", "log.filter"]);
    }

    #[test]
    fn json_source_reports_bad_files() {
        let file = json_file("not json");
        let source = JsonConfigSource::new(file.path());
        assert!(matches!(source.reload(), Err(DiError::Config(_))));
        assert_eq!(source.get("host.bind"), None);

        let missing = JsonConfigSource::new("/nonexistent/lifetimes.json");
        assert!(matches!(missing.reload(), Err(DiError::Config(_))));
    }

    #[test]
    fn provider_prefers_earlier_sources() {
        let mut provider = ConfigProvider::new();
        provider.add_source(Box::new(MapSource::new(&[(
            "host.bind",
            ConfigValue::String("10.0.0.1:80".to_string()),
        )])));
        provider.add_source(Box::new(MapSource::new(&[
            ("host.bind", ConfigValue::String("10.0.0.2:80".to_string())),
            ("host.requests", ConfigValue::Integer(9)),
        ])));

        assert_eq!(provider.get_string("host.bind").unwrap(), "10.0.0.1:80");
        assert_eq!(provider.get_i64("host.requests").unwrap(), 9);
        assert_eq!(provider.get_string_or("missing", "fallback"), "fallback");
        assert!(provider.get_bool("host.bind").is_err());
        assert_eq!(provider.all_keys(), ["host.bind", "host.requests"]);
    }

    #[test]
    fn host_config_defaults() {
        let config = HostConfig::load(&ConfigProvider::new());
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.requests, 2);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn host_config_ignores_negative_request_counts() {
        let mut provider = ConfigProvider::new();
        provider.add_source(Box::new(MapSource::new(&[(
            "host.requests",
            ConfigValue::Integer(-3),
        )])));
        assert_eq!(HostConfig::load(&provider).requests, HostConfig::DEFAULT_REQUESTS);
    }

    #[test]
    #[serial]
    fn environment_overrides_json_file() {
        let file = json_file(r#"{ "host.bind": "0.0.0.0:9000", "host.requests": 7 }"#);
        env::set_var("LIFETIMES_HOST_BIND", "127.0.0.1:4000");

        let provider = ConfigProvider::for_host(Some(file.path())).unwrap();
        let config = HostConfig::load(&provider);

        env::remove_var("LIFETIMES_HOST_BIND");
        assert_eq!(config.bind, "127.0.0.1:4000");
        assert_eq!(config.requests, 7);
    }
}
