//! Runtime configuration and its environment loader.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Game system selecting the catalog and storage strategy.
    pub system_id: String,
    /// TOML settings file; bundled settings when `None`.
    pub settings_path: Option<PathBuf>,
    /// RON catalog file; built-in catalog for `system_id` when `None`.
    pub catalog_path: Option<PathBuf>,
    /// Whether this session writes documents directly.
    pub authoritative: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Upper bound on a proxied privileged write.
    pub privileged_timeout: Duration,
    /// Simulated round trip of the document host.
    pub host_latency: Duration,
    pub session_id: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            system_id: cover_content::GENERIC_SYSTEM.to_owned(),
            settings_path: None,
            catalog_path: None,
            authoritative: true,
            event_buffer_size: 100,
            command_buffer_size: 32,
            privileged_timeout: Duration::from_secs(5),
            host_latency: Duration::ZERO,
            session_id: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COVER_SYSTEM_ID` - Game system id (default: generic)
    /// - `COVER_SETTINGS_PATH` - Settings TOML file (default: bundled)
    /// - `COVER_CATALOG_PATH` - Catalog RON file (default: built-in for the system)
    /// - `COVER_AUTHORITATIVE` - Write documents directly (default: true)
    /// - `COVER_EVENT_CAPACITY` - Event bus capacity per topic (default: 100)
    /// - `COVER_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `COVER_PRIVILEGED_TIMEOUT_MS` - Proxied write timeout (default: 5000)
    /// - `COVER_HOST_LATENCY_MS` - Simulated document host latency (default: 0)
    /// - `COVER_SESSION_ID` - Session identifier for log files (default: auto-generated)
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(system_id) = read("COVER_SYSTEM_ID") {
            config.system_id = system_id.trim().to_owned();
        }
        config.settings_path = read("COVER_SETTINGS_PATH").map(PathBuf::from);
        config.catalog_path = read("COVER_CATALOG_PATH").map(PathBuf::from);

        if let Some(authoritative) = parse::<bool>(read("COVER_AUTHORITATIVE")) {
            config.authoritative = authoritative;
        }
        if let Some(capacity) = parse::<usize>(read("COVER_EVENT_CAPACITY")) {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = parse::<usize>(read("COVER_COMMAND_BUFFER")) {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(millis) = parse::<u64>(read("COVER_PRIVILEGED_TIMEOUT_MS")) {
            config.privileged_timeout = Duration::from_millis(millis.max(1));
        }
        if let Some(millis) = parse::<u64>(read("COVER_HOST_LATENCY_MS")) {
            config.host_latency = Duration::from_millis(millis);
        }
        config.session_id = read("COVER_SESSION_ID");

        config
    }
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        RuntimeConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]);
        assert_eq!(config.system_id, "generic");
        assert!(config.authoritative);
        assert_eq!(config.event_buffer_size, 100);
        assert_eq!(config.command_buffer_size, 32);
        assert_eq!(config.privileged_timeout, Duration::from_secs(5));
        assert!(config.session_id.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("COVER_SYSTEM_ID", "pf2e"),
            ("COVER_SETTINGS_PATH", "/tmp/settings.toml"),
            ("COVER_AUTHORITATIVE", "false"),
            ("COVER_EVENT_CAPACITY", "0"),
            ("COVER_COMMAND_BUFFER", "4"),
            ("COVER_PRIVILEGED_TIMEOUT_MS", "250"),
            ("COVER_HOST_LATENCY_MS", "10"),
            ("COVER_SESSION_ID", "table-1"),
        ]);

        assert_eq!(config.system_id, "pf2e");
        assert_eq!(config.settings_path, Some(PathBuf::from("/tmp/settings.toml")));
        assert!(config.catalog_path.is_none());
        assert!(!config.authoritative);
        assert_eq!(config.event_buffer_size, 1);
        assert_eq!(config.command_buffer_size, 4);
        assert_eq!(config.privileged_timeout, Duration::from_millis(250));
        assert_eq!(config.host_latency, Duration::from_millis(10));
        assert_eq!(config.session_id.as_deref(), Some("table-1"));
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = config(&[("COVER_AUTHORITATIVE", "maybe"), ("COVER_COMMAND_BUFFER", "x")]);
        assert!(config.authoritative);
        assert_eq!(config.command_buffer_size, 32);
    }
}
