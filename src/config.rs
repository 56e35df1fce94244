use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read once from `COURTBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metrics_port: Option<u16>,
    pub session_ttl: Duration,
    pub reaper_interval: Duration,
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_port: None,
            session_ttl: Duration::from_secs(1800),
            reaper_interval: Duration::from_secs(30),
            data_file: PathBuf::from("./data/club.json"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to the default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            get(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };
        Self {
            metrics_port: get("COURTBOOK_METRICS_PORT").and_then(|s| s.parse().ok()),
            session_ttl: secs("COURTBOOK_SESSION_TTL_SECS", defaults.session_ttl),
            reaper_interval: secs("COURTBOOK_REAPER_INTERVAL_SECS", defaults.reaper_interval),
            data_file: get("COURTBOOK_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_overrides() {
        let env = HashMap::from([
            ("COURTBOOK_METRICS_PORT", "9100"),
            ("COURTBOOK_SESSION_TTL_SECS", "60"),
            ("COURTBOOK_DATA_FILE", "/tmp/club.json"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.metrics_port, Some(9100));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.reaper_interval, Duration::from_secs(30));
        assert_eq!(config.data_file, PathBuf::from("/tmp/club.json"));
    }

    #[test]
    fn garbage_falls_back() {
        let config = Config::from_lookup(|k| (k == "COURTBOOK_REAPER_INTERVAL_SECS").then(|| "soon".to_string()));
        assert_eq!(config.reaper_interval, Duration::from_secs(30));
    }
}
