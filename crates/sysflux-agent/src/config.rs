use serde::Deserialize;
use std::time::Duration;
use sysflux_sink::SinkConfig;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Value of the `host` tag stamped on every emitted sample.
    /// Defaults to the machine hostname.
    #[serde(default)]
    pub host_tag: Option<String>,
    /// Which metric sources to run each round.
    #[serde(default = "default_collect")]
    pub collect: Vec<String>,
    #[serde(default = "default_collection_interval")]
    pub collection_interval_secs: u64,
    /// Duration the deltas are normalized to. A window of half the
    /// interval halves every delta; unset (or zero) leaves deltas
    /// untouched.
    #[serde(default)]
    pub consistency_window_secs: Option<f64>,
    /// Keep collecting forever instead of stopping after the first
    /// complete round.
    #[serde(default)]
    pub daemon: bool,
    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_collect() -> Vec<String> {
    [
        "cpu", "cpus", "mem", "swap", "uptime", "load", "network", "disks", "mounts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_collection_interval() -> u64 {
    10
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    /// Scale applied to every delta so a consistency window that drifted
    /// from the collection interval is normalized back to the configured
    /// cadence.
    pub fn consistency_factor(&self) -> f64 {
        match self.consistency_window_secs {
            Some(window) if window > 0.0 => window / self.collection_interval_secs as f64,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_sources() {
        let config: AgentConfig = toml::from_str("").unwrap();
        assert_eq!(config.collect.len(), 9);
        assert_eq!(config.collection_interval_secs, 10);
        assert!(!config.daemon);
        assert!(config.sink.database.is_none());
        assert_eq!(config.consistency_factor(), 1.0);
    }

    #[test]
    fn consistency_factor_is_window_over_interval() {
        let config: AgentConfig = toml::from_str(
            "collection_interval_secs = 10\nconsistency_window_secs = 5.0\n",
        )
        .unwrap();
        assert_eq!(config.consistency_factor(), 0.5);
    }

    #[test]
    fn zero_window_disables_scaling() {
        let config: AgentConfig =
            toml::from_str("consistency_window_secs = 0.0\n").unwrap();
        assert_eq!(config.consistency_factor(), 1.0);
    }

    #[test]
    fn sink_table_is_parsed() {
        let config: AgentConfig = toml::from_str(
            "[sink]\nurl = \"influx:8086\"\ndatabase = \"metrics\"\nssl = true\n",
        )
        .unwrap();
        assert_eq!(config.sink.database.as_deref(), Some("metrics"));
        assert!(config.sink.ssl);
        assert_eq!(config.sink.username, "root");
    }
}
