mod config;

use anyhow::{bail, Result};
use std::sync::Arc;
use sysflux_collector::cpu::{CpuSource, CpusSource};
use sysflux_collector::disk::DiskSource;
use sysflux_collector::load::LoadSource;
use sysflux_collector::memory::MemorySource;
use sysflux_collector::mount::MountSource;
use sysflux_collector::network::NetworkSource;
use sysflux_collector::swap::SwapSource;
use sysflux_collector::uptime::UptimeSource;
use sysflux_collector::Source;
use sysflux_engine::{DiffEngine, Emitter, RunMode, Scheduler};
use sysflux_sink::{InfluxEmitter, StdoutEmitter};
use sysinfo::System;
use tokio::signal;
use tracing_subscriber::EnvFilter;

fn build_sources(names: &[String]) -> Result<Vec<Arc<dyn Source>>> {
    let mut sources: Vec<Arc<dyn Source>> = Vec::new();
    for name in names {
        let source: Arc<dyn Source> = match name.trim() {
            "cpu" => Arc::new(CpuSource),
            "cpus" => Arc::new(CpusSource),
            "mem" => Arc::new(MemorySource::new()),
            "swap" => Arc::new(SwapSource::new()),
            "uptime" => Arc::new(UptimeSource),
            "load" => Arc::new(LoadSource),
            "network" => Arc::new(NetworkSource),
            "disks" => Arc::new(DiskSource),
            "mounts" => Arc::new(MountSource::new()),
            other => bail!("unknown collect option '{other}'"),
        };
        sources.push(source);
    }
    if sources.is_empty() {
        bail!("no metric sources enabled");
    }
    Ok(sources)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sysflux=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = config::AgentConfig::load(&config_path)?;

    let host_tag = config
        .host_tag
        .clone()
        .or_else(System::host_name)
        .unwrap_or_else(|| "unknown".to_string());

    let sources = build_sources(&config.collect)?;
    let diff = Arc::new(DiffEngine::new(config.consistency_factor()));

    let emitter: Arc<dyn Emitter> = if config.sink.database.is_some() {
        Arc::new(InfluxEmitter::new(&config.sink)?)
    } else {
        Arc::new(StdoutEmitter::new())
    };

    let mode = if config.daemon {
        RunMode::Daemon
    } else {
        RunMode::Once
    };

    tracing::info!(
        host = %host_tag,
        interval_secs = config.collection_interval_secs,
        consistency_factor = config.consistency_factor(),
        sources = sources.len(),
        daemon = config.daemon,
        "sysflux-agent starting"
    );

    let scheduler = Scheduler::new(
        sources,
        diff,
        emitter,
        config.interval(),
        mode,
        host_tag,
    );

    match mode {
        RunMode::Once => scheduler.run().await,
        RunMode::Daemon => {
            tokio::select! {
                result = scheduler.run() => result,
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutting down gracefully");
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_source_name_is_fatal() {
        let names = vec!["cpu".to_string(), "bogus".to_string()];
        let err = build_sources(&names).err().unwrap();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn all_default_sources_resolve() {
        let names: Vec<String> = [
            "cpu", "cpus", "mem", "swap", "uptime", "load", "network", "disks", "mounts",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(build_sources(&names).unwrap().len(), 9);
    }

    #[test]
    fn empty_source_list_is_fatal() {
        assert!(build_sources(&[]).is_err());
    }
}
