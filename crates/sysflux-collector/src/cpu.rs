use crate::Source;
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use sysflux_common::types::{FieldValue, Sample};

const PROC_STAT: &str = "/proc/stat";

/// Tick counters for one `cpu*` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub sys: u64,
    pub idle: u64,
    pub wait: u64,
    pub total: u64,
}

/// Parse the `cpu*` lines of `/proc/stat`. The aggregate line is
/// reported as `None`, per-core lines as `Some(core_index)`.
pub(crate) fn parse_stat(content: &str) -> Vec<(Option<u32>, CpuTimes)> {
    let mut entries = Vec::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        if !label.starts_with("cpu") {
            continue;
        }

        let core = if label == "cpu" {
            None
        } else {
            match label[3..].parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => continue,
            }
        };

        // user nice system idle iowait irq softirq steal; guest time is
        // already folded into user, so only the first eight columns count
        // toward total.
        let ticks: Vec<u64> = fields
            .take(8)
            .map(|f| f.parse().unwrap_or(0))
            .collect();
        if ticks.len() < 5 {
            continue;
        }

        entries.push((
            core,
            CpuTimes {
                user: ticks[0],
                nice: ticks[1],
                sys: ticks[2],
                idle: ticks[3],
                wait: ticks[4],
                total: ticks.iter().sum(),
            },
        ));
    }

    entries
}

fn cpu_sample(name: &str, cpuid: String, times: CpuTimes) -> Sample {
    let mut tags = HashMap::new();
    tags.insert("cpuid".to_string(), cpuid);

    let mut fields = HashMap::new();
    fields.insert("user".to_string(), FieldValue::U64(times.user));
    fields.insert("nice".to_string(), FieldValue::U64(times.nice));
    fields.insert("sys".to_string(), FieldValue::U64(times.sys));
    fields.insert("idle".to_string(), FieldValue::U64(times.idle));
    fields.insert("wait".to_string(), FieldValue::U64(times.wait));
    fields.insert("total".to_string(), FieldValue::U64(times.total));

    Sample {
        name: name.to_string(),
        tags,
        fields,
        timestamp: Utc::now(),
    }
}

/// Aggregate CPU tick counters (the `cpu` line), tagged `cpuid=all`.
pub struct CpuSource;

impl Source for CpuSource {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn cumulative(&self) -> bool {
        true
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let content = std::fs::read_to_string(PROC_STAT).context("reading /proc/stat")?;
        let samples = parse_stat(&content)
            .into_iter()
            .filter(|(core, _)| core.is_none())
            .map(|(_, times)| cpu_sample("cpu", "all".to_string(), times))
            .collect();
        Ok(samples)
    }
}

/// Per-core CPU tick counters (the `cpuN` lines), tagged `cpuid=N`.
pub struct CpusSource;

impl Source for CpusSource {
    fn name(&self) -> &'static str {
        "cpus"
    }

    fn cumulative(&self) -> bool {
        true
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let content = std::fs::read_to_string(PROC_STAT).context("reading /proc/stat")?;
        let samples = parse_stat(&content)
            .into_iter()
            .filter_map(|(core, times)| {
                core.map(|n| cpu_sample("cpus", n.to_string(), times))
            })
            .collect();
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "\
cpu  10132153 290696 3084719 46828483 16683 0 25195 0 175628 0
cpu0 5066076 145348 1542359 23414241 8341 0 12597 0 87814 0
cpu1 5066077 145348 1542360 23414242 8342 0 12598 0 87814 0
intr 1232848112 0 0
ctxt 2465644251
btime 1566395122
";

    #[test]
    fn parses_aggregate_and_cores() {
        let entries = parse_stat(STAT);
        assert_eq!(entries.len(), 3);

        let (core, agg) = entries[0];
        assert_eq!(core, None);
        assert_eq!(agg.user, 10132153);
        assert_eq!(agg.nice, 290696);
        assert_eq!(agg.sys, 3084719);
        assert_eq!(agg.idle, 46828483);
        assert_eq!(agg.wait, 16683);
        // user + nice + sys + idle + iowait + irq + softirq + steal
        assert_eq!(
            agg.total,
            10132153 + 290696 + 3084719 + 46828483 + 16683 + 25195
        );

        assert_eq!(entries[1].0, Some(0));
        assert_eq!(entries[2].0, Some(1));
        assert_eq!(entries[2].1.idle, 23414242);
    }

    #[test]
    fn ignores_non_cpu_lines() {
        let entries = parse_stat("intr 5 0 0\nctxt 9\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn sample_carries_cpuid_tag_and_tick_fields() {
        let entries = parse_stat(STAT);
        let sample = cpu_sample("cpu", "all".to_string(), entries[0].1);
        assert_eq!(sample.name, "cpu");
        assert_eq!(sample.tags["cpuid"], "all");
        assert_eq!(sample.fields["user"], FieldValue::U64(10132153));
        assert_eq!(sample.fields.len(), 6);
    }
}
