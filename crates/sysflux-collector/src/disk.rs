use crate::Source;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use sysflux_common::types::{FieldValue, Sample};

const PROC_DISKSTATS: &str = "/proc/diskstats";

/// I/O counter columns of `/proc/diskstats`, starting after the device
/// name (field 3 of the line).
const DISK_COLS: [&str; 11] = [
    "read_ios",
    "read_merges",
    "read_sectors",
    "read_ticks",
    "write_ios",
    "write_merges",
    "write_sectors",
    "write_ticks",
    "in_flight",
    "io_ticks",
    "time_in_queue",
];

/// Parse `/proc/diskstats` into per-device counter rows.
pub(crate) fn parse_diskstats(content: &str) -> Result<Vec<(String, [u64; 11])>> {
    let mut rows = Vec::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 14 {
            bail!("malformed /proc/diskstats line: {line:?}");
        }

        let mut values = [0u64; 11];
        for (i, value) in values.iter_mut().enumerate() {
            *value = fields[3 + i].parse().unwrap_or(0);
        }

        rows.push((fields[2].to_string(), values));
    }

    Ok(rows)
}

/// Per-device I/O counters from `/proc/diskstats`, tagged `device`.
pub struct DiskSource;

impl Source for DiskSource {
    fn name(&self) -> &'static str {
        "disks"
    }

    fn cumulative(&self) -> bool {
        true
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let content =
            std::fs::read_to_string(PROC_DISKSTATS).context("reading /proc/diskstats")?;
        let now = Utc::now();

        let samples = parse_diskstats(&content)?
            .into_iter()
            .map(|(device, values)| {
                let mut tags = HashMap::new();
                tags.insert("device".to_string(), device);

                let fields = DISK_COLS
                    .iter()
                    .zip(values)
                    .map(|(col, v)| (col.to_string(), FieldValue::U64(v)))
                    .collect();

                Sample {
                    name: "disks".to_string(),
                    tags,
                    fields,
                    timestamp: now,
                }
            })
            .collect();

        Ok(samples)
    }
}
