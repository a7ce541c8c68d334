use crate::Source;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use sysflux_common::types::{FieldValue, Sample};

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Column names of `/proc/net/dev`, in file order.
const NET_COLS: [&str; 16] = [
    "recv_bytes",
    "recv_packets",
    "recv_errs",
    "recv_drop",
    "recv_fifo",
    "recv_frame",
    "recv_compressed",
    "recv_multicast",
    "trans_bytes",
    "trans_packets",
    "trans_errs",
    "trans_drop",
    "trans_fifo",
    "trans_colls",
    "trans_carrier",
    "trans_compressed",
];

/// Parse `/proc/net/dev` into per-interface counter rows. The first two
/// lines are headers.
pub(crate) fn parse_net_dev(content: &str) -> Result<Vec<(String, [u64; 16])>> {
    let mut rows = Vec::new();

    for line in content.lines().skip(2) {
        let Some((iface, counters)) = line.split_once(':') else {
            bail!("malformed /proc/net/dev line: {line:?}");
        };

        let mut values = [0u64; 16];
        let fields: Vec<&str> = counters.split_whitespace().collect();
        for (i, value) in values.iter_mut().enumerate() {
            *value = fields.get(i).and_then(|f| f.parse().ok()).unwrap_or(0);
        }

        rows.push((iface.trim().to_string(), values));
    }

    Ok(rows)
}

/// Per-interface traffic counters from `/proc/net/dev`, tagged `iface`.
pub struct NetworkSource;

impl Source for NetworkSource {
    fn name(&self) -> &'static str {
        "network"
    }

    fn cumulative(&self) -> bool {
        true
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let content =
            std::fs::read_to_string(PROC_NET_DEV).context("reading /proc/net/dev")?;
        let now = Utc::now();

        let samples = parse_net_dev(&content)?
            .into_iter()
            .map(|(iface, values)| {
                let mut tags = HashMap::new();
                tags.insert("iface".to_string(), iface);

                let fields = NET_COLS
                    .iter()
                    .zip(values)
                    .map(|(col, v)| (col.to_string(), FieldValue::U64(v)))
                    .collect();

                Sample {
                    name: "network".to_string(),
                    tags,
                    fields,
                    timestamp: now,
                }
            })
            .collect();

        Ok(samples)
    }
}
