use crate::Source;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use sysflux_common::types::{FieldValue, Sample};
use sysinfo::Disks;

/// Free and total bytes per mounted filesystem, tagged with the backing
/// device and the mount point. Virtual filesystems are excluded by the
/// probe's disk list.
///
/// Reported as cumulative so the emitted values are per-interval changes
/// in free space, mirroring the counter sources.
pub struct MountSource {
    disks: Mutex<Disks>,
}

impl MountSource {
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl Default for MountSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for MountSource {
    fn name(&self) -> &'static str {
        "mounts"
    }

    fn cumulative(&self) -> bool {
        true
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let mut disks = self.disks.lock().unwrap();
        // Rescan so filesystems mounted after startup are picked up.
        disks.refresh_list();
        let now = Utc::now();

        let samples = disks
            .iter()
            .map(|disk| {
                let mut tags = HashMap::new();
                tags.insert(
                    "disk".to_string(),
                    disk.name().to_string_lossy().to_string(),
                );
                tags.insert(
                    "mountpoint".to_string(),
                    disk.mount_point().to_string_lossy().to_string(),
                );

                let mut fields = HashMap::new();
                fields.insert(
                    "free".to_string(),
                    FieldValue::U64(disk.available_space()),
                );
                fields.insert("total".to_string(), FieldValue::U64(disk.total_space()));

                Sample {
                    name: "mounts".to_string(),
                    tags,
                    fields,
                    timestamp: now,
                }
            })
            .collect();

        Ok(samples)
    }
}
