use crate::Source;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use sysflux_common::types::{FieldValue, Sample};
use sysinfo::System;

/// Physical memory gauges. Not cumulative; emitted as-is every round.
pub struct MemorySource {
    system: Mutex<System>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for MemorySource {
    fn name(&self) -> &'static str {
        "mem"
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let mut system = self.system.lock().unwrap();
        system.refresh_memory();
        let now = Utc::now();

        let total = system.total_memory();
        let used = system.used_memory();
        let free = system.free_memory();
        // "actual" figures count buffers/cache as reclaimable, matching
        // what a process could actually allocate.
        let actual_free = system.available_memory();
        let actual_used = total.saturating_sub(actual_free);

        let mut fields = HashMap::new();
        fields.insert("free".to_string(), FieldValue::U64(free));
        fields.insert("used".to_string(), FieldValue::U64(used));
        fields.insert("actualfree".to_string(), FieldValue::U64(actual_free));
        fields.insert("actualused".to_string(), FieldValue::U64(actual_used));
        fields.insert("total".to_string(), FieldValue::U64(total));

        Ok(vec![Sample {
            name: "mem".to_string(),
            tags: HashMap::new(),
            fields,
            timestamp: now,
        }])
    }
}
