use crate::Source;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use sysflux_common::types::{FieldValue, Sample};
use sysinfo::System;

/// Swap usage gauges.
pub struct SwapSource {
    system: Mutex<System>,
}

impl SwapSource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SwapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for SwapSource {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let mut system = self.system.lock().unwrap();
        system.refresh_memory();
        let now = Utc::now();

        let mut fields = HashMap::new();
        fields.insert("free".to_string(), FieldValue::U64(system.free_swap()));
        fields.insert("used".to_string(), FieldValue::U64(system.used_swap()));
        fields.insert("total".to_string(), FieldValue::U64(system.total_swap()));

        Ok(vec![Sample {
            name: "swap".to_string(),
            tags: HashMap::new(),
            fields,
            timestamp: now,
        }])
    }
}
