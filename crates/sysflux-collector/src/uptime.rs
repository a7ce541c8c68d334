use crate::Source;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use sysflux_common::types::{FieldValue, Sample};
use sysinfo::System;

/// Seconds since boot.
pub struct UptimeSource;

impl Source for UptimeSource {
    fn name(&self) -> &'static str {
        "uptime"
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let mut fields = HashMap::new();
        fields.insert(
            "length".to_string(),
            FieldValue::F64(System::uptime() as f64),
        );

        Ok(vec![Sample {
            name: "uptime".to_string(),
            tags: HashMap::new(),
            fields,
            timestamp: Utc::now(),
        }])
    }
}
