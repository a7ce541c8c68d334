use crate::Source;
use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use sysflux_common::types::{FieldValue, Sample};
use sysinfo::System;

/// Load averages over one, five and fifteen minutes.
pub struct LoadSource;

impl Source for LoadSource {
    fn name(&self) -> &'static str {
        "load"
    }

    fn collect(&self) -> Result<Vec<Sample>> {
        let load = System::load_average();

        let mut fields = HashMap::new();
        fields.insert("one".to_string(), FieldValue::F64(load.one));
        fields.insert("five".to_string(), FieldValue::F64(load.five));
        fields.insert("fifteen".to_string(), FieldValue::F64(load.fifteen));

        Ok(vec![Sample {
            name: "load".to_string(),
            tags: HashMap::new(),
            fields,
            timestamp: Utc::now(),
        }])
    }
}
