use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One measurement taken from a metric source: a metric family name,
/// a set of identifying tags, one or more numeric fields, and the time
/// the reading was taken.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub name: String,
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Canonical identity of this sample's series (name + sorted tags).
    /// Two samples with the same name and tag set produce the same key
    /// regardless of tag insertion order.
    pub fn series_key(&self) -> String {
        crate::series::series_key(&self.name, &self.tags)
    }
}

/// A numeric field value that remembers its original kind.
///
/// Counter fields keep the integer width the kernel reports them in, so
/// delta arithmetic can run in the same domain (an unsigned counter that
/// wraps still produces the right modular difference). `F64` carries
/// gauge readings such as load averages; the diff engine leaves it
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F64(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn field_values_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&FieldValue::U64(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&FieldValue::I32(-7)).unwrap(), "-7");
        assert_eq!(serde_json::to_string(&FieldValue::F64(0.5)).unwrap(), "0.5");
    }

    #[test]
    fn sample_serializes_fields_inline() {
        let mut fields = HashMap::new();
        fields.insert("user".to_string(), FieldValue::U64(100));
        let sample = Sample {
            name: "cpu".to_string(),
            tags: HashMap::new(),
            fields,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["name"], "cpu");
        assert_eq!(json["fields"]["user"], 100);
    }
}
