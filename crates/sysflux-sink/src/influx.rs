use crate::error::{Result, SinkError};
use crate::SinkConfig;
use async_trait::async_trait;
use sysflux_common::types::{FieldValue, Sample};
use sysflux_engine::Emitter;

/// Writes batches to an InfluxDB v1 compatible `/write` endpoint in line
/// protocol, millisecond precision.
pub struct InfluxEmitter {
    client: reqwest::Client,
    write_url: String,
    database: String,
    retention_policy: Option<String>,
    username: String,
    password: String,
}

impl InfluxEmitter {
    /// Build an emitter from sink settings. Fails fast on a missing
    /// database, an unparsable endpoint URL, or an unreadable secret
    /// file; these are startup errors the operator must fix.
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let database = config
            .database
            .clone()
            .ok_or_else(|| SinkError::InvalidConfig("database is required".to_string()))?;

        let scheme = if config.ssl { "https" } else { "http" };
        let write_url = format!("{scheme}://{}/write", config.url);
        if reqwest::Url::parse(&write_url).is_err() {
            return Err(SinkError::InvalidUrl(write_url));
        }

        let password = match &config.secret_file {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| SinkError::SecretFile {
                        path: path.clone(),
                        source,
                    })?;
                content.lines().next().unwrap_or_default().to_string()
            }
            None => config.password.clone(),
        };

        Ok(Self {
            client: reqwest::Client::new(),
            write_url,
            database,
            retention_policy: config.retention_policy.clone(),
            username: config.username.clone(),
            password,
        })
    }

    async fn write(&self, body: String) -> Result<()> {
        let mut query = vec![
            ("db", self.database.as_str()),
            ("precision", "ms"),
        ];
        if let Some(rp) = &self.retention_policy {
            query.push(("rp", rp.as_str()));
        }

        let response = self
            .client
            .post(&self.write_url)
            .query(&query)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Emitter for InfluxEmitter {
    async fn emit(&self, batch: &[Sample]) -> anyhow::Result<()> {
        let body = batch.iter().map(line).collect::<Vec<_>>().join("\n");
        self.write(body).await?;
        tracing::debug!(count = batch.len(), "wrote batch to influx");
        Ok(())
    }
}

/// Render one sample as a line-protocol line. Tags and fields are sorted
/// by key so output is deterministic.
fn line(sample: &Sample) -> String {
    let mut out = String::new();
    out.push_str(&escape_measurement(&sample.name));

    let mut tags: Vec<(&String, &String)> = sample.tags.iter().collect();
    tags.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in tags {
        out.push(',');
        out.push_str(&escape_tag(key));
        out.push('=');
        out.push_str(&escape_tag(value));
    }

    out.push(' ');
    let mut fields: Vec<(&String, &FieldValue)> = sample.fields.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (i, (key, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_tag(key));
        out.push('=');
        out.push_str(&field_value(value));
    }

    out.push(' ');
    out.push_str(&sample.timestamp.timestamp_millis().to_string());
    out
}

fn field_value(value: &FieldValue) -> String {
    use FieldValue::*;
    match value {
        I8(v) => format!("{v}i"),
        I16(v) => format!("{v}i"),
        I32(v) => format!("{v}i"),
        I64(v) => format!("{v}i"),
        U8(v) => format!("{v}u"),
        U16(v) => format!("{v}u"),
        U32(v) => format!("{v}u"),
        U64(v) => format!("{v}u"),
        F64(v) => format!("{v}"),
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn sample() -> Sample {
        let mut tags = HashMap::new();
        tags.insert("iface".to_string(), "eth0".to_string());
        tags.insert("host".to_string(), "web-01".to_string());

        let mut fields = HashMap::new();
        fields.insert("recv_bytes".to_string(), FieldValue::U64(1024));
        fields.insert("delta".to_string(), FieldValue::I32(-3));
        fields.insert("load".to_string(), FieldValue::F64(0.5));

        Sample {
            name: "network".to_string(),
            tags,
            fields,
            timestamp: chrono::Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn renders_sorted_tags_and_typed_fields() {
        assert_eq!(
            line(&sample()),
            "network,host=web-01,iface=eth0 delta=-3i,load=0.5,recv_bytes=1024u 1700000000000"
        );
    }

    #[test]
    fn escapes_special_characters() {
        let mut tags = HashMap::new();
        tags.insert("mountpoint".to_string(), "/mnt/my data".to_string());
        let mut fields = HashMap::new();
        fields.insert("free".to_string(), FieldValue::U64(1));

        let sample = Sample {
            name: "mou nts".to_string(),
            tags,
            fields,
            timestamp: chrono::Utc.timestamp_millis_opt(0).unwrap(),
        };
        assert_eq!(
            line(&sample),
            "mou\\ nts,mountpoint=/mnt/my\\ data free=1u 0"
        );
    }

    #[test]
    fn new_rejects_missing_database() {
        let config = SinkConfig::default();
        assert!(matches!(
            InfluxEmitter::new(&config),
            Err(SinkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn new_rejects_unparsable_url() {
        let config = SinkConfig {
            database: Some("metrics".to_string()),
            url: "not a url".to_string(),
            ..SinkConfig::default()
        };
        assert!(matches!(
            InfluxEmitter::new(&config),
            Err(SinkError::InvalidUrl(_))
        ));
    }
}
