use crate::error::SinkError;
use async_trait::async_trait;
use sysflux_common::types::Sample;
use sysflux_engine::Emitter;

/// Prints each completed batch to stdout as a JSON array, one batch per
/// line. Used when no database is configured.
#[derive(Default)]
pub struct StdoutEmitter;

impl StdoutEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Emitter for StdoutEmitter {
    async fn emit(&self, batch: &[Sample]) -> anyhow::Result<()> {
        let json = serde_json::to_string(batch).map_err(SinkError::Json)?;
        println!("{json}");
        Ok(())
    }
}
