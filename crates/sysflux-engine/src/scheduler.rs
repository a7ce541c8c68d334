use crate::DiffEngine;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sysflux_collector::Source;
use sysflux_common::types::Sample;
use tokio::sync::mpsc;

/// Delivers a finished batch of samples to the time-series store.
///
/// Invoked at most once per complete collection round with a non-empty
/// batch. A failed delivery is logged by the scheduler and the batch is
/// dropped; the next round proceeds on schedule.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, batch: &[Sample]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Collect until one complete round has been emitted, then stop.
    Once,
    /// Collect forever, sleeping the configured interval between
    /// complete rounds.
    Daemon,
}

/// One source's contribution to a round. `None` entries mark samples the
/// diff engine withheld because a series was observed for the first time.
struct SourceReport {
    source: &'static str,
    result: Result<Vec<Option<Sample>>>,
}

struct Round {
    complete: bool,
    samples: Vec<Sample>,
}

/// Runs all configured metric sources concurrently once per round and
/// fans their results back in.
///
/// A round is complete when every source produced at least one sample
/// and none of those samples was withheld by the diff engine. Incomplete
/// rounds are retried immediately without sleeping, so the bootstrap
/// round (where every counter series is new) converges to a complete
/// round without waiting a full interval. Nothing is emitted for an
/// incomplete round.
pub struct Scheduler {
    sources: Vec<Arc<dyn Source>>,
    diff: Arc<DiffEngine>,
    emitter: Arc<dyn Emitter>,
    interval: Duration,
    mode: RunMode,
    host_tag: String,
}

impl Scheduler {
    pub fn new(
        sources: Vec<Arc<dyn Source>>,
        diff: Arc<DiffEngine>,
        emitter: Arc<dyn Emitter>,
        interval: Duration,
        mode: RunMode,
        host_tag: String,
    ) -> Self {
        Self {
            sources,
            diff,
            emitter,
            interval,
            mode,
            host_tag,
        }
    }

    /// Run the collection loop until it finishes (one complete round in
    /// [`RunMode::Once`], forever in [`RunMode::Daemon`]).
    pub async fn run(&self) -> Result<()> {
        loop {
            let round = self.run_round().await;

            if !round.complete {
                tracing::debug!(
                    carried = round.samples.len(),
                    series = self.diff.series_count(),
                    "Round incomplete, retrying immediately"
                );
                continue;
            }

            let mut batch = round.samples;
            for sample in &mut batch {
                sample
                    .tags
                    .insert("host".to_string(), self.host_tag.clone());
            }

            if !batch.is_empty() {
                if let Err(e) = self.emitter.emit(&batch).await {
                    tracing::warn!(error = %e, count = batch.len(), "Failed to deliver batch");
                } else {
                    tracing::debug!(count = batch.len(), "Batch delivered");
                }
            }

            match self.mode {
                RunMode::Once => return Ok(()),
                RunMode::Daemon => tokio::time::sleep(self.interval).await,
            }
        }
    }

    /// Spawn one task per source and drain exactly as many reports as
    /// were spawned. There is no per-source timeout: a source that never
    /// returns stalls the round.
    async fn run_round(&self) -> Round {
        let (tx, mut rx) = mpsc::channel(self.sources.len().max(1));

        for source in &self.sources {
            let source = Arc::clone(source);
            let diff = Arc::clone(&self.diff);
            let tx = tx.clone();
            tokio::task::spawn_blocking(move || {
                let result = source.collect().map(|samples| {
                    if source.cumulative() {
                        samples.into_iter().map(|s| diff.diff(s)).collect()
                    } else {
                        samples.into_iter().map(Some).collect()
                    }
                });
                let _ = tx.blocking_send(SourceReport {
                    source: source.name(),
                    result,
                });
            });
        }
        drop(tx);

        let mut complete = true;
        let mut samples = Vec::new();

        for _ in 0..self.sources.len() {
            let Some(report) = rx.recv().await else {
                // A source task died without reporting.
                complete = false;
                break;
            };
            match report.result {
                Err(e) => {
                    tracing::warn!(source = report.source, error = %e, "Source collection failed");
                    complete = false;
                }
                Ok(batch) if batch.is_empty() => {
                    // Every source must be heard from before results can
                    // be trusted; zero samples forces a retry.
                    complete = false;
                }
                Ok(batch) => {
                    for entry in batch {
                        match entry {
                            Some(sample) => samples.push(sample),
                            None => complete = false,
                        }
                    }
                }
            }
        }

        Round { complete, samples }
    }
}
