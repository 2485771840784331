//! Bounded-concurrency liveness sweep.
//!
//! Every target address waits for one of `parallelism` admission permits before its probe
//! task is spawned, so dispatch stalls naturally once the ceiling is reached. Finished
//! probes report to a dedicated writer task which owns the output sink.
//!
//! Teardown happens in a fixed order:
//! 1. admissions are closed once every address has been dispatched,
//! 2. every spawned probe task is joined,
//! 3. the last queue sender is dropped so the writer drains, flushes and hands the sink back.

use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::Utc;
use ipmap_common::config::SweepConfig;
use ipmap_common::error::ConfigError;
use tokio::io::AsyncWrite;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::error::ScanError;

pub mod icmp;
pub mod probe;
mod writer;

pub use icmp::IcmpProber;
pub use probe::{ProbeOutcome, ProbeStats, Prober};
pub use writer::WriterTally;

/// Receives the number of hosts reported so far.
pub type ProgressFn = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub dispatched: usize,
    pub up: usize,
    pub down: usize,
    pub failed: usize,
}

impl SweepSummary {
    pub fn written(&self) -> usize {
        self.up + self.down
    }
}

/// Everything a probe task needs, built once per sweep.
pub struct ScanContext<P> {
    prober: Arc<P>,
    admission: Arc<Semaphore>,
    results: mpsc::Sender<ProbeOutcome>,
}

impl<P> Clone for ScanContext<P> {
    fn clone(&self) -> Self {
        Self {
            prober: self.prober.clone(),
            admission: self.admission.clone(),
            results: self.results.clone(),
        }
    }
}

/// Probes every address of `targets` and writes the results to `sink`.
///
/// Returns the sink after it has been flushed, together with a summary of the sweep.
pub async fn sweep<P, I, W>(
    targets: I,
    prober: Arc<P>,
    sink: W,
    cfg: &SweepConfig,
    on_progress: Option<ProgressFn>,
) -> Result<(W, SweepSummary), ScanError>
where
    P: Prober,
    I: IntoIterator<Item = Ipv4Addr>,
    W: AsyncWrite + Unpin + Send + 'static,
{
    if cfg.parallelism == 0 {
        return Err(ConfigError::InvalidParallelism.into());
    }

    let (tx, rx) = mpsc::channel::<ProbeOutcome>(cfg.queue_depth.max(1));
    let writer = tokio::spawn(writer::write_results(rx, sink, on_progress));

    let ctx = ScanContext {
        prober,
        admission: Arc::new(Semaphore::new(cfg.parallelism)),
        results: tx,
    };

    let mut tasks: JoinSet<()> = JoinSet::new();
    let mut dispatched: usize = 0;

    for addr in targets {
        if ctx.results.is_closed() {
            error!("Result writer stopped, no further hosts will be probed");
            break;
        }

        let Ok(permit) = ctx.admission.clone().acquire_owned().await else {
            break;
        };
        tasks.spawn(probe_and_report(ctx.clone(), addr, permit));
        dispatched += 1;

        while let Some(res) = tasks.try_join_next() {
            report_join(res);
        }
    }

    ctx.admission.close();
    info!("Started {dispatched} probes, waiting for the last ones to finish...");

    while let Some(res) = tasks.join_next().await {
        report_join(res);
    }

    drop(ctx);

    let (sink, tally) = writer
        .await
        .map_err(|e| ScanError::Writer(e.to_string()))??;

    if tally.processed() != dispatched {
        warn!(
            "{} of {dispatched} probes did not report a result",
            dispatched - tally.processed()
        );
    }

    let summary = SweepSummary {
        dispatched,
        up: tally.up,
        down: tally.down,
        failed: tally.failed,
    };
    Ok((sink, summary))
}

async fn probe_and_report<P: Prober>(
    ctx: ScanContext<P>,
    addr: Ipv4Addr,
    _permit: OwnedSemaphorePermit,
) {
    let outcome = match ctx.prober.probe(addr).await {
        Ok(stats) => ProbeOutcome::Completed {
            stats,
            finished_at: Utc::now(),
        },
        Err(error) => ProbeOutcome::Failed { addr, error },
    };

    if ctx.results.send(outcome).await.is_err() {
        warn!("Result for {addr} dropped, writer is gone");
    }
}

fn report_join(res: Result<(), JoinError>) {
    if let Err(e) = res {
        error!("Probe task failed: {e}");
    }
}
