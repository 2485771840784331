//! The single owner of the sweep output.
//!
//! Probe tasks never touch the sink; they push [`ProbeOutcome`]s into a bounded queue and this
//! task turns them into interchange lines one at a time. The queue closing is the signal
//! that every probe has reported.

use ipmap_common::record::SCHEMA_HEADER;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::ProgressFn;
use super::probe::ProbeOutcome;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterTally {
    pub up: usize,
    pub down: usize,
    pub failed: usize,
}

impl WriterTally {
    pub fn written(&self) -> usize {
        self.up + self.down
    }

    pub fn processed(&self) -> usize {
        self.written() + self.failed
    }
}

pub(crate) async fn write_results<W>(
    mut rx: mpsc::Receiver<ProbeOutcome>,
    sink: W,
    on_progress: Option<ProgressFn>,
) -> std::io::Result<(W, WriterTally)>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut out = BufWriter::new(sink);
    let mut tally = WriterTally::default();

    out.write_all(SCHEMA_HEADER.as_bytes()).await?;
    out.write_all(b"\n").await?;

    while let Some(outcome) = rx.recv().await {
        match outcome {
            ProbeOutcome::Completed { stats, finished_at } => {
                let record = stats.to_record(finished_at);
                out.write_all(format!("{record}\n").as_bytes()).await?;

                if record.status.is_up() {
                    tally.up += 1;
                } else {
                    tally.down += 1;
                }
                debug!(
                    sent = stats.sent,
                    received = stats.received,
                    avg_rtt_ms = stats.avg_rtt.as_millis() as u64,
                    "Saved: {}",
                    stats.addr
                );
            }
            ProbeOutcome::Failed { addr, error } => {
                tally.failed += 1;
                warn!("Skipping {addr}: {error}");
            }
        }

        if let Some(report) = &on_progress {
            report(tally.processed());
        }
    }

    out.flush().await?;
    Ok((out.into_inner(), tally))
}
