use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Local};
use ipmap_common::config::SweepConfig;
use ipmap_common::network::range;
use ipmap_core::scanner::{self, IcmpProber, ProgressFn};
use pnet::ipnetwork::Ipv4Network;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::SweepArgs;
use crate::terminal::{print, progress};

pub async fn sweep(args: SweepArgs) -> anyhow::Result<()> {
    let target: Ipv4Network = range::sweep_target(&args.target)?;
    let mut cfg = SweepConfig::new(args.parallelism)?;
    if let Some(depth) = args.queue_depth {
        cfg = cfg.with_queue_depth(depth);
    }

    if !is_root::is_root() {
        warn!("Not running as root, raw ICMP sockets need root or CAP_NET_RAW");
    }
    let prober = Arc::new(IcmpProber::new(cfg.probe).context("cannot start pinging")?);

    let path: PathBuf = args
        .output
        .unwrap_or_else(|| default_output_path(&target, Local::now()));
    let file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("failed to create '{}' for writing output", path.display()))?;
    info!("Writing results to '{}'", path.display());

    let total: u64 = 1u64 << (32 - u32::from(target.prefix()));
    let bar = progress::start_sweep_bar(total);
    let on_progress: ProgressFn = Box::new(move |done| bar.set_position(done as u64));

    let start_time = Instant::now();
    let (mut file, summary) =
        scanner::sweep(target.iter(), prober, file, &cfg, Some(on_progress)).await?;
    file.sync_all().await?;
    file.shutdown().await?;
    progress::finish();

    print::sweep_summary(&summary, start_time.elapsed());
    Ok(())
}

fn default_output_path(target: &Ipv4Network, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "sweep-{}_{}-{}.txt",
        target.network(),
        target.prefix(),
        now.format("%Y-%m-%d-%H-%M")
    ))
}
