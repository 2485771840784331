use std::time::Duration;

use colored::*;
use ipmap_core::ingest::IngestStats;
use ipmap_core::render::PaintStats;
use ipmap_core::scanner::SweepSummary;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str) {
    let text = format!(" {} ", msg.to_uppercase());
    let side = TOTAL_WIDTH.saturating_sub(text.len()) / 2;
    let sep = "═".repeat(side);
    info!("{}{}{}", sep.bright_black(), text.bright_green().bold(), sep.bright_black());
}

pub fn sweep_summary(summary: &SweepSummary, total_time: Duration) {
    let up = format!("{} up", summary.up).bold().green();
    let down = format!("{} down", summary.down).bold().red();
    let failed = format!("{} skipped", summary.failed).bold().yellow();
    let total_time = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    info!("Sweep complete: {up}, {down}, {failed} out of {} in {total_time}", summary.dispatched);
}

pub fn render_summary(ingest: &IngestStats, painted: &PaintStats) {
    info!(
        lines = ingest.lines,
        rejected = ingest.rejected,
        outside = painted.out_of_range,
        "Image written with {} hosts up",
        painted.painted_up.to_string().green().bold()
    );
}
