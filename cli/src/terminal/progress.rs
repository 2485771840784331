use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};

static SWEEP_BAR: OnceLock<ProgressBar> = OnceLock::new();

/// Starts the sweep progress bar; later calls return the bar already on screen.
pub fn start_sweep_bar(total: u64) -> ProgressBar {
    SWEEP_BAR
        .get_or_init(|| {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::with_template(
                "{spinner:.blue} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} hosts ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▆▁");
            pb.set_style(style);
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        })
        .clone()
}

/// The bar while it is still drawn.
pub fn active() -> Option<&'static ProgressBar> {
    SWEEP_BAR.get().filter(|pb| !pb.is_finished())
}

pub fn finish() {
    if let Some(pb) = SWEEP_BAR.get() {
        pb.finish_and_clear();
    }
}
