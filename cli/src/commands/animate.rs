use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use ipmap_core::animate;
use tracing::info;

use super::{AnimateArgs, open_input};

pub fn animate(args: AnimateArgs) -> anyhow::Result<()> {
    info!("Reading input file list from '{}'...", args.source.display());
    let paths = animate::read_frame_list(open_input(&args.source)?)
        .with_context(|| format!("failed to read file list from '{}'", args.source.display()))?;
    info!("Loaded {} file names", paths.len());

    let file = create_private(&args.output)
        .with_context(|| format!("failed to open '{}' for writing output", args.output.display()))?;
    let mut out = BufWriter::new(file);

    let frames = animate::assemble_gif(&paths, &mut out).context("failed to encode output GIF")?;
    out.flush()?;

    info!("Wrote {frames} frames to '{}'", args.output.display());
    Ok(())
}

fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
