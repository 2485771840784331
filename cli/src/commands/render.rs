use std::io::{BufWriter, Write};

use anyhow::Context;
use ipmap_common::config::Palette;
use ipmap_core::hilbert::HilbertMapper;
use ipmap_core::ingest::Records;
use ipmap_core::render::{self, Renderer};
use tracing::{info, warn};

use super::{RenderArgs, create_output, open_input};
use crate::terminal::print;

pub fn render(args: RenderArgs) -> anyhow::Result<()> {
    let range = args.range;
    info!(
        base = %range.base(),
        length = range.length(),
        size = range.size(),
        grid = range.side(),
        "Prefix parsed"
    );

    let input = open_input(&args.input)?;
    info!("Loaded '{}'", args.input.display());

    let mapper = HilbertMapper::new(range.side()).context("failed to create hilbert curve map")?;

    let palette = Palette {
        up: args.up_color,
        down: args.down_color,
        unscanned: args.unscanned_color,
    };
    let renderer = Renderer::new(&range, &mapper, palette)?;

    let mut records = Records::new(input);
    let (canvas, painted) = renderer.paint(&mut records).context("failed to render image")?;

    if let Some(e) = records.take_error() {
        if records.stats().lines == 0 {
            return Err(e).with_context(|| format!("could not read '{}'", args.input.display()));
        }
        warn!("Input ended early, the image only covers what was read before: {e}");
    }

    let mut out = BufWriter::new(create_output(&args.output)?);
    info!("Writing {}x{} PNG...", canvas.width(), canvas.height());
    render::encode_png(&canvas, &mut out).context("failed to encode image")?;
    out.flush()
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    print::render_summary(&records.stats(), &painted);
    Ok(())
}
