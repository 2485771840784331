//! Paints scan records onto a Hilbert-ordered canvas.

use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use ipmap_common::config::Palette;
use ipmap_common::network::range::AddressRange;
use ipmap_common::record::{ScanRecord, Status};
use tracing::{debug, info, trace};

use crate::error::RenderError;
use crate::hilbert::HilbertMapper;

pub type Canvas = RgbaImage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaintStats {
    pub painted_up: usize,
    pub painted_down: usize,
    pub out_of_range: usize,
}

pub struct Renderer<'a> {
    range: &'a AddressRange,
    mapper: &'a HilbertMapper,
    palette: Palette,
}

impl<'a> Renderer<'a> {
    pub fn new(
        range: &'a AddressRange,
        mapper: &'a HilbertMapper,
        palette: Palette,
    ) -> Result<Self, RenderError> {
        if mapper.side() != range.side() {
            return Err(RenderError::SideMismatch {
                mapper: mapper.side(),
                range: range.side(),
            });
        }
        Ok(Self {
            range,
            mapper,
            palette,
        })
    }

    /// Paints every in-range record on a fresh canvas.
    ///
    /// A [`MappingError`](ipmap_common::error::MappingError) aborts the pass: the offset came
    /// from a range membership check, so a failure means the range and curve disagree.
    pub fn paint<I>(&self, records: I) -> Result<(Canvas, PaintStats), RenderError>
    where
        I: IntoIterator<Item = ScanRecord>,
    {
        let side = self.range.side();
        let background = Rgba(self.palette.background().to_rgba());
        let up = Rgba(self.palette.up.to_rgba());
        let down = Rgba(self.palette.down.to_rgba());

        let mut canvas: Canvas = RgbaImage::from_pixel(side, side, background);
        let mut stats = PaintStats::default();
        // Indexed by curve offset, independent of the palette colors.
        let mut cells: Vec<Option<Status>> = vec![None; self.range.size() as usize];

        for record in records {
            let Some(offset) = self.range.offset_of(record.address) else {
                trace!(address = %record.address, "Ignoring address outside {}", self.range);
                stats.out_of_range += 1;
                continue;
            };

            let (x, y) = self.mapper.map(offset)?;
            let cell = &mut cells[offset as usize];

            match (record.status, *cell) {
                (_, Some(Status::Up)) => {}
                (Status::Up, _) => {
                    canvas.put_pixel(x, y, up);
                    *cell = Some(Status::Up);
                    stats.painted_up += 1;
                }
                // Up wins over down when an address shows up more than once.
                (Status::Down, None) if self.palette.unscanned.is_some() => {
                    canvas.put_pixel(x, y, down);
                    *cell = Some(Status::Down);
                    stats.painted_down += 1;
                }
                (Status::Down, _) => {}
            }
        }

        debug!(
            up = stats.painted_up,
            down = stats.painted_down,
            skipped = stats.out_of_range,
            "Canvas painted"
        );
        Ok((canvas, stats))
    }

    /// Paints the records and writes the canvas as PNG to `out`.
    pub fn render<I, W>(&self, records: I, out: W) -> Result<PaintStats, RenderError>
    where
        I: IntoIterator<Item = ScanRecord>,
        W: Write,
    {
        let (canvas, stats) = self.paint(records)?;
        info!("Writing {}x{} PNG...", canvas.width(), canvas.height());
        encode_png(&canvas, out)?;
        Ok(stats)
    }
}

pub fn encode_png<W: Write>(canvas: &Canvas, out: W) -> Result<(), RenderError> {
    PngEncoder::new(out).write_image(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(())
}
