//! Stitches rendered PNG snapshots into one looping GIF.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage};
use tracing::{info, warn};

use crate::error::RenderError;

/// Reads one path per line, ignoring blank lines.
pub fn read_frame_list<R: BufRead>(reader: R) -> Result<Vec<PathBuf>, RenderError> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            paths.push(PathBuf::from(line));
        }
    }
    Ok(paths)
}

/// Encodes every readable PNG of `paths` as a frame of `out`, returning the frame count.
///
/// Files that cannot be opened or are not PNGs are skipped with a warning.
pub fn assemble_gif<P, W>(paths: &[P], out: W) -> Result<usize, RenderError>
where
    P: AsRef<Path>,
    W: Write,
{
    let frames: Vec<Frame> = paths
        .iter()
        .filter_map(|path| match load_png(path.as_ref()) {
            Ok(image) => {
                info!("Converting '{}' to GIF...", path.as_ref().display());
                Some(Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(0, 1)))
            }
            Err(e) => {
                warn!("Skipping '{}': {e}", path.as_ref().display());
                None
            }
        })
        .collect();

    if frames.is_empty() {
        return Err(RenderError::NoFrames(paths.len()));
    }

    let count = frames.len();
    let mut encoder = GifEncoder::new(out);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;
    Ok(count)
}

fn load_png(path: &Path) -> Result<RgbaImage, RenderError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(image::load(reader, ImageFormat::Png)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn write_png(dir: &Path, name: &str, px: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(4, 4, Rgba(px)).save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn frame_list_skips_blank_lines() {
        let list = "a.png\n\n  b.png  \n";
        let paths = read_frame_list(Cursor::new(list)).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
    }

    #[test]
    fn unusable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_png(dir.path(), "first.png", [50, 200, 50, 255]);
        let second = write_png(dir.path(), "second.png", [50, 50, 50, 255]);
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"not a png").unwrap();
        let missing = dir.path().join("missing.png");

        let mut gif: Vec<u8> = Vec::new();
        let frames = assemble_gif(&[first, bogus, missing, second], &mut gif).unwrap();

        assert_eq!(frames, 2);
        assert!(gif.starts_with(b"GIF89a"));
    }

    #[test]
    fn no_frames_is_an_error() {
        let mut gif: Vec<u8> = Vec::new();
        let result = assemble_gif(&[PathBuf::from("/nonexistent/x.png")], &mut gif);
        assert!(matches!(result, Err(RenderError::NoFrames(1))));
    }
}
