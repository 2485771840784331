pub mod animate;
pub mod render;
pub mod sweep;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ipmap_common::color::Color;
use ipmap_common::config::DEFAULT_PARALLELISM;
use ipmap_common::network::range::AddressRange;

const STDIO_PATH: &str = "-";

#[derive(Parser)]
#[command(name = "ipmap")]
#[command(about = "Sweep IPv4 blocks for live hosts and draw them on a Hilbert curve.")]
#[command(version)]
pub struct CommandLine {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ping every address of a block and record which hosts answer
    #[command(alias = "s")]
    Sweep(SweepArgs),
    /// Draw an interchange file as a PNG
    #[command(alias = "r")]
    Render(RenderArgs),
    /// Combine a list of PNGs into an animated GIF
    #[command(alias = "a")]
    Animate(AnimateArgs),
}

#[derive(Args)]
pub struct SweepArgs {
    /// Block to sweep, any prefix length
    #[arg(default_value = "147.52.0.0/16")]
    pub target: String,

    /// Number of parallel pings
    #[arg(short = 'g', long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: usize,

    /// Output file, defaults to sweep-<base>_<length>-<date>.txt
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Results buffered between probes and the writer, defaults to twice the parallelism
    #[arg(long)]
    pub queue_depth: Option<usize>,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Interchange file to draw, '-' for stdin
    #[arg(short, long, default_value = STDIO_PATH)]
    pub input: PathBuf,

    /// PNG file to write, '-' for stdout
    #[arg(short, long, default_value = STDIO_PATH)]
    pub output: PathBuf,

    /// Range to draw, the prefix length must be even
    #[arg(short, long, default_value = "193.5.16.0/22")]
    pub range: AddressRange,

    /// Color used for hosts that are up
    #[arg(short, long, default_value = "#32c832")]
    pub up_color: Color,

    /// Color used for hosts that are down
    #[arg(short, long, default_value = "#323232")]
    pub down_color: Color,

    /// Color for addresses without any record, by default they share the down color
    #[arg(long)]
    pub unscanned_color: Option<Color>,
}

#[derive(Args)]
pub struct AnimateArgs {
    /// File listing one PNG per line, '-' for stdin
    #[arg(short, long, default_value = STDIO_PATH)]
    pub source: PathBuf,

    /// GIF file to write
    #[arg(short, long, default_value = "animated.gif")]
    pub output: PathBuf,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub(crate) fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new(STDIO_PATH) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("could not open '{}'", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

pub(crate) fn create_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path == Path::new(STDIO_PATH) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create '{}' for writing", path.display()))?;
    Ok(Box::new(file))
}
