use std::net::Ipv4Addr;

use ipmap_common::error::{ConfigError, MappingError};
use thiserror::Error;

/// Failure of a single host probe. Never fatal for a sweep.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to open raw ICMP socket (root or CAP_NET_RAW required): {0}")]
    Channel(#[source] std::io::Error),

    #[error("failed to send echo request to {addr}: {source}")]
    Send {
        addr: Ipv4Addr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to receive echo reply from {addr}: {source}")]
    Receive {
        addr: Ipv4Addr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build echo request: {0}")]
    Packet(String),

    #[error("probe task for {0} stopped before finishing")]
    Aborted(Ipv4Addr),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("prober is unusable: {0}")]
    Probe(#[from] ProbeError),

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("result writer stopped unexpectedly: {0}")]
    Writer(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("curve side {mapper} does not match range side {range}")]
    SideMismatch { mapper: u32, range: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("none of the {0} listed files could be used as a frame")]
    NoFrames(usize),
}
