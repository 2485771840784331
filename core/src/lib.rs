//! Sweeping, mapping and rendering for ipmap.

pub mod animate;
pub mod error;
pub mod hilbert;
pub mod ingest;
pub mod network;
pub mod render;
pub mod scanner;
