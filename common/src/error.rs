//! Error types shared by every crate of the workspace.
//!
//! The split follows how each failure is handled by callers:
//! * [`ConfigError`] is raised while assembling a run from user input and is fatal at startup.
//! * [`ParseError`] describes one malformed interchange line; callers log it and move on.
//! * [`MappingError`] means an offset escaped the curve domain, which only happens when an
//!   upstream range check is broken. Callers abort instead of skipping.

use std::net::AddrParseError;
use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid prefix '{input}': {reason}")]
    InvalidPrefix { input: String, reason: String },

    #[error("'{0}' is an IPv6 prefix, only IPv4 is supported")]
    Ipv6Unsupported(String),

    #[error("prefix length /{0} is odd, the image range must have an even prefix length (/8, /10, /24, ...)")]
    OddPrefixLength(u8),

    #[error("curve side {0} is not a power of two between 1 and 65536")]
    InvalidCurveSide(u64),

    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("parallelism must be at least 1")]
    InvalidParallelism,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 5 space separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("line uses the legacy comma layout (address,status,sent,recv,rtt)")]
    LegacyLayout,

    #[error("invalid port '{value}': {source}")]
    Port {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid address '{value}': {source}")]
    Address {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid timestamp '{value}'")]
    Timestamp { value: String },
}

impl ParseError {
    /// Name of the interchange field that failed to parse.
    pub fn field(&self) -> &'static str {
        match self {
            ParseError::FieldCount { .. } | ParseError::LegacyLayout => "line",
            ParseError::Port { .. } => "port",
            ParseError::Address { .. } => "address",
            ParseError::Timestamp { .. } => "timestamp",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum MappingError {
    #[error("offset {offset} is outside a {side}x{side} curve")]
    OffsetOutOfRange { offset: u64, side: u32 },

    #[error("coordinate ({x}, {y}) is outside a {side}x{side} curve")]
    CoordinateOutOfRange { x: u32, y: u32, side: u32 },
}
