//! # Interchange records
//!
//! One line of the interchange stream maps to one [`ScanRecord`]. The canonical layout
//! (schema v1) is five fields separated by a single space:
//!
//! ```text
//! status protocol port address timestamp
//! up icmp 0 147.52.0.1 1700000000
//! ```
//!
//! Only the literal [`UP_KEYWORD`] marks a host as up; any other status token reads as down.
//! Lines in the older `address,status,sent,recv,rtt` layout are rejected, never reinterpreted.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ParseError;

pub const UP_KEYWORD: &str = "up";
pub const DOWN_KEYWORD: &str = "down";
pub const COMMENT_MARKER: char = '#';
pub const FIELD_SEPARATOR: char = ' ';
pub const SCHEMA_HEADER: &str = "# ipmap interchange v1: status protocol port address timestamp";

const FIELD_COUNT: usize = 5;
const LEGACY_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Up,
    Down,
}

impl Status {
    /// Binary classification: the up keyword is up, everything else is down.
    pub fn classify(token: &str) -> Self {
        if token == UP_KEYWORD { Status::Up } else { Status::Down }
    }

    pub fn is_up(self) -> bool {
        self == Status::Up
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Status::Up => UP_KEYWORD,
            Status::Down => DOWN_KEYWORD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub status: Status,
    pub protocol: String,
    pub port: u16,
    pub address: Ipv4Addr,
    pub timestamp: DateTime<Utc>,
}

impl ScanRecord {
    pub fn is_comment(line: &str) -> bool {
        line.starts_with(COMMENT_MARKER)
    }
}

impl FromStr for ScanRecord {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        if fields.len() != FIELD_COUNT {
            if fields.len() == 1 && line.split(LEGACY_SEPARATOR).count() == FIELD_COUNT {
                return Err(ParseError::LegacyLayout);
            }
            return Err(ParseError::FieldCount { found: fields.len() });
        }

        let status = Status::classify(fields[0]);
        let protocol = fields[1].to_string();

        let port = fields[2].parse::<u16>().map_err(|source| ParseError::Port {
            value: fields[2].to_string(),
            source,
        })?;

        let address = fields[3].parse::<Ipv4Addr>().map_err(|source| ParseError::Address {
            value: fields[3].to_string(),
            source,
        })?;

        let timestamp = fields[4]
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| ParseError::Timestamp {
                value: fields[4].to_string(),
            })?;

        Ok(Self {
            status,
            protocol,
            port,
            address,
            timestamp,
        })
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.status.keyword(),
            self.protocol,
            self.port,
            self.address,
            self.timestamp.timestamp()
        )
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
