use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ipmap_common::record::{ScanRecord, Status};

use crate::error::ProbeError;

pub const PROBE_PROTOCOL: &str = "icmp";

/// Counters of one finished probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStats {
    pub addr: Ipv4Addr,
    pub sent: u32,
    pub received: u32,
    pub avg_rtt: Duration,
}

impl ProbeStats {
    /// A host is up only when every echo request was answered.
    pub fn status(&self) -> Status {
        if self.sent == self.received {
            Status::Up
        } else {
            Status::Down
        }
    }

    pub fn to_record(&self, finished_at: DateTime<Utc>) -> ScanRecord {
        ScanRecord {
            status: self.status(),
            protocol: PROBE_PROTOCOL.to_string(),
            port: 0,
            address: self.addr,
            timestamp: finished_at,
        }
    }
}

/// What a probe task hands to the writer.
#[derive(Debug)]
pub enum ProbeOutcome {
    Completed {
        stats: ProbeStats,
        finished_at: DateTime<Utc>,
    },
    Failed {
        addr: Ipv4Addr,
        error: ProbeError,
    },
}

/// Determines whether a single host is alive.
///
/// Implementations must finish on their own (the sweep never cancels a probe) and must not
/// panic on unreachable hosts; those are a normal `Ok` with fewer replies than requests.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, addr: Ipv4Addr) -> Result<ProbeStats, ProbeError>;
}
