//! Privileged ICMP echo prober.
//!
//! Every probe opens its own raw socket and runs on tokio's blocking pool, so a slow or
//! silent host only ever ties up its own thread until the probe timeout expires.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ipmap_common::config::ProbeConfig;
use ipmap_protocols::icmp::{self, EchoId};
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::transport::{IcmpTransportChannelIterator, icmp_packet_iter};
use tracing::trace;

use super::probe::{ProbeStats, Prober};
use crate::error::ProbeError;
use crate::network::transport::{self, IcmpChannel};

pub struct IcmpProber {
    cfg: ProbeConfig,
}

impl IcmpProber {
    /// Checks once that raw ICMP sockets can be opened before any host is probed.
    pub fn new(cfg: ProbeConfig) -> Result<Self, ProbeError> {
        transport::open_icmp_channel().map_err(ProbeError::Channel)?;
        Ok(Self { cfg })
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, addr: Ipv4Addr) -> Result<ProbeStats, ProbeError> {
        let cfg = self.cfg;
        tokio::task::spawn_blocking(move || ping(addr, cfg))
            .await
            .map_err(|_| ProbeError::Aborted(addr))?
    }
}

fn ping(addr: Ipv4Addr, cfg: ProbeConfig) -> Result<ProbeStats, ProbeError> {
    let IcmpChannel { mut tx, mut rx } =
        transport::open_icmp_channel().map_err(ProbeError::Channel)?;
    let mut replies = icmp_packet_iter(&mut rx);

    let deadline = Instant::now() + cfg.timeout;
    let mut session = EchoSession::new(addr, icmp::random_identifier(), cfg.count);

    for sequence in 0..cfg.count {
        if Instant::now() >= deadline {
            break;
        }

        let bytes = icmp::create_echo_request(EchoId {
            identifier: session.identifier,
            sequence,
        })
        .map_err(|e| ProbeError::Packet(e.to_string()))?;
        let packet = IcmpPacket::new(&bytes)
            .ok_or_else(|| ProbeError::Packet("echo request too short".to_string()))?;

        tx.send_to(packet, IpAddr::V4(addr))
            .map_err(|source| ProbeError::Send { addr, source })?;
        session.mark_sent(sequence, Instant::now());

        let wait_until = if sequence + 1 < cfg.count {
            (Instant::now() + cfg.interval).min(deadline)
        } else {
            deadline
        };
        collect_replies(&mut replies, &mut session, wait_until)?;
    }

    Ok(session.stats())
}

fn collect_replies(
    replies: &mut IcmpTransportChannelIterator<'_>,
    session: &mut EchoSession,
    until: Instant,
) -> Result<(), ProbeError> {
    let source_addr = IpAddr::V4(session.addr);
    loop {
        if session.is_finished() {
            return Ok(());
        }

        let remaining: Duration = until.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }

        match replies.next_with_timeout(remaining) {
            Ok(Some((packet, source))) if source == source_addr => {
                if let Some(id) = icmp::parse_echo_reply(packet.packet()) {
                    session.mark_received(id, Instant::now());
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(ProbeError::Receive {
                    addr: session.addr,
                    source,
                });
            }
        }
    }
}

/// Bookkeeping for the echo requests of one probe.
#[derive(Debug)]
struct EchoSession {
    addr: Ipv4Addr,
    identifier: u16,
    count: u16,
    sent_at: Vec<Option<Instant>>,
    answered: Vec<bool>,
    sent: u32,
    received: u32,
    rtt_total: Duration,
}

impl EchoSession {
    fn new(addr: Ipv4Addr, identifier: u16, count: u16) -> Self {
        Self {
            addr,
            identifier,
            count,
            sent_at: vec![None; count as usize],
            answered: vec![false; count as usize],
            sent: 0,
            received: 0,
            rtt_total: Duration::ZERO,
        }
    }

    fn mark_sent(&mut self, sequence: u16, at: Instant) {
        if let Some(slot) = self.sent_at.get_mut(sequence as usize) {
            if slot.replace(at).is_none() {
                self.sent += 1;
            }
        }
    }

    /// Counts a reply once, ignoring foreign identifiers and duplicates.
    fn mark_received(&mut self, id: EchoId, at: Instant) -> bool {
        if id.identifier != self.identifier {
            return false;
        }
        let idx = id.sequence as usize;
        let Some(Some(sent_at)) = self.sent_at.get(idx).copied() else {
            return false;
        };
        if self.answered[idx] {
            trace!(addr = %self.addr, sequence = id.sequence, "Duplicate echo reply");
            return false;
        }

        self.answered[idx] = true;
        self.received += 1;
        self.rtt_total += at.saturating_duration_since(sent_at);
        true
    }

    fn is_finished(&self) -> bool {
        self.sent == u32::from(self.count) && self.received == self.sent
    }

    fn stats(&self) -> ProbeStats {
        let avg_rtt = if self.received == 0 {
            Duration::ZERO
        } else {
            self.rtt_total / self.received
        };
        ProbeStats {
            addr: self.addr,
            sent: self.sent,
            received: self.received,
            avg_rtt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: Ipv4Addr = Ipv4Addr::new(147, 52, 0, 1);

    #[test]
    fn replies_are_matched_by_identifier_and_sequence() {
        let start = Instant::now();
        let mut session = EchoSession::new(ADDR, 42, 4);
        session.mark_sent(0, start);
        session.mark_sent(1, start);

        assert!(!session.mark_received(EchoId { identifier: 41, sequence: 0 }, start));
        assert!(!session.mark_received(EchoId { identifier: 42, sequence: 2 }, start));
        assert!(!session.mark_received(EchoId { identifier: 42, sequence: 9 }, start));
        assert!(session.mark_received(
            EchoId { identifier: 42, sequence: 0 },
            start + Duration::from_millis(10)
        ));
        assert!(!session.mark_received(EchoId { identifier: 42, sequence: 0 }, start));

        let stats = session.stats();
        assert_eq!((stats.sent, stats.received), (2, 1));
        assert_eq!(stats.avg_rtt, Duration::from_millis(10));
    }

    #[test]
    fn session_finishes_once_everything_is_answered() {
        let start = Instant::now();
        let mut session = EchoSession::new(ADDR, 1, 2);
        session.mark_sent(0, start);
        session.mark_received(EchoId { identifier: 1, sequence: 0 }, start + Duration::from_millis(4));
        assert!(!session.is_finished());

        session.mark_sent(1, start);
        session.mark_received(EchoId { identifier: 1, sequence: 1 }, start + Duration::from_millis(8));
        assert!(session.is_finished());
        assert_eq!(session.stats().avg_rtt, Duration::from_millis(6));
    }

    #[test]
    fn silent_host_has_zero_rtt() {
        let mut session = EchoSession::new(ADDR, 1, 4);
        for seq in 0..4 {
            session.mark_sent(seq, Instant::now());
        }
        let stats = session.stats();
        assert_eq!((stats.sent, stats.received), (4, 0));
        assert_eq!(stats.avg_rtt, Duration::ZERO);
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_answers_every_echo() {
        let prober = IcmpProber::new(ProbeConfig::default()).unwrap();
        let stats = prober.probe(Ipv4Addr::LOCALHOST).await.unwrap();
        assert_eq!(stats.sent, 4);
        assert_eq!(stats.received, 4);
    }

    #[tokio::test]
    #[ignore]
    async fn reserved_address_stays_silent() {
        let prober = IcmpProber::new(ProbeConfig::default()).unwrap();
        let stats = prober.probe(Ipv4Addr::new(203, 0, 113, 1)).await.unwrap();
        assert_eq!(stats.received, 0);
    }
}
