#![cfg(test)]
use std::io::Cursor;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ipmap_common::config::{Palette, SweepConfig};
use ipmap_common::network::range::AddressRange;
use ipmap_common::record::{SCHEMA_HEADER, Status};
use ipmap_core::error::ProbeError;
use ipmap_core::hilbert::HilbertMapper;
use ipmap_core::ingest::Records;
use ipmap_core::render::Renderer;
use ipmap_core::scanner::{self, ProbeStats, Prober};

/// Answers for every address whose last octet is a multiple of `modulus`.
struct PatternProber {
    modulus: u8,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl PatternProber {
    fn new(modulus: u8) -> Self {
        Self {
            modulus,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Prober for PatternProber {
    async fn probe(&self, addr: Ipv4Addr) -> Result<ProbeStats, ProbeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let received = if addr.octets()[3] % self.modulus == 0 { 4 } else { 0 };
        Ok(ProbeStats {
            addr,
            sent: 4,
            received,
            avg_rtt: Duration::from_millis(7),
        })
    }
}

#[tokio::test]
async fn sweep_output_feeds_the_renderer() {
    let range: AddressRange = "172.16.4.0/24".parse().unwrap();
    let prober = Arc::new(PatternProber::new(16));
    let cfg = SweepConfig::new(32).unwrap();

    let (sink, summary) = scanner::sweep(range.addresses(), prober.clone(), Vec::new(), &cfg, None)
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 256);
    assert_eq!(summary.up, 16);
    assert_eq!(summary.down, 240);
    assert!(prober.peak.load(Ordering::SeqCst) <= 32);

    let text = String::from_utf8(sink).unwrap();
    assert_eq!(text.lines().next(), Some(SCHEMA_HEADER));

    let mut records = Records::new(Cursor::new(text.as_str()));
    let parsed: Vec<_> = records.by_ref().collect();
    assert_eq!(parsed.len(), 256);
    assert_eq!(records.stats().rejected, 0);
    assert_eq!(parsed.iter().filter(|r| r.status == Status::Up).count(), 16);

    let mapper = HilbertMapper::new(range.side()).unwrap();
    let palette = Palette::default();
    let renderer = Renderer::new(&range, &mapper, palette).unwrap();
    let (canvas, stats) = renderer.paint(parsed).unwrap();

    assert_eq!(stats.painted_up, 16);
    let up = image::Rgba(palette.up.to_rgba());
    assert_eq!(canvas.pixels().filter(|p| **p == up).count(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sweep_respects_a_tiny_ceiling() {
    let range: AddressRange = "10.9.0.0/26".parse().unwrap();
    let prober = Arc::new(PatternProber::new(1));
    let cfg = SweepConfig::new(2).unwrap();

    let (_, summary) = scanner::sweep(range.addresses(), prober.clone(), Vec::new(), &cfg, None)
        .await
        .unwrap();

    assert_eq!(summary.written(), 64);
    assert_eq!(summary.up, 64);
    assert!(prober.peak.load(Ordering::SeqCst) <= 2);
}
