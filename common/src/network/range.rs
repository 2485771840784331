use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::error::ConfigError;

const IPV4_BITS: u8 = 32;

/// An IPv4 block that can be laid out on a square grid.
///
/// The prefix length is always even, so `size` is a perfect square and every address
/// gets exactly one cell on a `side x side` canvas. The base address is kept masked,
/// `193.5.16.1/22` is stored as `193.5.16.0/22`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    network: Ipv4Network,
}

impl AddressRange {
    pub fn new(base: Ipv4Addr, length: u8) -> Result<Self, ConfigError> {
        if length % 2 != 0 {
            return Err(ConfigError::OddPrefixLength(length));
        }

        let network = Ipv4Network::new(base, length).map_err(|e| ConfigError::InvalidPrefix {
            input: format!("{base}/{length}"),
            reason: e.to_string(),
        })?;

        let masked = Ipv4Network::new(network.network(), length).map_err(|e| {
            ConfigError::InvalidPrefix {
                input: format!("{base}/{length}"),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { network: masked })
    }

    pub fn base(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn length(&self) -> u8 {
        self.network.prefix()
    }

    /// Number of addresses in the block, `2^(32 - length)`.
    pub fn size(&self) -> u64 {
        1u64 << (IPV4_BITS - self.length())
    }

    /// Side of the square grid holding the block, `sqrt(size)`.
    pub fn side(&self) -> u32 {
        1u32 << ((IPV4_BITS - self.length()) / 2)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }

    /// Linear position of `addr` inside the block, `None` when it lies outside.
    pub fn offset_of(&self, addr: Ipv4Addr) -> Option<u64> {
        if !self.contains(addr) {
            return None;
        }
        Some(u64::from(u32::from(addr) - u32::from(self.base())))
    }

    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u64 = u32::from(self.base()).into();
        let end: u64 = start + self.size();
        (start..end).map(|ip| Ipv4Addr::from(ip as u32))
    }

    pub fn as_network(&self) -> Ipv4Network {
        self.network
    }
}

impl FromStr for AddressRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let network = parse_ipv4_network(s)?;
        Self::new(network.ip(), network.prefix())
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base(), self.length())
    }
}

/// Parses a prefix of any length for sweeping, masking the host bits.
///
/// Unlike [`AddressRange`] the prefix length may be odd, sweeps are never drawn.
pub fn sweep_target(s: &str) -> Result<Ipv4Network, ConfigError> {
    let network = parse_ipv4_network(s)?;
    Ipv4Network::new(network.network(), network.prefix()).map_err(|e| ConfigError::InvalidPrefix {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

fn parse_ipv4_network(s: &str) -> Result<Ipv4Network, ConfigError> {
    let trimmed = s.trim();
    if !trimmed.contains('/') {
        return Err(ConfigError::InvalidPrefix {
            input: s.to_string(),
            reason: "missing '/<length>'".to_string(),
        });
    }

    match IpNetwork::from_str(trimmed) {
        Ok(IpNetwork::V4(v4)) => Ok(v4),
        Ok(IpNetwork::V6(_)) => Err(ConfigError::Ipv6Unsupported(s.to_string())),
        Err(e) => Err(ConfigError::InvalidPrefix {
            input: s.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_masks_host_bits() {
        let range: AddressRange = "193.5.16.77/22".parse().unwrap();
        assert_eq!(range.base(), Ipv4Addr::new(193, 5, 16, 0));
        assert_eq!(range.length(), 22);
        assert_eq!(range.to_string(), "193.5.16.0/22");
    }

    #[test]
    fn even_lengths_have_integer_side() {
        for length in (0..=32u8).step_by(2) {
            let range = AddressRange::new(Ipv4Addr::new(10, 0, 0, 0), length).unwrap();
            let side = u64::from(range.side());
            assert_eq!(side * side, range.size(), "length /{length}");
            assert_eq!(range.size(), 1u64 << (32 - length));
        }
    }

    #[test]
    fn odd_lengths_are_rejected() {
        for length in (1..32u8).step_by(2) {
            let result = AddressRange::new(Ipv4Addr::new(10, 0, 0, 0), length);
            assert_eq!(result, Err(ConfigError::OddPrefixLength(length)));
        }
        assert_eq!(
            "10.0.0.0/23".parse::<AddressRange>(),
            Err(ConfigError::OddPrefixLength(23))
        );
    }

    #[test]
    fn ipv6_is_rejected() {
        let result = "2001:db8::/32".parse::<AddressRange>();
        assert!(matches!(result, Err(ConfigError::Ipv6Unsupported(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        for input in ["", "hello", "10.0.0.0", "10.0.0.0/40", "300.1.1.1/24"] {
            let result = input.parse::<AddressRange>();
            assert!(
                matches!(result, Err(ConfigError::InvalidPrefix { .. })),
                "{input:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn offsets_follow_membership() {
        let range: AddressRange = "193.5.16.0/22".parse().unwrap();
        assert_eq!(range.size(), 1024);
        assert_eq!(range.side(), 32);
        assert_eq!(range.offset_of(Ipv4Addr::new(193, 5, 16, 0)), Some(0));
        assert_eq!(range.offset_of(Ipv4Addr::new(193, 5, 17, 4)), Some(260));
        assert_eq!(range.offset_of(Ipv4Addr::new(193, 5, 19, 255)), Some(1023));
        assert_eq!(range.offset_of(Ipv4Addr::new(193, 5, 20, 0)), None);
        assert!(!range.contains(Ipv4Addr::new(193, 5, 15, 255)));
    }

    #[test]
    fn addresses_cover_the_block_in_order() {
        let range: AddressRange = "192.168.1.0/30".parse().unwrap();
        let all: Vec<Ipv4Addr> = range.addresses().collect();
        assert_eq!(
            all,
            vec![
                Ipv4Addr::new(192, 168, 1, 0),
                Ipv4Addr::new(192, 168, 1, 1),
                Ipv4Addr::new(192, 168, 1, 2),
                Ipv4Addr::new(192, 168, 1, 3),
            ]
        );
    }

    #[test]
    fn whole_internet_fits() {
        let range: AddressRange = "0.0.0.0/0".parse().unwrap();
        assert_eq!(range.size(), 1u64 << 32);
        assert_eq!(range.side(), 65536);
        assert_eq!(range.offset_of(Ipv4Addr::new(255, 255, 255, 255)), Some(u32::MAX as u64));
    }

    #[test]
    fn sweep_target_allows_odd_lengths() {
        let network = sweep_target("147.52.3.9/17").unwrap();
        assert_eq!(network.network(), Ipv4Addr::new(147, 52, 0, 0));
        assert_eq!(network.prefix(), 17);
        assert!(matches!(sweep_target("::1/128"), Err(ConfigError::Ipv6Unsupported(_))));
    }
}
