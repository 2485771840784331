//! ICMPv4 echo packets for liveness probes.
//!
//! Packets built here start at the ICMP header; the kernel adds the IPv4 header when they
//! are sent over a Layer 4 transport channel.

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpPacket, IcmpTypes, checksum};

pub const ICMP_ECHO_HDR_LEN: usize = 8;
pub const ECHO_PAYLOAD_LEN: usize = 56;

/// Identifies the echo requests of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EchoId {
    pub identifier: u16,
    pub sequence: u16,
}

pub fn random_identifier() -> u16 {
    rand::random()
}

pub fn create_echo_request(id: EchoId) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + ECHO_PAYLOAD_LEN];
    {
        let mut echo = MutableEchoRequestPacket::new(&mut buffer)
            .context("creating echo request packet")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode::new(0));
        echo.set_identifier(id.identifier);
        echo.set_sequence_number(id.sequence);
        echo.set_payload(&payload_for(id));
        echo.set_checksum(0);
    }

    let csm = {
        let icmp = IcmpPacket::new(&buffer).context("creating icmp packet")?;
        checksum(&icmp)
    };

    let mut echo = MutableEchoRequestPacket::new(&mut buffer)
        .context("creating echo request packet")?;
    echo.set_checksum(csm);
    Ok(buffer)
}

/// Reads the identifier and sequence number of an echo reply.
///
/// Returns `None` for every other ICMP message, so destination-unreachable and friends are
/// simply ignored by the caller.
pub fn parse_echo_reply(bytes: &[u8]) -> Option<EchoId> {
    let icmp = IcmpPacket::new(bytes)?;
    if icmp.get_icmp_type() != IcmpTypes::EchoReply {
        return None;
    }
    let reply = EchoReplyPacket::new(icmp.packet())?;
    Some(EchoId {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
    })
}

fn payload_for(id: EchoId) -> [u8; ECHO_PAYLOAD_LEN] {
    let mut payload = [0u8; ECHO_PAYLOAD_LEN];
    let tag: [u8; 4] = [
        (id.identifier >> 8) as u8,
        id.identifier as u8,
        (id.sequence >> 8) as u8,
        id.sequence as u8,
    ];
    for (idx, byte) in payload.iter_mut().enumerate() {
        *byte = tag[idx % tag.len()] ^ idx as u8;
    }
    payload
}
