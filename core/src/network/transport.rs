use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

pub struct IcmpChannel {
    pub tx: TransportSender,
    pub rx: TransportReceiver,
}

/// Opens a raw ICMPv4 socket.
///
/// Needs root or `CAP_NET_RAW`; without it the kernel answers with `EPERM`.
pub fn open_icmp_channel() -> std::io::Result<IcmpChannel> {
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)?;
    Ok(IcmpChannel { tx, rx })
}
