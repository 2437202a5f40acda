use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::TcpError;
use super::reader::TcpReader;

/// Parsed TCP segment with source/destination endpoints.
pub struct TcpSegment<'a> {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

impl TcpSegment<'_> {
    /// True when either endpoint uses one of `ports`.
    pub fn touches_any(&self, ports: &[u16]) -> bool {
        ports.contains(&self.src_port) || ports.contains(&self.dst_port)
    }
}

/// Parse a TCP segment from a link-layer frame.
///
/// Returns `Ok(None)` when the frame does not carry TCP or the link type is
/// not Ethernet or raw IP.
pub fn parse_tcp_segment(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<TcpSegment<'_>>, TcpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| TcpError::Slice(e.to_string()))?
        }
        Linktype::RAW => SlicedPacket::from_ip(data).map_err(|e| TcpError::Slice(e.to_string()))?,
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(TcpError::MissingNetworkLayer)?;
    let transport = match sliced.transport {
        Some(transport) => transport,
        None => return Ok(None),
    };
    let tcp = match transport {
        TransportSlice::Tcp(tcp) => tcp,
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    let ip_payload = net.ip_payload_ref().ok_or(TcpError::MissingIpPayload)?;
    let reader = TcpReader::new(ip_payload.payload);
    let payload = reader.payload_without_header()?;

    Ok(Some(TcpSegment {
        src_ip,
        src_port: tcp.source_port(),
        dst_ip,
        dst_port: tcp.destination_port(),
        payload,
    }))
}
