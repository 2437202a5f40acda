//! Capture and message builders shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use etherparse::PacketBuilder;

pub const CONTROLLER: [u8; 4] = [10, 0, 0, 1];
pub const SWITCH: [u8; 4] = [10, 0, 0, 2];
pub const SWITCH_PORT: u16 = 40000;

/// OpenFlow 1.3 message with a correct header length.
pub fn message(msg_type: u8, xid: u32, body: &[u8]) -> Vec<u8> {
    let length = (8 + body.len()) as u16;
    let mut bytes = vec![0x04, msg_type];
    bytes.extend_from_slice(&length.to_be_bytes());
    bytes.extend_from_slice(&xid.to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

pub fn hello(xid: u32) -> Vec<u8> {
    // version bitmap element advertising 1.3 only
    message(0, xid, &[0x00, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x10])
}

pub fn echo_request(xid: u32, data: &[u8]) -> Vec<u8> {
    message(2, xid, data)
}

pub fn barrier_request(xid: u32) -> Vec<u8> {
    message(20, xid, &[])
}

/// Ethernet/IPv4/TCP frame carrying `payload`.
pub fn tcp_frame(
    src: [u8; 4],
    src_port: u16,
    dst: [u8; 4],
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4(src, dst, 64)
        .tcp(src_port, dst_port, 1, 65535);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("build tcp frame");
    frame
}

/// Ethernet/IPv4/UDP frame carrying `payload`.
pub fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4(SWITCH, CONTROLLER, 64)
        .udp(src_port, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .expect("build udp frame");
    frame
}

/// Switch to controller segment on port 6653.
pub fn to_controller(payload: &[u8]) -> Vec<u8> {
    tcp_frame(SWITCH, SWITCH_PORT, CONTROLLER, 6653, payload)
}

/// Controller to switch segment on port 6653.
pub fn to_switch(payload: &[u8]) -> Vec<u8> {
    tcp_frame(CONTROLLER, 6653, SWITCH, SWITCH_PORT, payload)
}

/// Writes a big-endian PCAPNG with one Ethernet interface and microsecond
/// timestamps.
pub fn write_pcapng(path: &Path, packets: &[(u64, Vec<u8>)]) {
    write_pcapng_with_tsresol(path, None, packets);
}

/// Like `write_pcapng`, with an explicit `if_tsresol` option; timestamps are in
/// units of that resolution.
pub fn write_pcapng_with_tsresol(path: &Path, tsresol: Option<u8>, packets: &[(u64, Vec<u8>)]) {
    let mut output = Vec::new();
    output.extend_from_slice(&pcapng_block(0x0A0D0D0A, &section_header_body()));
    output.extend_from_slice(&pcapng_block(1, &interface_desc_body(tsresol)));

    for (ts, data) in packets {
        output.extend_from_slice(&pcapng_block(6, &enhanced_packet_body(*ts, data)));
    }

    fs::write(path, output).expect("write pcapng");
}

/// Writes a little-endian legacy PCAP with Ethernet link type.
pub fn write_legacy_pcap(path: &Path, nanosecond: bool, packets: &[(u32, u32, Vec<u8>)]) {
    let magic: u32 = if nanosecond { 0xa1b2_3c4d } else { 0xa1b2_c3d4 };
    let mut output = Vec::new();
    output.extend_from_slice(&magic.to_le_bytes());
    output.extend_from_slice(&2u16.to_le_bytes());
    output.extend_from_slice(&4u16.to_le_bytes());
    output.extend_from_slice(&0i32.to_le_bytes());
    output.extend_from_slice(&0u32.to_le_bytes());
    output.extend_from_slice(&65535u32.to_le_bytes());
    output.extend_from_slice(&1u32.to_le_bytes());
    for (sec, frac, data) in packets {
        output.extend_from_slice(&sec.to_le_bytes());
        output.extend_from_slice(&frac.to_le_bytes());
        output.extend_from_slice(&(data.len() as u32).to_le_bytes());
        output.extend_from_slice(&(data.len() as u32).to_le_bytes());
        output.extend_from_slice(data);
    }
    fs::write(path, output).expect("write pcap");
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body(tsresol: Option<u8>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&65535u32.to_be_bytes());
    if let Some(resol) = tsresol {
        body.extend_from_slice(&9u16.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&[resol, 0, 0, 0]);
        body.extend_from_slice(&[0, 0, 0, 0]);
    }
    body
}

fn enhanced_packet_body(ts: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = ((ts >> 32) & 0xFFFF_FFFF) as u32;
    let ts_low = (ts & 0xFFFF_FFFF) as u32;
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.extend(std::iter::repeat_n(0u8, pad_len));
    body
}
