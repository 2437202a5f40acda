use std::io::{Read, Seek, SeekFrom};

use super::error::PcapSourceError;
use super::layout;
use pcap_parser::Linktype;

/// Read the magic bytes and rewind the reader to the start.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use ofshark_core::source::pcap::reader::read_magic_and_rewind;
/// use std::io::Cursor;
///
/// let bytes = [0x0a, 0x0d, 0x0d, 0x0a, 0x01];
/// let mut cursor = Cursor::new(bytes);
/// let magic = read_magic_and_rewind(&mut cursor).unwrap();
/// assert_eq!(magic, [0x0a, 0x0d, 0x0d, 0x0a]);
/// ```
///
/// # Errors
/// Returns `PcapSourceError` when the reader cannot be read or rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

/// Check whether the magic bytes match PCAPNG.
pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Check whether a legacy PCAP header announces nanosecond timestamps.
pub fn is_nanosecond_magic(magic_number: u32) -> bool {
    layout::PCAP_NANOSECOND_MAGICS.contains(&magic_number)
}

/// Per-interface state collected from PCAPNG interface description blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub linktype: Linktype,
    pub tsresol: u8,
}

impl Default for InterfaceInfo {
    fn default() -> Self {
        Self {
            linktype: Linktype::ETHERNET,
            tsresol: layout::DEFAULT_TSRESOL,
        }
    }
}

/// Resolve the interface state for a given interface id, defaulting to
/// Ethernet with microsecond timestamps.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use ofshark_core::source::pcap::reader::{InterfaceInfo, interface_info};
/// use pcap_parser::Linktype;
///
/// let interfaces = [InterfaceInfo { linktype: Linktype::RAW, tsresol: 9 }];
/// assert_eq!(interface_info(&interfaces, 0).linktype, Linktype::RAW);
/// assert_eq!(interface_info(&interfaces, 1).linktype, Linktype::ETHERNET);
/// ```
pub fn interface_info(interfaces: &[InterfaceInfo], if_id: u32) -> InterfaceInfo {
    interfaces
        .get(if_id as usize)
        .copied()
        .unwrap_or_default()
}

/// Number of timestamp units per second for an `if_tsresol` value.
///
/// The high bit selects a power of two, otherwise the value is a power of ten.
/// Exponents that would overflow fall back to microseconds.
pub fn tsresol_units_per_second(tsresol: u8) -> u64 {
    let exponent = u32::from(tsresol & !layout::TSRESOL_BINARY_FLAG);
    let units = if tsresol & layout::TSRESOL_BINARY_FLAG != 0 {
        2u64.checked_pow(exponent)
    } else {
        10u64.checked_pow(exponent)
    };
    units.filter(|u| *u > 0).unwrap_or(1_000_000)
}

/// Convert PCAPNG high/low timestamp to seconds using the interface resolution.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use ofshark_core::source::pcap::reader::pcapng_ts_to_seconds;
///
/// let seconds = pcapng_ts_to_seconds(0, 1_500_000, 6);
/// assert!((seconds - 1.5).abs() < f64::EPSILON);
/// ```
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32, tsresol: u8) -> f64 {
    let ts = ((ts_high as u64) << 32) | (ts_low as u64);
    let units = tsresol_units_per_second(tsresol);
    let secs = ts / units;
    let frac = ts % units;
    secs as f64 + frac as f64 / units as f64
}

/// Convert a legacy PCAP record timestamp to seconds.
pub fn legacy_ts_to_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let scale = if nanosecond { 1e-9 } else { 1e-6 };
    ts_sec as f64 + ts_frac as f64 * scale
}
