//! Constants for PCAP/PCAPNG input handling.

/// Section header block type, as it appears in the first four bytes of a PCAPNG file.
pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Buffer size handed to the `pcap-parser` streaming readers.
pub const PCAP_READER_BUFFER_SIZE: usize = 65536;

/// Interface timestamp resolution used when `if_tsresol` is absent (microseconds).
pub const DEFAULT_TSRESOL: u8 = 6;

/// Legacy PCAP magic numbers announcing nanosecond timestamps (both byte orders).
pub const PCAP_NANOSECOND_MAGICS: [u32; 2] = [0xa1b2_3c4d, 0x4d3c_b2a1];

/// `if_tsresol` bit selecting a power-of-two resolution.
pub const TSRESOL_BINARY_FLAG: u8 = 0x80;
