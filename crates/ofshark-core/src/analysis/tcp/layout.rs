//! TCP header offsets used when stripping the header from an IP payload.

/// Fixed part of the TCP header.
pub const TCP_MIN_HEADER_LEN: usize = 20;
/// Byte holding the data offset in its upper nibble.
pub const TCP_DATA_OFFSET_INDEX: usize = 12;
/// Data offset is counted in 32-bit words.
pub const TCP_DATA_OFFSET_UNIT: usize = 4;
