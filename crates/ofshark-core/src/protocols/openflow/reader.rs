use std::net::{Ipv4Addr, Ipv6Addr};

use super::error::OpenFlowError;

/// Bounds-checked, random-access view over a window `[start, end)` of an
/// immutable buffer.
///
/// Offsets are absolute positions in the underlying buffer, so nodes built
/// from nested windows keep their location in the original message. A read
/// that leaves the window fails with [`OpenFlowError::OutOfBounds`] even when
/// the buffer itself continues past `end`.
///
/// # Examples
/// ```
/// use ofshark_core::protocols::openflow::OfReader;
///
/// let bytes = [0x04, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x2a];
/// let reader = OfReader::new(&bytes);
/// assert_eq!(reader.read_u16(2).unwrap(), 8);
/// assert_eq!(reader.read_u32(4).unwrap(), 42);
///
/// let header = reader.window(0, 4).unwrap();
/// assert!(header.read_u32(4).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OfReader<'a> {
    data: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> OfReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            start: 0,
            end: data.len(),
        }
    }

    /// First absolute offset inside the window.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute offset one past the last byte of the window.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Narrower window `[offset, offset + len)`, which must lie inside this one.
    pub fn window(&self, offset: usize, len: usize) -> Result<OfReader<'a>, OpenFlowError> {
        let end = self.checked_end(offset, len)?;
        Ok(Self {
            data: self.data,
            start: offset,
            end,
        })
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], OpenFlowError> {
        let end = self.checked_end(offset, len)?;
        self.data.get(offset..end).ok_or(OpenFlowError::OutOfBounds {
            offset,
            len,
            end: self.end,
        })
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, OpenFlowError> {
        let bytes = self.read_bytes(offset, 1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, OpenFlowError> {
        let bytes = self.read_bytes(offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a 24-bit big-endian integer into the low bits of a `u32`.
    pub fn read_u24(&self, offset: usize) -> Result<u32, OpenFlowError> {
        let bytes = self.read_bytes(offset, 3)?;
        Ok(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, OpenFlowError> {
        let bytes = self.read_bytes(offset, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64, OpenFlowError> {
        let bytes = self.read_bytes(offset, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    /// Reads a big-endian unsigned integer of `width` bytes (at most 8).
    pub fn read_uint(&self, offset: usize, width: usize) -> Result<u64, OpenFlowError> {
        if width > 8 {
            return Err(OpenFlowError::OutOfBounds {
                offset,
                len: width,
                end: self.end,
            });
        }
        let bytes = self.read_bytes(offset, width)?;
        Ok(bytes
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }

    pub fn read_mac(&self, offset: usize) -> Result<[u8; 6], OpenFlowError> {
        let bytes = self.read_bytes(offset, 6)?;
        let mut mac = [0u8; 6];
        mac.copy_from_slice(bytes);
        Ok(mac)
    }

    pub fn read_ipv4(&self, offset: usize) -> Result<Ipv4Addr, OpenFlowError> {
        self.read_u32(offset).map(Ipv4Addr::from)
    }

    pub fn read_ipv6(&self, offset: usize) -> Result<Ipv6Addr, OpenFlowError> {
        let bytes = self.read_bytes(offset, 16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Ipv6Addr::from(raw))
    }

    /// Fixed-length, NUL-padded string field.
    pub fn read_string(&self, offset: usize, len: usize) -> Result<String, OpenFlowError> {
        let bytes = self.read_bytes(offset, len)?;
        let raw = String::from_utf8_lossy(bytes);
        Ok(raw.trim_end_matches('\0').to_string())
    }

    fn checked_end(&self, offset: usize, len: usize) -> Result<usize, OpenFlowError> {
        let out_of_bounds = OpenFlowError::OutOfBounds {
            offset,
            len,
            end: self.end,
        };
        let end = offset.checked_add(len).ok_or(out_of_bounds.clone())?;
        if offset < self.start || end > self.end {
            return Err(out_of_bounds);
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::OfReader;
    use crate::protocols::openflow::error::OpenFlowError;

    #[test]
    fn reads_big_endian_integers() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let reader = OfReader::new(&bytes);
        assert_eq!(reader.read_u8(0).unwrap(), 1);
        assert_eq!(reader.read_u16(0).unwrap(), 0x0102);
        assert_eq!(reader.read_u24(0).unwrap(), 0x010203);
        assert_eq!(reader.read_u32(4).unwrap(), 0x05060708);
        assert_eq!(reader.read_u64(0).unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_uint(1, 3).unwrap(), 0x020304);
    }

    #[test]
    fn read_past_end_is_out_of_bounds() {
        let bytes = [0u8; 4];
        let reader = OfReader::new(&bytes);
        let err = reader.read_u32(1).unwrap_err();
        assert_eq!(
            err,
            OpenFlowError::OutOfBounds {
                offset: 1,
                len: 4,
                end: 4
            }
        );
    }

    #[test]
    fn window_restricts_reads() {
        let bytes = [0u8; 16];
        let reader = OfReader::new(&bytes);
        let window = reader.window(4, 4).unwrap();
        assert_eq!(window.start(), 4);
        assert_eq!(window.end(), 8);
        assert!(window.read_u32(4).is_ok());
        assert!(window.read_u8(8).is_err());
        assert!(window.read_u8(3).is_err());
        assert!(window.window(6, 4).is_err());
    }

    #[test]
    fn offset_overflow_is_rejected() {
        let bytes = [0u8; 4];
        let reader = OfReader::new(&bytes);
        assert!(reader.read_bytes(usize::MAX, 2).is_err());
    }

    #[test]
    fn string_is_trimmed_at_nul() {
        let bytes = *b"br-int\0\0\0\0";
        let reader = OfReader::new(&bytes);
        assert_eq!(reader.read_string(0, 10).unwrap(), "br-int");
    }

    #[test]
    fn addresses_are_decoded() {
        let mut bytes = [0u8; 26];
        bytes[..6].copy_from_slice(&[0, 1, 2, 3, 4, 5]);
        bytes[6..10].copy_from_slice(&[10, 0, 0, 1]);
        bytes[25] = 1;
        let reader = OfReader::new(&bytes);
        assert_eq!(reader.read_mac(0).unwrap(), [0, 1, 2, 3, 4, 5]);
        assert_eq!(reader.read_ipv4(6).unwrap().to_string(), "10.0.0.1");
        assert_eq!(reader.read_ipv6(10).unwrap().to_string(), "::1");
    }
}
