use serde::{Deserialize, Serialize};

use super::error::OpenFlowError;
use super::layout;
use super::reader::OfReader;

/// Fixed 8-byte header shared by every OpenFlow message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    pub msg_type: u8,
    /// Total message size, header included.
    pub length: u16,
    pub xid: u32,
}

impl Header {
    /// Decodes the header at offset 0.
    ///
    /// An unknown `msg_type` is not an error here; dispatch reports it.
    ///
    /// # Examples
    /// ```
    /// use ofshark_core::Header;
    /// use ofshark_core::protocols::openflow::OfReader;
    ///
    /// let bytes = [0x04, 0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x07];
    /// let header = Header::parse(&OfReader::new(&bytes)).unwrap();
    /// assert_eq!(header.msg_type, 2);
    /// assert_eq!(header.xid, 7);
    /// ```
    pub fn parse(reader: &OfReader<'_>) -> Result<Self, OpenFlowError> {
        if reader.len() < layout::HEADER_LEN {
            return Err(OpenFlowError::TooShort {
                needed: layout::HEADER_LEN,
                actual: reader.len(),
            });
        }
        Ok(Self {
            version: reader.read_u8(layout::VERSION_OFFSET)?,
            msg_type: reader.read_u8(layout::TYPE_OFFSET)?,
            length: reader.read_u16(layout::LENGTH_OFFSET)?,
            xid: reader.read_u32(layout::XID_OFFSET)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; layout::HEADER_LEN] {
        let mut out = [0u8; layout::HEADER_LEN];
        out[layout::VERSION_OFFSET] = self.version;
        out[layout::TYPE_OFFSET] = self.msg_type;
        out[layout::LENGTH_OFFSET..layout::XID_OFFSET].copy_from_slice(&self.length.to_be_bytes());
        out[layout::XID_OFFSET..].copy_from_slice(&self.xid.to_be_bytes());
        out
    }

    /// Symbolic message type name, when the type code is known.
    pub fn type_name(&self) -> Option<&'static str> {
        layout::lookup_name(layout::MESSAGE_TYPE_NAMES, u64::from(self.msg_type))
    }
}

#[cfg(test)]
mod tests {
    use super::Header;
    use crate::protocols::openflow::error::OpenFlowError;
    use crate::protocols::openflow::reader::OfReader;

    #[test]
    fn parse_header_fields() {
        let bytes = [0x04, 0x0e, 0x00, 0x50, 0xde, 0xad, 0xbe, 0xef];
        let header = Header::parse(&OfReader::new(&bytes)).unwrap();
        assert_eq!(header.version, 4);
        assert_eq!(header.msg_type, 14);
        assert_eq!(header.length, 0x50);
        assert_eq!(header.xid, 0xdeadbeef);
        assert_eq!(header.type_name(), Some("OFPT_FLOW_MOD"));
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn parse_short_header() {
        let bytes = [0x04, 0x00, 0x00];
        let err = Header::parse(&OfReader::new(&bytes)).unwrap_err();
        assert_eq!(
            err,
            OpenFlowError::TooShort {
                needed: 8,
                actual: 3
            }
        );
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let bytes = [0x04, 0xc8, 0x00, 0x08, 0, 0, 0, 1];
        let header = Header::parse(&OfReader::new(&bytes)).unwrap();
        assert_eq!(header.type_name(), None);
    }
}
