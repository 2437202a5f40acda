use super::error::TcpError;
use super::layout;

/// Bounds-checked view over a TCP segment (header plus payload).
pub struct TcpReader<'a> {
    segment: &'a [u8],
}

impl<'a> TcpReader<'a> {
    pub fn new(segment: &'a [u8]) -> Self {
        Self { segment }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), TcpError> {
        if self.segment.len() < needed {
            return Err(TcpError::TooShort {
                needed,
                actual: self.segment.len(),
            });
        }
        Ok(())
    }

    /// Header length in bytes, from the data offset nibble.
    pub fn header_len(&self) -> Result<usize, TcpError> {
        self.require_len(layout::TCP_MIN_HEADER_LEN)?;
        let data_offset = self
            .segment
            .get(layout::TCP_DATA_OFFSET_INDEX)
            .map(|b| b >> 4)
            .ok_or(TcpError::TooShort {
                needed: layout::TCP_MIN_HEADER_LEN,
                actual: self.segment.len(),
            })?;
        let header_len = usize::from(data_offset) * layout::TCP_DATA_OFFSET_UNIT;
        if header_len < layout::TCP_MIN_HEADER_LEN {
            return Err(TcpError::InvalidDataOffset {
                data_offset,
                header_len,
            });
        }
        Ok(header_len)
    }

    pub fn payload_without_header(&self) -> Result<&'a [u8], TcpError> {
        let header_len = self.header_len()?;
        self.require_len(header_len)?;
        self.segment.get(header_len..).ok_or(TcpError::TooShort {
            needed: header_len,
            actual: self.segment.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TcpReader;
    use crate::analysis::tcp::error::TcpError;

    fn segment(data_offset: u8, total: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; total];
        bytes[12] = data_offset << 4;
        bytes
    }

    #[test]
    fn payload_without_header_ok() {
        let bytes = segment(5, 24);
        let reader = TcpReader::new(&bytes);
        assert_eq!(reader.payload_without_header().unwrap().len(), 4);
    }

    #[test]
    fn payload_skips_options() {
        let bytes = segment(8, 40);
        let reader = TcpReader::new(&bytes);
        assert_eq!(reader.header_len().unwrap(), 32);
        assert_eq!(reader.payload_without_header().unwrap().len(), 8);
    }

    #[test]
    fn payload_without_header_too_short() {
        let bytes = [0u8; 19];
        let reader = TcpReader::new(&bytes);
        let err = reader.payload_without_header().unwrap_err();
        assert!(matches!(err, TcpError::TooShort { needed: 20, .. }));
    }

    #[test]
    fn data_offset_below_minimum() {
        let bytes = segment(4, 20);
        let reader = TcpReader::new(&bytes);
        assert!(matches!(
            reader.header_len(),
            Err(TcpError::InvalidDataOffset { data_offset: 4, header_len: 16 })
        ));
    }

    #[test]
    fn options_past_segment_end() {
        let bytes = segment(15, 24);
        let reader = TcpReader::new(&bytes);
        assert!(matches!(
            reader.payload_without_header(),
            Err(TcpError::TooShort { needed: 60, actual: 24 })
        ));
    }
}
