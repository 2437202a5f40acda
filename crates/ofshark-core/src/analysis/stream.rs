//! Splits a byte stream of back-to-back OpenFlow messages at header length
//! boundaries.
//!
//! There is no reassembly across TCP segments: a message cut by the segment
//! boundary comes back as a short slice and is reported by the decoder as a
//! structural overrun.

use crate::protocols::openflow::layout;

/// One message-sized slice of a stream, with its offset in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSlice<'a> {
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Cuts `stream` into consecutive messages using each header's declared
/// length.
///
/// A declared length below the header size still advances by the header size.
/// Trailing bytes that cannot hold a header, or a message running past the
/// end, are returned as the final slice.
///
/// # Examples
/// ```
/// use ofshark_core::split_messages;
///
/// let stream = [
///     0x04, 0x14, 0x00, 0x08, 0, 0, 0, 1, // barrier request
///     0x04, 0x02, 0x00, 0x0a, 0, 0, 0, 2, 0xaa, 0xbb, // echo request
///     0x04, 0x00, // cut short
/// ];
/// let slices = split_messages(&stream);
/// assert_eq!(slices.len(), 3);
/// assert_eq!(slices[1].offset, 8);
/// assert_eq!(slices[1].bytes.len(), 10);
/// assert_eq!(slices[2].bytes, &[0x04, 0x00]);
/// ```
pub fn split_messages(stream: &[u8]) -> Vec<MessageSlice<'_>> {
    let mut slices = Vec::new();
    let mut offset = 0;
    while offset < stream.len() {
        let rest = &stream[offset..];
        let declared = rest
            .get(layout::LENGTH_OFFSET..layout::LENGTH_OFFSET + 2)
            .map(|b| usize::from(u16::from_be_bytes([b[0], b[1]])));
        let take = match declared {
            Some(len) => len.max(layout::HEADER_LEN).min(rest.len()),
            None => rest.len(),
        };
        slices.push(MessageSlice {
            offset,
            bytes: &rest[..take],
        });
        offset += take;
    }
    slices
}
