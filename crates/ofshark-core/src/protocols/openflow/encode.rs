use super::layout::HEADER_LEN;
use super::tree::Message;

/// Serializes a decoded message back to wire bytes.
///
/// The header is written first, then every leaf field of the body at its
/// recorded offset. Decoding keeps every body byte in some field (padding,
/// residue and unknown regions included), so a message decoded from `bytes`
/// encodes back to `bytes[..length]`.
///
/// # Examples
/// ```
/// use ofshark_core::{decode, encode};
///
/// let bytes = [0x04, 0x02, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x01, 0xde, 0xad, 0xbe, 0xef];
/// let message = decode(&bytes).unwrap();
/// assert_eq!(encode(&message), bytes);
/// ```
pub fn encode(message: &Message) -> Vec<u8> {
    let fields = message.body.leaf_fields();
    let len = fields
        .iter()
        .map(|field| field.end())
        .max()
        .unwrap_or(0)
        .max(message.body.end())
        .max(HEADER_LEN);
    let mut out = vec![0u8; len];
    out[..HEADER_LEN].copy_from_slice(&message.header.to_bytes());
    for field in fields {
        let bytes = field.to_bytes();
        if let Some(target) = out.get_mut(field.offset..field.offset + bytes.len()) {
            target.copy_from_slice(&bytes);
        }
    }
    out
}
