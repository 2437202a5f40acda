/// Wire alignment shared by padded OpenFlow records.
pub(crate) const ALIGNMENT: usize = 8;

/// Number of zero bytes that follow a record of `length` bytes so the next
/// record starts on an `ALIGNMENT` boundary.
///
/// Only the pre-padding length matters; the padding content is never checked.
pub(crate) fn padding_len(length: usize) -> usize {
    length.next_multiple_of(ALIGNMENT) - length
}
