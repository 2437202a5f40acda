use thiserror::Error;

/// Hard failures of the OpenFlow decoder.
///
/// Only a missing fixed header and an oversized declared length abort a whole
/// message; every other irregularity is reported as an
/// [`Anomaly`](super::Anomaly) on the node where it occurs.
///
/// # Examples
/// ```
/// use ofshark_core::protocols::openflow::OpenFlowError;
///
/// let err = OpenFlowError::OutOfBounds { offset: 8, len: 4, end: 10 };
/// assert!(err.to_string().contains("out of bounds"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenFlowError {
    #[error("read out of bounds: {len} bytes at offset {offset}, window ends at {end}")]
    OutOfBounds { offset: usize, len: usize, end: usize },
    #[error("message too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("declared message length {declared} exceeds the configured limit of {max} bytes")]
    MessageTooLarge { declared: usize, max: usize },
}
