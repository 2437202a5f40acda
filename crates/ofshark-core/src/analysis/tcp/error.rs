use thiserror::Error;

/// Errors returned by TCP segment extraction.
///
/// Note: this error type lives in an internal module; the example is
/// illustrative and not compiled as a public doctest.
///
/// # Examples
/// ```text
/// use ofshark_core::analysis::tcp::error::TcpError;
///
/// let err = TcpError::MissingNetworkLayer;
/// assert!(err.to_string().contains("missing network layer"));
/// ```
#[derive(Debug, Error)]
pub enum TcpError {
    #[error("packet slice error: {0}")]
    Slice(String),
    #[error("missing network layer in packet")]
    MissingNetworkLayer,
    #[error("missing IP payload in packet")]
    MissingIpPayload,
    #[error("segment too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid TCP data offset {data_offset} (header length {header_len})")]
    InvalidDataOffset { data_offset: u8, header_len: usize },
}
