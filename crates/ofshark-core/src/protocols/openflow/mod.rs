//! OpenFlow 1.3 message decoding.
//!
//! A message is decoded in one pass into a tree of [`DecodeNode`]s. Record
//! decoders are plain functions looked up in an immutable [`Registry`] by
//! `(ListKind, tag)`; they emit fields through a [`Scope`] and recurse into
//! nested lists through the generic list engine. Malformed or unknown records
//! never abort the message: they become [`Anomaly`] entries on the node where
//! they were found, and their bytes are kept as raw fields.
//!
//! Wire-format constants live in `layout`, bounds-checked reads in `reader`
//! and sentinel interpretation in `reserved`.

mod actions;
mod encode;
mod error;
mod groups;
mod header;
mod hello;
mod instructions;
pub mod layout;
mod list;
mod messages;
mod meters;
mod multipart;
mod oxm;
mod ports;
mod queues;
mod reader;
mod registry;
mod reserved;
mod scope;
mod table_features;
mod tree;

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use encode::encode;
pub use error::OpenFlowError;
pub use header::Header;
pub use oxm::{OxmHeader, basic_field_name};
pub use reader::OfReader;
pub use registry::{
    DecodeFn, LengthField, ListKind, RecordLayout, Registry, RegistryBuilder, TagField,
    VariantEntry,
};
pub use reserved::{Rendering, ReservedSite};
pub use scope::Scope;
pub use tree::{Anomaly, AnomalyKind, DecodeNode, DecodedField, FieldValue, Message, NodeItem};

/// Decoder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Largest declared message length accepted before any decoding.
    pub max_message_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_message_len: layout::MAX_MESSAGE_LEN,
        }
    }
}

/// Shared OpenFlow 1.3 registry, built on first use.
pub fn default_registry() -> Arc<Registry> {
    static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(RegistryBuilder::openflow13().build())))
}

/// Stateless message decoder; cheap to clone and safe to share across threads.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use ofshark_core::{Decoder, DecoderConfig, RegistryBuilder};
/// use ofshark_core::protocols::openflow::OpenFlowError;
///
/// let registry = Arc::new(RegistryBuilder::openflow13().build());
/// let decoder = Decoder::new(registry, DecoderConfig { max_message_len: 64 });
///
/// let barrier = [0x04, 0x14, 0x00, 0x08, 0x00, 0x00, 0x00, 0x09];
/// assert_eq!(decoder.decode(&barrier).unwrap().kind(), "barrier_request");
///
/// let oversized = [0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01];
/// assert!(matches!(
///     decoder.decode(&oversized),
///     Err(OpenFlowError::MessageTooLarge { declared: 256, max: 64 })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    registry: Arc<Registry>,
    config: DecoderConfig,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(default_registry(), DecoderConfig::default())
    }
}

impl Decoder {
    pub fn new(registry: Arc<Registry>, config: DecoderConfig) -> Self {
        Self { registry, config }
    }

    /// Default registry with custom limits.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self::new(default_registry(), config)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes the message at the start of `bytes`.
    ///
    /// Bytes past the header's declared length are ignored. Fails only when
    /// fewer than 8 bytes are available or the declared length exceeds
    /// [`DecoderConfig::max_message_len`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Message, OpenFlowError> {
        let reader = OfReader::new(bytes);
        let header = Header::parse(&reader)?;
        let declared = usize::from(header.length);
        if declared > self.config.max_message_len {
            return Err(OpenFlowError::MessageTooLarge {
                declared,
                max: self.config.max_message_len,
            });
        }

        let mut framing = Vec::new();
        let mut end = declared;
        if declared < layout::HEADER_LEN {
            framing.push(Anomaly {
                offset: layout::LENGTH_OFFSET,
                len: 2,
                kind: AnomalyKind::InconsistentLength,
                message: format!(
                    "declared message length {declared} is shorter than the {}-byte header",
                    layout::HEADER_LEN
                ),
            });
            end = layout::HEADER_LEN;
        }
        let truncated = end > bytes.len();
        if truncated {
            framing.push(Anomaly {
                offset: 0,
                len: bytes.len(),
                kind: AnomalyKind::StructuralOverrun,
                message: format!(
                    "message declares {end} bytes but only {} are available",
                    bytes.len()
                ),
            });
            end = bytes.len();
        }

        let window = reader.window(layout::HEADER_LEN, end - layout::HEADER_LEN)?;
        let mut body = if header.version == self.registry.version() {
            list::decode_variant(
                &self.registry,
                window,
                ListKind::Message,
                u32::from(header.msg_type),
                truncated,
            )
        } else {
            list::unknown_node(
                &self.registry,
                window,
                ListKind::Message,
                format!(
                    "protocol version {:#04x} is not decoded by this registry ({:#04x})",
                    header.version,
                    self.registry.version()
                ),
            )
        };
        framing.append(&mut body.anomalies);
        body.anomalies = framing;

        let anomalies = body.collect_anomalies();
        for anomaly in &anomalies {
            debug!(
                xid = header.xid,
                kind = %anomaly.kind,
                offset = anomaly.offset,
                len = anomaly.len,
                "{}",
                anomaly.message
            );
        }
        Ok(Message {
            header,
            body,
            anomalies,
        })
    }
}

/// Decodes one message with the default OpenFlow 1.3 registry.
pub fn decode(bytes: &[u8]) -> Result<Message, OpenFlowError> {
    Decoder::default().decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::{AnomalyKind, Decoder, DecoderConfig, OpenFlowError, decode, encode};

    #[test]
    fn short_buffer_is_an_error() {
        let err = decode(&[0x04, 0x00, 0x00]).unwrap_err();
        assert_eq!(err, OpenFlowError::TooShort { needed: 8, actual: 3 });
    }

    #[test]
    fn oversized_length_is_rejected_before_decoding() {
        let decoder = Decoder::with_config(DecoderConfig { max_message_len: 16 });
        let bytes = [0x04, 0x02, 0x00, 0x20, 0, 0, 0, 0];
        assert!(matches!(
            decoder.decode(&bytes),
            Err(OpenFlowError::MessageTooLarge { declared: 32, max: 16 })
        ));
    }

    #[test]
    fn unknown_type_spans_body() {
        let bytes = [0x04, 0x63, 0x00, 0x0c, 0, 0, 0, 1, 1, 2, 3, 4];
        let message = decode(&bytes).unwrap();
        assert_eq!(message.kind(), "unknown_message");
        assert_eq!(message.anomalies.len(), 1);
        assert_eq!(message.anomalies[0].kind, AnomalyKind::UnknownVariant);
        assert_eq!(message.anomalies[0].offset, 8);
        assert_eq!(message.anomalies[0].len, 4);
        assert_eq!(encode(&message), bytes);
    }

    #[test]
    fn unknown_type_without_body_is_clean() {
        let message = decode(&[0x04, 0x63, 0x00, 0x08, 0, 0, 0, 1]).unwrap();
        assert!(message.is_clean());
    }

    #[test]
    fn other_versions_are_not_decoded() {
        let bytes = [0x01, 0x02, 0x00, 0x0c, 0, 0, 0, 1, 1, 2, 3, 4];
        let message = decode(&bytes).unwrap();
        assert_eq!(message.kind(), "unknown_message");
        assert_eq!(message.anomalies[0].kind, AnomalyKind::UnknownVariant);
    }

    #[test]
    fn length_below_header_is_flagged() {
        let message = decode(&[0x04, 0x14, 0x00, 0x04, 0, 0, 0, 1]).unwrap();
        assert_eq!(message.kind(), "barrier_request");
        assert_eq!(message.anomalies.len(), 1);
        assert_eq!(message.anomalies[0].kind, AnomalyKind::InconsistentLength);
    }

    #[test]
    fn truncated_message_is_decoded_partially() {
        // echo_request declaring 16 bytes with only 12 present.
        let bytes = [0x04, 0x02, 0x00, 0x10, 0, 0, 0, 1, 1, 2, 3, 4];
        let message = decode(&bytes).unwrap();
        assert_eq!(message.kind(), "echo_request");
        let kinds: Vec<_> = message.anomalies.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, [AnomalyKind::StructuralOverrun]);
        assert_eq!(message.body.field("data").unwrap().width, 4);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let bytes = [0x04, 0x14, 0x00, 0x08, 0, 0, 0, 1, 0xff, 0xff];
        let message = decode(&bytes).unwrap();
        assert!(message.is_clean());
        assert_eq!(encode(&message), &bytes[..8]);
    }
}
