use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::OpenFlowError;
use super::layout;
use super::reader::OfReader;
use super::scope::Scope;
use super::{actions, groups, instructions, messages, meters, multipart, oxm, ports, queues};
use super::{table_features, hello};

/// Decoder for one record variant. It receives a [`Scope`] positioned at the
/// first byte of the record and bounded by the record's declared length.
pub type DecodeFn = for<'a, 'r> fn(&mut Scope<'a, 'r>) -> Result<(), OpenFlowError>;

/// Family of records sharing one tag space and one framing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Message,
    HelloElement,
    Match,
    Oxm,
    OxmId,
    Action,
    ActionId,
    ActionExperimenter,
    Instruction,
    InstructionId,
    Bucket,
    BucketCounter,
    MeterBand,
    MeterBandStats,
    PacketQueue,
    QueueProperty,
    MultipartRequest,
    MultipartReply,
    FlowStats,
    TableStats,
    PortStats,
    QueueStats,
    GroupStats,
    GroupDesc,
    MeterStats,
    MeterConfig,
    Port,
    TableFeatures,
    TableFeatureProperty,
}

/// Location of a record's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    /// Untagged record; every record uses tag 0.
    None,
    U8(usize),
    U16(usize),
}

/// How a record declares its own length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// Big-endian u16 at the given record offset, counting the whole record.
    U16(usize),
    /// OXM TLV: 4-byte header plus the payload length byte at offset 3.
    OxmPayload,
    /// OXM id: the 4-byte header, plus the experimenter id for class 0xffff.
    OxmId,
    Fixed(usize),
    /// The record spans the rest of the enclosing region.
    Remaining,
}

/// Framing of one record family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Bytes needed to read the tag and the declared length.
    pub header_len: usize,
    /// Smallest legal record; shorter declared lengths are clamped to it.
    pub min_len: usize,
    pub tag: TagField,
    pub length: LengthField,
    /// Records are followed by padding up to a multiple of 8 bytes.
    pub aligned: bool,
}

impl RecordLayout {
    const fn tagged(header_len: usize, min_len: usize, length_at: usize) -> Self {
        Self {
            header_len,
            min_len,
            tag: TagField::U16(0),
            length: LengthField::U16(length_at),
            aligned: false,
        }
    }

    const fn untagged(header_len: usize, min_len: usize, length_at: usize) -> Self {
        Self {
            header_len,
            min_len,
            tag: TagField::None,
            length: LengthField::U16(length_at),
            aligned: false,
        }
    }

    const fn fixed(len: usize) -> Self {
        Self {
            header_len: len,
            min_len: len,
            tag: TagField::None,
            length: LengthField::Fixed(len),
            aligned: false,
        }
    }

    const fn remaining() -> Self {
        Self {
            header_len: 0,
            min_len: 0,
            tag: TagField::None,
            length: LengthField::Remaining,
            aligned: false,
        }
    }

    const fn aligned(self) -> Self {
        Self {
            aligned: true,
            ..self
        }
    }

    /// Reads the tag and declared length of the record at `offset`. `end` is
    /// the end of the enclosing region.
    pub fn peek(
        &self,
        reader: &OfReader<'_>,
        offset: usize,
        end: usize,
    ) -> Result<(u32, usize), OpenFlowError> {
        let tag = match self.tag {
            TagField::None => 0,
            TagField::U8(at) => u32::from(reader.read_u8(offset + at)?),
            TagField::U16(at) => u32::from(reader.read_u16(offset + at)?),
        };
        let len = match self.length {
            LengthField::U16(at) => usize::from(reader.read_u16(offset + at)?),
            LengthField::OxmPayload => {
                layout::OXM_HEADER_LEN + usize::from(reader.read_u8(offset + 3)?)
            }
            LengthField::OxmId => {
                if reader.read_u16(offset)? == layout::OFPXMC_EXPERIMENTER {
                    layout::OXM_HEADER_LEN + layout::OXM_EXPERIMENTER_ID_LEN
                } else {
                    layout::OXM_HEADER_LEN
                }
            }
            LengthField::Fixed(len) => len,
            LengthField::Remaining => end.saturating_sub(offset),
        };
        Ok((tag, len))
    }
}

impl ListKind {
    pub fn layout(self) -> RecordLayout {
        match self {
            ListKind::Message => RecordLayout {
                header_len: layout::HEADER_LEN,
                min_len: layout::HEADER_LEN,
                tag: TagField::U8(layout::TYPE_OFFSET),
                length: LengthField::U16(layout::LENGTH_OFFSET),
                aligned: false,
            },
            ListKind::HelloElement => RecordLayout::tagged(4, 4, 2).aligned(),
            ListKind::Match => {
                RecordLayout::tagged(layout::MATCH_HEADER_LEN, layout::MATCH_HEADER_LEN, 2)
                    .aligned()
            }
            ListKind::Oxm => RecordLayout {
                header_len: layout::OXM_HEADER_LEN,
                min_len: layout::OXM_HEADER_LEN,
                tag: TagField::U16(0),
                length: LengthField::OxmPayload,
                aligned: false,
            },
            ListKind::OxmId => RecordLayout {
                header_len: layout::OXM_HEADER_LEN,
                min_len: layout::OXM_HEADER_LEN,
                tag: TagField::U16(0),
                length: LengthField::OxmId,
                aligned: false,
            },
            ListKind::Action => {
                RecordLayout::tagged(layout::ACTION_HEADER_LEN, layout::ACTION_MIN_LEN, 2)
            }
            ListKind::ActionId => RecordLayout::tagged(4, 4, 2),
            ListKind::Instruction => RecordLayout::tagged(
                layout::INSTRUCTION_HEADER_LEN,
                layout::INSTRUCTION_MIN_LEN,
                2,
            ),
            ListKind::InstructionId => RecordLayout::tagged(4, 4, 2),
            ListKind::Bucket => RecordLayout::untagged(2, layout::BUCKET_MIN_LEN, 0),
            ListKind::BucketCounter => RecordLayout::fixed(layout::BUCKET_COUNTER_LEN),
            ListKind::MeterBand => {
                RecordLayout::tagged(layout::METER_BAND_HEADER_LEN, layout::METER_BAND_LEN, 2)
            }
            ListKind::MeterBandStats => RecordLayout::fixed(layout::METER_BAND_STATS_LEN),
            ListKind::PacketQueue => RecordLayout::untagged(
                layout::PACKET_QUEUE_HEADER_LEN,
                layout::PACKET_QUEUE_MIN_LEN,
                8,
            ),
            ListKind::QueueProperty => RecordLayout::tagged(
                layout::QUEUE_PROPERTY_HEADER_LEN,
                layout::QUEUE_PROPERTY_MIN_LEN,
                2,
            ),
            ListKind::ActionExperimenter
            | ListKind::MultipartRequest
            | ListKind::MultipartReply => RecordLayout::remaining(),
            ListKind::FlowStats => RecordLayout::untagged(2, layout::FLOW_STATS_MIN_LEN, 0),
            ListKind::TableStats => RecordLayout::fixed(layout::TABLE_STATS_LEN),
            ListKind::PortStats => RecordLayout::fixed(layout::PORT_STATS_LEN),
            ListKind::QueueStats => RecordLayout::fixed(layout::QUEUE_STATS_LEN),
            ListKind::GroupStats => RecordLayout::untagged(2, layout::GROUP_STATS_MIN_LEN, 0),
            ListKind::GroupDesc => RecordLayout::untagged(2, layout::GROUP_DESC_MIN_LEN, 0),
            ListKind::MeterStats => RecordLayout::untagged(6, layout::METER_STATS_MIN_LEN, 4),
            ListKind::MeterConfig => RecordLayout::untagged(2, layout::METER_CONFIG_MIN_LEN, 0),
            ListKind::Port => RecordLayout::fixed(layout::PORT_LEN),
            ListKind::TableFeatures => {
                RecordLayout::untagged(2, layout::TABLE_FEATURES_MIN_LEN, 0)
            }
            ListKind::TableFeatureProperty => {
                RecordLayout::tagged(layout::TABLE_FEATURE_PROP_HEADER_LEN, 4, 2).aligned()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Message => "message",
            ListKind::HelloElement => "hello_element",
            ListKind::Match => "match",
            ListKind::Oxm => "oxm",
            ListKind::OxmId => "oxm_id",
            ListKind::Action => "action",
            ListKind::ActionId => "action_id",
            ListKind::ActionExperimenter => "action_experimenter",
            ListKind::Instruction => "instruction",
            ListKind::InstructionId => "instruction_id",
            ListKind::Bucket => "bucket",
            ListKind::BucketCounter => "bucket_counter",
            ListKind::MeterBand => "meter_band",
            ListKind::MeterBandStats => "meter_band_stats",
            ListKind::PacketQueue => "packet_queue",
            ListKind::QueueProperty => "queue_property",
            ListKind::MultipartRequest => "multipart_request",
            ListKind::MultipartReply => "multipart_reply",
            ListKind::FlowStats => "flow_stats",
            ListKind::TableStats => "table_stats",
            ListKind::PortStats => "port_stats",
            ListKind::QueueStats => "queue_stats",
            ListKind::GroupStats => "group_stats",
            ListKind::GroupDesc => "group_desc",
            ListKind::MeterStats => "meter_stats",
            ListKind::MeterConfig => "meter_config",
            ListKind::Port => "port",
            ListKind::TableFeatures => "table_features",
            ListKind::TableFeatureProperty => "table_feature_property",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered decoder for one `(ListKind, tag)` pair.
#[derive(Clone, Copy)]
pub struct VariantEntry {
    /// Name given to the decoded node.
    pub name: &'static str,
    /// Smallest legal declared length; shorter records are clamped and flagged.
    pub min_len: usize,
    pub decode: DecodeFn,
}

impl VariantEntry {
    pub const fn new(name: &'static str, min_len: usize, decode: DecodeFn) -> Self {
        Self {
            name,
            min_len,
            decode,
        }
    }
}

impl fmt::Debug for VariantEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantEntry")
            .field("name", &self.name)
            .field("min_len", &self.min_len)
            .finish_non_exhaustive()
    }
}

/// Immutable dispatch table from `(ListKind, tag)` to record decoders, for
/// one protocol version.
///
/// # Examples
/// ```
/// use ofshark_core::{ListKind, RegistryBuilder};
///
/// let registry = RegistryBuilder::openflow13().build();
/// assert_eq!(registry.version(), 0x04);
/// assert_eq!(registry.get(ListKind::Message, 14).map(|e| e.name), Some("flow_mod"));
/// assert!(registry.get(ListKind::Action, 0x99).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    version: u8,
    variants: HashMap<(ListKind, u32), VariantEntry>,
}

impl Registry {
    /// Protocol version carried in the header of messages this registry decodes.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn get(&self, kind: ListKind, tag: u32) -> Option<&VariantEntry> {
        self.variants.get(&(kind, tag))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Collects variants before freezing them into a [`Registry`].
///
/// Registering a tag that already exists replaces the earlier entry, which is
/// how callers override or extend the stock OpenFlow 1.3 tables.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    version: u8,
    variants: HashMap<(ListKind, u32), VariantEntry>,
}

impl RegistryBuilder {
    /// Empty builder for the given header version.
    pub fn new(version: u8) -> Self {
        Self {
            version,
            variants: HashMap::new(),
        }
    }

    /// Builder preloaded with every OpenFlow 1.3 record decoder.
    pub fn openflow13() -> Self {
        let builder = Self::new(layout::OFP_VERSION_1_3);
        let builder = messages::register(builder);
        let builder = hello::register(builder);
        let builder = oxm::register(builder);
        let builder = actions::register(builder);
        let builder = instructions::register(builder);
        let builder = groups::register(builder);
        let builder = meters::register(builder);
        let builder = queues::register(builder);
        let builder = ports::register(builder);
        let builder = multipart::register(builder);
        table_features::register(builder)
    }

    pub fn register(mut self, kind: ListKind, tag: u32, entry: VariantEntry) -> Self {
        self.variants.insert((kind, tag), entry);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            version: self.version,
            variants: self.variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListKind, RegistryBuilder, VariantEntry};
    use crate::protocols::openflow::error::OpenFlowError;
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::scope::Scope;

    fn noop(_scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
        Ok(())
    }

    #[test]
    fn openflow13_registers_every_message_type() {
        let registry = RegistryBuilder::openflow13().build();
        for msg_type in 0..=29u32 {
            assert!(
                registry.get(ListKind::Message, msg_type).is_some(),
                "message type {msg_type}"
            );
        }
        assert!(registry.get(ListKind::Message, 30).is_none());
    }

    #[test]
    fn register_adds_and_replaces_variants() {
        let registry = RegistryBuilder::openflow13()
            .register(ListKind::Action, 0x99, VariantEntry::new("custom", 8, noop))
            .register(ListKind::Action, 0, VariantEntry::new("my_output", 16, noop))
            .build();
        assert_eq!(registry.get(ListKind::Action, 0x99).map(|e| e.name), Some("custom"));
        assert_eq!(registry.get(ListKind::Action, 0).map(|e| e.name), Some("my_output"));
    }

    #[test]
    fn peek_reads_tag_and_length() {
        let action = [0x00, 0x11, 0x00, 0x08, 0x81, 0x00, 0x00, 0x00];
        let reader = OfReader::new(&action);
        let layout = ListKind::Action.layout();
        assert_eq!(layout.peek(&reader, 0, 8).unwrap(), (0x11, 8));

        let oxm = [0x80, 0x00, 0x06, 0x06];
        let reader = OfReader::new(&oxm);
        assert_eq!(ListKind::Oxm.layout().peek(&reader, 0, 4).unwrap(), (0x8000, 10));

        let oxm_id = [0xff, 0xff, 0x00, 0x04];
        let reader = OfReader::new(&oxm_id);
        assert_eq!(ListKind::OxmId.layout().peek(&reader, 0, 4).unwrap(), (0xffff, 8));
    }

    #[test]
    fn fixed_and_remaining_layouts() {
        let bytes = [0u8; 40];
        let reader = OfReader::new(&bytes);
        assert_eq!(ListKind::QueueStats.layout().peek(&reader, 0, 40).unwrap(), (0, 40));
        assert_eq!(
            ListKind::MultipartReply.layout().peek(&reader, 16, 40).unwrap(),
            (0, 24)
        );
    }
}
