use super::error::OpenFlowError;
use super::layout::{self, NameTable};
use super::list;
use super::reader::OfReader;
use super::registry::{ListKind, Registry};
use super::reserved::ReservedSite;
use super::tree::{Anomaly, AnomalyKind, DecodeNode, DecodedField, FieldValue};

/// Field emitter handed to record decoders.
///
/// A scope owns the node being built for one record and a cursor position
/// inside the record's window. Every emitting call reads at the current
/// position, appends a field or child node in wire order and advances.
/// Reads past the record's declared end fail with
/// [`OpenFlowError::OutOfBounds`]; the engine turns that failure into an
/// anomaly and keeps the unread bytes as a raw field.
///
/// # Examples
/// ```
/// use ofshark_core::{ListKind, RegistryBuilder, VariantEntry, Scope};
/// use ofshark_core::protocols::openflow::OpenFlowError;
///
/// fn nicira_noop(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
///     scope.u16("subtype")?;
///     scope.pad(6)?;
///     Ok(())
/// }
///
/// let registry = RegistryBuilder::openflow13()
///     .register(
///         ListKind::ActionExperimenter,
///         0x0000_2320,
///         VariantEntry::new("nicira_noop", 0, nicira_noop),
///     )
///     .build();
/// assert!(registry.get(ListKind::ActionExperimenter, 0x2320).is_some());
/// ```
pub struct Scope<'a, 'r> {
    registry: &'r Registry,
    reader: OfReader<'a>,
    pos: usize,
    node: DecodeNode,
}

impl<'a, 'r> Scope<'a, 'r> {
    pub(crate) fn new(registry: &'r Registry, reader: OfReader<'a>, name: &str) -> Self {
        Self {
            registry,
            reader,
            pos: reader.start(),
            node: DecodeNode::new(name, reader.start(), reader.len()),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn reader(&self) -> OfReader<'a> {
        self.reader
    }

    /// Absolute offset of the next byte to decode.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn start(&self) -> usize {
        self.reader.start()
    }

    pub fn end(&self) -> usize {
        self.reader.end()
    }

    pub fn remaining(&self) -> usize {
        self.end().saturating_sub(self.pos)
    }

    /// Bytes consumed since the start of the record.
    pub fn consumed(&self) -> usize {
        self.pos - self.start()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.node.name = name.into();
    }

    /// Big-endian integer of `width` bytes.
    pub fn uint(&mut self, name: &str, width: usize) -> Result<u64, OpenFlowError> {
        self.uint_display(name, width, |_| None)
    }

    /// Integer field with a symbolic rendering computed from its value.
    pub fn uint_display(
        &mut self,
        name: &str,
        width: usize,
        display: impl FnOnce(u64) -> Option<String>,
    ) -> Result<u64, OpenFlowError> {
        let value = self.reader.read_uint(self.pos, width)?;
        self.emit(name, width, FieldValue::Uint(value), display(value));
        Ok(value)
    }

    pub fn u8(&mut self, name: &str) -> Result<u8, OpenFlowError> {
        self.uint(name, 1).map(|value| value as u8)
    }

    pub fn u16(&mut self, name: &str) -> Result<u16, OpenFlowError> {
        self.uint(name, 2).map(|value| value as u16)
    }

    pub fn u24(&mut self, name: &str) -> Result<u32, OpenFlowError> {
        self.uint(name, 3).map(|value| value as u32)
    }

    pub fn u32(&mut self, name: &str) -> Result<u32, OpenFlowError> {
        self.uint(name, 4).map(|value| value as u32)
    }

    pub fn u64(&mut self, name: &str) -> Result<u64, OpenFlowError> {
        self.uint(name, 8)
    }

    /// Enumeration field rendered through `table`.
    pub fn named(&mut self, name: &str, width: usize, table: NameTable) -> Result<u64, OpenFlowError> {
        self.uint_display(name, width, |value| {
            layout::lookup_name(table, value).map(str::to_string)
        })
    }

    /// Bit-set field rendered as `A|B` through `table`.
    pub fn flags(&mut self, name: &str, width: usize, table: NameTable) -> Result<u64, OpenFlowError> {
        self.uint_display(name, width, |value| Some(layout::render_flags(table, value)))
    }

    /// Identifier that may hold a reserved sentinel; sentinels get a display.
    pub fn reserved(&mut self, name: &str, site: ReservedSite) -> Result<u64, OpenFlowError> {
        self.uint_display(name, site.width(), |value| {
            let rendering = site.interpret(value);
            rendering.is_sentinel().then(|| rendering.to_string())
        })
    }

    pub fn mac(&mut self, name: &str) -> Result<[u8; 6], OpenFlowError> {
        let mac = self.reader.read_mac(self.pos)?;
        let text = mac
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(":");
        self.emit(name, 6, FieldValue::Bytes(mac.to_vec()), Some(text));
        Ok(mac)
    }

    pub fn ipv4(&mut self, name: &str) -> Result<(), OpenFlowError> {
        let addr = self.reader.read_ipv4(self.pos)?;
        self.emit(
            name,
            4,
            FieldValue::Bytes(addr.octets().to_vec()),
            Some(addr.to_string()),
        );
        Ok(())
    }

    pub fn ipv6(&mut self, name: &str) -> Result<(), OpenFlowError> {
        let addr = self.reader.read_ipv6(self.pos)?;
        self.emit(
            name,
            16,
            FieldValue::Bytes(addr.octets().to_vec()),
            Some(addr.to_string()),
        );
        Ok(())
    }

    pub fn bytes(&mut self, name: &str, len: usize) -> Result<&'a [u8], OpenFlowError> {
        let bytes = self.reader.read_bytes(self.pos, len)?;
        self.emit(name, len, FieldValue::Bytes(bytes.to_vec()), None);
        Ok(bytes)
    }

    /// Fixed-length NUL-padded text field.
    pub fn string(&mut self, name: &str, len: usize) -> Result<String, OpenFlowError> {
        let text = self.reader.read_string(self.pos, len)?;
        let bytes = self.reader.read_bytes(self.pos, len)?;
        self.emit(name, len, FieldValue::Bytes(bytes.to_vec()), Some(text.clone()));
        Ok(text)
    }

    /// Skips `len` padding bytes, kept as a `pad` field and never validated.
    pub fn pad(&mut self, len: usize) -> Result<(), OpenFlowError> {
        if len > 0 {
            self.bytes("pad", len)?;
        }
        Ok(())
    }

    /// Everything up to the record end as one raw field; returns its length.
    /// Emits nothing when the record is already exhausted.
    pub fn rest(&mut self, name: &str) -> Result<usize, OpenFlowError> {
        let len = self.remaining();
        if len > 0 {
            self.bytes(name, len)?;
        }
        Ok(len)
    }

    /// Records an anomaly on this scope's node.
    pub fn anomaly(&mut self, kind: AnomalyKind, offset: usize, len: usize, message: impl Into<String>) {
        self.node.anomalies.push(Anomaly {
            offset,
            len,
            kind,
            message: message.into(),
        });
    }

    /// Decodes `[pos, end)` as a sequence of `kind` records appended as
    /// children, then moves to `end` (clamped to the record end).
    pub fn list(&mut self, kind: ListKind, end: usize) -> Result<(), OpenFlowError> {
        list::decode_list(self, kind, end)
    }

    /// Decodes exactly one `kind` record at the current position.
    pub fn record(&mut self, kind: ListKind) -> Result<(), OpenFlowError> {
        list::decode_record(self, kind)
    }

    /// Decodes `[pos, end)` as the `(kind, tag)` variant; an unregistered tag
    /// becomes an `unknown_*` node carrying an `UnknownVariant` anomaly.
    pub fn dispatch(&mut self, kind: ListKind, tag: u32, end: usize) -> Result<(), OpenFlowError> {
        let len = end.checked_sub(self.pos).ok_or(OpenFlowError::OutOfBounds {
            offset: self.pos,
            len: 0,
            end,
        })?;
        let window = self.reader.window(self.pos, len)?;
        let node = list::decode_variant(self.registry, window, kind, tag, false);
        self.push_node(node);
        self.pos = end;
        Ok(())
    }

    pub(crate) fn push_node(&mut self, node: DecodeNode) {
        self.node.push_node(node);
    }

    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Keeps unread bytes as an `undecoded` field with an `UndecodedResidue`
    /// anomaly.
    pub(crate) fn residue(&mut self) {
        let offset = self.pos;
        let len = self.remaining();
        if len == 0 {
            return;
        }
        self.raw_tail("undecoded");
        self.anomaly(
            AnomalyKind::UndecodedResidue,
            offset,
            len,
            format!("{len} bytes of {} left undecoded", self.node.name),
        );
    }

    /// Keeps unread bytes as a raw field without flagging them.
    pub(crate) fn raw_tail(&mut self, name: &str) {
        if let Ok(bytes) = self.reader.read_bytes(self.pos, self.remaining()) {
            if !bytes.is_empty() {
                self.emit(name, bytes.len(), FieldValue::Bytes(bytes.to_vec()), None);
            }
        }
    }

    pub(crate) fn node_mut(&mut self) -> &mut DecodeNode {
        &mut self.node
    }

    pub(crate) fn finish(self) -> DecodeNode {
        self.node
    }

    fn emit(&mut self, name: &str, width: usize, value: FieldValue, display: Option<String>) {
        self.node.push_field(DecodedField {
            name: name.to_string(),
            offset: self.pos,
            width,
            value,
            display,
        });
        self.pos += width;
    }
}
