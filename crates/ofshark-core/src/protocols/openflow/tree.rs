use std::fmt;

use serde::{Deserialize, Serialize};

use super::header::Header;

/// Category of a non-fatal decoding irregularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A declared length runs past the available bytes.
    StructuralOverrun,
    /// A type tag has no decoder in the registry.
    UnknownVariant,
    /// A decoder understood fewer bytes than the record declares.
    UndecodedResidue,
    /// A declared length contradicts the record kind's fixed layout.
    InconsistentLength,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::StructuralOverrun => "structural_overrun",
            AnomalyKind::UnknownVariant => "unknown_variant",
            AnomalyKind::UndecodedResidue => "undecoded_residue",
            AnomalyKind::InconsistentLength => "inconsistent_length",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Irregular region found while decoding, attached to the node where it was
/// seen.
///
/// # Examples
/// ```
/// use ofshark_core::{Anomaly, AnomalyKind};
///
/// let anomaly = Anomaly {
///     offset: 24,
///     len: 8,
///     kind: AnomalyKind::UnknownVariant,
///     message: "unknown action type 0x0099".to_string(),
/// };
/// assert_eq!(anomaly.end(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub offset: usize,
    pub len: usize,
    pub kind: AnomalyKind,
    pub message: String,
}

impl Anomaly {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Raw content of a leaf field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Big-endian integer of at most 8 bytes.
    Uint(u64),
    /// Addresses, strings, payloads, padding and undecoded regions.
    Bytes(Vec<u8>),
}

/// Leaf value decoded from a fixed byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedField {
    pub name: String,
    pub offset: usize,
    /// Declared width in bytes.
    pub width: usize,
    pub value: FieldValue,
    /// Symbolic rendering (sentinel name, enum meaning, flags, address text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl DecodedField {
    pub fn end(&self) -> usize {
        self.offset + self.width
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self.value {
            FieldValue::Uint(value) => Some(value),
            FieldValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            FieldValue::Uint(_) => None,
            FieldValue::Bytes(bytes) => Some(bytes),
        }
    }

    /// Wire representation of the field.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.value {
            FieldValue::Uint(value) => {
                let raw = value.to_be_bytes();
                raw[raw.len().saturating_sub(self.width)..].to_vec()
            }
            FieldValue::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// Entry of a node, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeItem {
    Field(DecodedField),
    Node(DecodeNode),
}

/// Decoded subtree for one protocol record, covering `[offset, offset + len)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeNode {
    pub name: String,
    pub offset: usize,
    pub len: usize,
    pub items: Vec<NodeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

impl DecodeNode {
    pub fn new(name: impl Into<String>, offset: usize, len: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            len,
            items: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn fields(&self) -> impl Iterator<Item = &DecodedField> {
        self.items.iter().filter_map(|item| match item {
            NodeItem::Field(field) => Some(field),
            NodeItem::Node(_) => None,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = &DecodeNode> {
        self.items.iter().filter_map(|item| match item {
            NodeItem::Field(_) => None,
            NodeItem::Node(node) => Some(node),
        })
    }

    /// First direct field called `name`.
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        self.fields().find(|field| field.name == name)
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&DecodeNode> {
        self.children().find(|node| node.name == name)
    }

    /// All leaf fields of the subtree in wire order.
    pub fn leaf_fields(&self) -> Vec<&DecodedField> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    /// All anomalies of the subtree, parents before children.
    pub fn collect_anomalies(&self) -> Vec<Anomaly> {
        let mut out = Vec::new();
        self.collect_anomalies_into(&mut out);
        out
    }

    pub(crate) fn push_field(&mut self, field: DecodedField) {
        self.items.push(NodeItem::Field(field));
    }

    pub(crate) fn push_node(&mut self, node: DecodeNode) {
        self.items.push(NodeItem::Node(node));
    }

    fn collect_fields<'n>(&'n self, out: &mut Vec<&'n DecodedField>) {
        for item in &self.items {
            match item {
                NodeItem::Field(field) => out.push(field),
                NodeItem::Node(node) => node.collect_fields(out),
            }
        }
    }

    fn collect_anomalies_into(&self, out: &mut Vec<Anomaly>) {
        out.extend(self.anomalies.iter().cloned());
        for child in self.children() {
            child.collect_anomalies_into(out);
        }
    }
}

/// Fully decoded message: fixed header, body tree and every anomaly found
/// anywhere in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub header: Header,
    pub body: DecodeNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

impl Message {
    /// Name of the decoded message kind (e.g. `flow_mod`).
    pub fn kind(&self) -> &str {
        &self.body.name
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn anomalies_of(&self, kind: AnomalyKind) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |anomaly| anomaly.kind == kind)
    }
}
