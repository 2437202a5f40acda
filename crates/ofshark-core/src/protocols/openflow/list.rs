//! Generic iteration over self-describing, length-prefixed records.
//!
//! Iteration advances by each record's declared length, never by what its
//! decoder consumed. Undersized declared lengths are clamped to the record
//! minimum and flagged, so every step makes progress.

use tracing::{debug, trace};

use super::error::OpenFlowError;
use super::reader::OfReader;
use super::registry::{ListKind, RecordLayout, Registry};
use super::scope::Scope;
use super::tree::{Anomaly, AnomalyKind, DecodeNode, DecodedField, FieldValue};
use crate::protocols::common::reader::padding_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Decodes `window` as the `(kind, tag)` variant.
///
/// Bytes the decoder leaves unread become an `UndecodedResidue`, except in a
/// `truncated` record whose overrun the parent already reports. A decoder
/// that runs out of bytes keeps the remainder raw and flags the record as
/// `InconsistentLength`, unless `truncated` says the overrun was already
/// reported on the parent.
pub(crate) fn decode_variant(
    registry: &Registry,
    window: OfReader<'_>,
    kind: ListKind,
    tag: u32,
    truncated: bool,
) -> DecodeNode {
    let Some(entry) = registry.get(kind, tag) else {
        return unknown_node(
            registry,
            window,
            kind,
            format!("unknown {kind} type {tag:#06x}"),
        );
    };
    let mut scope = Scope::new(registry, window, entry.name);
    match (entry.decode)(&mut scope) {
        Ok(()) if truncated => scope.raw_tail("undecoded"),
        Ok(()) => scope.residue(),
        Err(err) => {
            scope.raw_tail("undecoded");
            let already_flagged = truncated
                || scope
                    .node_mut()
                    .anomalies
                    .iter()
                    .any(|anomaly| anomaly.kind == AnomalyKind::StructuralOverrun);
            if !already_flagged {
                scope.anomaly(
                    AnomalyKind::InconsistentLength,
                    window.start(),
                    window.len(),
                    format!(
                        "{} declares {} bytes, too short for its fields: {err}",
                        entry.name,
                        window.len()
                    ),
                );
            }
        }
    }
    scope.finish()
}

/// Node for a region nothing in the registry understands. The region is kept
/// as one raw `data` field; an empty region carries no anomaly.
pub(crate) fn unknown_node(
    registry: &Registry,
    window: OfReader<'_>,
    kind: ListKind,
    message: String,
) -> DecodeNode {
    let mut scope = Scope::new(registry, window, &format!("unknown_{kind}"));
    if !window.is_empty() {
        debug!(offset = window.start(), len = window.len(), "{message}");
        scope.raw_tail("data");
        scope.anomaly(
            AnomalyKind::UnknownVariant,
            window.start(),
            window.len(),
            message,
        );
    }
    scope.finish()
}

pub(crate) fn decode_list(
    scope: &mut Scope<'_, '_>,
    kind: ListKind,
    end: usize,
) -> Result<(), OpenFlowError> {
    let layout = kind.layout();
    let start = scope.pos();
    let mut end = end.max(start);
    if end > scope.end() {
        scope.anomaly(
            AnomalyKind::StructuralOverrun,
            start,
            end - start,
            format!(
                "{kind} list declares {} bytes but only {} remain",
                end - start,
                scope.end() - start
            ),
        );
        end = scope.end();
    }

    while scope.pos() < end {
        let remaining = end - scope.pos();
        if remaining < layout.header_len {
            let offset = scope.pos();
            scope.bytes("undecoded", remaining)?;
            scope.anomaly(
                AnomalyKind::UndecodedResidue,
                offset,
                remaining,
                format!(
                    "{remaining} trailing bytes too short for a {kind} header of {} bytes",
                    layout.header_len
                ),
            );
            break;
        }
        if step(scope, kind, &layout, end)? == Step::Stop {
            break;
        }
    }
    scope.set_pos(end);
    Ok(())
}

pub(crate) fn decode_record(scope: &mut Scope<'_, '_>, kind: ListKind) -> Result<(), OpenFlowError> {
    let layout = kind.layout();
    if scope.remaining() < layout.header_len {
        return Err(OpenFlowError::OutOfBounds {
            offset: scope.pos(),
            len: layout.header_len,
            end: scope.end(),
        });
    }
    let end = scope.end();
    step(scope, kind, &layout, end)?;
    Ok(())
}

fn step(
    scope: &mut Scope<'_, '_>,
    kind: ListKind,
    layout: &RecordLayout,
    end: usize,
) -> Result<Step, OpenFlowError> {
    let start = scope.pos();
    let reader = scope.reader();
    let avail = end - start;
    let (tag, declared) = layout.peek(&reader, start, end)?;

    let entry_min = scope.registry().get(kind, tag).map_or(0, |entry| entry.min_len);
    let min_len = layout.min_len.max(entry_min);
    let mut len = declared;
    if declared < min_len {
        scope.anomaly(
            AnomalyKind::InconsistentLength,
            start,
            min_len.min(avail),
            format!("{kind} declares length {declared}, below the minimum of {min_len}"),
        );
        len = min_len;
    }

    let truncated = len > avail;
    if truncated {
        scope.anomaly(
            AnomalyKind::StructuralOverrun,
            start,
            avail,
            format!("{kind} declares {len} bytes but only {avail} remain"),
        );
    }
    let body_len = len.min(avail);
    let window = reader.window(start, body_len)?;
    let mut node = decode_variant(scope.registry(), window, kind, tag, truncated);
    let mut next = start + body_len;

    if layout.aligned && !truncated {
        let pad = padding_len(len);
        let fit = pad.min(end - next);
        if fit > 0 {
            let bytes = reader.read_bytes(next, fit)?;
            node.push_field(DecodedField {
                name: "pad".to_string(),
                offset: next,
                width: fit,
                value: FieldValue::Bytes(bytes.to_vec()),
                display: None,
            });
            node.len += fit;
            next += fit;
        }
        if fit < pad {
            node.anomalies.push(Anomaly {
                offset: next,
                len: pad - fit,
                kind: AnomalyKind::StructuralOverrun,
                message: format!("{kind} alignment padding needs {pad} bytes, {fit} remain"),
            });
        }
    }

    trace!(%kind, tag, offset = start, len, name = %node.name, "decoded record");
    scope.push_node(node);

    if truncated {
        scope.set_pos(end);
        return Ok(Step::Stop);
    }
    if next <= start {
        scope.anomaly(
            AnomalyKind::InconsistentLength,
            start,
            avail,
            format!("{kind} record at offset {start} made no progress"),
        );
        scope.set_pos(end);
        return Ok(Step::Stop);
    }
    scope.set_pos(next);
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use super::decode_variant;
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::registry::{ListKind, RegistryBuilder};
    use crate::protocols::openflow::scope::Scope;
    use crate::protocols::openflow::tree::{AnomalyKind, DecodeNode};

    fn decode_actions(bytes: &[u8]) -> DecodeNode {
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(bytes), "actions");
        scope.list(ListKind::Action, bytes.len()).unwrap();
        scope.finish()
    }

    fn kinds(node: &DecodeNode) -> Vec<AnomalyKind> {
        node.collect_anomalies().iter().map(|a| a.kind).collect()
    }

    #[test]
    fn zero_length_record_is_clamped_and_flagged() {
        // pop_vlan declaring length 0, followed by a valid pop_vlan.
        let bytes = [
            0x00, 0x12, 0x00, 0x00, 0, 0, 0, 0, //
            0x00, 0x12, 0x00, 0x08, 0, 0, 0, 0,
        ];
        let node = decode_actions(&bytes);
        let names: Vec<_> = node.children().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["pop_vlan", "pop_vlan"]);
        assert_eq!(kinds(&node), [AnomalyKind::InconsistentLength]);
        assert_eq!(node.anomalies[0].offset, 0);
    }

    #[test]
    fn short_trailing_bytes_become_residue() {
        let bytes = [0x00, 0x12, 0x00, 0x08, 0, 0, 0, 0, 0xab, 0xcd];
        let node = decode_actions(&bytes);
        assert_eq!(node.children().count(), 1);
        assert_eq!(kinds(&node), [AnomalyKind::UndecodedResidue]);
        assert_eq!(node.anomalies[0].offset, 8);
        assert_eq!(node.anomalies[0].len, 2);
        assert_eq!(node.field("undecoded").unwrap().width, 2);
    }

    #[test]
    fn overrunning_record_stops_iteration() {
        let bytes = [0x00, 0x12, 0x00, 0x10, 0, 0, 0, 0, 0, 0];
        let node = decode_actions(&bytes);
        assert_eq!(node.children().count(), 1);
        let anomalies = node.collect_anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::StructuralOverrun);
        assert_eq!(anomalies[0].len, 10);
        let child = node.children().next().unwrap();
        assert_eq!(child.len, 10);
    }

    #[test]
    fn unknown_tag_spans_declared_length() {
        let bytes = [
            0x00, 0x99, 0x00, 0x10, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, //
            0x00, 0x12, 0x00, 0x08, 0, 0, 0, 0,
        ];
        let node = decode_actions(&bytes);
        let children: Vec<_> = node.children().collect();
        assert_eq!(children[0].name, "unknown_action");
        assert_eq!(children[0].anomalies[0].kind, AnomalyKind::UnknownVariant);
        assert_eq!(children[0].anomalies[0].len, 16);
        assert_eq!(children[1].name, "pop_vlan");
        assert_eq!(children[1].offset, 16);
    }

    #[test]
    fn empty_unknown_region_has_no_anomaly() {
        let registry = RegistryBuilder::openflow13().build();
        let bytes = [0u8; 8];
        let window = OfReader::new(&bytes).window(8, 0).unwrap();
        let node = decode_variant(&registry, window, ListKind::Message, 200, false);
        assert_eq!(node.name, "unknown_message");
        assert!(node.anomalies.is_empty());
    }

    #[test]
    fn record_shorter_than_its_fields_is_inconsistent() {
        // output action declares 8 bytes but needs 16; the next record must
        // still be found at offset 16 after clamping.
        let bytes = [
            0x00, 0x00, 0x00, 0x08, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, //
            0x00, 0x12, 0x00, 0x08, 0, 0, 0, 0,
        ];
        let node = decode_actions(&bytes);
        assert_eq!(kinds(&node), [AnomalyKind::InconsistentLength]);
        let names: Vec<_> = node.children().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["output", "pop_vlan"]);
    }
}
