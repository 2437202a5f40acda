use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;
use crate::protocols::common::reader::padding_len;

const ACTIONS: &[(u16, VariantEntry)] = &[
    (layout::OFPAT_OUTPUT, VariantEntry::new("output", layout::ACTION_OUTPUT_LEN, output)),
    (layout::OFPAT_COPY_TTL_OUT, VariantEntry::new("copy_ttl_out", 8, header_only)),
    (layout::OFPAT_COPY_TTL_IN, VariantEntry::new("copy_ttl_in", 8, header_only)),
    (layout::OFPAT_SET_MPLS_TTL, VariantEntry::new("set_mpls_ttl", 8, set_ttl)),
    (layout::OFPAT_DEC_MPLS_TTL, VariantEntry::new("dec_mpls_ttl", 8, header_only)),
    (layout::OFPAT_PUSH_VLAN, VariantEntry::new("push_vlan", 8, push)),
    (layout::OFPAT_POP_VLAN, VariantEntry::new("pop_vlan", 8, header_only)),
    (layout::OFPAT_PUSH_MPLS, VariantEntry::new("push_mpls", 8, push)),
    (layout::OFPAT_POP_MPLS, VariantEntry::new("pop_mpls", 8, push)),
    (layout::OFPAT_SET_QUEUE, VariantEntry::new("set_queue", 8, set_queue)),
    (layout::OFPAT_GROUP, VariantEntry::new("group", 8, group)),
    (layout::OFPAT_SET_NW_TTL, VariantEntry::new("set_nw_ttl", 8, set_ttl)),
    (layout::OFPAT_DEC_NW_TTL, VariantEntry::new("dec_nw_ttl", 8, header_only)),
    (layout::OFPAT_SET_FIELD, VariantEntry::new("set_field", 8, set_field)),
    (layout::OFPAT_PUSH_PBB, VariantEntry::new("push_pbb", 8, push)),
    (layout::OFPAT_POP_PBB, VariantEntry::new("pop_pbb", 8, header_only)),
    (layout::OFPAT_EXPERIMENTER, VariantEntry::new("experimenter", 8, experimenter)),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    ACTIONS.iter().fold(builder, |builder, (action_type, entry)| {
        let tag = u32::from(*action_type);
        let id_min = if *action_type == layout::OFPAT_EXPERIMENTER { 8 } else { 4 };
        builder
            .register(ListKind::Action, tag, *entry)
            .register(ListKind::ActionId, tag, VariantEntry::new(entry.name, id_min, action_id))
    })
}

/// Emits the common `type` and `len` fields of an action.
pub(crate) fn action_header(scope: &mut Scope<'_, '_>) -> Result<u16, OpenFlowError> {
    let action_type = scope.named("type", 2, layout::ACTION_TYPE_NAMES)? as u16;
    scope.u16("len")?;
    Ok(action_type)
}

fn output(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.reserved("port", ReservedSite::PortNo)?;
    scope.reserved("max_len", ReservedSite::ControllerMaxLen)?;
    scope.pad(6)
}

fn header_only(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.pad(4)
}

fn set_ttl(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.u8("ttl")?;
    scope.pad(3)
}

fn push(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.uint_display("ethertype", 2, |ethertype| Some(format!("{ethertype:#06x}")))?;
    scope.pad(2)
}

fn set_queue(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.reserved("queue_id", ReservedSite::QueueId)?;
    Ok(())
}

fn group(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.reserved("group_id", ReservedSite::GroupId)?;
    Ok(())
}

fn set_field(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    scope.record(ListKind::Oxm)?;
    let pad = padding_len(scope.consumed()).min(scope.remaining());
    scope.pad(pad)
}

fn experimenter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    action_header(scope)?;
    let experimenter = scope.u32("experimenter")?;
    let end = scope.end();
    scope.dispatch(ListKind::ActionExperimenter, experimenter, end)
}

fn action_id(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let action_type = action_header(scope)?;
    if action_type == layout::OFPAT_EXPERIMENTER {
        scope.u32("experimenter")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::registry::{ListKind, RegistryBuilder};
    use crate::protocols::openflow::scope::Scope;
    use crate::protocols::openflow::tree::{AnomalyKind, DecodeNode};

    fn decode(kind: ListKind, bytes: &[u8]) -> DecodeNode {
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(bytes), "list");
        scope.list(kind, bytes.len()).unwrap();
        scope.finish()
    }

    #[test]
    fn output_to_controller() {
        let bytes = [
            0x00, 0x00, 0x00, 0x10, 0xff, 0xff, 0xff, 0xfd, 0xff, 0xff, 0, 0, 0, 0, 0, 0,
        ];
        let node = decode(ListKind::Action, &bytes);
        let output = node.child("output").unwrap();
        assert_eq!(output.field("port").unwrap().display.as_deref(), Some("CONTROLLER"));
        assert_eq!(output.field("max_len").unwrap().display.as_deref(), Some("NO_BUFFER"));
        assert!(node.collect_anomalies().is_empty());
    }

    #[test]
    fn experimenter_payload_is_unknown_and_next_action_decodes() {
        let bytes = [
            0xff, 0xff, 0x00, 0x10, 0x00, 0x00, 0x23, 0x20, 1, 2, 3, 4, 5, 6, 7, 8, //
            0x00, 0x11, 0x00, 0x08, 0x81, 0x00, 0x00, 0x00,
        ];
        let node = decode(ListKind::Action, &bytes);
        let anomalies = node.collect_anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnknownVariant);
        assert_eq!(anomalies[0].offset, 8);
        assert_eq!(anomalies[0].len, 8);

        let push = node.child("push_vlan").unwrap();
        assert_eq!(push.offset, 16);
        assert_eq!(push.field("ethertype").unwrap().as_uint(), Some(0x8100));
    }

    #[test]
    fn set_field_pads_to_eight() {
        // set_field carrying VLAN_VID (4 + 2 bytes), padded from 10 to 16.
        let bytes = [
            0x00, 0x19, 0x00, 0x10, 0x80, 0x00, 0x0c, 0x02, 0x10, 0x05, 0, 0, 0, 0, 0, 0,
        ];
        let node = decode(ListKind::Action, &bytes);
        let set_field = node.child("set_field").unwrap();
        assert!(set_field.child("vlan_vid").is_some());
        assert_eq!(set_field.field("pad").unwrap().width, 6);
        assert!(node.collect_anomalies().is_empty());
    }

    #[test]
    fn action_ids_have_no_body() {
        let bytes = [
            0x00, 0x00, 0x00, 0x04, //
            0xff, 0xff, 0x00, 0x08, 0x00, 0x00, 0x23, 0x20,
        ];
        let node = decode(ListKind::ActionId, &bytes);
        let names: Vec<_> = node.children().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["output", "experimenter"]);
        assert!(node.collect_anomalies().is_empty());
    }
}
