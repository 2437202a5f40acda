mod common;

use std::sync::Arc;

use ofshark_core::protocols::openflow::OpenFlowError;
use ofshark_core::{
    AnomalyKind, Decoder, DecoderConfig, ListKind, Message, RegistryBuilder, Scope, VariantEntry,
    decode, encode,
};

use common::message;

/// FlowMod fixed part: table 0, ADD, no buffer, out_port/out_group ANY.
fn flow_mod_fixed() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&0x0102_0304_0506_0708u64.to_be_bytes());
    body.extend_from_slice(&0u64.to_be_bytes());
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(&10u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&0x8000u16.to_be_bytes());
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&0x0001u16.to_be_bytes());
    body.extend_from_slice(&[0, 0]);
    body
}

fn oxm_match(oxms: &[u8]) -> Vec<u8> {
    let length = 4 + oxms.len();
    let mut bytes = vec![0x00, 0x01];
    bytes.extend_from_slice(&(length as u16).to_be_bytes());
    bytes.extend_from_slice(oxms);
    bytes.resize(length.next_multiple_of(8), 0);
    bytes
}

fn decode_clean(bytes: &[u8]) -> Message {
    let message = decode(bytes).expect("decode");
    assert!(message.is_clean(), "unexpected anomalies: {:?}", message.anomalies);
    message
}

#[test]
fn flow_mod_with_eth_dst_match_and_no_instructions() {
    let mut body = flow_mod_fixed();
    body.extend_from_slice(&oxm_match(&[
        0x80, 0x00, 0x06, 0x06, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
    ]));
    let bytes = message(14, 0x10, &body);
    assert_eq!(bytes.len(), 64);

    let message = decode_clean(&bytes);
    assert_eq!(message.kind(), "flow_mod");
    let flow_mod = &message.body;
    assert_eq!(flow_mod.field("command").unwrap().display.as_deref(), Some("OFPFC_ADD"));
    assert_eq!(flow_mod.field("buffer_id").unwrap().display.as_deref(), Some("NO_BUFFER"));
    assert_eq!(flow_mod.field("out_port").unwrap().display.as_deref(), Some("ANY"));
    assert_eq!(flow_mod.field("out_group").unwrap().display.as_deref(), Some("ANY"));
    assert_eq!(flow_mod.field("table_id").unwrap().display, None);
    assert_eq!(
        flow_mod.field("flags").unwrap().display.as_deref(),
        Some("SEND_FLOW_REM")
    );

    let matched = flow_mod.child("match").expect("match node");
    assert_eq!(matched.offset, 48);
    assert_eq!(matched.len, 16);
    assert_eq!(matched.children().count(), 1);
    let eth_dst = matched.child("eth_dst").unwrap();
    assert_eq!(
        eth_dst.field("value").unwrap().display.as_deref(),
        Some("00:11:22:33:44:55")
    );
    let pad = matched.field("pad").unwrap();
    assert_eq!((pad.offset, pad.width), (62, 2));

    // the match is the only child: no instructions follow
    assert_eq!(flow_mod.children().count(), 1);
    assert_eq!(encode(&message), bytes);
}

#[test]
fn packet_in_match_residue_does_not_shift_payload() {
    let mut body = Vec::new();
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&64u16.to_be_bytes());
    body.push(0x01);
    body.push(0x00);
    body.extend_from_slice(&0u64.to_be_bytes());
    // IN_PORT declaring 8 value bytes, 4 more than the field's width
    body.extend_from_slice(&oxm_match(&[
        0x80, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x03, 0xde, 0xad, 0xbe, 0xef,
    ]));
    body.extend_from_slice(&[0, 0]);
    body.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
    let bytes = message(10, 0x20, &body);

    let message = decode(&bytes).unwrap();
    assert_eq!(message.kind(), "packet_in");
    assert_eq!(
        message.body.field("reason").unwrap().display.as_deref(),
        Some("OFPR_ACTION")
    );

    let matched = message.body.child("match").unwrap();
    assert_eq!((matched.offset, matched.len), (24, 16));
    let in_port = matched.child("in_port").unwrap();
    assert_eq!(in_port.field("value").unwrap().as_uint(), Some(3));

    assert_eq!(in_port.anomalies.len(), 1);
    let residue = &in_port.anomalies[0];
    assert_eq!(residue.kind, AnomalyKind::UndecodedResidue);
    assert_eq!((residue.offset, residue.len), (36, 4));
    assert!(matched.anomalies.is_empty());
    assert!(message.body.anomalies.is_empty());
    assert_eq!(message.anomalies.len(), 1);

    let data = message.body.field("data").unwrap();
    assert_eq!(data.offset, 42);
    assert_eq!(data.as_bytes(), Some(&[0xaa, 0xbb, 0xcc][..]));
    assert_eq!(encode(&message), bytes);
}

#[test]
fn packet_out_experimenter_action_then_push_vlan() {
    let actions = [
        0xff, 0xff, 0x00, 0x10, 0x00, 0x00, 0x23, 0x20, 1, 2, 3, 4, 5, 6, 7, 8, //
        0x00, 0x11, 0x00, 0x08, 0x81, 0x00, 0x00, 0x00,
    ];
    let mut body = Vec::new();
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&0xffff_fffdu32.to_be_bytes());
    body.extend_from_slice(&(actions.len() as u16).to_be_bytes());
    body.extend_from_slice(&[0; 6]);
    body.extend_from_slice(&actions);
    let bytes = message(13, 0x30, &body);

    let message = decode(&bytes).unwrap();
    assert_eq!(
        message.body.field("in_port").unwrap().display.as_deref(),
        Some("CONTROLLER")
    );
    assert_eq!(message.anomalies.len(), 1);
    let unknown = &message.anomalies[0];
    assert_eq!(unknown.kind, AnomalyKind::UnknownVariant);
    assert_eq!((unknown.offset, unknown.len), (32, 8));

    let push = message.body.child("push_vlan").unwrap();
    assert_eq!(push.offset, 40);
    assert_eq!(push.field("ethertype").unwrap().as_uint(), Some(0x8100));
    assert!(message.body.field("data").is_none());
}

#[test]
fn mpls_label_with_three_byte_value() {
    let mut body = flow_mod_fixed();
    body.extend_from_slice(&oxm_match(&[0x80, 0x00, 0x44, 0x03, 0x0f, 0xff, 0xff]));
    let bytes = message(14, 0x40, &body);

    let message = decode_clean(&bytes);
    let matched = message.body.child("match").unwrap();
    assert_eq!(matched.field("pad").unwrap().width, 5);
    let value = matched.child("mpls_label").unwrap().field("value").unwrap();
    assert_eq!(value.width, 3);
    assert_eq!(value.as_uint(), Some(0x0f_ffff));
}

#[test]
fn flow_mod_with_instructions_round_trips() {
    let mut body = flow_mod_fixed();
    body.extend_from_slice(&oxm_match(&[0x80, 0x00, 0x0a, 0x02, 0x08, 0x00]));
    // apply_actions [output:2], goto_table 1
    body.extend_from_slice(&[
        0x00, 0x04, 0x00, 0x18, 0, 0, 0, 0, //
        0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x00, 0x40, 0, 0, 0, 0, 0, 0, //
        0x00, 0x01, 0x00, 0x08, 0x01, 0, 0, 0,
    ]);
    let bytes = message(14, 0x50, &body);

    let message = decode_clean(&bytes);
    let names: Vec<_> = message.body.children().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["match", "apply_actions", "goto_table"]);
    let output = message
        .body
        .child("apply_actions")
        .and_then(|node| node.child("output"))
        .unwrap();
    assert_eq!(output.field("port").unwrap().as_uint(), Some(2));
    assert_eq!(output.field("port").unwrap().display, None);
    assert_eq!(encode(&message), bytes);
}

#[test]
fn hello_bitmap_element_padding_keeps_next_element_aligned() {
    let elements = [
        0x00, 0x01, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x01, 0, 0, 0, 0, //
        0x00, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x10,
    ];
    let bytes = message(0, 0x70, &elements);

    let message = decode_clean(&bytes);
    assert_eq!(message.kind(), "hello");
    let placed: Vec<_> = message
        .body
        .children()
        .map(|c| (c.name.as_str(), c.offset, c.len))
        .collect();
    assert_eq!(placed, [("version_bitmap", 8, 16), ("version_bitmap", 24, 8)]);
    let first = message.body.children().next().unwrap();
    let pad = first.field("pad").unwrap();
    assert_eq!((pad.offset, pad.width), (20, 4));
    assert_eq!(encode(&message), bytes);
}

#[test]
fn zero_length_action_cannot_stall_decoding() {
    let actions = [0x00, 0x11, 0x00, 0x00, 0x81, 0x00, 0x00, 0x00];
    let mut body = Vec::new();
    body.extend_from_slice(&0xffff_ffffu32.to_be_bytes());
    body.extend_from_slice(&1u32.to_be_bytes());
    body.extend_from_slice(&(actions.len() as u16).to_be_bytes());
    body.extend_from_slice(&[0; 6]);
    body.extend_from_slice(&actions);
    let bytes = message(13, 0x31, &body);

    let message = decode(&bytes).unwrap();
    assert!(
        message
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::InconsistentLength)
    );
    assert_eq!(encode(&message), bytes);
}

#[test]
fn truncated_capture_keeps_partial_tree() {
    let mut body = flow_mod_fixed();
    body.extend_from_slice(&oxm_match(&[
        0x80, 0x00, 0x06, 0x06, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
    ]));
    let bytes = message(14, 0x60, &body);
    let cut = &bytes[..56];

    let message = decode(cut).unwrap();
    assert!(message.anomalies_of(AnomalyKind::StructuralOverrun).next().is_some());
    assert_eq!(message.body.field("cookie").unwrap().as_uint(), Some(0x0102_0304_0506_0708));
    for field in message.body.leaf_fields() {
        assert!(field.end() <= cut.len());
    }
}

#[test]
fn custom_registry_decodes_new_message_type() {
    fn probe(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
        scope.u32("token")?;
        Ok(())
    }

    let registry = Arc::new(
        RegistryBuilder::openflow13()
            .register(ListKind::Message, 0x63, VariantEntry::new("probe", 0, probe))
            .build(),
    );
    let decoder = Decoder::new(registry, DecoderConfig::default());
    let bytes = message(0x63, 1, &[0, 0, 0, 7]);

    let decoded = decoder.decode(&bytes).unwrap();
    assert_eq!(decoded.kind(), "probe");
    assert_eq!(decoded.body.field("token").unwrap().as_uint(), Some(7));
    assert!(decoded.is_clean());

    let stock = decode(&bytes).unwrap();
    assert_eq!(stock.anomalies[0].kind, AnomalyKind::UnknownVariant);
}

#[test]
fn decoded_tree_serializes_to_json() {
    let bytes = common::hello(9);
    let message = decode_clean(&bytes);
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["header"]["xid"], 9);
    assert!(value.get("anomalies").is_none());
    assert_eq!(value["body"]["name"], "hello");
}
