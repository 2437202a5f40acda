//! Decoders for the body of each top-level message type.

use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

const MESSAGES: &[(u8, VariantEntry)] = &[
    (layout::OFPT_HELLO, VariantEntry::new("hello", 8, hello)),
    (layout::OFPT_ERROR, VariantEntry::new("error", 12, error)),
    (layout::OFPT_ECHO_REQUEST, VariantEntry::new("echo_request", 8, echo)),
    (layout::OFPT_ECHO_REPLY, VariantEntry::new("echo_reply", 8, echo)),
    (layout::OFPT_EXPERIMENTER, VariantEntry::new("experimenter", 16, experimenter)),
    (layout::OFPT_FEATURES_REQUEST, VariantEntry::new("features_request", 8, empty)),
    (layout::OFPT_FEATURES_REPLY, VariantEntry::new("features_reply", 32, features_reply)),
    (layout::OFPT_GET_CONFIG_REQUEST, VariantEntry::new("get_config_request", 8, empty)),
    (layout::OFPT_GET_CONFIG_REPLY, VariantEntry::new("get_config_reply", 12, switch_config)),
    (layout::OFPT_SET_CONFIG, VariantEntry::new("set_config", 12, switch_config)),
    (layout::OFPT_PACKET_IN, VariantEntry::new("packet_in", 34, packet_in)),
    (layout::OFPT_FLOW_REMOVED, VariantEntry::new("flow_removed", 56, flow_removed)),
    (layout::OFPT_PORT_STATUS, VariantEntry::new("port_status", 80, port_status)),
    (layout::OFPT_PACKET_OUT, VariantEntry::new("packet_out", 24, packet_out)),
    (layout::OFPT_FLOW_MOD, VariantEntry::new("flow_mod", 56, flow_mod)),
    (layout::OFPT_GROUP_MOD, VariantEntry::new("group_mod", 16, group_mod)),
    (layout::OFPT_PORT_MOD, VariantEntry::new("port_mod", 40, port_mod)),
    (layout::OFPT_TABLE_MOD, VariantEntry::new("table_mod", 16, table_mod)),
    (layout::OFPT_MULTIPART_REQUEST, VariantEntry::new("multipart_request", 16, multipart_request)),
    (layout::OFPT_MULTIPART_REPLY, VariantEntry::new("multipart_reply", 16, multipart_reply)),
    (layout::OFPT_BARRIER_REQUEST, VariantEntry::new("barrier_request", 8, empty)),
    (layout::OFPT_BARRIER_REPLY, VariantEntry::new("barrier_reply", 8, empty)),
    (
        layout::OFPT_QUEUE_GET_CONFIG_REQUEST,
        VariantEntry::new("queue_get_config_request", 16, queue_get_config_request),
    ),
    (
        layout::OFPT_QUEUE_GET_CONFIG_REPLY,
        VariantEntry::new("queue_get_config_reply", 16, queue_get_config_reply),
    ),
    (layout::OFPT_ROLE_REQUEST, VariantEntry::new("role_request", 24, role)),
    (layout::OFPT_ROLE_REPLY, VariantEntry::new("role_reply", 24, role)),
    (layout::OFPT_GET_ASYNC_REQUEST, VariantEntry::new("get_async_request", 8, empty)),
    (layout::OFPT_GET_ASYNC_REPLY, VariantEntry::new("get_async_reply", 32, async_config)),
    (layout::OFPT_SET_ASYNC, VariantEntry::new("set_async", 32, async_config)),
    (layout::OFPT_METER_MOD, VariantEntry::new("meter_mod", 16, meter_mod)),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    MESSAGES.iter().fold(builder, |builder, (msg_type, entry)| {
        builder.register(ListKind::Message, u32::from(*msg_type), *entry)
    })
}

fn empty(_scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    Ok(())
}

fn hello(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let end = scope.end();
    scope.list(ListKind::HelloElement, end)
}

fn error(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let err_type = scope.named("type", 2, layout::ERROR_TYPE_NAMES)?;
    if err_type == u64::from(layout::OFPET_EXPERIMENTER) {
        scope.u16("exp_type")?;
        scope.u32("experimenter")?;
    } else {
        scope.u16("code")?;
    }
    // Usually the head of the offending request.
    scope.rest("data")?;
    Ok(())
}

fn echo(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.rest("data")?;
    Ok(())
}

fn experimenter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u32("experimenter")?;
    scope.u32("exp_type")?;
    scope.rest("data")?;
    Ok(())
}

fn features_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.uint_display("datapath_id", 8, |dpid| Some(format!("{dpid:016x}")))?;
    scope.u32("n_buffers")?;
    scope.u8("n_tables")?;
    scope.u8("auxiliary_id")?;
    scope.pad(2)?;
    scope.flags("capabilities", 4, layout::CAPABILITY_NAMES)?;
    scope.u32("reserved")?;
    Ok(())
}

fn switch_config(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("flags", 2, layout::CONFIG_FLAG_NAMES)?;
    scope.reserved("miss_send_len", ReservedSite::ControllerMaxLen)?;
    Ok(())
}

fn packet_in(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("buffer_id", ReservedSite::BufferId)?;
    scope.u16("total_len")?;
    scope.named("reason", 1, layout::PACKET_IN_REASON_NAMES)?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.u64("cookie")?;
    scope.record(ListKind::Match)?;
    scope.pad(2)?;
    scope.rest("data")?;
    Ok(())
}

fn flow_removed(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u64("cookie")?;
    scope.u16("priority")?;
    scope.named("reason", 1, layout::FLOW_REMOVED_REASON_NAMES)?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.u32("duration_sec")?;
    scope.u32("duration_nsec")?;
    scope.u16("idle_timeout")?;
    scope.u16("hard_timeout")?;
    scope.u64("packet_count")?;
    scope.u64("byte_count")?;
    scope.record(ListKind::Match)
}

fn port_status(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("reason", 1, layout::PORT_REASON_NAMES)?;
    scope.pad(7)?;
    scope.record(ListKind::Port)
}

fn packet_out(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("buffer_id", ReservedSite::BufferId)?;
    scope.reserved("in_port", ReservedSite::PortNo)?;
    let actions_len = usize::from(scope.u16("actions_len")?);
    scope.pad(6)?;
    let actions_end = scope.pos() + actions_len;
    scope.list(ListKind::Action, actions_end)?;
    scope.rest("data")?;
    Ok(())
}

fn flow_mod(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u64("cookie")?;
    scope.u64("cookie_mask")?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.named("command", 1, layout::FLOW_MOD_COMMAND_NAMES)?;
    scope.u16("idle_timeout")?;
    scope.u16("hard_timeout")?;
    scope.u16("priority")?;
    scope.reserved("buffer_id", ReservedSite::BufferId)?;
    scope.reserved("out_port", ReservedSite::PortNo)?;
    scope.reserved("out_group", ReservedSite::GroupId)?;
    scope.flags("flags", 2, layout::FLOW_MOD_FLAG_NAMES)?;
    scope.pad(2)?;
    scope.record(ListKind::Match)?;
    let end = scope.end();
    scope.list(ListKind::Instruction, end)
}

fn group_mod(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("command", 2, layout::GROUP_MOD_COMMAND_NAMES)?;
    scope.named("type", 1, layout::GROUP_TYPE_NAMES)?;
    scope.pad(1)?;
    scope.reserved("group_id", ReservedSite::GroupId)?;
    let end = scope.end();
    scope.list(ListKind::Bucket, end)
}

fn port_mod(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.pad(4)?;
    scope.mac("hw_addr")?;
    scope.pad(2)?;
    scope.flags("config", 4, layout::PORT_CONFIG_NAMES)?;
    scope.flags("mask", 4, layout::PORT_CONFIG_NAMES)?;
    scope.flags("advertise", 4, layout::PORT_FEATURE_NAMES)?;
    scope.pad(4)
}

fn table_mod(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(3)?;
    scope.u32("config")?;
    Ok(())
}

fn multipart_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    multipart(scope, ListKind::MultipartRequest, layout::MULTIPART_REQUEST_FLAG_NAMES)
}

fn multipart_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    multipart(scope, ListKind::MultipartReply, layout::MULTIPART_REPLY_FLAG_NAMES)
}

fn multipart(
    scope: &mut Scope<'_, '_>,
    kind: ListKind,
    flag_names: layout::NameTable,
) -> Result<(), OpenFlowError> {
    let mp_type = scope.named("type", 2, layout::MULTIPART_TYPE_NAMES)?;
    scope.flags("flags", 2, flag_names)?;
    scope.pad(4)?;
    let end = scope.end();
    scope.dispatch(kind, mp_type as u32, end)
}

fn queue_get_config_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port", ReservedSite::PortNo)?;
    scope.pad(4)
}

fn queue_get_config_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port", ReservedSite::PortNo)?;
    scope.pad(4)?;
    let end = scope.end();
    scope.list(ListKind::PacketQueue, end)
}

fn role(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("role", 4, layout::CONTROLLER_ROLE_NAMES)?;
    scope.pad(4)?;
    scope.u64("generation_id")?;
    Ok(())
}

fn async_config(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u32("packet_in_mask_master")?;
    scope.u32("packet_in_mask_slave")?;
    scope.u32("port_status_mask_master")?;
    scope.u32("port_status_mask_slave")?;
    scope.u32("flow_removed_mask_master")?;
    scope.u32("flow_removed_mask_slave")?;
    Ok(())
}

fn meter_mod(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("command", 2, layout::METER_MOD_COMMAND_NAMES)?;
    scope.flags("flags", 2, layout::METER_FLAG_NAMES)?;
    scope.reserved("meter_id", ReservedSite::MeterId)?;
    let end = scope.end();
    scope.list(ListKind::MeterBand, end)
}
