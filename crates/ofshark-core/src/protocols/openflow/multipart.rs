//! Multipart request and reply bodies, keyed by multipart type.

use super::error::OpenFlowError;
use super::groups;
use super::layout;
use super::meters;
use super::registry::{DecodeFn, ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

const REQUESTS: &[(u16, &str, DecodeFn)] = &[
    (layout::OFPMP_DESC, "desc", empty),
    (layout::OFPMP_FLOW, "flow", flow_request),
    (layout::OFPMP_AGGREGATE, "aggregate", flow_request),
    (layout::OFPMP_TABLE, "table", empty),
    (layout::OFPMP_PORT_STATS, "port_stats", port_request),
    (layout::OFPMP_QUEUE, "queue", queue_request),
    (layout::OFPMP_GROUP, "group", group_request),
    (layout::OFPMP_GROUP_DESC, "group_desc", empty),
    (layout::OFPMP_GROUP_FEATURES, "group_features", empty),
    (layout::OFPMP_METER, "meter", meter_request),
    (layout::OFPMP_METER_CONFIG, "meter_config", meter_request),
    (layout::OFPMP_METER_FEATURES, "meter_features", empty),
    (layout::OFPMP_TABLE_FEATURES, "table_features", table_features),
    (layout::OFPMP_PORT_DESC, "port_desc", empty),
    (layout::OFPMP_EXPERIMENTER, "experimenter", experimenter),
];

const REPLIES: &[(u16, &str, DecodeFn)] = &[
    (layout::OFPMP_DESC, "desc", desc_reply),
    (layout::OFPMP_FLOW, "flow", flow_reply),
    (layout::OFPMP_AGGREGATE, "aggregate", aggregate_reply),
    (layout::OFPMP_TABLE, "table", table_reply),
    (layout::OFPMP_PORT_STATS, "port_stats", port_stats_reply),
    (layout::OFPMP_QUEUE, "queue", queue_reply),
    (layout::OFPMP_GROUP, "group", group_reply),
    (layout::OFPMP_GROUP_DESC, "group_desc", group_desc_reply),
    (layout::OFPMP_GROUP_FEATURES, "group_features", groups::group_features),
    (layout::OFPMP_METER, "meter", meter_reply),
    (layout::OFPMP_METER_CONFIG, "meter_config", meter_config_reply),
    (layout::OFPMP_METER_FEATURES, "meter_features", meters::meter_features),
    (layout::OFPMP_TABLE_FEATURES, "table_features", table_features),
    (layout::OFPMP_PORT_DESC, "port_desc", port_desc_reply),
    (layout::OFPMP_EXPERIMENTER, "experimenter", experimenter),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = REQUESTS.iter().fold(builder, |builder, (mp_type, name, decode)| {
        builder.register(
            ListKind::MultipartRequest,
            u32::from(*mp_type),
            VariantEntry::new(*name, 0, *decode),
        )
    });
    let builder = REPLIES.iter().fold(builder, |builder, (mp_type, name, decode)| {
        builder.register(
            ListKind::MultipartReply,
            u32::from(*mp_type),
            VariantEntry::new(*name, 0, *decode),
        )
    });
    builder
        .register(
            ListKind::FlowStats,
            0,
            VariantEntry::new("flow_stats", layout::FLOW_STATS_MIN_LEN, flow_stats),
        )
        .register(
            ListKind::TableStats,
            0,
            VariantEntry::new("table_stats", layout::TABLE_STATS_LEN, table_stats),
        )
}

fn empty(_scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    Ok(())
}

fn list_to_end(scope: &mut Scope<'_, '_>, kind: ListKind) -> Result<(), OpenFlowError> {
    let end = scope.end();
    scope.list(kind, end)
}

fn flow_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(3)?;
    scope.reserved("out_port", ReservedSite::PortNo)?;
    scope.reserved("out_group", ReservedSite::GroupId)?;
    scope.pad(4)?;
    scope.u64("cookie")?;
    scope.u64("cookie_mask")?;
    scope.record(ListKind::Match)
}

fn port_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.pad(4)
}

fn queue_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.reserved("queue_id", ReservedSite::QueueId)?;
    Ok(())
}

fn group_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("group_id", ReservedSite::GroupId)?;
    scope.pad(4)
}

fn meter_request(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("meter_id", ReservedSite::MeterId)?;
    scope.pad(4)
}

fn table_features(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::TableFeatures)
}

fn experimenter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u32("experimenter")?;
    scope.u32("exp_type")?;
    scope.rest("data")?;
    Ok(())
}

fn desc_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.string("mfr_desc", layout::DESC_STR_LEN)?;
    scope.string("hw_desc", layout::DESC_STR_LEN)?;
    scope.string("sw_desc", layout::DESC_STR_LEN)?;
    scope.string("serial_num", layout::SERIAL_NUM_LEN)?;
    scope.string("dp_desc", layout::DESC_STR_LEN)?;
    Ok(())
}

fn flow_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::FlowStats)
}

fn aggregate_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u64("packet_count")?;
    scope.u64("byte_count")?;
    scope.u32("flow_count")?;
    scope.pad(4)
}

fn table_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::TableStats)
}

fn port_stats_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::PortStats)
}

fn queue_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::QueueStats)
}

fn group_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::GroupStats)
}

fn group_desc_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::GroupDesc)
}

fn meter_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::MeterStats)
}

fn meter_config_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::MeterConfig)
}

fn port_desc_reply(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    list_to_end(scope, ListKind::Port)
}

fn flow_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("length")?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(1)?;
    scope.u32("duration_sec")?;
    scope.u32("duration_nsec")?;
    scope.u16("priority")?;
    scope.u16("idle_timeout")?;
    scope.u16("hard_timeout")?;
    scope.flags("flags", 2, layout::FLOW_MOD_FLAG_NAMES)?;
    scope.pad(4)?;
    scope.u64("cookie")?;
    scope.u64("packet_count")?;
    scope.u64("byte_count")?;
    scope.record(ListKind::Match)?;
    list_to_end(scope, ListKind::Instruction)
}

fn table_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(3)?;
    scope.u32("active_count")?;
    scope.u64("lookup_count")?;
    scope.u64("matched_count")?;
    Ok(())
}
