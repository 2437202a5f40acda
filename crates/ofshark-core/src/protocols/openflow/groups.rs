use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(
            ListKind::Bucket,
            0,
            VariantEntry::new("bucket", layout::BUCKET_MIN_LEN, bucket),
        )
        .register(
            ListKind::BucketCounter,
            0,
            VariantEntry::new("bucket_counter", layout::BUCKET_COUNTER_LEN, bucket_counter),
        )
        .register(
            ListKind::GroupStats,
            0,
            VariantEntry::new("group_stats", layout::GROUP_STATS_MIN_LEN, group_stats),
        )
        .register(
            ListKind::GroupDesc,
            0,
            VariantEntry::new("group_desc", layout::GROUP_DESC_MIN_LEN, group_desc),
        )
}

fn bucket(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("len")?;
    scope.u16("weight")?;
    scope.reserved("watch_port", ReservedSite::PortNo)?;
    scope.reserved("watch_group", ReservedSite::GroupId)?;
    scope.pad(4)?;
    let end = scope.end();
    scope.list(ListKind::Action, end)
}

fn bucket_counter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u64("packet_count")?;
    scope.u64("byte_count")?;
    Ok(())
}

fn group_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("length")?;
    scope.pad(2)?;
    scope.reserved("group_id", ReservedSite::GroupId)?;
    scope.u32("ref_count")?;
    scope.pad(4)?;
    scope.u64("packet_count")?;
    scope.u64("byte_count")?;
    scope.u32("duration_sec")?;
    scope.u32("duration_nsec")?;
    let end = scope.end();
    scope.list(ListKind::BucketCounter, end)
}

fn group_desc(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("length")?;
    scope.named("type", 1, layout::GROUP_TYPE_NAMES)?;
    scope.pad(1)?;
    scope.reserved("group_id", ReservedSite::GroupId)?;
    let end = scope.end();
    scope.list(ListKind::Bucket, end)
}

/// Group features multipart reply body.
pub(crate) fn group_features(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u32("types")?;
    scope.u32("capabilities")?;
    for name in ["max_groups_all", "max_groups_select", "max_groups_indirect", "max_groups_ff"] {
        scope.u32(name)?;
    }
    for name in ["actions_all", "actions_select", "actions_indirect", "actions_ff"] {
        scope.u32(name)?;
    }
    Ok(())
}
