use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(
            ListKind::MeterBand,
            u32::from(layout::OFPMBT_DROP),
            VariantEntry::new("drop", layout::METER_BAND_LEN, drop_band),
        )
        .register(
            ListKind::MeterBand,
            u32::from(layout::OFPMBT_DSCP_REMARK),
            VariantEntry::new("dscp_remark", layout::METER_BAND_LEN, dscp_remark_band),
        )
        .register(
            ListKind::MeterBand,
            u32::from(layout::OFPMBT_EXPERIMENTER),
            VariantEntry::new("experimenter", layout::METER_BAND_LEN, experimenter_band),
        )
        .register(
            ListKind::MeterBandStats,
            0,
            VariantEntry::new("meter_band_stats", layout::METER_BAND_STATS_LEN, band_stats),
        )
        .register(
            ListKind::MeterStats,
            0,
            VariantEntry::new("meter_stats", layout::METER_STATS_MIN_LEN, meter_stats),
        )
        .register(
            ListKind::MeterConfig,
            0,
            VariantEntry::new("meter_config", layout::METER_CONFIG_MIN_LEN, meter_config),
        )
}

fn band_header(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("type", 2, layout::METER_BAND_TYPE_NAMES)?;
    scope.u16("len")?;
    scope.u32("rate")?;
    scope.u32("burst_size")?;
    Ok(())
}

fn drop_band(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    band_header(scope)?;
    scope.pad(4)
}

fn dscp_remark_band(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    band_header(scope)?;
    scope.u8("prec_level")?;
    scope.pad(3)
}

fn experimenter_band(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    band_header(scope)?;
    scope.u32("experimenter")?;
    scope.rest("data")?;
    Ok(())
}

fn band_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u64("packet_band_count")?;
    scope.u64("byte_band_count")?;
    Ok(())
}

fn meter_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("meter_id", ReservedSite::MeterId)?;
    scope.u16("len")?;
    scope.pad(6)?;
    scope.u32("flow_count")?;
    scope.u64("packet_in_count")?;
    scope.u64("byte_in_count")?;
    scope.u32("duration_sec")?;
    scope.u32("duration_nsec")?;
    let end = scope.end();
    scope.list(ListKind::MeterBandStats, end)
}

fn meter_config(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("length")?;
    scope.flags("flags", 2, layout::METER_FLAG_NAMES)?;
    scope.reserved("meter_id", ReservedSite::MeterId)?;
    let end = scope.end();
    scope.list(ListKind::MeterBand, end)
}

/// Meter features multipart reply body.
pub(crate) fn meter_features(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u32("max_meter")?;
    scope.u32("band_types")?;
    scope.flags("capabilities", 4, layout::METER_FLAG_NAMES)?;
    scope.u8("max_bands")?;
    scope.u8("max_color")?;
    scope.pad(2)
}

#[cfg(test)]
mod tests {
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::registry::{ListKind, RegistryBuilder};
    use crate::protocols::openflow::scope::Scope;

    #[test]
    fn meter_config_lists_bands() {
        let bytes = [
            0x00, 0x18, 0x00, 0x09, 0xff, 0xff, 0xff, 0xfe, //
            0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x03, 0xe8, 0x00, 0x00, 0x00, 0x10, 0, 0, 0, 0,
        ];
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(&bytes), "configs");
        scope.list(ListKind::MeterConfig, bytes.len()).unwrap();
        let node = scope.finish();
        let config = node.child("meter_config").unwrap();
        assert_eq!(config.field("flags").unwrap().display.as_deref(), Some("KBPS|STATS"));
        assert_eq!(
            config.field("meter_id").unwrap().display.as_deref(),
            Some("CONTROLLER")
        );
        let band = config.child("drop").unwrap();
        assert_eq!(band.field("rate").unwrap().as_uint(), Some(1000));
        assert!(node.collect_anomalies().is_empty());
    }
}
