use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

/// Rates above this many tenths of a percent mean the limit is disabled.
const RATE_DISABLED_ABOVE: u64 = 1000;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(
            ListKind::PacketQueue,
            0,
            VariantEntry::new("packet_queue", layout::PACKET_QUEUE_MIN_LEN, packet_queue),
        )
        .register(
            ListKind::QueueProperty,
            u32::from(layout::OFPQT_MIN_RATE),
            VariantEntry::new("min_rate", layout::QUEUE_PROPERTY_RATE_LEN, rate_property),
        )
        .register(
            ListKind::QueueProperty,
            u32::from(layout::OFPQT_MAX_RATE),
            VariantEntry::new("max_rate", layout::QUEUE_PROPERTY_RATE_LEN, rate_property),
        )
        .register(
            ListKind::QueueProperty,
            u32::from(layout::OFPQT_EXPERIMENTER),
            VariantEntry::new("experimenter", 16, experimenter_property),
        )
        .register(
            ListKind::QueueStats,
            0,
            VariantEntry::new("queue_stats", layout::QUEUE_STATS_LEN, queue_stats),
        )
}

fn packet_queue(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("queue_id", ReservedSite::QueueId)?;
    scope.reserved("port", ReservedSite::PortNo)?;
    scope.u16("len")?;
    scope.pad(6)?;
    let end = scope.end();
    scope.list(ListKind::QueueProperty, end)
}

fn property_header(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("property", 2, layout::QUEUE_PROPERTY_NAMES)?;
    scope.u16("len")?;
    scope.pad(4)
}

fn rate_property(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    scope.uint_display("rate", 2, |rate| {
        (rate > RATE_DISABLED_ABOVE).then(|| "disabled".to_string())
    })?;
    scope.pad(6)
}

fn experimenter_property(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    scope.u32("experimenter")?;
    scope.pad(4)?;
    scope.rest("data")?;
    Ok(())
}

fn queue_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.reserved("queue_id", ReservedSite::QueueId)?;
    scope.u64("tx_bytes")?;
    scope.u64("tx_packets")?;
    scope.u64("tx_errors")?;
    scope.u32("duration_sec")?;
    scope.u32("duration_nsec")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::registry::{ListKind, RegistryBuilder};
    use crate::protocols::openflow::scope::Scope;

    #[test]
    fn packet_queue_with_disabled_max_rate() {
        let bytes = [
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x20, 0, 0, 0, 0, 0, 0, //
            0x00, 0x02, 0x00, 0x10, 0, 0, 0, 0, 0xff, 0xff, 0, 0, 0, 0, 0, 0,
        ];
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(&bytes), "queues");
        scope.list(ListKind::PacketQueue, bytes.len()).unwrap();
        let node = scope.finish();
        let queue = node.child("packet_queue").unwrap();
        let rate = queue.child("max_rate").unwrap().field("rate").unwrap();
        assert_eq!(rate.display.as_deref(), Some("disabled"));
        assert!(node.collect_anomalies().is_empty());
    }
}
