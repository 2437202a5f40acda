use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register(ListKind::Port, 0, VariantEntry::new("port", layout::PORT_LEN, port))
        .register(
            ListKind::PortStats,
            0,
            VariantEntry::new("port_stats", layout::PORT_STATS_LEN, port_stats),
        )
}

fn port(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.pad(4)?;
    scope.mac("hw_addr")?;
    scope.pad(2)?;
    scope.string("name", layout::PORT_NAME_LEN)?;
    scope.flags("config", 4, layout::PORT_CONFIG_NAMES)?;
    scope.flags("state", 4, layout::PORT_STATE_NAMES)?;
    for feature in ["curr", "advertised", "supported", "peer"] {
        scope.flags(feature, 4, layout::PORT_FEATURE_NAMES)?;
    }
    scope.u32("curr_speed")?;
    scope.u32("max_speed")?;
    Ok(())
}

const PORT_COUNTERS: [&str; 12] = [
    "rx_packets",
    "tx_packets",
    "rx_bytes",
    "tx_bytes",
    "rx_dropped",
    "tx_dropped",
    "rx_errors",
    "tx_errors",
    "rx_frame_err",
    "rx_over_err",
    "rx_crc_err",
    "collisions",
];

fn port_stats(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.reserved("port_no", ReservedSite::PortNo)?;
    scope.pad(4)?;
    for counter in PORT_COUNTERS {
        scope.u64(counter)?;
    }
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
    fn port_description_fields() {
        let mut bytes = [0u8; 64];
        bytes[..4].copy_from_slice(&[0xff, 0xff, 0xff, 0xfe]);
        bytes[8..14].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
        bytes[16..22].copy_from_slice(b"br-int");
        bytes[39] = 0x04; // state LIVE
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(&bytes), "ports");
        scope.list(ListKind::Port, bytes.len()).unwrap();
        let node = scope.finish();
        let port = node.child("port").unwrap();
        assert_eq!(port.field("name").unwrap().display.as_deref(), Some("br-int"));
        assert_eq!(port.field("port_no").unwrap().display.as_deref(), Some("LOCAL"));
        assert_eq!(port.field("hw_addr").unwrap().display.as_deref(), Some("02:00:00:00:00:01"));
        assert_eq!(port.field("state").unwrap().display.as_deref(), Some("LIVE"));
        assert!(node.collect_anomalies().is_empty());
    }
}
