//! OpenFlow Extensible Match: the `Match` record and its OXM TLVs.

use super::error::OpenFlowError;
use super::layout::{self, OFPVID_PRESENT};
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;
use super::tree::AnomalyKind;

/// Unpacked 32-bit OXM header `{class:16, field:7, has_mask:1, length:8}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OxmHeader {
    pub class: u16,
    pub field: u8,
    pub has_mask: bool,
    /// Payload length in bytes, header excluded.
    pub length: u8,
}

impl OxmHeader {
    pub fn unpack(raw: u32) -> Self {
        Self {
            class: (raw >> 16) as u16,
            field: ((raw >> 9) & 0x7f) as u8,
            has_mask: (raw >> 8) & 1 == 1,
            length: (raw & 0xff) as u8,
        }
    }

    pub fn pack(&self) -> u32 {
        (u32::from(self.class) << 16)
            | (u32::from(self.field & 0x7f) << 9)
            | (u32::from(self.has_mask) << 8)
            | u32::from(self.length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Uint,
    Port,
    Mac,
    Ipv4,
    Ipv6,
    VlanVid,
}

#[derive(Debug)]
struct BasicField {
    name: &'static str,
    /// Legal unmasked value widths, widest first.
    widths: &'static [usize],
    kind: ValueKind,
}

const fn field(name: &'static str, widths: &'static [usize], kind: ValueKind) -> BasicField {
    BasicField { name, widths, kind }
}

/// `OFPXMC_OPENFLOW_BASIC` fields, indexed by field number.
const BASIC_FIELDS: [BasicField; 40] = [
    field("IN_PORT", &[4], ValueKind::Port),
    field("IN_PHY_PORT", &[4], ValueKind::Port),
    field("METADATA", &[8], ValueKind::Uint),
    field("ETH_DST", &[6], ValueKind::Mac),
    field("ETH_SRC", &[6], ValueKind::Mac),
    field("ETH_TYPE", &[2], ValueKind::Uint),
    field("VLAN_VID", &[2], ValueKind::VlanVid),
    field("VLAN_PCP", &[1], ValueKind::Uint),
    field("IP_DSCP", &[1], ValueKind::Uint),
    field("IP_ECN", &[1], ValueKind::Uint),
    field("IP_PROTO", &[1], ValueKind::Uint),
    field("IPV4_SRC", &[4], ValueKind::Ipv4),
    field("IPV4_DST", &[4], ValueKind::Ipv4),
    field("TCP_SRC", &[2], ValueKind::Uint),
    field("TCP_DST", &[2], ValueKind::Uint),
    field("UDP_SRC", &[2], ValueKind::Uint),
    field("UDP_DST", &[2], ValueKind::Uint),
    field("SCTP_SRC", &[2], ValueKind::Uint),
    field("SCTP_DST", &[2], ValueKind::Uint),
    field("ICMPV4_TYPE", &[1], ValueKind::Uint),
    field("ICMPV4_CODE", &[1], ValueKind::Uint),
    field("ARP_OP", &[2], ValueKind::Uint),
    field("ARP_SPA", &[4], ValueKind::Ipv4),
    field("ARP_TPA", &[4], ValueKind::Ipv4),
    field("ARP_SHA", &[6], ValueKind::Mac),
    field("ARP_THA", &[6], ValueKind::Mac),
    field("IPV6_SRC", &[16], ValueKind::Ipv6),
    field("IPV6_DST", &[16], ValueKind::Ipv6),
    field("IPV6_FLABEL", &[4], ValueKind::Uint),
    field("ICMPV6_TYPE", &[1], ValueKind::Uint),
    field("ICMPV6_CODE", &[1], ValueKind::Uint),
    field("IPV6_ND_TARGET", &[16], ValueKind::Ipv6),
    field("IPV6_ND_SLL", &[6], ValueKind::Mac),
    field("IPV6_ND_TLL", &[6], ValueKind::Mac),
    // Some switches send the 20-bit label in 3 bytes.
    field("MPLS_LABEL", &[4, 3], ValueKind::Uint),
    field("MPLS_TC", &[1], ValueKind::Uint),
    field("MPLS_BOS", &[1], ValueKind::Uint),
    field("PBB_ISID", &[3], ValueKind::Uint),
    field("TUNNEL_ID", &[8], ValueKind::Uint),
    field("IPV6_EXTHDR", &[2], ValueKind::Uint),
];

impl BasicField {
    fn max_width(&self) -> usize {
        self.widths.iter().copied().max().unwrap_or(0)
    }
}

/// Symbolic name of a basic-class field number.
pub fn basic_field_name(field: u8) -> Option<&'static str> {
    BASIC_FIELDS.get(usize::from(field)).map(|basic| basic.name)
}

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let oxm_id = VariantEntry::new("oxm_id", layout::OXM_HEADER_LEN, oxm_id);
    builder
        .register(
            ListKind::Match,
            u32::from(layout::OFPMT_OXM),
            VariantEntry::new("match", layout::MATCH_HEADER_LEN, oxm_match),
        )
        .register(
            ListKind::Oxm,
            u32::from(layout::OFPXMC_OPENFLOW_BASIC),
            VariantEntry::new("oxm", layout::OXM_HEADER_LEN, basic_oxm),
        )
        .register(
            ListKind::Oxm,
            u32::from(layout::OFPXMC_EXPERIMENTER),
            VariantEntry::new(
                "experimenter_oxm",
                layout::OXM_HEADER_LEN + layout::OXM_EXPERIMENTER_ID_LEN,
                experimenter_oxm,
            ),
        )
        .register(ListKind::OxmId, u32::from(layout::OFPXMC_NXM_0), oxm_id)
        .register(ListKind::OxmId, u32::from(layout::OFPXMC_NXM_1), oxm_id)
        .register(ListKind::OxmId, u32::from(layout::OFPXMC_OPENFLOW_BASIC), oxm_id)
        .register(ListKind::OxmId, u32::from(layout::OFPXMC_EXPERIMENTER), oxm_id)
}

fn oxm_match(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("type", 2, layout::MATCH_TYPE_NAMES)?;
    scope.u16("length")?;
    let end = scope.end();
    scope.list(ListKind::Oxm, end)
}

fn field_display(header: &OxmHeader) -> String {
    let name = match header.class {
        layout::OFPXMC_OPENFLOW_BASIC => basic_field_name(header.field)
            .map(str::to_string)
            .unwrap_or_else(|| format!("field {}", header.field)),
        _ => format!("field {}", header.field),
    };
    if header.has_mask {
        format!("{name}/masked")
    } else {
        name
    }
}

/// Emits the class, field/mask byte and length of an OXM header.
fn oxm_header(scope: &mut Scope<'_, '_>) -> Result<OxmHeader, OpenFlowError> {
    let header = OxmHeader::unpack(scope.reader().read_u32(scope.pos())?);
    scope.named("class", 2, layout::OXM_CLASS_NAMES)?;
    scope.uint_display("field", 1, |_| Some(field_display(&header)))?;
    scope.u8("length")?;
    Ok(header)
}

fn basic_oxm(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let start = scope.start();
    let header = oxm_header(scope)?;
    let Some(basic) = BASIC_FIELDS.get(usize::from(header.field)) else {
        scope.set_name("unknown_oxm");
        let len = scope.end() - start;
        scope.rest("data")?;
        scope.anomaly(
            AnomalyKind::UnknownVariant,
            start,
            len,
            format!("unknown OXM basic field {}", header.field),
        );
        return Ok(());
    };
    scope.set_name(basic.name.to_ascii_lowercase());

    let length = usize::from(header.length);
    if header.has_mask {
        match basic.widths.iter().find(|width| 2 * **width == length) {
            Some(&width) => {
                oxm_value(scope, basic, "value", width, false)?;
                oxm_value(scope, basic, "mask", width, true)?;
            }
            None => inconsistent_value(scope, basic, length)?,
        }
    } else if basic.widths.contains(&length) {
        oxm_value(scope, basic, "value", length, false)?;
    } else if length > basic.max_width() {
        // Decode what the field defines; the engine flags the rest.
        oxm_value(scope, basic, "value", basic.max_width(), false)?;
    } else {
        inconsistent_value(scope, basic, length)?;
    }
    Ok(())
}

fn oxm_value(
    scope: &mut Scope<'_, '_>,
    basic: &BasicField,
    name: &str,
    width: usize,
    mask: bool,
) -> Result<(), OpenFlowError> {
    match basic.kind {
        ValueKind::Mac => scope.mac(name).map(|_| ()),
        ValueKind::Ipv4 => scope.ipv4(name),
        ValueKind::Ipv6 => scope.ipv6(name),
        ValueKind::Port if !mask => scope.reserved(name, ReservedSite::PortNo).map(|_| ()),
        ValueKind::VlanVid if !mask => scope
            .uint_display(name, width, |vid| Some(render_vlan_vid(vid)))
            .map(|_| ()),
        ValueKind::Uint | ValueKind::Port | ValueKind::VlanVid => {
            scope.uint(name, width).map(|_| ())
        }
    }
}

fn render_vlan_vid(vid: u64) -> String {
    if vid & OFPVID_PRESENT != 0 {
        format!("present|{}", vid & 0x0fff)
    } else if vid == 0 {
        "none".to_string()
    } else {
        format!("{vid}")
    }
}

fn inconsistent_value(
    scope: &mut Scope<'_, '_>,
    basic: &BasicField,
    length: usize,
) -> Result<(), OpenFlowError> {
    let offset = scope.pos();
    let len = scope.rest("value")?;
    let expected = basic
        .widths
        .iter()
        .map(|width| width.to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    scope.anomaly(
        AnomalyKind::InconsistentLength,
        offset,
        len,
        format!("{} declares {length} value bytes, expected {expected} (doubled when masked)", basic.name),
    );
    Ok(())
}

fn experimenter_oxm(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let header = oxm_header(scope)?;
    scope.u32("experimenter")?;
    if header.has_mask {
        let payload = scope.remaining();
        if payload % 2 != 0 {
            let offset = scope.pos();
            let len = scope.rest("value")?;
            scope.anomaly(
                AnomalyKind::InconsistentLength,
                offset,
                len,
                format!("masked experimenter field carries an odd payload of {payload} bytes"),
            );
            return Ok(());
        }
        scope.bytes("value", payload / 2)?;
        scope.rest("mask")?;
    } else {
        scope.rest("value")?;
    }
    Ok(())
}

fn oxm_id(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    let header = oxm_header(scope)?;
    if header.class == layout::OFPXMC_OPENFLOW_BASIC {
        if let Some(name) = basic_field_name(header.field) {
            scope.set_name(name.to_ascii_lowercase());
        }
    }
    if header.class == layout::OFPXMC_EXPERIMENTER {
        scope.u32("experimenter")?;
    }
    Ok(())
}
