use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

const INSTRUCTIONS: &[(u16, VariantEntry)] = &[
    (layout::OFPIT_GOTO_TABLE, VariantEntry::new("goto_table", 8, goto_table)),
    (
        layout::OFPIT_WRITE_METADATA,
        VariantEntry::new("write_metadata", layout::INSTRUCTION_WRITE_METADATA_LEN, write_metadata),
    ),
    (layout::OFPIT_WRITE_ACTIONS, VariantEntry::new("write_actions", 8, actions)),
    (layout::OFPIT_APPLY_ACTIONS, VariantEntry::new("apply_actions", 8, actions)),
    (layout::OFPIT_CLEAR_ACTIONS, VariantEntry::new("clear_actions", 8, actions)),
    (layout::OFPIT_METER, VariantEntry::new("meter", 8, meter)),
    (layout::OFPIT_EXPERIMENTER, VariantEntry::new("experimenter", 8, experimenter)),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    INSTRUCTIONS.iter().fold(builder, |builder, (instruction_type, entry)| {
        let tag = u32::from(*instruction_type);
        let id_min = if *instruction_type == layout::OFPIT_EXPERIMENTER { 8 } else { 4 };
        builder.register(ListKind::Instruction, tag, *entry).register(
            ListKind::InstructionId,
            tag,
            VariantEntry::new(entry.name, id_min, instruction_id),
        )
    })
}

fn instruction_header(scope: &mut Scope<'_, '_>) -> Result<u16, OpenFlowError> {
    let instruction_type = scope.named("type", 2, layout::INSTRUCTION_TYPE_NAMES)? as u16;
    scope.u16("len")?;
    Ok(instruction_type)
}

fn goto_table(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    instruction_header(scope)?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(3)
}

fn write_metadata(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    instruction_header(scope)?;
    scope.pad(4)?;
    scope.u64("metadata")?;
    scope.u64("metadata_mask")?;
    Ok(())
}

fn actions(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    instruction_header(scope)?;
    scope.pad(4)?;
    let end = scope.end();
    scope.list(ListKind::Action, end)
}

fn meter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    instruction_header(scope)?;
    scope.reserved("meter_id", ReservedSite::MeterId)?;
    Ok(())
}

fn experimenter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    instruction_header(scope)?;
    scope.u32("experimenter")?;
    scope.rest("data")?;
    Ok(())
}

fn instruction_id(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    if instruction_header(scope)? == layout::OFPIT_EXPERIMENTER {
        scope.u32("experimenter")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::protocols::openflow::reader::OfReader;
    use crate::protocols::openflow::registry::{ListKind, RegistryBuilder};
    use crate::protocols::openflow::scope::Scope;
    use crate::protocols::openflow::tree::AnomalyKind;

    #[test]
    fn apply_actions_nests_action_list() {
        let bytes = [
            0x00, 0x04, 0x00, 0x18, 0, 0, 0, 0, //
            0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0, 0, 0, 0, 0, 0,
        ];
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(&bytes), "instructions");
        scope.list(ListKind::Instruction, bytes.len()).unwrap();
        let node = scope.finish();
        let apply = node.child("apply_actions").unwrap();
        let output = apply.child("output").unwrap();
        assert_eq!(output.field("port").unwrap().as_uint(), Some(2));
        assert!(node.collect_anomalies().is_empty());
    }

    #[test]
    fn undersized_instruction_is_clamped() {
        // goto_table declaring 4 bytes is clamped to the 8-byte minimum.
        let bytes = [0x00, 0x01, 0x00, 0x04, 0x05, 0, 0, 0];
        let registry = RegistryBuilder::openflow13().build();
        let mut scope = Scope::new(&registry, OfReader::new(&bytes), "instructions");
        scope.list(ListKind::Instruction, bytes.len()).unwrap();
        let node = scope.finish();
        let goto = node.child("goto_table").unwrap();
        assert_eq!(goto.field("table_id").unwrap().as_uint(), Some(5));
        let kinds: Vec<_> = node.collect_anomalies().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, [AnomalyKind::InconsistentLength]);
    }
}
