use super::error::OpenFlowError;
use super::layout;
use super::registry::{DecodeFn, ListKind, RegistryBuilder, VariantEntry};
use super::reserved::ReservedSite;
use super::scope::Scope;

const PROPERTIES: &[(u16, &str, DecodeFn)] = &[
    (layout::OFPTFPT_INSTRUCTIONS, "instructions", instruction_ids),
    (layout::OFPTFPT_INSTRUCTIONS_MISS, "instructions_miss", instruction_ids),
    (layout::OFPTFPT_NEXT_TABLES, "next_tables", next_tables),
    (layout::OFPTFPT_NEXT_TABLES_MISS, "next_tables_miss", next_tables),
    (layout::OFPTFPT_WRITE_ACTIONS, "write_actions", action_ids),
    (layout::OFPTFPT_WRITE_ACTIONS_MISS, "write_actions_miss", action_ids),
    (layout::OFPTFPT_APPLY_ACTIONS, "apply_actions", action_ids),
    (layout::OFPTFPT_APPLY_ACTIONS_MISS, "apply_actions_miss", action_ids),
    (layout::OFPTFPT_MATCH, "match", oxm_ids),
    (layout::OFPTFPT_WILDCARDS, "wildcards", oxm_ids),
    (layout::OFPTFPT_WRITE_SETFIELD, "write_setfield", oxm_ids),
    (layout::OFPTFPT_WRITE_SETFIELD_MISS, "write_setfield_miss", oxm_ids),
    (layout::OFPTFPT_APPLY_SETFIELD, "apply_setfield", oxm_ids),
    (layout::OFPTFPT_APPLY_SETFIELD_MISS, "apply_setfield_miss", oxm_ids),
    (layout::OFPTFPT_EXPERIMENTER, "experimenter", experimenter),
    (layout::OFPTFPT_EXPERIMENTER_MISS, "experimenter_miss", experimenter),
];

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = builder.register(
        ListKind::TableFeatures,
        0,
        VariantEntry::new("table_features", layout::TABLE_FEATURES_MIN_LEN, table_features),
    );
    PROPERTIES.iter().fold(builder, |builder, (prop_type, name, decode)| {
        let min_len = if matches!(
            *prop_type,
            layout::OFPTFPT_EXPERIMENTER | layout::OFPTFPT_EXPERIMENTER_MISS
        ) {
            12
        } else {
            layout::TABLE_FEATURE_PROP_HEADER_LEN
        };
        builder.register(
            ListKind::TableFeatureProperty,
            u32::from(*prop_type),
            VariantEntry::new(*name, min_len, *decode),
        )
    })
}

fn table_features(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.u16("length")?;
    scope.reserved("table_id", ReservedSite::TableId)?;
    scope.pad(5)?;
    scope.string("name", layout::OFP_MAX_TABLE_NAME_LEN)?;
    scope.uint_display("metadata_match", 8, |mask| Some(format!("{mask:#018x}")))?;
    scope.uint_display("metadata_write", 8, |mask| Some(format!("{mask:#018x}")))?;
    scope.u32("config")?;
    scope.u32("max_entries")?;
    let end = scope.end();
    scope.list(ListKind::TableFeatureProperty, end)
}

fn property_header(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("type", 2, layout::TABLE_FEATURE_PROP_NAMES)?;
    scope.u16("length")?;
    Ok(())
}

fn instruction_ids(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    let end = scope.end();
    scope.list(ListKind::InstructionId, end)
}

fn next_tables(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    while scope.remaining() > 0 {
        scope.reserved("table_id", ReservedSite::TableId)?;
    }
    Ok(())
}

fn action_ids(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    let end = scope.end();
    scope.list(ListKind::ActionId, end)
}

fn oxm_ids(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    let end = scope.end();
    scope.list(ListKind::OxmId, end)
}

fn experimenter(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    property_header(scope)?;
    scope.u32("experimenter")?;
    scope.u32("exp_type")?;
    while scope.remaining() >= 4 {
        scope.u32("experimenter_data")?;
    }
    Ok(())
}
