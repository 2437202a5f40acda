use super::error::OpenFlowError;
use super::layout;
use super::registry::{ListKind, RegistryBuilder, VariantEntry};
use super::scope::Scope;

pub(crate) fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder.register(
        ListKind::HelloElement,
        u32::from(layout::OFPHET_VERSIONBITMAP),
        VariantEntry::new("version_bitmap", 4, version_bitmap),
    )
}

fn version_bitmap(scope: &mut Scope<'_, '_>) -> Result<(), OpenFlowError> {
    scope.named("type", 2, layout::HELLO_ELEMENT_TYPE_NAMES)?;
    scope.u16("length")?;
    let mut index = 0;
    while scope.remaining() >= 4 {
        // Bitmap word N covers versions 32*N..32*N+31.
        if index == 0 {
            scope.flags("bitmap", 4, layout::VERSION_BITMAP_NAMES)?;
        } else {
            scope.u32("bitmap")?;
        }
        index += 1;
    }
    Ok(())
}
