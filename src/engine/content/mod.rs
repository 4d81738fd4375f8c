// Builtin content types and their importers

mod text;
mod texture;

pub use text::{Text, TextImporter};
pub use texture::{Texture, TextureImporter};

use crate::engine::assets::{AssetError, ImporterRegistry};

/// Register the builtin importers for textures and text
pub fn register_builtin(registry: &mut ImporterRegistry) -> Result<(), AssetError> {
    registry.register(TextureImporter, TextureImporter::EXTENSIONS)?;
    registry.register(TextImporter, TextImporter::EXTENSIONS)?;
    Ok(())
}
