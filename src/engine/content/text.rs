// Text content

use crate::engine::assets::{Asset, AssetValue, ContentBackend, Importer, TypeTag};
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// UTF-8 text such as dialogue lines or credits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(String);

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the lines of the text
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Asset for Text {
    const TAG: TypeTag = TypeTag::new("text");
}

/// Imports `.txt` files as [`Text`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TextImporter;

impl TextImporter {
    pub const EXTENSIONS: &'static [&'static str] = &["txt"];
}

impl Importer for TextImporter {
    fn tag(&self) -> TypeTag {
        Text::TAG
    }

    fn import(&self, backend: &dyn ContentBackend, path: &Path) -> Result<AssetValue> {
        let bytes = backend.read(path)?;
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
        Ok(AssetValue::plain(Text(text)))
    }
}
