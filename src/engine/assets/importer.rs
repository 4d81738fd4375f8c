// Importer trait and the tag / extension registry

use super::loader::ContentBackend;
use super::{Asset, AssetError, AssetValue, TypeTag};
use anyhow::Result;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// Turns the content at a path into an asset value
pub trait Importer: Send + Sync {
    /// Tag of the values this importer produces
    fn tag(&self) -> TypeTag;

    /// Import the asset at `path` (relative to the content root)
    fn import(&self, backend: &dyn ContentBackend, path: &Path) -> Result<AssetValue>;
}

pub type SharedImporter = Arc<dyn Importer>;

/// Run an importer, wrapping any failure with the asset path
pub fn import(
    importer: &dyn Importer,
    backend: &dyn ContentBackend,
    path: &Path,
) -> Result<AssetValue, AssetError> {
    let value = importer
        .import(backend, path)
        .map_err(|source| AssetError::ContentLoad {
            path: path.to_path_buf(),
            source,
        })?;

    if value.tag() != importer.tag() {
        value.dispose();
        return Err(AssetError::TypeMismatch {
            name: path.display().to_string(),
            expected: importer.tag(),
            actual: value.tag(),
        });
    }

    Ok(value)
}

/// Importer built from a decoding closure over the raw file bytes
pub struct FnImporter<T, F> {
    decode: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> FnImporter<T, F>
where
    T: Asset,
    F: Fn(&[u8]) -> Result<T> + Send + Sync,
{
    pub fn new(decode: F) -> Self {
        Self {
            decode,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> Importer for FnImporter<T, F>
where
    T: Asset,
    F: Fn(&[u8]) -> Result<T> + Send + Sync,
{
    fn tag(&self) -> TypeTag {
        T::TAG
    }

    fn import(&self, backend: &dyn ContentBackend, path: &Path) -> Result<AssetValue> {
        let bytes = backend.read(path)?;
        Ok(AssetValue::plain((self.decode)(&bytes)?))
    }
}

/// Maps type tags and file extensions to importers
///
/// The two maps are independent: an extension may point at a different
/// importer than the one registered for that importer's tag.
#[derive(Default)]
pub struct ImporterRegistry {
    by_type: HashMap<TypeTag, SharedImporter>,
    by_extension: HashMap<String, SharedImporter>,
}

impl ImporterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `importer` for `tag`, then for each of `extensions`
    pub fn register_by_type(
        &mut self,
        tag: TypeTag,
        importer: SharedImporter,
        extensions: &[&str],
    ) -> Result<(), AssetError> {
        if self.by_type.contains_key(&tag) {
            return Err(AssetError::Conflict(format!(
                "an importer is already registered for type '{}'",
                tag
            )));
        }

        self.by_type.insert(tag, importer.clone());
        debug!("Registered importer for type '{}'", tag);

        self.register_by_extension(importer, extensions)
    }

    /// Register `importer` for each of `extensions`
    ///
    /// Not atomic: extensions registered before a conflicting one stay
    /// registered.
    pub fn register_by_extension(
        &mut self,
        importer: SharedImporter,
        extensions: &[&str],
    ) -> Result<(), AssetError> {
        for extension in extensions {
            let key = normalize_extension(extension);

            if self.by_extension.contains_key(&key) {
                return Err(AssetError::Conflict(format!(
                    "an importer is already registered for extension '{}'",
                    key
                )));
            }

            debug!("Registered '{}' importer for .{}", importer.tag(), key);
            self.by_extension.insert(key, importer.clone());
        }

        Ok(())
    }

    /// Register an importer under its own tag and the given extensions
    pub fn register<I: Importer + 'static>(
        &mut self,
        importer: I,
        extensions: &[&str],
    ) -> Result<(), AssetError> {
        let tag = importer.tag();
        self.register_by_type(tag, Arc::new(importer), extensions)
    }

    /// Look up the importer registered for a type tag
    pub fn resolve_by_type(&self, tag: TypeTag) -> Result<SharedImporter, AssetError> {
        self.by_type.get(&tag).cloned().ok_or_else(|| {
            AssetError::NotFound(format!("no importer registered for type '{}'", tag))
        })
    }

    /// Look up the importer registered for a file extension
    pub fn resolve_by_extension(&self, extension: &str) -> Result<SharedImporter, AssetError> {
        let key = normalize_extension(extension);
        self.by_extension
            .get(&key)
            .cloned()
            .ok_or_else(|| AssetError::UnsupportedFormat(format!(".{}", key)))
    }

    /// Check if a type tag has an importer
    pub fn contains_type(&self, tag: TypeTag) -> bool {
        self.by_type.contains_key(&tag)
    }

    /// Check if an extension has an importer
    pub fn contains_extension(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&normalize_extension(extension))
    }

    /// All registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl fmt::Debug for ImporterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<TypeTag> = self.by_type.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("ImporterRegistry")
            .field("types", &types)
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
