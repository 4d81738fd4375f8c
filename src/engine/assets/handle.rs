// Deferred, memoized single-asset loads

use super::importer::{import, SharedImporter};
use super::loader::SharedBackend;
use super::{Asset, AssetError, AssetValue, TypeTag};
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Placeholder for an asset that is imported on first typed access
///
/// The importer is chosen when the file is scanned; the content itself is only
/// read by the first successful [`LazyAsset::load`]. A failed load leaves the
/// handle unloaded so it can be retried. Once disposed, a handle never loads
/// again.
pub struct LazyAsset {
    /// Asset name within its group
    name: String,

    /// Path relative to the content root
    path: PathBuf,

    importer: SharedImporter,
    backend: SharedBackend,

    state: RefCell<LoadState>,
}

#[derive(Debug)]
enum LoadState {
    Unloaded,
    /// Set once, on the first successful load
    Loaded(AssetValue),
    Disposed,
}

impl LazyAsset {
    /// Create an unloaded handle
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        importer: SharedImporter,
        backend: SharedBackend,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            importer,
            backend,
            state: RefCell::new(LoadState::Unloaded),
        }
    }

    /// Load the asset as `T`, importing it on the first call
    ///
    /// Requesting a type other than the one the importer produces (or the one
    /// already memoized) fails with [`AssetError::TypeMismatch`]. Loading a
    /// disposed handle fails with [`AssetError::NotFound`].
    pub fn load<T: Asset>(&self) -> Result<Arc<T>, AssetError> {
        match &*self.state.borrow() {
            LoadState::Loaded(value) => return value.downcast::<T>(&self.name),
            LoadState::Disposed => {
                return Err(AssetError::NotFound(format!(
                    "'{}' ({}) was disposed",
                    self.name,
                    self.path.display()
                )))
            }
            LoadState::Unloaded => {}
        }

        let produced = self.importer.tag();
        if produced != T::TAG {
            return Err(AssetError::TypeMismatch {
                name: self.name.clone(),
                expected: T::TAG,
                actual: produced,
            });
        }

        let value = import(self.importer.as_ref(), self.backend.as_ref(), &self.path)?;
        let typed = value.downcast::<T>(&self.name)?;

        debug!("Lazily loaded '{}' from {}", self.name, self.path.display());
        *self.state.borrow_mut() = LoadState::Loaded(value);

        Ok(typed)
    }

    /// Check if the asset has been materialized
    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Loaded(_))
    }

    /// Check if the handle has been disposed
    pub fn is_disposed(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Disposed)
    }

    /// The memoized value, if loaded
    pub fn loaded_value(&self) -> Option<AssetValue> {
        match &*self.state.borrow() {
            LoadState::Loaded(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Get the asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the content-relative path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tag of the type this handle will load as
    pub fn tag(&self) -> TypeTag {
        self.importer.tag()
    }

    /// Dispose the memoized value, if any; later loads are rejected
    pub fn dispose(&self) {
        let previous = self.state.replace(LoadState::Disposed);
        if let LoadState::Loaded(value) = previous {
            value.dispose();
        }
    }
}

impl fmt::Debug for LazyAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyAsset")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("tag", &self.tag())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::fixtures::{self, FlakyBackend, Note};
    use crate::engine::assets::FnImporter;
    use crate::engine::content::Texture;

    fn note_importer() -> SharedImporter {
        Arc::new(FnImporter::new(|bytes: &[u8]| {
            Ok(Note(String::from_utf8(bytes.to_vec())?))
        }))
    }

    #[test]
    fn test_starts_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend.clone());

        assert!(!handle.is_loaded());
        assert_eq!(handle.name(), "motd");
        assert_eq!(handle.tag(), Note::TAG);
        assert_eq!(backend.reads(), 0);
    }

    #[test]
    fn test_load_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_text(dir.path(), "motd.note", "welcome");
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend.clone());

        let first = handle.load::<Note>().unwrap();
        let second = handle.load::<Note>().unwrap();

        assert_eq!(first.0, "welcome");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(handle.is_loaded());
        assert_eq!(backend.reads(), 1);
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_text(dir.path(), "motd.note", "welcome");
        let backend = Arc::new(FlakyBackend::new(dir.path(), 1));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend.clone());

        let failed = handle.load::<Note>();
        match failed {
            Err(AssetError::ContentLoad { path, .. }) => {
                assert_eq!(path, PathBuf::from("motd.note"))
            }
            other => panic!("expected ContentLoad, got {:?}", other),
        }
        assert!(!handle.is_loaded());

        let loaded = handle.load::<Note>().unwrap();
        assert_eq!(loaded.0, "welcome");
        assert_eq!(backend.reads(), 2);
    }

    #[test]
    fn test_wrong_type_before_load() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_text(dir.path(), "motd.note", "welcome");
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend.clone());

        let result = handle.load::<Texture>();
        assert!(matches!(result, Err(AssetError::TypeMismatch { .. })));
        // Rejected without touching the backend
        assert_eq!(backend.reads(), 0);
        assert!(!handle.is_loaded());
    }

    #[test]
    fn test_wrong_type_after_load() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_text(dir.path(), "motd.note", "welcome");
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend);

        handle.load::<Note>().unwrap();
        let result = handle.load::<Texture>();
        assert!(matches!(
            result,
            Err(AssetError::TypeMismatch { expected, actual, .. })
                if expected == Texture::TAG && actual == Note::TAG
        ));
    }

    #[test]
    fn test_load_after_dispose_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_png(dir.path(), "bg.png", 2, 2);
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let importer: SharedImporter = Arc::new(crate::engine::content::TextureImporter);
        let handle = LazyAsset::new("bg", "bg.png", importer, backend.clone());

        let texture = handle.load::<Texture>().unwrap();
        assert!(!texture.is_released());

        handle.dispose();
        assert!(texture.is_released());
        assert!(!handle.is_loaded());
        assert!(handle.is_disposed());

        // No second texture is materialized
        let result = handle.load::<Texture>();
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert_eq!(backend.reads(), 1);

        handle.dispose();
        assert!(handle.is_disposed());
    }

    #[test]
    fn test_dispose_before_load() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_text(dir.path(), "motd.note", "welcome");
        let backend = Arc::new(FlakyBackend::new(dir.path(), 0));
        let handle = LazyAsset::new("motd", "motd.note", note_importer(), backend.clone());

        handle.dispose();
        assert!(matches!(handle.load::<Note>(), Err(AssetError::NotFound(_))));
        assert_eq!(backend.reads(), 0);
    }
}
