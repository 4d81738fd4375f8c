// Asset catalog system
//
// Scans a content root into a tree of named groups, imports files through
// registered importers (eagerly or lazily) and resolves dotted asset URIs.

mod group;
mod handle;
mod importer;
mod loader;
mod manager;
mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use group::{
    split_uri, AssetGroup, AssetSlot, LoadPolicy, PrepareOptions, ScanMode, URI_SEPARATOR,
};
pub use handle::LazyAsset;
pub use importer::{import, FnImporter, Importer, ImporterRegistry, SharedImporter};
pub use loader::{ContentBackend, FileBackend, SharedBackend};
pub use manager::{Catalog, CatalogConfig, CatalogStats, CONTENT_ROOT_ENV};
pub use value::{Asset, AssetValue, Dispose, TypeTag};

use crate::core::paths::PathError;
use std::path::PathBuf;

/// Asset catalog errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: no importer registered for '{0}'")]
    UnsupportedFormat(String),

    #[error("Type mismatch for '{name}': requested {expected}, stored {actual}")]
    TypeMismatch {
        name: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    #[error("Failed to load asset '{}': {source}", path.display())]
    ContentLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid asset uri: '{0}'")]
    InvalidUri(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_display() {
        let err = AssetError::NotFound("sprites.bg".to_string());
        assert_eq!(err.to_string(), "Asset not found: sprites.bg");

        let err = AssetError::TypeMismatch {
            name: "sprites.bg".to_string(),
            expected: TypeTag::new("text"),
            actual: TypeTag::new("texture"),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for 'sprites.bg': requested text, stored texture"
        );
    }

    #[test]
    fn test_content_load_keeps_cause() {
        use std::error::Error;

        let err = AssetError::ContentLoad {
            path: PathBuf::from("sprites/bg.png"),
            source: anyhow::anyhow!("truncated file"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load asset 'sprites/bg.png': truncated file"
        );
        assert!(err.source().is_some());
    }
}
