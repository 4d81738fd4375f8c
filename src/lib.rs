//! Hierarchical asset catalog
//!
//! Content is prepared one root group at a time from a content directory,
//! imported through registered importers (eagerly or on first access) and
//! addressed by dotted URIs such as `sprites.ui.button`.

pub mod core;
pub mod engine;

pub use engine::assets::{
    Asset, AssetError, AssetGroup, Catalog, CatalogConfig, LoadPolicy, PrepareOptions, ScanMode,
    TypeTag,
};
pub use engine::content::{Text, Texture};
