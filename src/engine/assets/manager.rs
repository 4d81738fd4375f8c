// Central asset catalog

use super::group::{split_uri, AssetGroup, AssetSlot, PrepareOptions, ScanContext, URI_SEPARATOR};
use super::importer::{import, ImporterRegistry};
use super::loader::{FileBackend, SharedBackend};
use super::{Asset, AssetError, AssetValue};
use crate::core::paths;
use crate::engine::content;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the content root
pub const CONTENT_ROOT_ENV: &str = "ASSET_CONTENT_ROOT";

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory holding one folder per preparable group
    pub content_root: PathBuf,

    /// Options used by [`Catalog::prepare_default`]
    pub default_options: PrepareOptions,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("Content"),
            default_options: PrepareOptions::default(),
        }
    }
}

impl CatalogConfig {
    /// Default configuration, with the content root taken from
    /// `ASSET_CONTENT_ROOT` when it is set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var(CONTENT_ROOT_ENV) {
            config.content_root = PathBuf::from(root);
        }
        config
    }

    pub fn with_content_root<P: AsRef<Path>>(mut self, content_root: P) -> Self {
        self.content_root = content_root.as_ref().to_path_buf();
        self
    }

    pub fn with_default_options(mut self, options: PrepareOptions) -> Self {
        self.default_options = options;
        self
    }
}

/// Named tree of game content
///
/// Each root group is prepared from `content_root/<name>` and addressed by
/// dotted URIs such as `sprites.ui.button`. The catalog is single-threaded:
/// prepare and unload between frames, look up during them.
pub struct Catalog {
    config: CatalogConfig,

    /// Content source shared with lazy handles
    backend: SharedBackend,

    importers: ImporterRegistry,

    /// Prepared root groups
    roots: BTreeMap<String, AssetGroup>,
}

impl Catalog {
    /// Create a catalog reading content files from the configured root
    pub fn new(config: CatalogConfig) -> Self {
        let backend = Arc::new(FileBackend::new(&config.content_root));
        Self::with_backend(config, backend)
    }

    /// Create a catalog over a custom content backend
    pub fn with_backend(config: CatalogConfig, backend: SharedBackend) -> Self {
        info!("Asset catalog over {}", config.content_root.display());

        Self {
            config,
            backend,
            importers: ImporterRegistry::new(),
            roots: BTreeMap::new(),
        }
    }

    /// Register the texture and text importers
    pub fn with_builtin_importers(mut self) -> Result<Self, AssetError> {
        content::register_builtin(&mut self.importers)?;
        Ok(self)
    }

    /// Get the importer registry
    pub fn importers(&self) -> &ImporterRegistry {
        &self.importers
    }

    /// Get the importer registry for registration
    pub fn importers_mut(&mut self) -> &mut ImporterRegistry {
        &mut self.importers
    }

    /// Get the content root
    pub fn content_root(&self) -> &Path {
        &self.config.content_root
    }

    /// Get the configuration
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Scan `content_root/name` and register the result as root group `name`
    ///
    /// Nothing is registered unless the whole tree was built. Pruning applies
    /// to subgroups only: a root left empty is still registered.
    pub fn prepare(&mut self, name: &str, options: &PrepareOptions) -> Result<(), AssetError> {
        if name.is_empty() || name.contains(URI_SEPARATOR) || name.contains(['/', '\\']) {
            return Err(AssetError::InvalidUri(name.to_string()));
        }

        if self.roots.contains_key(name) {
            return Err(AssetError::Conflict(format!(
                "group '{}' is already prepared",
                name
            )));
        }

        let dir = self.config.content_root.join(name);
        if !dir.is_dir() {
            return Err(AssetError::NotFound(dir.display().to_string()));
        }

        let ctx = ScanContext {
            content_root: &self.config.content_root,
            importers: &self.importers,
            backend: &self.backend,
        };
        let group = AssetGroup::build(&dir, None, options, &ctx)?;

        if group.is_empty() {
            warn!("Prepared group '{}' is empty", name);
        }

        info!("Prepared group '{}' ({:?}, {:?})", name, options.scan, options.policy);
        self.roots.insert(name.to_string(), group);
        Ok(())
    }

    /// Prepare a group with the configured default options
    pub fn prepare_default(&mut self, name: &str) -> Result<(), AssetError> {
        let options = self.config.default_options.clone();
        self.prepare(name, &options)
    }

    /// Get an asset by URI
    ///
    /// `root.sub.asset` is resolved through the prepared groups. A URI without
    /// a separator names content directly (relative to the content root, no
    /// extension) and is imported by the importer registered for `T`; such
    /// loads are not cached.
    pub fn get<T: Asset>(&self, uri: &str) -> Result<Arc<T>, AssetError> {
        match uri.split_once(URI_SEPARATOR) {
            Some((root, rest)) => {
                let group = self.root(root)?;
                group.asset::<T>(&split_uri(rest))
            }
            None => self.load_direct::<T>(uri),
        }
    }

    /// Get a group by URI (`root` or `root.sub...`)
    pub fn group(&self, uri: &str) -> Result<&AssetGroup, AssetError> {
        match uri.split_once(URI_SEPARATOR) {
            Some((root, rest)) => self.root(root)?.subgroup_by_name(rest),
            None => self.root(uri),
        }
    }

    /// Import a single content file, choosing the importer by its extension
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<AssetValue, AssetError> {
        let path = path.as_ref();
        let extension = paths::extension(path)
            .ok_or_else(|| AssetError::UnsupportedFormat(path.display().to_string()))?;
        let importer = self.importers.resolve_by_extension(&extension)?;

        import(importer.as_ref(), self.backend.as_ref(), path)
    }

    /// Import a single content file as `T`, choosing the importer by its extension
    pub fn load_file<T: Asset, P: AsRef<Path>>(&self, path: P) -> Result<Arc<T>, AssetError> {
        let path = path.as_ref();
        let value = self.import_file(path)?;
        value.downcast::<T>(&path.display().to_string())
    }

    fn load_direct<T: Asset>(&self, uri: &str) -> Result<Arc<T>, AssetError> {
        if uri.is_empty() {
            return Err(AssetError::InvalidUri(uri.to_string()));
        }

        let importer = self.importers.resolve_by_type(T::TAG)?;
        let value = import(importer.as_ref(), self.backend.as_ref(), Path::new(uri))?;
        debug!("Loaded '{}' directly as {}", uri, T::TAG);
        value.downcast::<T>(uri)
    }

    /// Unload a root group (`root`) or a subgroup (`root.sub...`)
    ///
    /// Everything below the named group is disposed first. `reclaim_hint`
    /// tells the backend that many resources were released.
    pub fn unload(&mut self, uri: &str, reclaim_hint: bool) -> Result<(), AssetError> {
        match uri.split_once(URI_SEPARATOR) {
            Some((root, rest)) => {
                let group = self
                    .roots
                    .get_mut(root)
                    .ok_or_else(|| AssetError::NotFound(root.to_string()))?;
                group.remove_subgroup(&split_uri(rest))?;
            }
            None => {
                let mut group = self
                    .roots
                    .remove(uri)
                    .ok_or_else(|| AssetError::NotFound(uri.to_string()))?;
                group.dispose();
            }
        }

        info!("Unloaded '{}'", uri);
        self.backend.reclaim(reclaim_hint);
        Ok(())
    }

    /// Unload every prepared group
    pub fn unload_all(&mut self, reclaim_hint: bool) {
        if self.roots.is_empty() {
            return;
        }

        for group in self.roots.values_mut() {
            group.dispose();
        }
        self.roots.clear();

        info!("Unloaded all groups");
        self.backend.reclaim(reclaim_hint);
    }

    /// Check if a root group is prepared
    pub fn is_prepared(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    /// Names of the prepared root groups, sorted
    pub fn root_names(&self) -> Vec<&str> {
        self.roots.keys().map(|s| s.as_str()).collect()
    }

    /// Get statistics about prepared content
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            root_count: self.roots.len(),
            ..CatalogStats::default()
        };

        for root in self.roots.values() {
            root.walk(|group, _| {
                stats.group_count += 1;
                for name in group.asset_names() {
                    match group.slot(name) {
                        Some(slot) if slot.is_loaded() => stats.loaded_assets += 1,
                        Some(AssetSlot::Lazy(_)) => stats.pending_assets += 1,
                        _ => {}
                    }
                }
            });
        }

        stats
    }

    fn root(&self, name: &str) -> Result<&AssetGroup, AssetError> {
        self.roots
            .get(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.unload_all(false);
    }
}

/// Statistics about prepared content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub root_count: usize,
    pub group_count: usize,
    pub loaded_assets: usize,
    /// Lazy assets not yet materialized
    pub pending_assets: usize,
}
