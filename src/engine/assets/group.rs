// Asset groups: the tree built from one content directory

use super::handle::LazyAsset;
use super::importer::{import, ImporterRegistry};
use super::loader::SharedBackend;
use super::{Asset, AssetError, AssetValue};
use crate::core::paths::{self, NameFilter};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Separator between the segments of an asset URI
pub const URI_SEPARATOR: char = '.';

/// Split a dotted URI into its segments
pub fn split_uri(uri: &str) -> Vec<&str> {
    uri.split(URI_SEPARATOR).collect()
}

/// How far a scan descends into the directory tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Files in the group directory only
    Shallow,
    /// Files plus every subdirectory, each becoming a subgroup
    #[default]
    Deep,
}

/// When scanned files are imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Import every file during the scan
    #[default]
    Eager,
    /// Store a [`LazyAsset`] and import on first access
    Lazy,
}

/// Options for preparing a group
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub scan: ScanMode,
    pub file_filter: NameFilter,
    pub folder_filter: NameFilter,
    /// Drop subgroups left with no assets and no subgroups
    pub prune: bool,
    pub policy: LoadPolicy,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            scan: ScanMode::Deep,
            file_filter: NameFilter::any(),
            folder_filter: NameFilter::any(),
            prune: true,
            policy: LoadPolicy::Eager,
        }
    }
}

impl PrepareOptions {
    pub fn shallow(mut self) -> Self {
        self.scan = ScanMode::Shallow;
        self
    }

    pub fn deep(mut self) -> Self {
        self.scan = ScanMode::Deep;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.policy = LoadPolicy::Lazy;
        self
    }

    pub fn eager(mut self) -> Self {
        self.policy = LoadPolicy::Eager;
        self
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Only import files whose names match `pattern`
    pub fn with_file_filter(mut self, pattern: &str) -> Result<Self, AssetError> {
        self.file_filter = NameFilter::new(pattern)?;
        Ok(self)
    }

    /// Only descend into folders whose names match `pattern`
    pub fn with_folder_filter(mut self, pattern: &str) -> Result<Self, AssetError> {
        self.folder_filter = NameFilter::new(pattern)?;
        Ok(self)
    }
}

/// What a scan needs besides the directory itself
pub(crate) struct ScanContext<'a> {
    pub content_root: &'a Path,
    pub importers: &'a ImporterRegistry,
    pub backend: &'a SharedBackend,
}

/// A stored asset: imported, or waiting for its first access
#[derive(Debug)]
pub enum AssetSlot {
    Loaded(AssetValue),
    Lazy(LazyAsset),
}

impl AssetSlot {
    fn resolve<T: Asset>(&self, name: &str) -> Result<Arc<T>, AssetError> {
        match self {
            AssetSlot::Loaded(value) => value.downcast::<T>(name),
            AssetSlot::Lazy(handle) => handle.load::<T>(),
        }
    }

    /// Check if the asset has been materialized
    pub fn is_loaded(&self) -> bool {
        match self {
            AssetSlot::Loaded(_) => true,
            AssetSlot::Lazy(handle) => handle.is_loaded(),
        }
    }

    fn dispose(&self) {
        match self {
            AssetSlot::Loaded(value) => value.dispose(),
            AssetSlot::Lazy(handle) => handle.dispose(),
        }
    }
}

/// A named collection of assets and child groups
///
/// Groups are built by a single scan and never change afterwards except by
/// removing whole subgroups.
#[derive(Debug)]
pub struct AssetGroup {
    /// Unqualified name (the directory name)
    name: String,

    /// Full name of the parent group, if any
    parent: Option<String>,

    /// Dotted path from the root group
    full_name: String,

    subgroups: BTreeMap<String, AssetGroup>,
    assets: BTreeMap<String, AssetSlot>,

    disposed: bool,
}

impl AssetGroup {
    fn new(name: String, parent: Option<&str>) -> Self {
        let full_name = match parent {
            Some(parent) => format!("{}{}{}", parent, URI_SEPARATOR, name),
            None => name.clone(),
        };

        Self {
            name,
            parent: parent.map(str::to_string),
            full_name,
            subgroups: BTreeMap::new(),
            assets: BTreeMap::new(),
            disposed: false,
        }
    }

    /// Build the group for `dir`
    ///
    /// Either the whole subtree is built or nothing is: on failure anything
    /// imported so far is disposed before the error is returned.
    pub(crate) fn build(
        dir: &Path,
        parent: Option<&str>,
        options: &PrepareOptions,
        ctx: &ScanContext<'_>,
    ) -> Result<Self, AssetError> {
        let mut group = Self::new(paths::file_name(dir), parent);

        if group.name.contains(URI_SEPARATOR) {
            warn!(
                "Group '{}' contains '{}' and cannot be addressed by uri",
                group.full_name, URI_SEPARATOR
            );
        }

        match group.populate(dir, options, ctx) {
            Ok(()) => Ok(group),
            Err(err) => {
                debug!("Discarding partially built group '{}'", group.full_name);
                group.dispose();
                Err(err)
            }
        }
    }

    fn populate(
        &mut self,
        dir: &Path,
        options: &PrepareOptions,
        ctx: &ScanContext<'_>,
    ) -> Result<(), AssetError> {
        if options.scan == ScanMode::Deep {
            for child_dir in paths::list_dirs(dir, &options.folder_filter)? {
                let parent = Some(self.full_name.as_str());
                let child = Self::build(&child_dir, parent, options, ctx)?;

                // Children are built with the same options, so pruning has
                // already been applied below this level
                if options.prune && child.is_empty() {
                    debug!("Pruned empty group '{}'", child.full_name);
                    continue;
                }

                self.subgroups.insert(child.name.clone(), child);
            }
        }

        for file in paths::list_files(dir, &options.file_filter)? {
            let name = paths::base_name(&file);

            if self.assets.contains_key(&name) {
                return Err(AssetError::Conflict(format!(
                    "asset '{}' is defined twice in group '{}'",
                    name, self.full_name
                )));
            }

            if name.contains(URI_SEPARATOR) {
                warn!(
                    "Asset '{}' in group '{}' contains '{}' and cannot be addressed by uri",
                    name, self.full_name, URI_SEPARATOR
                );
            }

            let relative = paths::make_relative(ctx.content_root, &file)?;
            let extension = paths::extension(&file)
                .ok_or_else(|| AssetError::UnsupportedFormat(paths::file_name(&file)))?;
            let importer = ctx.importers.resolve_by_extension(&extension)?;

            let slot = match options.policy {
                LoadPolicy::Eager => {
                    AssetSlot::Loaded(import(importer.as_ref(), ctx.backend.as_ref(), &relative)?)
                }
                LoadPolicy::Lazy => AssetSlot::Lazy(LazyAsset::new(
                    name.clone(),
                    relative,
                    importer,
                    Arc::clone(ctx.backend),
                )),
            };

            self.assets.insert(name, slot);
        }

        Ok(())
    }

    /// Get the unqualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the dotted name from the root group
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Get the parent's full name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Check if the group has neither assets nor subgroups
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.subgroups.is_empty()
    }

    /// Check if the group has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Names of the assets directly in this group, sorted
    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.keys().map(|s| s.as_str()).collect()
    }

    /// Names of the direct subgroups, sorted
    pub fn subgroup_names(&self) -> Vec<&str> {
        self.subgroups.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over the direct subgroups
    pub fn subgroups(&self) -> impl Iterator<Item = &AssetGroup> {
        self.subgroups.values()
    }

    /// Get the slot of an asset directly in this group
    pub fn slot(&self, name: &str) -> Option<&AssetSlot> {
        self.assets.get(name)
    }

    /// Resolve a descendant group from its path segments
    ///
    /// An empty path resolves to this group.
    pub fn subgroup(&self, segments: &[&str]) -> Result<&AssetGroup, AssetError> {
        let mut current = self;

        for &segment in segments {
            current = current
                .subgroups
                .get(segment)
                .ok_or_else(|| AssetError::NotFound(current.child_name(segment)))?;
        }

        Ok(current)
    }

    /// Resolve a descendant group from a dotted name relative to this group
    ///
    /// For a group named `Parent`, `subgroup_by_name("Child.GrandChild")`
    /// returns `Parent.Child.GrandChild`.
    pub fn subgroup_by_name(&self, name: &str) -> Result<&AssetGroup, AssetError> {
        self.subgroup(&split_uri(name))
    }

    fn subgroup_mut(&mut self, segments: &[&str]) -> Result<&mut AssetGroup, AssetError> {
        let mut current = self;

        for &segment in segments {
            let missing = AssetError::NotFound(current.child_name(segment));
            current = current.subgroups.get_mut(segment).ok_or(missing)?;
        }

        Ok(current)
    }

    /// Resolve an asset from its path segments and return it as `T`
    ///
    /// The last segment names the asset; the ones before it name subgroups.
    /// Lazy assets are imported on first access.
    pub fn asset<T: Asset>(&self, segments: &[&str]) -> Result<Arc<T>, AssetError> {
        let (name, groups) = segments
            .split_last()
            .ok_or_else(|| AssetError::InvalidUri(self.full_name.clone()))?;

        let group = self.subgroup(groups)?;
        let qualified = group.child_name(name);

        let slot = group
            .assets
            .get(*name)
            .ok_or_else(|| AssetError::NotFound(qualified.clone()))?;

        slot.resolve::<T>(&qualified)
    }

    /// Dispose and detach the descendant group at `segments`
    pub fn remove_subgroup(&mut self, segments: &[&str]) -> Result<(), AssetError> {
        let (target, parents) = segments
            .split_last()
            .ok_or_else(|| AssetError::InvalidUri(self.full_name.clone()))?;

        let parent = self.subgroup_mut(parents)?;

        let mut child = parent
            .subgroups
            .remove(*target)
            .ok_or_else(|| AssetError::NotFound(parent.child_name(target)))?;
        child.dispose();

        debug!("Removed group '{}'", child.full_name);
        Ok(())
    }

    /// Release everything this group owns
    ///
    /// Subgroups are disposed first, then the group's own disposable assets;
    /// both maps are cleared afterwards. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for child in self.subgroups.values_mut() {
            child.dispose();
        }

        for slot in self.assets.values() {
            slot.dispose();
        }

        self.subgroups.clear();
        self.assets.clear();

        debug!("Disposed group '{}'", self.full_name);
    }

    /// Visit this group and every descendant, parents before children
    ///
    /// The visitor receives each group and its depth below this one.
    pub fn walk<F: FnMut(&AssetGroup, usize)>(&self, mut visit: F) {
        self.walk_inner(0, &mut visit);
    }

    fn walk_inner<F: FnMut(&AssetGroup, usize)>(&self, depth: usize, visit: &mut F) {
        visit(self, depth);
        for child in self.subgroups.values() {
            child.walk_inner(depth + 1, visit);
        }
    }

    fn child_name(&self, name: &str) -> String {
        format!("{}{}{}", self.full_name, URI_SEPARATOR, name)
    }
}
