// Type tags and type-erased asset values

use super::AssetError;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Explicit token naming an asset type
///
/// Importers and typed lookups are keyed by this token instead of runtime type
/// information, so two types only match when they declare the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Create a tag from a static name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Tag declared by an asset type
    pub fn of<T: Asset>() -> Self {
        T::TAG
    }

    /// The tag name
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A type that can be stored in the catalog
pub trait Asset: Any + Send + Sync {
    const TAG: TypeTag;
}

/// Optional capability for assets holding resources that must be released
/// explicitly when their group is unloaded
pub trait Dispose: Send + Sync {
    fn dispose(&self);
}

/// An imported asset, erased to its tag
///
/// The variant records whether the value carries a disposal capability, so the
/// unload cascade never has to probe the value itself.
#[derive(Clone)]
pub enum AssetValue {
    Plain {
        tag: TypeTag,
        value: Arc<dyn Any + Send + Sync>,
    },
    Disposable {
        tag: TypeTag,
        value: Arc<dyn Any + Send + Sync>,
        resource: Arc<dyn Dispose>,
    },
}

impl AssetValue {
    /// Wrap a value with no disposal step
    pub fn plain<T: Asset>(value: T) -> Self {
        Self::Plain {
            tag: T::TAG,
            value: Arc::new(value),
        }
    }

    /// Wrap a value whose `dispose` runs when its group is unloaded
    pub fn disposable<T: Asset + Dispose>(value: T) -> Self {
        let shared = Arc::new(value);
        Self::Disposable {
            tag: T::TAG,
            value: shared.clone(),
            resource: shared,
        }
    }

    /// Tag of the wrapped value
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Plain { tag, .. } | Self::Disposable { tag, .. } => *tag,
        }
    }

    /// Whether the value carries a disposal capability
    pub fn is_disposable(&self) -> bool {
        matches!(self, Self::Disposable { .. })
    }

    /// Recover the concrete value; `name` is only used for error reporting
    pub fn downcast<T: Asset>(&self, name: &str) -> Result<Arc<T>, AssetError> {
        let mismatch = || AssetError::TypeMismatch {
            name: name.to_string(),
            expected: T::TAG,
            actual: self.tag(),
        };

        if self.tag() != T::TAG {
            return Err(mismatch());
        }

        let value = match self {
            Self::Plain { value, .. } | Self::Disposable { value, .. } => value.clone(),
        };
        // Two distinct types may declare the same tag
        value.downcast::<T>().map_err(|_| mismatch())
    }

    /// Release the underlying resource, if it has one
    pub fn dispose(&self) {
        if let Self::Disposable { resource, .. } = self {
            resource.dispose();
        }
    }
}

impl fmt::Debug for AssetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetValue")
            .field("tag", &self.tag())
            .field("disposable", &self.is_disposable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Label(&'static str);

    impl Asset for Label {
        const TAG: TypeTag = TypeTag::new("label");
    }

    // Same tag as `Label`, different Rust type
    struct Impostor;

    impl Asset for Impostor {
        const TAG: TypeTag = TypeTag::new("label");
    }

    struct Counted(Arc<AtomicUsize>);

    impl Asset for Counted {
        const TAG: TypeTag = TypeTag::new("counted");
    }

    impl Dispose for Counted {
        fn dispose(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_tag_of() {
        assert_eq!(TypeTag::of::<Label>(), TypeTag::new("label"));
        assert_eq!(TypeTag::of::<Label>().to_string(), "label");
    }

    #[test]
    fn test_downcast_matching_tag() {
        let value = AssetValue::plain(Label("hello"));
        let label = value.downcast::<Label>("greeting").unwrap();
        assert_eq!(label.0, "hello");

        // Every downcast shares the same allocation
        let again = value.downcast::<Label>("greeting").unwrap();
        assert!(Arc::ptr_eq(&label, &again));
    }

    #[test]
    fn test_downcast_wrong_tag() {
        let value = AssetValue::plain(Label("hello"));
        let result = value.downcast::<Counted>("greeting");
        assert!(matches!(
            result,
            Err(AssetError::TypeMismatch { expected, actual, .. })
                if expected == Counted::TAG && actual == Label::TAG
        ));
    }

    #[test]
    fn test_downcast_same_tag_other_type() {
        let value = AssetValue::plain(Label("hello"));
        assert!(matches!(
            value.downcast::<Impostor>("greeting"),
            Err(AssetError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_dispose_only_for_disposable() {
        let count = Arc::new(AtomicUsize::new(0));

        let disposable = AssetValue::disposable(Counted(count.clone()));
        assert!(disposable.is_disposable());
        disposable.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let plain = AssetValue::plain(Counted(count.clone()));
        assert!(!plain.is_disposable());
        plain.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
