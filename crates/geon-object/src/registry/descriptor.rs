//! Runtime type descriptors.
//!
//! A `TypeDescriptor` records everything the framework knows about one
//! concrete class: its name, its immediate base, its uuid, and the optional
//! factory/copier capabilities. Descriptors are created by
//! `TypeRegistry::register` and handed out as `Arc`s; identity comparisons
//! are pointer comparisons, never name comparisons.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use uuid::Uuid;

use super::{RegistryShared, MAX_ANCESTRY_DEPTH};
use crate::entity::Entity;

/// Manufactures a fresh default instance of the described type.
///
/// The descriptor passes itself in so the new instance can carry its own
/// type identity from birth.
pub type FactoryFn = Box<dyn Fn(&Arc<TypeDescriptor>) -> Box<dyn Entity> + Send + Sync>;

/// Copies `src`'s defining fields into `dst`.
///
/// Returns false when either argument is not an instance of the described
/// concrete type.
pub type CopierFn = Box<dyn Fn(&dyn Entity, &mut dyn Entity) -> bool + Send + Sync>;

/// Everything a registration supplies about a new type.
///
/// Built by the `entity_type!` macro in the common case; constructed by
/// hand for abstract-for-persistence types that register neither factory
/// nor copier.
pub struct TypeSpec {
    pub(crate) name: String,
    pub(crate) base_name: Option<String>,
    pub(crate) uuid: Uuid,
    pub(crate) factory: Option<FactoryFn>,
    pub(crate) copier: Option<CopierFn>,
}

impl TypeSpec {
    /// Describe a type with no factory and no copier.
    ///
    /// `base_name` is `None` for a hierarchy root.
    pub fn new(name: impl Into<String>, base_name: Option<&str>, uuid: Uuid) -> Self {
        Self {
            name: name.into(),
            base_name: base_name.map(str::to_string),
            uuid,
            factory: None,
            copier: None,
        }
    }

    /// Register a default-construction capability.
    pub fn with_factory(
        mut self,
        factory: impl Fn(&Arc<TypeDescriptor>) -> Box<dyn Entity> + Send + Sync + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Register a generic field-copy capability.
    pub fn with_copier(
        mut self,
        copier: impl Fn(&dyn Entity, &mut dyn Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.copier = Some(Box::new(copier));
        self
    }
}

/// Registry record describing one concrete class.
pub struct TypeDescriptor {
    name: String,
    base_name: Option<String>,
    uuid: Uuid,
    mark: u32,
    factory: Option<FactoryFn>,
    copier: Option<CopierFn>,
    /// Registry this descriptor was registered in; base names resolve here.
    home: Weak<RegistryShared>,
    self_weak: Weak<TypeDescriptor>,
    /// Cached base resolution, tagged with the registry revision it was
    /// made under. A purge bumps the revision and invalidates the cache.
    base_link: RwLock<Option<(Weak<TypeDescriptor>, u64)>>,
}

impl TypeDescriptor {
    pub(crate) fn new_registered(
        spec: TypeSpec,
        mark: u32,
        home: Weak<RegistryShared>,
        self_weak: Weak<TypeDescriptor>,
    ) -> Self {
        Self {
            name: spec.name,
            base_name: spec.base_name,
            uuid: spec.uuid,
            mark,
            factory: spec.factory,
            copier: spec.copier,
            home,
            self_weak,
            base_link: RwLock::new(None),
        }
    }

    /// Class name, unique among live descriptors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the immediate base class; `None` for a hierarchy root.
    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    /// Class uuid, unique among live descriptors.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Generation tag stamped at registration time.
    pub fn mark(&self) -> u32 {
        self.mark
    }

    /// Whether instances can be manufactured generically.
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Whether instances can be copied generically.
    pub fn has_copier(&self) -> bool {
        self.copier.is_some()
    }

    /// Resolve the immediate base class.
    ///
    /// Resolution is lazy: the base may be registered after this type and
    /// is looked up on first use. A purged base stops resolving; `None`
    /// here means "no further ancestor", whether by design or because the
    /// base is gone.
    pub fn base_class(&self) -> Option<Arc<TypeDescriptor>> {
        let base_name = self.base_name.as_deref()?;
        let home = self.home.upgrade()?;

        if let Some((cached, revision)) = &*self.base_link.read() {
            if *revision == home.revision() {
                return cached.upgrade();
            }
        }

        let (resolved, revision) = home.resolve(base_name)?;
        *self.base_link.write() = Some((Arc::downgrade(&resolved), revision));
        Some(resolved)
    }

    /// Strict ancestry test: true iff `ancestor` appears above this type.
    ///
    /// A type is not derived from itself. The walk stops at the first
    /// unresolved base and is depth-bounded so a malformed chain can never
    /// loop forever.
    pub fn is_derived_from(&self, ancestor: &TypeDescriptor) -> bool {
        let mut current = self.base_class();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            match current {
                Some(base) => {
                    if std::ptr::eq(Arc::as_ptr(&base), ancestor) {
                        return true;
                    }
                    current = base.base_class();
                }
                None => return false,
            }
        }
        log::warn!(
            "ancestry walk for {} exceeded {} levels, treating as unrelated",
            self.name,
            MAX_ANCESTRY_DEPTH
        );
        false
    }

    /// Manufacture a default instance, or `None` for types registered
    /// without a factory.
    pub fn create(&self) -> Option<Box<dyn Entity>> {
        let factory = self.factory.as_ref()?;
        let me = self.self_weak.upgrade()?;
        Some(factory(&me))
    }

    /// Run the registered copier, or return false when the type has none.
    pub fn copy_into(&self, src: &dyn Entity, dst: &mut dyn Entity) -> bool {
        match &self.copier {
            Some(copier) => copier(src, dst),
            None => false,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("base_name", &self.base_name)
            .field("uuid", &self.uuid)
            .field("mark", &self.mark)
            .field("has_factory", &self.factory.is_some())
            .field("has_copier", &self.copier.is_some())
            .finish()
    }
}
