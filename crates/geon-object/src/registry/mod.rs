//! Process-wide registry of runtime types.
//!
//! Every concrete entity class registers a `TypeDescriptor` here, usually
//! through the `entity_type!` macro. The registry backs name/uuid lookup,
//! ancestry queries, and generic construction for the persistence layer.
//!
//! ## Generation marks and module unload
//!
//! Registrations are tagged with the registry's current mark. A host that
//! loads type-contributing modules at runtime brackets each load:
//!
//! ```ignore
//! let mark = registry.increment_mark();
//! // ... load the module; its types register under `mark` ...
//! registry.purge(mark); // before unloading the module again
//! ```
//!
//! Purging removes the batch wholesale; surviving descriptors that named a
//! purged type as their base simply stop resolving that ancestor.
//!
//! Registration and purging take a writer lock; lookups, ancestry walks and
//! dumps run concurrently under a reader lock. The process-wide instance is
//! created lazily on first access, so static registration order across
//! modules does not matter.

mod descriptor;

pub use descriptor::{CopierFn, FactoryFn, TypeDescriptor, TypeSpec};

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::RegistryError;

/// Upper bound on every base-chain walk.
///
/// Cycles are rejected at registration time; this bound is the second line
/// of defense should a malformed chain slip through.
pub const MAX_ANCESTRY_DEPTH: usize = 64;

pub(crate) struct RegistryShared {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Live descriptors in registration order.
    entries: Vec<Arc<TypeDescriptor>>,
    by_name: FxHashMap<String, Arc<TypeDescriptor>>,
    by_uuid: FxHashMap<Uuid, Arc<TypeDescriptor>>,
    current_mark: u32,
    /// Bumped by every purge; invalidates cached base links.
    revision: u64,
}

impl RegistryShared {
    /// Look up a live descriptor by name, together with the revision the
    /// answer is valid for.
    pub(crate) fn resolve(&self, name: &str) -> Option<(Arc<TypeDescriptor>, u64)> {
        let inner = self.inner.read();
        inner
            .by_name
            .get(name)
            .map(|d| (Arc::clone(d), inner.revision))
    }

    pub(crate) fn revision(&self) -> u64 {
        self.inner.read().revision
    }
}

static GLOBAL_REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

/// Ordered collection of live type descriptors.
///
/// One process-wide instance is available through [`TypeRegistry::global`];
/// tests and embedders can also hold their own.
pub struct TypeRegistry {
    shared: Arc<RegistryShared>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RegistryShared {
                inner: RwLock::new(RegistryInner::default()),
            }),
        }
    }

    /// The process-wide registry, created on first access.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register a new type under the current mark.
    ///
    /// Fails without modifying the registry when the name or uuid collides
    /// with a live descriptor, when the uuid is nil, or when the declared
    /// base chain would loop back onto the new type.
    pub fn register(&self, spec: TypeSpec) -> Result<Arc<TypeDescriptor>, RegistryError> {
        let mut inner = self.shared.inner.write();

        if spec.uuid.is_nil() {
            return Err(RegistryError::NilUuid(spec.name));
        }
        if inner.by_name.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateName(spec.name));
        }
        if inner.by_uuid.contains_key(&spec.uuid) {
            return Err(RegistryError::DuplicateUuid(spec.uuid));
        }

        // Reject a base chain that leads back to the type being registered.
        // The chain is walked by declared names so the check also catches
        // cycles routed through a base that is not itself registered yet.
        if let Some(declared_base) = spec.base_name.as_deref() {
            let mut cursor = Some(declared_base.to_string());
            let mut depth = 0;
            while let Some(link) = cursor {
                if link == spec.name {
                    return Err(RegistryError::CyclicAncestry {
                        name: spec.name,
                        base: declared_base.to_string(),
                    });
                }
                depth += 1;
                if depth > MAX_ANCESTRY_DEPTH {
                    break;
                }
                cursor = inner
                    .by_name
                    .get(link.as_str())
                    .and_then(|d| d.base_name().map(str::to_string));
            }
        }

        let mark = inner.current_mark;
        let home = Arc::downgrade(&self.shared);
        let descriptor =
            Arc::new_cyclic(|weak| TypeDescriptor::new_registered(spec, mark, home, weak.clone()));

        inner.entries.push(Arc::clone(&descriptor));
        inner
            .by_name
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        inner.by_uuid.insert(descriptor.uuid(), Arc::clone(&descriptor));

        log::debug!(
            "registered type {} <{}> mark {}",
            descriptor.name(),
            descriptor.uuid(),
            mark
        );
        Ok(descriptor)
    }

    /// Look up a live descriptor by class name.
    pub fn lookup_name(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.shared.inner.read().by_name.get(name).cloned()
    }

    /// Look up a live descriptor by class uuid.
    pub fn lookup_uuid(&self, uuid: Uuid) -> Option<Arc<TypeDescriptor>> {
        self.shared.inner.read().by_uuid.get(&uuid).cloned()
    }

    /// Bump the generation mark; subsequent registrations carry the new
    /// value until the next bump. Returns the new mark.
    pub fn increment_mark(&self) -> u32 {
        let mut inner = self.shared.inner.write();
        inner.current_mark += 1;
        let mark = inner.current_mark;
        log::debug!("registry mark is now {mark}");
        mark
    }

    /// The mark new registrations are currently tagged with.
    pub fn current_mark(&self) -> u32 {
        self.shared.inner.read().current_mark
    }

    /// Remove every live descriptor tagged with `mark`.
    ///
    /// Returns the number removed. Descriptors of other marks survive; any
    /// whose resolved base was purged fall back to "unresolved" on their
    /// next ancestry query.
    pub fn purge(&self, mark: u32) -> usize {
        let mut inner = self.shared.inner.write();

        let mut purged = Vec::new();
        inner.entries.retain(|d| {
            if d.mark() == mark {
                purged.push(Arc::clone(d));
                false
            } else {
                true
            }
        });
        for d in &purged {
            inner.by_name.remove(d.name());
            inner.by_uuid.remove(&d.uuid());
        }
        if !purged.is_empty() {
            inner.revision += 1;
            log::debug!("purged {} type(s) with mark {}", purged.len(), mark);
        }
        purged.len()
    }

    /// Remove every descriptor registered strictly after `descriptor`, in
    /// reverse registration order.
    ///
    /// Used to roll back a partially failed load sequence. Returns false
    /// when `descriptor` is not live in this registry.
    pub fn purge_after(&self, descriptor: &TypeDescriptor) -> bool {
        let mut inner = self.shared.inner.write();

        let Some(position) = inner
            .entries
            .iter()
            .position(|d| std::ptr::eq(Arc::as_ptr(d), descriptor))
        else {
            return false;
        };

        let removed: Vec<_> = inner.entries.drain(position + 1..).collect();
        for d in removed.iter().rev() {
            inner.by_name.remove(d.name());
            inner.by_uuid.remove(&d.uuid());
        }
        if !removed.is_empty() {
            inner.revision += 1;
            log::debug!(
                "purged {} type(s) registered after {}",
                removed.len(),
                descriptor.name()
            );
        }
        true
    }

    /// Manufacture an instance of the described type, or `None` for types
    /// registered without a factory.
    pub fn create(&self, descriptor: &TypeDescriptor) -> Option<Box<dyn Entity>> {
        descriptor.create()
    }

    /// Strict ancestry test between two descriptors.
    pub fn is_derived_from(&self, derived: &TypeDescriptor, ancestor: &TypeDescriptor) -> bool {
        derived.is_derived_from(ancestor)
    }

    /// The most recently registered live descriptor.
    pub fn last(&self) -> Option<Arc<TypeDescriptor>> {
        self.shared.inner.read().entries.last().cloned()
    }

    /// Number of live descriptors.
    pub fn len(&self) -> usize {
        self.shared.inner.read().entries.len()
    }

    /// True when no descriptors are live.
    pub fn is_empty(&self) -> bool {
        self.shared.inner.read().entries.is_empty()
    }

    /// Diagnostic listing of all live descriptors in registration order.
    pub fn dump(&self) -> String {
        use std::fmt::Write;

        let inner = self.shared.inner.read();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "type registry: {} live type(s), mark {}",
            inner.entries.len(),
            inner.current_mark
        );
        for d in &inner.entries {
            let _ = writeln!(
                out,
                "  {} <{}> mark {} base {}",
                d.name(),
                d.uuid(),
                d.mark(),
                d.base_name().unwrap_or("-")
            );
        }
        out
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
