//! Entity base: runtime type identity, casting, duplication, user state.
//!
//! Every object in the hierarchy implements [`Entity`] and embeds an
//! [`EntityCore`] carrying its [`TypeDescriptor`], its user-data chain and
//! its named strings. Type identity flows through descriptors, not through
//! the host's type ids, so `is_kind_of` and the checked casts keep working
//! for instances manufactured by a dynamically loaded module.
//!
//! Concrete types implement the payload-specific parts of [`Entity`] by
//! hand and let the [`entity_type!`](crate::entity_type) macro supply the
//! registration glue (factory and copier capabilities).

mod macros;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::ArchiveError;
use crate::registry::TypeDescriptor;
use crate::strings::{NamedString, NamedStringTable};
use crate::transform::Transform;
use crate::userdata::{UserData, UserDataChain};

/// Coarse object category for switch-style dispatch without a full
/// ancestry check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// No category claimed.
    #[default]
    Unknown,
    /// A single point.
    Point,
    /// A set of points (cloud, grid, ...).
    PointCloud,
    /// A curve of any concrete flavor.
    Curve,
    /// A surface of any concrete flavor.
    Surface,
    /// A polygonal mesh.
    Mesh,
    /// Annotation objects (dimensions, labels, ...).
    Annotation,
    /// User data treated as a first-class object.
    UserData,
}

/// Common state embedded in every entity.
pub struct EntityCore {
    descriptor: Arc<TypeDescriptor>,
    user_data: UserDataChain,
    strings: NamedStringTable,
}

impl EntityCore {
    /// Create the core for a fresh instance of the described type.
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor,
            user_data: UserDataChain::new(),
            strings: NamedStringTable::new(),
        }
    }

    /// This instance's type descriptor, fixed at construction.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The user-data chain.
    pub fn user_data(&self) -> &UserDataChain {
        &self.user_data
    }

    /// The user-data chain, mutably.
    pub fn user_data_mut(&mut self) -> &mut UserDataChain {
        &mut self.user_data
    }

    /// The named-string table.
    pub fn strings(&self) -> &NamedStringTable {
        &self.strings
    }

    /// The named-string table, mutably.
    pub fn strings_mut(&mut self) -> &mut NamedStringTable {
        &mut self.strings
    }

    // ------------------------------------------------------------------
    // User-data chain, entity-level delegates
    // ------------------------------------------------------------------

    /// Attach user data; the entity takes exclusive ownership.
    ///
    /// The item is handed back when its key is nil or already present.
    pub fn attach_user_data(
        &mut self,
        item: Box<dyn UserData>,
    ) -> Result<(), Box<dyn UserData>> {
        self.user_data.attach(item)
    }

    /// Detach user data; ownership reverts to the caller.
    pub fn detach_user_data(&mut self, key: Uuid) -> Option<Box<dyn UserData>> {
        self.user_data.detach(key)
    }

    /// Borrow the user-data item with the given key.
    pub fn get_user_data(&self, key: Uuid) -> Option<&dyn UserData> {
        self.user_data.get(key)
    }

    /// The first attached user-data item.
    pub fn first_user_data(&self) -> Option<&dyn UserData> {
        self.user_data.first()
    }

    /// Dispose of every attached user-data item.
    pub fn purge_user_data(&mut self) {
        self.user_data.purge_all();
    }

    /// Duplicate `src`'s copy-enabled user data onto this entity.
    pub fn copy_user_data(&mut self, src: &EntityCore) {
        self.user_data.copy_user_data(&src.user_data);
    }

    /// Move all of `src`'s user data onto this entity, emptying `src`.
    pub fn move_user_data(&mut self, src: &mut EntityCore) {
        self.user_data.move_user_data(&mut src.user_data);
    }

    /// Forward a spatial transform to transformable user data. Clients
    /// that transform an entity's geometry call this afterwards so the
    /// attached data tracks the new frame.
    pub fn transform_user_data(&mut self, xform: &Transform) {
        self.user_data.transform_user_data(xform);
    }

    // ------------------------------------------------------------------
    // Named strings, entity-level delegates
    // ------------------------------------------------------------------

    /// Set or delete a named string (`None` deletes).
    pub fn set_user_string(&mut self, key: &str, value: Option<&str>) -> bool {
        self.strings.set(key, value)
    }

    /// Look up a named string.
    pub fn user_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key)
    }

    /// Bulk-set named strings; see [`NamedStringTable::set_many`].
    pub fn set_user_strings(&mut self, entries: &[NamedString], replace_existing: bool) -> usize {
        self.strings.set_many(entries, replace_existing)
    }

    /// Named-string keys in insertion order.
    pub fn user_string_keys(&self) -> Vec<&str> {
        self.strings.keys().collect()
    }

    /// Number of named strings.
    pub fn user_string_count(&self) -> usize {
        self.strings.len()
    }

    /// Replace this core's user state with a copy of `src`'s, honoring
    /// each user-data item's copy policy. Run by the generic copier.
    pub(crate) fn assign_user_state_from(&mut self, src: &EntityCore) {
        self.user_data.purge_all();
        self.user_data.copy_user_data(&src.user_data);
        self.strings = src.strings.clone();
    }

    pub(crate) fn heap_size(&self) -> usize {
        self.user_data.heap_size() + self.strings.heap_size()
    }
}

impl fmt::Debug for EntityCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCore")
            .field("type", &self.descriptor.name())
            .field("user_data", &self.user_data.len())
            .field("strings", &self.strings.len())
            .finish()
    }
}

/// Root of the polymorphic hierarchy.
///
/// The required methods are plumbing every concrete type provides the same
/// way; the provided methods are the behavior hooks a type overrides when
/// it has something to say (persistence, validity, CRC, category).
pub trait Entity: Any + Send {
    /// The embedded common state.
    fn core(&self) -> &EntityCore;

    /// The embedded common state, mutably.
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Upcast for concrete-type access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for concrete-type access.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// This instance's type descriptor.
    fn descriptor(&self) -> &Arc<TypeDescriptor> {
        self.core().descriptor()
    }

    /// True iff this instance is of `candidate`'s type or derived from it.
    fn is_kind_of(&self, candidate: &TypeDescriptor) -> bool {
        let own = self.core().descriptor();
        std::ptr::eq(Arc::as_ptr(own), candidate) || own.is_derived_from(candidate)
    }

    /// Coarse category of this object.
    fn object_kind(&self) -> ObjectKind {
        ObjectKind::Unknown
    }

    /// Check data-member consistency, appending a short reason to `log`
    /// on failure.
    fn is_valid(&self, _log: Option<&mut String>) -> bool {
        true
    }

    /// One-line diagnostic description; defaults to the class name.
    fn dump(&self) -> String {
        self.core().descriptor().name().to_string()
    }

    /// Estimated memory footprint in bytes.
    fn size_of(&self) -> usize {
        std::mem::size_of_val(self) + self.core().heap_size()
    }

    /// Fold the fields that define this object into a running CRC-32.
    ///
    /// The default folds nothing and returns `seed` unchanged.
    fn data_crc(&self, seed: u32) -> u32 {
        seed
    }

    /// Model-level identity of this object, when it has one.
    fn model_id(&self) -> Uuid {
        Uuid::nil()
    }

    /// Write this object's payload to the archive.
    ///
    /// The envelope (type tag, length) is owned by the archive layer;
    /// implementations write the defining fields only. The default
    /// declares the type non-persistable.
    fn write(&self, _archive: &mut ArchiveWriter) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unsupported)
    }

    /// Read this object's payload from the archive. Counterpart of
    /// [`write`](Entity::write).
    fn read(&mut self, _archive: &mut ArchiveReader<'_>) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unsupported)
    }
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.dump())
    }
}

impl dyn Entity {
    /// Downcast to a concrete entity type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutable downcast to a concrete entity type.
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Checked cast: this instance viewed as `target`'s type.
    ///
    /// Succeeds iff the instance is of that type or derived from it; this
    /// is the sole supported downcast gate across module boundaries.
    pub fn cast(&self, target: &TypeDescriptor) -> Option<&dyn Entity> {
        if self.is_kind_of(target) {
            Some(self)
        } else {
            None
        }
    }

    /// Mutable counterpart of [`cast`](Self::cast).
    pub fn cast_mut(&mut self, target: &TypeDescriptor) -> Option<&mut dyn Entity> {
        if self.is_kind_of(target) {
            Some(self)
        } else {
            None
        }
    }

    /// Polymorphic deep copy through the registered factory and copier.
    ///
    /// `None` when the concrete type registered itself non-duplicable.
    /// Attached user data follows each item's copy policy; named strings
    /// are carried over wholesale.
    pub fn duplicate(&self) -> Option<Box<dyn Entity>> {
        let descriptor = Arc::clone(self.core().descriptor());
        let mut copy = descriptor.create()?;
        if descriptor.copy_into(self, copy.as_mut()) {
            Some(copy)
        } else {
            None
        }
    }

    /// Same-concrete-type field copy through the registered copier.
    ///
    /// False when `src` is of a different concrete type or no copier was
    /// registered.
    pub fn copy_from(&mut self, src: &dyn Entity) -> bool {
        let descriptor = Arc::clone(self.core().descriptor());
        descriptor.copy_into(src, self)
    }
}

/// Construction hook used by generated factories: build a default instance
/// around a prepared core.
pub trait FromCore: Entity + Sized {
    /// Build the default instance for a fresh registration-made object.
    fn from_core(core: EntityCore) -> Self;
}

/// Field-copy hook used by generated copiers: copy the defining fields
/// (not the core) from another instance of the same type.
pub trait CopyPayload: Entity + Sized {
    /// Copy `src`'s defining fields into `self`.
    fn copy_payload_from(&mut self, src: &Self);
}

/// Generic factory for `T`, stored in the type's descriptor.
pub fn factory_thunk<T: FromCore>(descriptor: &Arc<TypeDescriptor>) -> Box<dyn Entity> {
    Box::new(T::from_core(EntityCore::new(Arc::clone(descriptor))))
}

/// Generic copier for `T`, stored in the type's descriptor.
///
/// Copies the payload, then re-derives the destination's user state from
/// the source (copy-policy user data, cloned named strings). False when
/// either side is not a `T`.
pub fn copier_thunk<T: CopyPayload>(src: &dyn Entity, dst: &mut dyn Entity) -> bool {
    let Some(src_t) = src.as_any().downcast_ref::<T>() else {
        return false;
    };
    let Some(dst_t) = dst.as_any_mut().downcast_mut::<T>() else {
        return false;
    };
    dst_t.copy_payload_from(src_t);
    dst_t.core_mut().assign_user_state_from(src_t.core());
    true
}
