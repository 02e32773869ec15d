//! User data: keyed, policy-tagged payloads attached to entities.
//!
//! Each entity owns a chain of independently typed user-data items. An
//! item's policy flags decide what happens to it when the owning entity is
//! copied, moved, or transformed:
//!
//! - `copy_count() > 0`: the item is duplicated onto copies of the owner.
//! - `copy_count() == 0`: move-only; copies of the owner do not carry it.
//! - `is_transformable()`: the item participates in
//!   `transform_user_data` when the owner's geometry is transformed.
//!
//! The chain is an owned, insertion-ordered collection; items are never
//! shared between two owners.

use std::any::Any;
use std::fmt;

use uuid::Uuid;

use crate::transform::Transform;

/// A piece of user data attachable to any entity.
pub trait UserData: Any + Send {
    /// Identity of this item, unique per owning entity. Must not be nil.
    fn key(&self) -> Uuid;

    /// Copy policy: greater than zero means "duplicate me when the owner
    /// is copied"; zero means move-only.
    fn copy_count(&self) -> u32 {
        0
    }

    /// Whether this item follows the owner through spatial transforms.
    fn is_transformable(&self) -> bool {
        false
    }

    /// Produce an independent duplicate of this item.
    ///
    /// Items with a positive `copy_count` must implement this; move-only
    /// items may keep the default.
    fn duplicate_item(&self) -> Option<Box<dyn UserData>> {
        None
    }

    /// Apply a spatial transform. Only called on transformable items.
    fn transform(&mut self, _xform: &Transform) {}

    /// Short human-readable description used in dumps.
    fn description(&self) -> &str {
        ""
    }

    /// Estimated memory footprint in bytes.
    fn size_of(&self) -> usize {
        std::mem::size_of_val(self)
    }

    /// Upcast for concrete-type access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for concrete-type access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl fmt::Debug for dyn UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserData({})", self.key())
    }
}

/// Owned chain of user-data items, keyed by uuid, insertion-ordered.
#[derive(Default)]
pub struct UserDataChain {
    items: Vec<Box<dyn UserData>>,
}

impl UserDataChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an item, taking ownership.
    ///
    /// Fails if the item's key is nil or already present on this chain;
    /// the item is handed back to the caller on failure.
    pub fn attach(&mut self, item: Box<dyn UserData>) -> Result<(), Box<dyn UserData>> {
        let key = item.key();
        if key.is_nil() || self.get(key).is_some() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Detach the item with the given key; ownership reverts to the caller.
    pub fn detach(&mut self, key: Uuid) -> Option<Box<dyn UserData>> {
        let index = self.items.iter().position(|i| i.key() == key)?;
        Some(self.items.remove(index))
    }

    /// Borrow the item with the given key.
    pub fn get(&self, key: Uuid) -> Option<&dyn UserData> {
        self.items.iter().find(|i| i.key() == key).map(|b| b.as_ref())
    }

    /// Mutably borrow the item with the given key.
    pub fn get_mut(&mut self, key: Uuid) -> Option<&mut dyn UserData> {
        self.items
            .iter_mut()
            .find(|i| i.key() == key)
            .map(|b| b.as_mut())
    }

    /// Borrow the item with the given key as a concrete type.
    pub fn get_as<T: UserData>(&self, key: Uuid) -> Option<&T> {
        self.get(key)?.as_any().downcast_ref()
    }

    /// The first item in the chain (oldest attachment), if any.
    pub fn first(&self) -> Option<&dyn UserData> {
        self.items.first().map(|b| b.as_ref())
    }

    /// Iterate the chain in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn UserData> {
        self.items.iter().map(|b| b.as_ref())
    }

    /// Number of attached items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Dispose of every owned item.
    pub fn purge_all(&mut self) {
        self.items.clear();
    }

    /// Duplicate `src`'s copy-enabled items onto this chain.
    ///
    /// Items with `copy_count() == 0` are skipped, as are items whose key
    /// already exists here or whose `duplicate_item` declines.
    pub fn copy_user_data(&mut self, src: &UserDataChain) {
        for item in src.iter() {
            if item.copy_count() == 0 {
                continue;
            }
            if let Some(dup) = item.duplicate_item() {
                let _ = self.attach(dup);
            }
        }
    }

    /// Move every item from `src` onto this chain, leaving `src` empty.
    ///
    /// Move-only items transfer too. A pre-existing item with a colliding
    /// key is disposed and replaced by the incoming one.
    pub fn move_user_data(&mut self, src: &mut UserDataChain) {
        for item in src.items.drain(..) {
            let key = item.key();
            self.items.retain(|existing| existing.key() != key);
            self.items.push(item);
        }
    }

    /// Apply `xform` to every transformable item.
    pub fn transform_user_data(&mut self, xform: &Transform) {
        for item in &mut self.items {
            if item.is_transformable() {
                item.transform(xform);
            }
        }
    }

    pub(crate) fn heap_size(&self) -> usize {
        self.items.iter().map(|i| i.size_of()).sum()
    }
}

impl fmt::Debug for UserDataChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|i| i.key()))
            .finish()
    }
}
