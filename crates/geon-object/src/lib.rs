//! Geon object framework
//!
//! Runtime class identity and object persistence for the Geon geometry
//! kernel. The kernel's class hierarchy is large, extensible, and partly
//! contributed by dynamically loaded modules, so it cannot lean on the
//! host language's type ids for cross-module identity. This crate provides
//! the substitute:
//!
//! - [`TypeRegistry`] / [`TypeDescriptor`]: process-wide runtime type
//!   records with name/uuid lookup, lazy base-chain resolution, and
//!   generation-mark bulk purge for module unload.
//! - [`Entity`] / [`EntityCore`]: the hierarchy root with `is_kind_of`,
//!   checked casts, generic duplication, per-type persistence hooks.
//! - [`UserData`] / [`UserDataChain`]: keyed metadata attached to any
//!   entity, with per-item copy/move/transform policies.
//! - [`NamedStringTable`]: small per-entity string annotations.
//! - [`ArchiveWriter`] / [`ArchiveReader`]: the binary container that
//!   frames object payloads by persisted type identity.
//!
//! Geometry itself (curves, surfaces, meshes and the algorithms over them)
//! lives in the kernel crates; everything here is the machinery those
//! types register themselves with.

#![warn(rust_2018_idioms)]

pub mod archive;
pub mod crc;
pub mod entity;
pub mod error;
pub mod registry;
pub mod strings;
pub mod transform;
pub mod userdata;

pub use archive::{ArchiveReader, ArchiveWriter, ARCHIVE_MAGIC, ARCHIVE_VERSION};
pub use entity::{CopyPayload, Entity, EntityCore, FromCore, ObjectKind};
pub use error::{ArchiveError, RegistryError};
pub use registry::{
    CopierFn, FactoryFn, TypeDescriptor, TypeRegistry, TypeSpec, MAX_ANCESTRY_DEPTH,
};
pub use strings::{NamedString, NamedStringTable};
pub use transform::Transform;
pub use userdata::{UserData, UserDataChain};
pub use uuid::Uuid;
