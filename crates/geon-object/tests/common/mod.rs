//! Shared fixture hierarchy: Geometry <- Curve <- Circle, plus a few
//! user-data flavors with different copy/transform policies.
#![allow(dead_code)]

use std::any::Any;

use geon_object::crc;
use geon_object::{
    ArchiveError, ArchiveReader, ArchiveWriter, CopyPayload, Entity, EntityCore, FromCore,
    ObjectKind, Transform, TypeRegistry, UserData,
};
use uuid::{uuid, Uuid};

// ----------------------------------------------------------------------
// Entity fixtures
// ----------------------------------------------------------------------

pub struct Geometry {
    core: EntityCore,
}

impl FromCore for Geometry {
    fn from_core(core: EntityCore) -> Self {
        Self { core }
    }
}

impl CopyPayload for Geometry {
    fn copy_payload_from(&mut self, _src: &Self) {}
}

impl Entity for Geometry {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

geon_object::entity_type! {
    Geometry {
        name: "Geometry",
        base: none,
        uuid: "0b9f2a64-3d71-4c28-9e05-86b1d4f7ac10",
    }
}

pub struct Curve {
    core: EntityCore,
    pub degree: u32,
}

impl FromCore for Curve {
    fn from_core(core: EntityCore) -> Self {
        Self { core, degree: 1 }
    }
}

impl CopyPayload for Curve {
    fn copy_payload_from(&mut self, src: &Self) {
        self.degree = src.degree;
    }
}

impl Entity for Curve {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn object_kind(&self) -> ObjectKind {
        ObjectKind::Curve
    }
}

geon_object::entity_type! {
    Curve {
        name: "Curve",
        base: "Geometry",
        uuid: "0b9f2a64-3d71-4c28-9e05-86b1d4f7ac11",
    }
}

pub struct Circle {
    core: EntityCore,
    pub center: [f64; 3],
    pub radius: f64,
}

impl FromCore for Circle {
    fn from_core(core: EntityCore) -> Self {
        Self {
            core,
            center: [0.0; 3],
            radius: 0.0,
        }
    }
}

impl CopyPayload for Circle {
    fn copy_payload_from(&mut self, src: &Self) {
        self.center = src.center;
        self.radius = src.radius;
    }
}

impl Entity for Circle {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn object_kind(&self) -> ObjectKind {
        ObjectKind::Curve
    }

    fn is_valid(&self, log: Option<&mut String>) -> bool {
        if self.radius.is_finite() && self.radius > 0.0 {
            return true;
        }
        if let Some(log) = log {
            log.push_str("circle radius must be positive");
        }
        false
    }

    fn data_crc(&self, seed: u32) -> u32 {
        let mut remainder = seed;
        for coordinate in self.center {
            remainder = crc::fold_f64(remainder, coordinate);
        }
        crc::fold_f64(remainder, self.radius)
    }

    fn write(&self, archive: &mut ArchiveWriter) -> Result<(), ArchiveError> {
        for coordinate in self.center {
            archive.write_f64(coordinate);
        }
        archive.write_f64(self.radius);
        Ok(())
    }

    fn read(&mut self, archive: &mut ArchiveReader<'_>) -> Result<(), ArchiveError> {
        for coordinate in &mut self.center {
            *coordinate = archive.read_f64()?;
        }
        self.radius = archive.read_f64()?;
        Ok(())
    }
}

geon_object::entity_type! {
    Circle {
        name: "Circle",
        base: "Curve",
        uuid: "0b9f2a64-3d71-4c28-9e05-86b1d4f7ac12",
    }
}

/// Register the whole fixture hierarchy into `registry`.
pub fn register_fixtures(registry: &TypeRegistry) {
    Geometry::register(registry).unwrap();
    Curve::register(registry).unwrap();
    Circle::register(registry).unwrap();
}

/// Manufacture a circle through its descriptor and set the radius.
pub fn make_circle(registry: &TypeRegistry, radius: f64) -> Box<dyn Entity> {
    let descriptor = registry.lookup_name("Circle").unwrap();
    let mut entity = descriptor.create().unwrap();
    entity.downcast_mut::<Circle>().unwrap().radius = radius;
    entity
}

// ----------------------------------------------------------------------
// User-data fixtures
// ----------------------------------------------------------------------

pub const RENDER_COLOR_KEY: Uuid = uuid!("5c7e90ab-12f4-4d6e-b380-9a1c2d3e4f01");
pub const SELECTION_CACHE_KEY: Uuid = uuid!("5c7e90ab-12f4-4d6e-b380-9a1c2d3e4f02");
pub const FRAME_ANCHOR_KEY: Uuid = uuid!("5c7e90ab-12f4-4d6e-b380-9a1c2d3e4f03");

/// Display color that should follow copies of its owner.
pub struct RenderColor {
    pub rgba: [u8; 4],
}

impl UserData for RenderColor {
    fn key(&self) -> Uuid {
        RENDER_COLOR_KEY
    }

    fn copy_count(&self) -> u32 {
        1
    }

    fn duplicate_item(&self) -> Option<Box<dyn UserData>> {
        Some(Box::new(Self { rgba: self.rgba }))
    }

    fn description(&self) -> &str {
        "render color"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Scratch state that must never follow copies (move-only).
pub struct SelectionCache {
    pub hits: u32,
}

impl UserData for SelectionCache {
    fn key(&self) -> Uuid {
        SELECTION_CACHE_KEY
    }

    fn description(&self) -> &str {
        "selection cache"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A point pinned to the owner's frame; follows spatial transforms.
pub struct FrameAnchor {
    pub position: [f64; 3],
}

impl UserData for FrameAnchor {
    fn key(&self) -> Uuid {
        FRAME_ANCHOR_KEY
    }

    fn copy_count(&self) -> u32 {
        1
    }

    fn is_transformable(&self) -> bool {
        true
    }

    fn duplicate_item(&self) -> Option<Box<dyn UserData>> {
        Some(Box::new(Self {
            position: self.position,
        }))
    }

    fn transform(&mut self, xform: &Transform) {
        self.position = xform.apply_point(self.position);
    }

    fn description(&self) -> &str {
        "frame anchor"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
