//! Integration tests for type registration, ancestry, and casting across
//! the fixture hierarchy.

mod common;

use common::*;
use geon_object::{ObjectKind, TypeRegistry, TypeSpec};
use std::sync::Arc;
use uuid::uuid;

#[test]
fn test_lookup_by_name_and_uuid_round_trips() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    for name in ["Geometry", "Curve", "Circle"] {
        let by_name = registry.lookup_name(name).unwrap();
        let by_uuid = registry.lookup_uuid(by_name.uuid()).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_uuid));
        assert_eq!(by_name.name(), name);
    }
}

#[test]
fn test_ancestry_is_strict() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let geometry = registry.lookup_name("Geometry").unwrap();
    let curve = registry.lookup_name("Curve").unwrap();
    let circle = registry.lookup_name("Circle").unwrap();

    assert!(circle.is_derived_from(&geometry));
    assert!(circle.is_derived_from(&curve));
    assert!(!geometry.is_derived_from(&circle));

    // Not reflexive: no descriptor is derived from itself.
    for d in [&geometry, &curve, &circle] {
        assert!(!d.is_derived_from(d));
        assert!(!registry.is_derived_from(d, d));
    }
}

#[test]
fn test_purge_forgets_a_load_batch() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let mark = registry.increment_mark();
    registry
        .register(TypeSpec::new(
            "Widget",
            Some("Geometry"),
            uuid!("77aa0c91-4e2b-4d3a-95f8-6012bc3de904"),
        ))
        .unwrap();
    assert!(registry.lookup_name("Widget").is_some());

    assert_eq!(registry.purge(mark), 1);
    assert!(registry.lookup_name("Widget").is_none());

    // Types registered before the mark stay fully resolvable.
    let geometry = registry.lookup_name("Geometry").unwrap();
    let circle = registry.lookup_name("Circle").unwrap();
    assert!(circle.is_derived_from(&geometry));
}

#[test]
fn test_cast_succeeds_upward_and_fails_downward() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let geometry_desc = registry.lookup_name("Geometry").unwrap();
    let circle_desc = registry.lookup_name("Circle").unwrap();

    let circle = make_circle(&registry, 2.0);
    assert!(circle.cast(&geometry_desc).is_some());
    assert!(circle.cast(&circle_desc).is_some());

    let geometry = geometry_desc.create().unwrap();
    assert!(geometry.cast(&circle_desc).is_none());
}

#[test]
fn test_kind_dispatch_without_full_type_check() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let circle = make_circle(&registry, 1.0);
    let geometry = registry.lookup_name("Geometry").unwrap().create().unwrap();
    assert_eq!(circle.object_kind(), ObjectKind::Curve);
    assert_eq!(geometry.object_kind(), ObjectKind::Unknown);
}

#[test]
fn test_invalid_circle_reports_reason() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let circle = make_circle(&registry, -1.0);
    let mut log = String::new();
    assert!(!circle.is_valid(Some(&mut log)));
    assert!(log.contains("radius"));

    let circle = make_circle(&registry, 5.0);
    assert!(circle.is_valid(None));
}

#[test]
fn test_duplicate_preserves_payload_and_identity() {
    let registry = TypeRegistry::new();
    register_fixtures(&registry);

    let original = make_circle(&registry, 5.0);
    let copy = original.duplicate().unwrap();

    assert!(Arc::ptr_eq(copy.descriptor(), original.descriptor()));
    assert_eq!(copy.downcast_ref::<Circle>().unwrap().radius, 5.0);
    assert_eq!(copy.data_crc(0), original.data_crc(0));
}

#[test]
fn test_non_duplicable_registration_opts_out() {
    struct Session {
        core: geon_object::EntityCore,
    }

    impl geon_object::Entity for Session {
        fn core(&self) -> &geon_object::EntityCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut geon_object::EntityCore {
            &mut self.core
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    geon_object::entity_type! {
        Session {
            name: "Session",
            base: none,
            uuid: "77aa0c91-4e2b-4d3a-95f8-6012bc3de905",
            non_duplicable,
        }
    }

    let registry = TypeRegistry::new();
    let descriptor = Session::register(&registry).unwrap();
    assert!(!descriptor.has_factory());
    assert!(!descriptor.has_copier());
    assert!(descriptor.create().is_none());
}
