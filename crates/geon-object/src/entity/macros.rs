//! Registration glue for concrete entity types.

/// Declare the registration constants and `register` function for a
/// concrete entity type.
///
/// The common form registers a factory and a generic copier, so the type
/// must implement [`FromCore`](crate::FromCore) and
/// [`CopyPayload`](crate::CopyPayload):
///
/// ```ignore
/// entity_type! {
///     Circle {
///         name: "Circle",
///         base: "Curve",
///         uuid: "6d180b1c-93f0-4aeb-9d4a-7c51e20a8301",
///     }
/// }
/// ```
///
/// `base: none` declares a hierarchy root. A trailing `non_duplicable`
/// registers neither capability; such types cannot be manufactured or
/// copied generically (and therefore cannot be read from an archive).
#[macro_export]
macro_rules! entity_type {
    ($ty:ident { name: $name:literal, base: none, uuid: $uuid:literal $(,)? }) => {
        $crate::entity_type!(@impl $ty, $name, ::core::option::Option::None, $uuid, @duplicable);
    };
    ($ty:ident { name: $name:literal, base: $base:literal, uuid: $uuid:literal $(,)? }) => {
        $crate::entity_type!(@impl $ty, $name, ::core::option::Option::Some($base), $uuid, @duplicable);
    };
    ($ty:ident { name: $name:literal, base: none, uuid: $uuid:literal, non_duplicable $(,)? }) => {
        $crate::entity_type!(@impl $ty, $name, ::core::option::Option::None, $uuid, @non_duplicable);
    };
    ($ty:ident { name: $name:literal, base: $base:literal, uuid: $uuid:literal, non_duplicable $(,)? }) => {
        $crate::entity_type!(@impl $ty, $name, ::core::option::Option::Some($base), $uuid, @non_duplicable);
    };
    (@impl $ty:ident, $name:literal, $base:expr, $uuid:literal, @duplicable) => {
        $crate::entity_type!(@constants $ty, $name, $uuid);

        impl $ty {
            /// Register this type in `registry` under the current mark.
            pub fn register(
                registry: &$crate::TypeRegistry,
            ) -> ::core::result::Result<
                ::std::sync::Arc<$crate::TypeDescriptor>,
                $crate::RegistryError,
            > {
                registry.register(
                    $crate::TypeSpec::new(Self::TYPE_NAME, $base, Self::TYPE_UUID)
                        .with_factory($crate::entity::factory_thunk::<$ty>)
                        .with_copier($crate::entity::copier_thunk::<$ty>),
                )
            }
        }
    };
    (@impl $ty:ident, $name:literal, $base:expr, $uuid:literal, @non_duplicable) => {
        $crate::entity_type!(@constants $ty, $name, $uuid);

        impl $ty {
            /// Register this type in `registry` under the current mark,
            /// without factory or copier capabilities.
            pub fn register(
                registry: &$crate::TypeRegistry,
            ) -> ::core::result::Result<
                ::std::sync::Arc<$crate::TypeDescriptor>,
                $crate::RegistryError,
            > {
                registry.register($crate::TypeSpec::new(Self::TYPE_NAME, $base, Self::TYPE_UUID))
            }
        }
    };
    (@constants $ty:ident, $name:literal, $uuid:literal) => {
        impl $ty {
            /// Class name this type registers under.
            pub const TYPE_NAME: &'static str = $name;

            /// Class uuid this type registers under.
            pub const TYPE_UUID: $crate::Uuid = match $crate::Uuid::try_parse($uuid) {
                ::core::result::Result::Ok(uuid) => uuid,
                ::core::result::Result::Err(_) => ::core::panic!("invalid uuid literal"),
            };
        }
    };
}
