//! The `impl_entity!` declaration macro.

/// Implement [`Entity`](crudhub_core::traits::Entity) for a struct that
/// embeds a [`SoftDelete`](crate::SoftDelete) base.
///
/// ```ignore
/// impl_entity!(Tenant {
///     collection: "tenants",
///     name: "Tenant",
///     base: base,
///     audit: audit,
///     fields: [FieldDescriptor::text("name"), FieldDescriptor::text("code")],
/// });
/// ```
///
/// The `audit` entry is optional; omit it for unaudited entities.
#[macro_export]
macro_rules! impl_entity {
    (@base $base:ident) => {
        fn id(&self) -> Option<&str> {
            self.$base.id.as_deref()
        }

        fn set_id(&mut self, id: String) {
            self.$base.id = Some(id);
        }

        fn is_active(&self) -> bool {
            self.$base.active
        }

        fn set_active(&mut self, active: bool) {
            self.$base.active = active;
        }
    };
    (
        $ty:ty {
            collection: $collection:expr,
            name: $name:expr,
            base: $base:ident,
            audit: $audit:ident,
            fields: [$($field:expr),* $(,)?] $(,)?
        }
    ) => {
        impl $crate::__private::Entity for $ty {
            const COLLECTION: &'static str = $collection;
            const NAME: &'static str = $name;
            const AUDITED: bool = true;

            fn fields() -> Vec<$crate::__private::FieldDescriptor> {
                vec![$($field),*]
            }

            $crate::impl_entity!(@base $base);

            fn audit_mut(&mut self) -> Option<&mut $crate::__private::AuditFields> {
                Some(&mut self.$audit)
            }
        }
    };
    (
        $ty:ty {
            collection: $collection:expr,
            name: $name:expr,
            base: $base:ident,
            fields: [$($field:expr),* $(,)?] $(,)?
        }
    ) => {
        impl $crate::__private::Entity for $ty {
            const COLLECTION: &'static str = $collection;
            const NAME: &'static str = $name;

            fn fields() -> Vec<$crate::__private::FieldDescriptor> {
                vec![$($field),*]
            }

            $crate::impl_entity!(@base $base);
        }
    };
}
