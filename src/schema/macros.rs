//! `entity!` declares one entity: the row struct, the creation and update payloads,
//! the typed merge and the static catalog definition, all from a single field list.
//!
//! Each field is `req` (NOT NULL) or `opt` (nullable):
//!
//! ```ignore
//! entity! {
//!     /// A host city.
//!     City, CityCreate, CityUpdate => CITY in "cities" {
//!         req name: String = "name" => text(),
//!         opt tz: String = "tz" => text(),
//!     }
//! }
//! ```
//!
//! Row and creation payload hold `T` / `Option<T>`. The update payload holds
//! `Option<T>` / `Option<Option<T>>`, where the outer `None` means "not supplied".

macro_rules! field_type {
    (req $ty:ty) => { $ty };
    (opt $ty:ty) => { Option<$ty> };
}

macro_rules! field_nullable {
    (req) => {
        false
    };
    (opt) => {
        true
    };
}

macro_rules! entity {
    (
        $(#[$meta:meta])*
        $name:ident, $create:ident, $update:ident => $def:ident in $table:literal {
            $( $presence:ident $field:ident : $ty:ty = $wire:literal => $col:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            pub id: i64,
            $(
                #[serde(rename = $wire)]
                pub $field: field_type!($presence $ty),
            )*
        }

        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $create {
            $(
                #[serde(rename = $wire)]
                pub $field: field_type!($presence $ty),
            )*
        }

        #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
        pub struct $update {
            $(
                #[serde(rename = $wire, default, deserialize_with = "crate::schema::patch::present")]
                pub $field: Option<field_type!($presence $ty)>,
            )*
        }

        pub static $def: $crate::schema::EntityDef = $crate::schema::EntityDef {
            name: stringify!($name),
            table: $table,
            columns: &[ $( $col.named($wire, field_nullable!($presence)) ),* ],
        };

        impl $crate::schema::Entity for $name {
            type Create = $create;
            type Update = $update;

            fn def() -> &'static $crate::schema::EntityDef {
                &$def
            }

            fn id(&self) -> i64 {
                self.id
            }

            fn merge(&mut self, patch: $update) {
                $(
                    if let Some(value) = patch.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}
