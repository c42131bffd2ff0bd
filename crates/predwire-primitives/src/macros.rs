#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Bool,
                "Bool",
                supports_arithmetic = false,
                supports_equality = true,
                supports_ordering = true
            ),
            (
                Float64,
                "Float64",
                supports_arithmetic = true,
                supports_equality = true,
                supports_ordering = true
            ),
            (
                Int,
                "Int",
                supports_arithmetic = true,
                supports_equality = true,
                supports_ordering = true
            ),
            (
                Text,
                "Text",
                supports_arithmetic = false,
                supports_equality = true,
                supports_ordering = true
            ),
            (
                Uint,
                "Uint",
                supports_arithmetic = true,
                supports_equality = true,
                supports_ordering = true
            ),
            (
                Ulid,
                "Ulid",
                supports_arithmetic = false,
                supports_equality = true,
                supports_ordering = true
            ),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $name:literal, supports_arithmetic = $supports_arithmetic:expr, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    supports_arithmetic: $supports_arithmetic,
                    supports_equality: $supports_equality,
                    supports_ordering: $supports_ordering,
                },
            )*
        }
    };
}

macro_rules! name_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $name:literal, supports_arithmetic = $supports_arithmetic:expr, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr) ),* $(,)? ) => {
        match $kind {
            $( $crate::ScalarKind::$scalar => $name, )*
        }
    };
}

macro_rules! from_name_from_registry {
    ( @args $name:expr; @entries $( ($scalar:ident, $label:literal, supports_arithmetic = $supports_arithmetic:expr, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr) ),* $(,)? ) => {
        match $name {
            $( $label => Some($crate::ScalarKind::$scalar), )*
            _ => None,
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($scalar:ident, $name:literal, supports_arithmetic = $supports_arithmetic:expr, supports_equality = $supports_equality:expr, supports_ordering = $supports_ordering:expr) ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
