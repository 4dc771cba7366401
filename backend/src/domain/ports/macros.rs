//! `define_port_error!` declares a port error enum whose variants all carry
//! named fields, and gives each variant a snake-case constructor taking
//! `impl Into<T>` per field.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Build a [`" $name "::" $variant "`]."]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum StoreProbeError {
            Offline { message: String } => "offline: {message}",
            Rejected { status: u16, message: String } => "rejected {status}: {message}",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        assert_eq!(
            StoreProbeError::offline("pool closed"),
            StoreProbeError::Offline {
                message: "pool closed".to_owned()
            }
        );
    }

    #[test]
    fn messages_interpolate_every_field() {
        let err = StoreProbeError::rejected(503_u16, "down");
        assert_eq!(err.to_string(), "rejected 503: down");
    }
}
