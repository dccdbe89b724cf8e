//! Macro for string conversions of closed domain enums
//!
//! Selection-style fields (category, lifecycle state, work state, outbox
//! status, ...) are persisted as lowercase text. This macro generates the
//! `as_str`, `Display` and `FromStr` implementations for them in one place.
//!
//! # Example
//!
//! ```rust
//! use leadflow_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum MoveType {
//!     In,
//!     Out,
//! }
//!
//! impl_domain_status_conversions!(MoveType {
//!     In => "in",
//!     Out => "out",
//! });
//!
//! assert_eq!(MoveType::Out.as_str(), "out");
//! assert_eq!("OUT".parse::<MoveType>(), Ok(MoveType::Out));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for selection enums.
///
/// Parsing is case-insensitive and surrounding whitespace is ignored; the
/// error names the enum so callers can log it verbatim.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical storage representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
