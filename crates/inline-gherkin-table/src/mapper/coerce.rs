//! Conversions from cell text to field values.

use std::fmt;

/// Converts a raw cell value into a typed field value.
///
/// Implemented for the scalar types a table cell can hold. Enumerations
/// implement it through [`coerce_enum!`](crate::coerce_enum).
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::Coerce;
///
/// assert_eq!(i32::coerce("42"), Ok(42));
/// assert_eq!(bool::coerce("TRUE"), Ok(true));
/// assert!(char::coerce("ab").is_err());
/// ```
pub trait Coerce: Sized {
    /// Type name reported in mapping errors.
    const TYPE_NAME: &'static str;

    /// Parses `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] when `value` is not a valid `Self`.
    fn coerce(value: &str) -> Result<Self, CoercionError>;
}

/// Error returned when a cell cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    reason: String,
}

impl CoercionError {
    /// Creates an error with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason text.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for CoercionError {}

macro_rules! coerce_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Coerce for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn coerce(value: &str) -> Result<Self, CoercionError> {
                    value.parse().map_err(|err| CoercionError::new(format!("{err}")))
                }
            }
        )+
    };
}

coerce_from_str!(i8, i16, i32, i64, u8, f32, f64);

impl Coerce for bool {
    const TYPE_NAME: &'static str = "bool";

    fn coerce(value: &str) -> Result<Self, CoercionError> {
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(CoercionError::new("expected 'true' or 'false'"))
        }
    }
}

impl Coerce for char {
    const TYPE_NAME: &'static str = "char";

    fn coerce(value: &str) -> Result<Self, CoercionError> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(CoercionError::new("expected exactly one character")),
        }
    }
}

impl Coerce for String {
    const TYPE_NAME: &'static str = "String";

    fn coerce(value: &str) -> Result<Self, CoercionError> {
        Ok(value.to_owned())
    }
}

/// Implements [`Coerce`] for a fieldless enum by exact variant name.
///
/// Matching is case-sensitive: `Red` matches `Colour::Red`, `red` does not.
///
/// # Examples
///
/// ```
/// use inline_gherkin_table::{coerce_enum, Coerce};
///
/// #[derive(Debug, PartialEq)]
/// enum Colour {
///     Red,
///     Green,
/// }
///
/// coerce_enum!(Colour { Red, Green });
///
/// assert_eq!(Colour::coerce("Green"), Ok(Colour::Green));
/// assert!(Colour::coerce("green").is_err());
/// ```
#[macro_export]
macro_rules! coerce_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::Coerce for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn coerce(value: &str) -> ::core::result::Result<Self, $crate::CoercionError> {
                match value {
                    $(stringify!($variant) => ::core::result::Result::Ok($ty::$variant),)+
                    other => ::core::result::Result::Err($crate::CoercionError::new(
                        ::std::format!("no variant named '{other}'"),
                    )),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    enum Mode {
        Fast,
        Slow,
    }

    crate::coerce_enum!(Mode { Fast, Slow });

    #[rstest]
    #[case("true", Some(true))]
    #[case("False", Some(false))]
    #[case("TRUE", Some(true))]
    #[case("yes", None)]
    #[case("", None)]
    fn bool_accepts_only_true_and_false(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(bool::coerce(raw).ok(), expected);
    }

    #[rstest]
    #[case("x", Some('x'))]
    #[case("é", Some('é'))]
    #[case("", None)]
    #[case("xy", None)]
    fn char_requires_one_character(#[case] raw: &str, #[case] expected: Option<char>) {
        assert_eq!(char::coerce(raw).ok(), expected);
    }

    #[test]
    fn integer_widths_are_checked() {
        assert_eq!(i8::coerce("127"), Ok(127));
        assert!(i8::coerce("128").is_err());
        assert_eq!(u8::coerce("255"), Ok(255));
        assert!(u8::coerce("-1").is_err());
        assert_eq!(i64::coerce("-9000000000"), Ok(-9_000_000_000));
    }

    #[test]
    fn floats_parse() {
        assert_eq!(f64::coerce("2.5").map(|v| v.to_string()), Ok("2.5".to_owned()));
        assert!(f32::coerce("two").is_err());
    }

    #[test]
    fn enum_names_are_case_sensitive() {
        assert_eq!(Mode::coerce("Fast"), Ok(Mode::Fast));
        assert_eq!(Mode::coerce("Slow"), Ok(Mode::Slow));
        let Err(err) = Mode::coerce("fast") else {
            panic!("lowercase variant must not match");
        };
        assert_eq!(err.reason(), "no variant named 'fast'");
        assert_eq!(Mode::TYPE_NAME, "Mode");
    }
}
