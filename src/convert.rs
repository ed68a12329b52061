use crate::layout;
use chrono::{DateTime, Utc};
use std::fmt;

/// The conversion a field type goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    String,
    Integer,
    Float,
    Bool,
    Timestamp,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "boolean"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A raw value that could not be converted into its field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub kind: Kind,
    pub value: String,
    pub cause: String,
}

impl ConvertError {
    fn new(kind: Kind, value: &str, cause: impl fmt::Display) -> Self {
        Self {
            kind,
            value: value.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot parse \"{}\" as {}: {}",
            self.value, self.kind, self.cause
        )
    }
}

impl std::error::Error for ConvertError {}

/// A field type that can be filled from an environment string
pub trait Value: Sized + 'static {
    const KIND: Kind;

    /// Converts `raw`; `layout` is only consulted by timestamps
    fn convert(raw: &str, layout: &str) -> Result<Self, ConvertError>;
}

impl Value for String {
    const KIND: Kind = Kind::String;

    fn convert(raw: &str, _layout: &str) -> Result<Self, ConvertError> {
        Ok(raw.to_string())
    }
}

/// Accepts the canonical boolean spellings: `1 t T TRUE true True` and
/// `0 f F FALSE false False`
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Value for bool {
    const KIND: Kind = Kind::Bool;

    fn convert(raw: &str, _layout: &str) -> Result<Self, ConvertError> {
        parse_bool(raw).ok_or_else(|| ConvertError::new(Kind::Bool, raw, "invalid syntax"))
    }
}

macro_rules! impl_from_str_value {
    ($kind:expr => $($ty:ty),*) => {
        $(
            impl Value for $ty {
                const KIND: Kind = $kind;

                fn convert(raw: &str, _layout: &str) -> Result<Self, ConvertError> {
                    raw.parse().map_err(|e| ConvertError::new($kind, raw, e))
                }
            }
        )*
    };
}

impl_from_str_value!(Kind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_str_value!(Kind::Float => f32, f64);

impl Value for DateTime<Utc> {
    const KIND: Kind = Kind::Timestamp;

    fn convert(raw: &str, layout: &str) -> Result<Self, ConvertError> {
        layout::parse_time(layout, raw).map_err(|e| ConvertError::new(Kind::Timestamp, raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_string_is_identity() {
        assert_eq!(String::convert(" spaced, value ", "").unwrap(), " spaced, value ");
    }

    #[test]
    fn test_integer_accepts_sign() {
        assert_eq!(i64::convert("6", "").unwrap(), 6);
        assert_eq!(i64::convert("+6", "").unwrap(), 6);
        assert_eq!(i32::convert("-42", "").unwrap(), -42);
    }

    #[test]
    fn test_integer_rejects_garbage() {
        let err = i32::convert("6.5", "").unwrap_err();
        assert_eq!(err.kind, Kind::Integer);
        assert_eq!(err.value, "6.5");
        assert!(err.to_string().starts_with("cannot parse \"6.5\" as integer: "));

        assert!(i32::convert(" 6", "").is_err());
        assert!(i32::convert("0x10", "").is_err());
    }

    #[test]
    fn test_integer_range_follows_width() {
        assert_eq!(u8::convert("255", "").unwrap(), 255);
        assert!(u8::convert("256", "").is_err());
        assert!(u16::convert("-1", "").is_err());
    }

    #[test]
    fn test_float_decimal_and_scientific() {
        assert_eq!(f64::convert("2.75", "").unwrap(), 2.75);
        assert_eq!(f64::convert("1e3", "").unwrap(), 1000.0);
        assert_eq!(f64::convert("-2.5E-1", "").unwrap(), -0.25);
        assert_eq!(f32::convert("0.5", "").unwrap(), 0.5);
        assert!(f64::convert("inf", "").unwrap().is_infinite());
        assert!(f64::convert("three", "").is_err());
    }

    #[test]
    fn test_bool_canonical_tokens() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::convert(raw, "").unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::convert(raw, "").unwrap(), "{raw}");
        }
    }

    #[test]
    fn test_bool_rejects_other_spellings() {
        for raw in ["yes", "no", "tRUE", "on", "2", ""] {
            let err = bool::convert(raw, "").unwrap_err();
            assert_eq!(err.kind, Kind::Bool);
        }
    }

    #[test]
    fn test_timestamp_uses_layout() {
        let parsed = DateTime::<Utc>::convert("01/11/2017", "02/01/2006").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2017, 11, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_timestamp_error_carries_layout_message() {
        let err = DateTime::<Utc>::convert("2017-11-01", "02/01/2006").unwrap_err();
        assert_eq!(err.kind, Kind::Timestamp);
        assert!(err.cause.contains("as \"02/01/2006\""));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Integer.to_string(), "integer");
        assert_eq!(Kind::Timestamp.to_string(), "timestamp");
        assert_eq!(<bool as Value>::KIND, Kind::Bool);
        assert_eq!(<f32 as Value>::KIND, Kind::Float);
    }
}
