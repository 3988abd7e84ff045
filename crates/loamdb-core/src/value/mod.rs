
use crate::entity::Element;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// CONSTANTS
///

const F64_SAFE_I64: i64 = 1i64 << 53;
const F64_SAFE_U64: u64 = 1u64 << 53;

///
/// Value
/// can be used in WHERE statements and as entity payloads
///
/// Null  → the field's value is absent (i.e., SQL NULL).
/// Param → internal placeholder for an unbound `@name` parameter; not a real
///         value. Substituted before any query reaches a manager.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    /// Ordered list of values.
    /// Used for IN/BETWEEN payloads and array transport.
    /// List order is preserved.
    List(Vec<Self>),
    /// Embedded sub-document: a nested list of named elements.
    Elements(Vec<Element>),
    Param(String),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from a list literal.
    ///
    /// Intended for tests and inline construction.
    /// Requires `Clone` because items are borrowed.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Build a `Value::List` from owned items.
    ///
    /// This is the canonical constructor for query / DTO boundaries.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    ///
    /// TYPES
    ///

    /// Returns true if the value is one of the numeric variants supported by
    /// cross-variant numeric comparison.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::UInt(_) | Self::Float(_))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if the value is an unbound parameter placeholder.
    #[must_use]
    pub const fn is_param(&self) -> bool {
        matches!(self, Self::Param(_))
    }

    /// Stable variant label used by error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Elements(_) => "elements",
            Self::Param(_) => "param",
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_elements(&self) -> Option<&[Element]> {
        if let Self::Elements(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_param(&self) -> Option<&str> {
        if let Self::Param(name) = self {
            Some(name.as_str())
        } else {
            None
        }
    }

    // Lossless f64 view of the numeric variants, where one exists.
    #[expect(clippy::cast_precision_loss)]
    fn to_f64_lossless(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) if (-F64_SAFE_I64..=F64_SAFE_I64).contains(i) => Some(*i as f64),
            Self::UInt(u) if *u <= F64_SAFE_U64 => Some(*u as f64),
            _ => None,
        }
    }

    /// Cross-type numeric comparison; returns None if non-numeric.
    ///
    /// Int/UInt pairs compare exactly; anything involving a Float goes
    /// through the lossless f64 window.
    #[must_use]
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::UInt(a), Self::UInt(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::UInt(b)) => {
                if *a < 0 {
                    Some(Ordering::Less)
                } else {
                    u64::try_from(*a).ok().map(|a| a.cmp(b))
                }
            }
            (Self::UInt(a), Self::Int(b)) => {
                if *b < 0 {
                    Some(Ordering::Greater)
                } else {
                    u64::try_from(*b).ok().map(|b| a.cmp(&b))
                }
            }
            _ => {
                if !self.is_numeric() || !other.is_numeric() {
                    return None;
                }
                match (self.to_f64_lossless(), other.to_f64_lossless()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => None,
                }
            }
        }
    }
}

// NOTE:
// Value::partial_cmp is same-variant only; cross-variant ordering goes
// through `cmp_numeric`. Collections and placeholders do not order.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::UInt(a), Self::UInt(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Blob(a), Self::Blob(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),

            // Cross-type comparisons: no ordering
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool               => Bool,
    i8                 => Int,
    i16                => Int,
    i32                => Int,
    i64                => Int,
    u8                 => UInt,
    u16                => UInt,
    u32                => UInt,
    u64                => UInt,
    f32                => Float,
    f64                => Float,
    &str               => Text,
    String             => Text,
    DateTime<Utc>      => Timestamp,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Blob(bytes)
    }
}

impl From<Vec<Element>> for Value {
    fn from(elements: Vec<Element>) -> Self {
        Self::Elements(elements)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
