//! Scalar values carried by attribute mutations and TopN filters, plus the
//! timestamp type used by range queries.
use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Attribute or filter value.
///
/// Rendering follows the PQL value rule: booleans are lowercase, strings are
/// wrapped in double quotes verbatim, numbers are written unquoted.
///
/// Embedded double quotes inside [`AttrValue::String`] are *not* escaped, so a
/// value such as `say "hi"` produces text the server cannot parse. Callers
/// that accept untrusted strings must reject quotes themselves.
///
/// When deserialized, JSON integers outside the `i64` range are rejected
/// rather than widened to [`AttrValue::Float`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            // Debug keeps the fractional part on integral floats (`1.0`, not `1`).
            AttrValue::Float(v) => write!(f, "{v:?}"),
            AttrValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Float(f64::from(value))
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_attr_value::deserialize(deserializer)
    }
}

mod serde_attr_value {
    use super::AttrValue;
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<AttrValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AttrValueVisitor;

        impl<'de> Visitor<'de> for AttrValueVisitor {
            type Value = AttrValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a boolean, number, or string")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttrValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttrValue::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(AttrValue::Int)
                    .map_err(|_| E::custom(format!("integer {value} is out of range for i64")))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttrValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttrValue::String(value.to_owned()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(AttrValue::String(value))
            }
        }

        deserializer.deserialize_any(AttrValueVisitor)
    }
}

/// Wall-clock timestamp bounding a [`Range`](crate::query::ast::Range) query.
///
/// Offset-aware values are normalised to UTC on conversion; the rendered form
/// never carries a zone marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    /// Wraps a naive date-time.
    pub const fn new(value: PrimitiveDateTime) -> Self {
        Self(value)
    }

    /// Underlying date-time, with full sub-second precision.
    pub const fn get(&self) -> PrimitiveDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    /// ISO-8601 with millisecond precision; sub-millisecond digits are dropped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.0;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
            dt.year(),
            u8::from(dt.month()),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
            dt.millisecond()
        )
    }
}

impl From<PrimitiveDateTime> for Timestamp {
    fn from(value: PrimitiveDateTime) -> Self {
        Self(value)
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        Self(PrimitiveDateTime::new(utc.date(), utc.time()))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_timestamp::deserialize(deserializer)
    }
}

mod serde_timestamp {
    use super::Timestamp;
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;
    use time::format_description::well_known::Iso8601;
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an ISO-8601 date-time string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if let Ok(dt) = OffsetDateTime::parse(value, &Iso8601::DEFAULT) {
                    return Ok(Timestamp::from(dt));
                }
                PrimitiveDateTime::parse(value, &Iso8601::DEFAULT)
                    .map(Timestamp::from)
                    .map_err(|err| E::custom(format!("invalid timestamp '{value}': {err}")))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                self.visit_str(&value)
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}
