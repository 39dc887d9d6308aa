//! Primitive leaf values
//!
//! A [`Primitive`] is the in-memory wrapper for a FHIR primitive as it comes
//! off the wire. The variant is picked once, when the value is ingested;
//! [`Primitive::normalize`] turns it into a canonical [`ScalarValue`].

use super::error::{Error, Result};
use super::temporal::{PartialDate, PartialDateTime, PartialTime};
use base64::Engine as _;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A FHIR primitive, tagged by its family
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Date(String),
    DateTime(String),
    Instant(String),
    Time(String),
    Integer(i32),
    PositiveInt(u32),
    UnsignedInt(u32),
    Integer64(i64),
    Base64Binary(String),
    Boolean(bool),
    Decimal(Decimal),
    /// string, uri, url, canonical, code, id, oid, uuid, markdown
    Other { type_name: String, lexical: String },
}

/// Normalized scalar extracted from a primitive leaf
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Date(PartialDate),
    Time(PartialTime),
    DateTime(PartialDateTime),
    Integer(i64),
    Binary(Vec<u8>),
    Boolean(bool),
    Decimal(Decimal),
    String(String),
    /// Lexical form of a value that could not be converted to its declared type
    Raw(String),
}

impl Primitive {
    /// Ingest a JSON value declared as the given FHIR primitive type
    pub fn from_json(type_name: &str, value: &Value) -> Result<Self> {
        let invalid = || Error::InvalidPrimitive {
            type_name: type_name.to_string(),
            value: value.to_string(),
        };

        let as_string = || value.as_str().map(str::to_string).ok_or_else(invalid);

        match type_name {
            "date" => Ok(Self::Date(as_string()?)),
            "dateTime" => Ok(Self::DateTime(as_string()?)),
            "instant" => Ok(Self::Instant(as_string()?)),
            "time" => Ok(Self::Time(as_string()?)),
            "integer" => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Integer)
                .ok_or_else(invalid),
            "positiveInt" => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .map(Self::PositiveInt)
                .ok_or_else(invalid),
            "unsignedInt" => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Self::UnsignedInt)
                .ok_or_else(invalid),
            // integer64 is carried as a JSON string
            "integer64" => match value {
                Value::String(s) => s.parse().map(Self::Integer64).map_err(|_| invalid()),
                Value::Number(n) => n.as_i64().map(Self::Integer64).ok_or_else(invalid),
                _ => Err(invalid()),
            },
            "base64Binary" => Ok(Self::Base64Binary(as_string()?)),
            "boolean" => value.as_bool().map(Self::Boolean).ok_or_else(invalid),
            "decimal" => match value {
                Value::Number(n) => Decimal::from_str(&n.to_string())
                    .map(Self::Decimal)
                    .map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            _ => Ok(Self::Other {
                type_name: type_name.to_string(),
                lexical: as_string()?,
            }),
        }
    }

    /// FHIR type code of this primitive
    pub fn type_name(&self) -> &str {
        match self {
            Self::Date(_) => "date",
            Self::DateTime(_) => "dateTime",
            Self::Instant(_) => "instant",
            Self::Time(_) => "time",
            Self::Integer(_) => "integer",
            Self::PositiveInt(_) => "positiveInt",
            Self::UnsignedInt(_) => "unsignedInt",
            Self::Integer64(_) => "integer64",
            Self::Base64Binary(_) => "base64Binary",
            Self::Boolean(_) => "boolean",
            Self::Decimal(_) => "decimal",
            Self::Other { type_name, .. } => type_name,
        }
    }

    /// Convert to the canonical scalar representation.
    ///
    /// Values that do not parse as their declared type come back as
    /// [`ScalarValue::Raw`] with the unparsed lexical form.
    pub fn normalize(&self) -> ScalarValue {
        match self {
            Self::Date(s) => s.parse().map(ScalarValue::Date).unwrap_or_else(|_| raw(s)),
            Self::Time(s) => s.parse().map(ScalarValue::Time).unwrap_or_else(|_| raw(s)),
            Self::DateTime(s) | Self::Instant(s) => s
                .parse()
                .map(ScalarValue::DateTime)
                .unwrap_or_else(|_| raw(s)),
            Self::Integer(v) => ScalarValue::Integer(i64::from(*v)),
            Self::PositiveInt(v) | Self::UnsignedInt(v) => ScalarValue::Integer(i64::from(*v)),
            Self::Integer64(v) => ScalarValue::Integer(*v),
            Self::Base64Binary(s) => base64::engine::general_purpose::STANDARD
                .decode(s.trim())
                .map(ScalarValue::Binary)
                .unwrap_or_else(|_| raw(s)),
            Self::Boolean(b) => ScalarValue::Boolean(*b),
            Self::Decimal(d) => ScalarValue::Decimal(*d),
            Self::Other { lexical, .. } => ScalarValue::String(lexical.clone()),
        }
    }
}

fn raw(lexical: &str) -> ScalarValue {
    tracing::debug!(value = %lexical, "primitive value did not parse, keeping lexical form");
    ScalarValue::Raw(lexical.to_string())
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(s)
            | Self::DateTime(s)
            | Self::Instant(s)
            | Self::Time(s)
            | Self::Base64Binary(s) => write!(f, "{}", s),
            Self::Integer(v) => write!(f, "{}", v),
            Self::PositiveInt(v) | Self::UnsignedInt(v) => write!(f, "{}", v),
            Self::Integer64(v) => write!(f, "{}", v),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Other { lexical, .. } => write!(f, "{}", lexical),
        }
    }
}

impl ScalarValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}
