//! Typed scalar values and their order-preserving key encoding.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitives::bytes::ord;

const MARKER_NULL: u8 = 0x00;
const MARKER_BOOL: u8 = 0x10;
const MARKER_INT: u8 = 0x20;
const MARKER_FLOAT_NAN: u8 = 0x30;
const MARKER_FLOAT: u8 = 0x31;
const MARKER_BYTES: u8 = 0x40;
const MARKER_STRING: u8 = 0x50;

/// Declared type of a table column.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean column.
    Bool,
    /// Signed 64-bit integer column.
    Int,
    /// 64-bit floating point column.
    Float,
    /// UTF-8 string column.
    String,
    /// Binary column.
    Bytes,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Bool => "BOOL",
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::String => "STRING",
            ColumnType::Bytes => "BYTES",
        };
        f.write_str(name)
    }
}

/// Typed value tagged with explicit type information.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Datum {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer value.
    Int(i64),
    /// 64-bit floating point value.
    Float(f64),
    /// UTF-8 string value.
    String(String),
    /// Arbitrary binary payload.
    Bytes(Vec<u8>),
}

impl Datum {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Null => "NULL",
            Datum::Bool(_) => "BOOL",
            Datum::Int(_) => "INT",
            Datum::Float(_) => "FLOAT",
            Datum::String(_) => "STRING",
            Datum::Bytes(_) => "BYTES",
        }
    }

    /// Returns true for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Appends the order-preserving encoding of this datum to `dst`.
    pub fn encode_key(&self, dst: &mut Vec<u8>) {
        match self {
            Datum::Null => dst.push(MARKER_NULL),
            Datum::Bool(v) => {
                dst.push(MARKER_BOOL);
                dst.push(u8::from(*v));
            }
            Datum::Int(v) => {
                dst.push(MARKER_INT);
                ord::put_i64_be(dst, *v);
            }
            Datum::Float(v) if v.is_nan() => dst.push(MARKER_FLOAT_NAN),
            Datum::Float(v) => {
                dst.push(MARKER_FLOAT);
                ord::put_f64_be(dst, *v);
            }
            Datum::Bytes(v) => {
                dst.push(MARKER_BYTES);
                ord::put_escaped_bytes(dst, v);
            }
            Datum::String(v) => {
                dst.push(MARKER_STRING);
                ord::put_escaped_bytes(dst, v.as_bytes());
            }
        }
    }

    /// Compares two datums by their key encodings, i.e. by physical index
    /// order.
    pub fn key_cmp(&self, other: &Datum) -> Ordering {
        encode_table_key(Vec::new(), self).cmp(&encode_table_key(Vec::new(), other))
    }
}

/// Appends `datum` to `key` and returns the extended key.
pub fn encode_table_key(mut key: Vec<u8>, datum: &Datum) -> Vec<u8> {
    datum.encode_key(&mut key);
    key
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(v) => write!(f, "{v}"),
            Datum::Int(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v:?}"),
            Datum::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Datum::Bytes(v) => write!(f, "x'{}'", hex::encode(v)),
        }
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Int(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Float(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_owned())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::String(value)
    }
}

impl From<Vec<u8>> for Datum {
    fn from(value: Vec<u8>) -> Self {
        Datum::Bytes(value)
    }
}
