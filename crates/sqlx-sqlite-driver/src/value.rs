//! Scalar values exchanged with the SQLite engine

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};

use crate::Result;

/// A result row: column name to value, in result-set column order.
pub type Row = IndexMap<String, Value>;

/// Typed scalar value as stored by SQLite.
///
/// Used both for bound statement parameters and for decoded column values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   Null,
   Integer(i64),
   Real(f64),
   Text(String),
   Blob(Vec<u8>),
}

impl Value {
   /// Returns true if this value is null.
   pub fn is_null(&self) -> bool {
      matches!(self, Value::Null)
   }

   /// Attempts to get this value as an integer.
   pub fn as_integer(&self) -> Option<i64> {
      match self {
         Value::Integer(i) => Some(*i),
         _ => None,
      }
   }

   /// Attempts to get this value as a float.
   pub fn as_real(&self) -> Option<f64> {
      match self {
         Value::Real(r) => Some(*r),
         _ => None,
      }
   }

   /// Attempts to get this value as a string reference.
   pub fn as_text(&self) -> Option<&str> {
      match self {
         Value::Text(s) => Some(s),
         _ => None,
      }
   }

   /// Attempts to get this value as a blob reference.
   pub fn as_blob(&self) -> Option<&[u8]> {
      match self {
         Value::Blob(b) => Some(b),
         _ => None,
      }
   }
}

/// Blobs serialize as base64 text so rows can be handed to JSON consumers.
impl Serialize for Value {
   fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
      match self {
         Value::Null => serializer.serialize_none(),
         Value::Integer(i) => serializer.serialize_i64(*i),
         Value::Real(r) => serializer.serialize_f64(*r),
         Value::Text(s) => serializer.serialize_str(s),
         Value::Blob(b) => serializer.serialize_str(&BASE64.encode(b)),
      }
   }
}

impl From<i64> for Value {
   fn from(value: i64) -> Self {
      Value::Integer(value)
   }
}

impl From<i32> for Value {
   fn from(value: i32) -> Self {
      Value::Integer(value.into())
   }
}

impl From<bool> for Value {
   fn from(value: bool) -> Self {
      Value::Integer(value.into())
   }
}

impl From<f64> for Value {
   fn from(value: f64) -> Self {
      Value::Real(value)
   }
}

impl From<&str> for Value {
   fn from(value: &str) -> Self {
      Value::Text(value.to_owned())
   }
}

impl From<String> for Value {
   fn from(value: String) -> Self {
      Value::Text(value)
   }
}

impl From<Vec<u8>> for Value {
   fn from(value: Vec<u8>) -> Self {
      Value::Blob(value)
   }
}

impl<T: Into<Value>> From<Option<T>> for Value {
   fn from(value: Option<T>) -> Self {
      value.map_or(Value::Null, Into::into)
   }
}

/// Bind a value positionally to a SQLx query without copying text or blobs.
pub(crate) fn bind_value<'q>(
   query: Query<'q, Sqlite, SqliteArguments<'q>>,
   value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
   match value {
      Value::Null => query.bind(None::<i64>),
      Value::Integer(i) => query.bind(*i),
      Value::Real(r) => query.bind(*r),
      Value::Text(s) => query.bind(s.as_str()),
      Value::Blob(b) => query.bind(b.as_slice()),
   }
}

/// Decode every column of a row, keeping the result-set column order.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row> {
   let mut values = IndexMap::with_capacity(row.columns().len());
   for (i, column) in row.columns().iter().enumerate() {
      values.insert(column.name().to_string(), decode_column(row, i)?);
   }
   Ok(values)
}

/// Decode by the storage class of the value itself, not the declared column
/// type. SQLite lets any column hold any storage class.
fn decode_column(row: &SqliteRow, index: usize) -> Result<Value> {
   let raw = row.try_get_raw(index)?;
   if raw.is_null() {
      return Ok(Value::Null);
   }

   let type_info = raw.type_info();
   let value = match type_info.name() {
      "NULL" => Value::Null,
      "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
      "REAL" | "NUMERIC" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
      "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
      _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
   };

   Ok(value)
}
