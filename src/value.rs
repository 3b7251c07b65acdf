//! Dynamic value representation for TOML documents.
//!
//! This module provides the [`Value`] enum, a tagged union over the seven
//! TOML data types. A parsed document is a `Value::Table` owning its children
//! exclusively: the document is strictly a tree with no shared ownership and
//! no cycles, and cloning is a deep copy.
//!
//! ## Creating values
//!
//! ```rust
//! use tomlet::{toml, Table, Value};
//!
//! // From primitives
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let name = Value::from("Alice");
//!
//! // From collections; any `T: Into<Value>` works
//! let ports = Value::from(vec![8080u16, 8081, 8082]);
//!
//! // With the macro
//! let doc = toml!({
//!     "name": "Alice",
//!     "ports": [8080, 8081]
//! });
//! assert!(doc.is_table());
//! ```
//!
//! ## Reading values
//!
//! ```rust
//! use tomlet::Value;
//!
//! let doc = tomlet::parse("x = 1\ny = \"two\"\n").unwrap();
//! assert_eq!(doc.get("x").and_then(Value::as_integer), Some(1));
//! assert_eq!(doc.get("y").and_then(Value::as_str), Some("two"));
//!
//! // Fallible extraction with TryFrom
//! let x: i64 = i64::try_from(doc.get("x").unwrap().clone()).unwrap();
//! assert_eq!(x, 1);
//! ```

use crate::options::StringifyOptions;
use crate::{Datetime, Error, Table};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A TOML value: exactly one of seven variants.
///
/// Mixed-type arrays are permitted, as in TOML v1.0. Tables iterate in
/// ascending key order (see [`Table`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Datetime(Datetime),
    Array(Vec<Value>),
    Table(Table),
}

/// The tag of a [`Value`], for type queries without pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Integer,
    Float,
    String,
    Datetime,
    Array,
    Table,
}

impl Kind {
    /// The lowercase name of this kind, as used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Datetime => "datetime",
            Kind::Array => "array",
            Kind::Table => "table",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for Value {
    /// An empty table, the natural root of a document built up by hand.
    fn default() -> Self {
        Value::Table(Table::new())
    }
}

impl Value {
    /// Returns the tag of this value.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Datetime(_) => Kind::Datetime,
            Value::Array(_) => Kind::Array,
            Value::Table(_) => Kind::Table,
        }
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns `true` if the value is an integer.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns `true` if the value is a float.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Returns `true` if the value is an integer or a float.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is a date/time.
    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Value::Datetime(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is a table.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer, returns it.
    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a float, returns it.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a date/time, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<&Datetime> {
        match self {
            Value::Datetime(dt) => Some(dt),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// If the value is an array, returns a mutable reference to it.
    #[inline]
    #[must_use]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// If the value is a table, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// If the value is a table, returns a mutable reference to it.
    #[inline]
    #[must_use]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Table lookup by key. Returns `None` for non-tables and missing keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Value;
    ///
    /// let doc = tomlet::parse("[a]\nb = 1\n").unwrap();
    /// let b = doc.get("a").and_then(|a| a.get("b"));
    /// assert_eq!(b.and_then(Value::as_integer), Some(1));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_table().and_then(|t| t.get(key))
    }

    /// Mutable table lookup by key.
    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.as_table_mut().and_then(|t| t.get_mut(key))
    }

    /// Array lookup by index. Returns `None` for non-arrays and out-of-range
    /// indices.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Mutable array lookup by index.
    #[must_use]
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.as_array_mut().and_then(|items| items.get_mut(index))
    }

    /// Appends `value` to this array.
    ///
    /// A receiver that is not an array is replaced by a fresh single-element
    /// array. Post-parse mutation is unchecked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Value;
    ///
    /// let mut v = Value::Array(vec![]);
    /// v.push(1);
    /// v.push("two");
    /// assert_eq!(v.as_array().map(Vec::len), Some(2));
    /// ```
    pub fn push(&mut self, value: impl Into<Value>) {
        if let Value::Array(items) = self {
            items.push(value.into());
            return;
        }
        *self = Value::Array(vec![value.into()]);
    }

    /// Inserts `key = value` into this table, returning the previous value
    /// bound to the key, if any.
    ///
    /// A receiver that is not a table is replaced by a fresh table.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        if let Value::Table(table) = self {
            return table.insert(key.into(), value.into());
        }
        let mut table = Table::new();
        table.insert(key.into(), value.into());
        *self = Value::Table(table);
        None
    }
}

/// Writes the value as TOML.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::stringify(self, StringifyOptions::new()))
    }
}

// Fallible extraction. Numeric conversions follow the value API contract:
// integers and floats convert into each other, and narrowing into smaller
// integer widths truncates silently.

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(Error::type_mismatch("boolean", other.kind().name())),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Float(f) => Ok(f as i64),
            other => Err(Error::type_mismatch("integer", other.kind().name())),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        i64::try_from(value).map(|i| i as i32)
    }
}

impl TryFrom<Value> for i16 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        i64::try_from(value).map(|i| i as i16)
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            other => Err(Error::type_mismatch("float", other.kind().name())),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        f64::try_from(value).map(|f| f as f32)
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.kind().name())),
        }
    }
}

impl TryFrom<Value> for Datetime {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Datetime(dt) => Ok(dt),
            other => Err(Error::type_mismatch("datetime", other.kind().name())),
        }
    }
}

// Construction from host primitives.

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Datetime> for Value {
    fn from(value: Datetime) -> Self {
        Value::Datetime(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

// The container constructors are generic over `T: Into<Value>`, so any
// application type with a `From<T> for Value` impl slots into vectors and
// maps without further ceremony.

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Table(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::Table(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Datetime(dt) => serializer.collect_str(dt),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Table(table) => {
                let mut map = serializer.serialize_map(Some(table.len()))?;
                for (key, value) in table.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any TOML value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                if value <= i64::MAX as u64 {
                    Ok(Value::Integer(value as i64))
                } else {
                    Ok(Value::Float(value as f64))
                }
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = Table::new();
                while let Some((key, value)) = map.next_entry()? {
                    table.insert(key, value);
                }
                Ok(Value::Table(table))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_predicates() {
        assert_eq!(Value::from(true).kind(), Kind::Boolean);
        assert_eq!(Value::from(1).kind(), Kind::Integer);
        assert_eq!(Value::from(1.5).kind(), Kind::Float);
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::Array(vec![]).kind(), Kind::Array);
        assert_eq!(Value::default().kind(), Kind::Table);
        assert!(Value::from(1).is_number());
        assert!(Value::from(1.5).is_number());
        assert!(!Value::from("x").is_number());
    }

    #[test]
    fn accessors_are_strict() {
        let v = Value::from(42);
        assert_eq!(v.as_integer(), Some(42));
        assert_eq!(v.as_float(), None);
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_boolean(), None);
    }

    #[test]
    fn try_from_coerces_between_numbers() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert_eq!(i64::try_from(Value::from(42.9)).unwrap(), 42);
        assert_eq!(f64::try_from(Value::from(42)).unwrap(), 42.0);
        assert!(i64::try_from(Value::from("42")).is_err());
    }

    #[test]
    fn try_from_narrowing_truncates_silently() {
        let wide = Value::from(0x1_0000_0001i64);
        assert_eq!(i32::try_from(wide.clone()).unwrap(), 1);
        assert_eq!(i16::try_from(wide).unwrap(), 1);
    }

    #[test]
    fn push_and_insert_convert_the_receiver() {
        let mut v = Value::from(1);
        v.push(2);
        assert_eq!(v, Value::Array(vec![Value::from(2)]));

        let mut v = Value::from(1);
        v.insert("a", 2);
        assert_eq!(v.get("a"), Some(&Value::from(2)));
    }

    #[test]
    fn from_vec_and_maps() {
        let v = Value::from(vec![1, 2, 3]);
        assert_eq!(v.get_index(2), Some(&Value::from(3)));

        let mut map = HashMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        let v = Value::from(map);
        let table = v.as_table().unwrap();
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn display_writes_toml() {
        let doc = crate::parse("b = 2\na = 1\n").unwrap();
        assert_eq!(doc.to_string(), "a = 1\nb = 2\n");
    }

    #[test]
    fn serde_roundtrip_through_json() {
        let doc = crate::parse("x = 1\n[t]\ny = [true, \"s\"]\n").unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("x").and_then(Value::as_integer), Some(1));
        let y = back.get("t").and_then(|t| t.get("y")).unwrap();
        assert_eq!(y.get_index(0), Some(&Value::from(true)));
    }
}
