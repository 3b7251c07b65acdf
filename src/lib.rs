//! # tomlet
//!
//! A TOML v1.0.0 library built around a plain document tree: parse TOML text
//! into a [`Value`], work with it through typed accessors, and write it back
//! out as TOML, JSON or YAML.
//!
//! ## Highlights
//!
//! - **Full TOML v1.0.0 grammar**: dotted keys, inline tables, arrays of
//!   tables, all four date/time flavors, binary/octal/hex integers, float
//!   specials, and all six string forms.
//! - **Semantic rules enforced at parse time**: duplicate keys, table
//!   redefinition and inline-table extension are rejected with byte-accurate
//!   error positions.
//! - **Three output formats** from one tree: TOML with proper
//!   `[table]`/`[[array-of-tables]]` promotion, minified or pretty JSON, and
//!   block-style YAML.
//! - **Deterministic output**: tables iterate in ascending key order.
//!
//! ## Parsing
//!
//! ```rust
//! use tomlet::Value;
//!
//! let doc = tomlet::parse(r#"
//! title = "TOML Example"
//!
//! [owner]
//! name = "Tom"
//! dob = 1979-05-27T07:32:00-08:00
//! "#).unwrap();
//!
//! assert_eq!(doc.get("title").and_then(Value::as_str), Some("TOML Example"));
//! let dob = doc.get("owner").and_then(|o| o.get("dob")).unwrap();
//! assert_eq!(dob.as_datetime().and_then(|d| d.year()), Some(1979));
//! ```
//!
//! ## Building and serializing
//!
//! ```rust
//! use tomlet::{toml, StringifyOptions};
//!
//! let doc = toml!({
//!     "database": {
//!         "enabled": true,
//!         "ports": [8000, 8001]
//!     }
//! });
//!
//! assert_eq!(
//!     tomlet::to_string(&doc),
//!     "\n[database]\nenabled = true\nports = [8000, 8001]\n"
//! );
//! assert_eq!(
//!     tomlet::to_string_with_options(&doc, StringifyOptions::json()),
//!     r#"{"database": {"enabled": true,"ports": [8000,8001]}}"#
//! );
//! assert_eq!(
//!     tomlet::to_string_with_options(&doc, StringifyOptions::yaml()),
//!     "database:\n  enabled: true\n  ports:\n    - 8000\n    - 8001"
//! );
//! ```
//!
//! ## Errors
//!
//! [`parse`] rejects invalid documents with [`Error::Parse`], which carries
//! the byte offset of the offending input:
//!
//! ```rust
//! let err = tomlet::parse("a = 1\na = 2\n").unwrap_err();
//! assert!(err.to_string().contains("duplicate key"));
//! ```
//!
//! Serialization never fails; [`to_string`] returns the text directly.

pub mod datetime;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod value;

pub use datetime::Datetime;
pub use error::{Error, Result};
pub use map::Table;
pub use options::{Format, StringifyOptions};
pub use value::{Kind, Value};

/// Parses a complete TOML document.
///
/// The result is always a `Value::Table` holding the document root.
///
/// # Examples
///
/// ```rust
/// use tomlet::Value;
///
/// let doc = tomlet::parse("answer = 42\n").unwrap();
/// assert_eq!(doc.get("answer").and_then(Value::as_integer), Some(42));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] with a byte offset for any grammar or semantic
/// violation.
#[must_use = "this returns the parsed document, errors must be handled"]
pub fn parse(input: &str) -> Result<Value> {
    parser::parse_document(input)
}

/// Parses a TOML document from bytes, checking that they are valid UTF-8.
///
/// # Examples
///
/// ```rust
/// use tomlet::Value;
///
/// let doc = tomlet::parse_slice(b"answer = 42\n").unwrap();
/// assert_eq!(doc.get("answer").and_then(Value::as_integer), Some(42));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] if the bytes are not valid UTF-8 or not a valid
/// document.
#[must_use = "this returns the parsed document, errors must be handled"]
pub fn parse_slice(input: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(input)
        .map_err(|e| Error::parse("input is not valid UTF-8", e.valid_up_to()))?;
    parse(text)
}

/// Serializes a value as TOML text.
///
/// Scalar bindings come before `[table]` and `[[array-of-tables]]` sections,
/// and table keys are emitted in ascending order, so the output is
/// deterministic: serializing, parsing and serializing again reproduces the
/// same bytes.
///
/// # Examples
///
/// ```rust
/// use tomlet::toml;
///
/// let doc = toml!({ "b": 2, "a": 1 });
/// assert_eq!(tomlet::to_string(&doc), "a = 1\nb = 2\n");
/// ```
#[must_use]
pub fn to_string(value: &Value) -> String {
    ser::stringify(value, StringifyOptions::new())
}

/// Serializes a value in the format selected by `options`.
///
/// # Examples
///
/// ```rust
/// use tomlet::{toml, StringifyOptions};
///
/// let doc = toml!({ "xs": [1, 2] });
/// assert_eq!(
///     tomlet::to_string_with_options(&doc, StringifyOptions::json().with_indent(2)),
///     "{\n  \"xs\": [\n    1,\n    2\n  ]\n}"
/// );
/// ```
#[must_use]
pub fn to_string_with_options(value: &Value, options: StringifyOptions) -> String {
    ser::stringify(value, options)
}
