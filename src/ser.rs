//! Multi-format serialization of document trees.
//!
//! One writer per target format:
//!
//! - **TOML** emits the scalar and inline bindings of each table first, then
//!   its sub-tables as `[section]` headers and its arrays-of-tables as
//!   `[[section]]` headers, recursing in key order. Arrays whose elements
//!   are all tables become `[[section]]`s; every other array is inlined.
//! - **JSON** is standard; `indent = 0` minifies, larger values
//!   pretty-print. Date/times become quoted strings in canonical TOML form.
//! - **YAML** is block style, with date/times unquoted.
//!
//! Float and string rendering are shared by all three formats; see
//! [`format_float`] for the notation rules.

use crate::options::{Format, StringifyOptions};
use crate::value::Value;
use crate::Table;

/// Renders `value` in the format selected by `options`.
pub(crate) fn stringify(value: &Value, options: StringifyOptions) -> String {
    let mut out = String::new();
    match options.format {
        Format::Toml => write_toml_value(value, &mut out),
        Format::Json => write_json_value(value, &mut out, options.indent, 0),
        Format::Yaml => write_yaml_value(value, &mut out, options.indent, 0),
    }
    out
}

// ---- shared scalar rendering ----

/// Formats a float for output in any mode:
///
/// - NaN is `nan`, the infinities are `inf` and `-inf`;
/// - magnitude at or above 10^6, or below 10^-4 (but nonzero), uses
///   scientific notation: trailing-zero-trimmed mantissa with at least one
///   fractional digit, lowercase `e`, exponent without `+` or leading zeros;
/// - integer-valued doubles below 10^14 in magnitude keep a trailing `.0`;
/// - everything else is the shortest decimal that round-trips.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e6 || (magnitude > 0.0 && magnitude < 1e-4) {
        let mut rendered = format!("{value:e}");
        if let Some(e_at) = rendered.find('e') {
            if !rendered[..e_at].contains('.') {
                rendered.insert_str(e_at, ".0");
            }
        }
        rendered
    } else if value == value.trunc() && magnitude < 1e14 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Writes `s` onto `out` as a basic string: quoted, with the named escapes
/// for `"`, `\`, backspace, form feed, newline, carriage return and tab, and
/// `\u00XX` for the remaining control characters.
///
/// This is the one escape table used for every quoted string the crate
/// emits, in TOML and JSON output alike.
///
/// # Examples
///
/// ```rust
/// let mut out = String::new();
/// tomlet::ser::write_escaped("a\"b\n", &mut out);
/// assert_eq!(out, "\"a\\\"b\\n\"");
/// ```
pub fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) <= 0x08 || ((c as u32) >= 0x0A && (c as u32) <= 0x1F) || c == '\u{7F}' =>
            {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// A key matching the bare-key grammar is emitted as-is; anything else is
/// quoted as a basic string.
fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn write_key(key: &str, out: &mut String) {
    if is_bare_key(key) {
        out.push_str(key);
    } else {
        write_escaped(key, out);
    }
}

fn push_spaces(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push(' ');
    }
}

/// An array whose elements are all tables (and there is at least one)
/// serializes as `[[section]]`s in TOML.
fn is_array_of_tables(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_table),
        _ => false,
    }
}

// ---- TOML ----

fn write_toml_value(value: &Value, out: &mut String) {
    match value {
        Value::Table(table) => write_toml_table(table, out, ""),
        other => write_toml_inline_value(other, out),
    }
}

/// A value in inline position: a scalar token, a `[ ... ]` array or a
/// `{ ... }` table.
fn write_toml_inline_value(value: &Value, out: &mut String) {
    match value {
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => write_escaped(s, out),
        Value::Datetime(dt) => out.push_str(&dt.to_string()),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_toml_inline_value(item, out);
            }
            out.push(']');
        }
        Value::Table(table) => write_toml_inline_table(table, out),
    }
}

fn write_toml_inline_table(table: &Table, out: &mut String) {
    if table.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{ ");
    for (index, (key, value)) in table.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        write_key(key, out);
        out.push_str(" = ");
        write_toml_inline_value(value, out);
    }
    out.push_str(" }");
}

/// Section form: scalar and inline bindings first, then `[table]` and
/// `[[array-of-tables]]` children, each with its dotted path.
fn write_toml_table(table: &Table, out: &mut String, prefix: &str) {
    for (key, value) in table.iter() {
        if !value.is_table() && !is_array_of_tables(value) {
            write_key(key, out);
            out.push_str(" = ");
            write_toml_inline_value(value, out);
            out.push('\n');
        }
    }
    for (key, value) in table.iter() {
        match value {
            Value::Table(child) => {
                let full = join_key(prefix, key);
                out.push_str("\n[");
                out.push_str(&full);
                out.push_str("]\n");
                write_toml_table(child, out, &full);
            }
            Value::Array(items) if is_array_of_tables(value) => {
                let full = join_key(prefix, key);
                for item in items {
                    if let Value::Table(element) = item {
                        out.push_str("\n[[");
                        out.push_str(&full);
                        out.push_str("]]\n");
                        write_toml_table(element, out, &full);
                    }
                }
            }
            _ => {}
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    let mut rendered = String::new();
    if !prefix.is_empty() {
        rendered.push_str(prefix);
        rendered.push('.');
    }
    write_key(key, &mut rendered);
    rendered
}

// ---- JSON ----

fn write_json_value(value: &Value, out: &mut String, indent: usize, level: usize) {
    match value {
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => write_escaped(s, out),
        Value::Datetime(dt) => {
            out.push('"');
            out.push_str(&dt.to_string());
            out.push('"');
        }
        Value::Array(items) => write_json_array(items, out, indent, level),
        Value::Table(table) => write_json_table(table, out, indent, level),
    }
}

fn write_json_array(items: &[Value], out: &mut String, indent: usize, level: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        if indent != 0 {
            out.push('\n');
        }
        push_spaces(out, (level + 1) * indent);
        write_json_value(item, out, indent, level + 1);
    }
    if indent != 0 {
        out.push('\n');
        push_spaces(out, level * indent);
    }
    out.push(']');
}

fn write_json_table(table: &Table, out: &mut String, indent: usize, level: usize) {
    if table.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (index, (key, value)) in table.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        if indent != 0 {
            out.push('\n');
        }
        push_spaces(out, (level + 1) * indent);
        write_escaped(key, out);
        out.push_str(": ");
        write_json_value(value, out, indent, level + 1);
    }
    if indent != 0 {
        out.push('\n');
        push_spaces(out, level * indent);
    }
    out.push('}');
}

// ---- YAML ----

fn write_yaml_value(value: &Value, out: &mut String, indent: usize, level: usize) {
    match value {
        Value::Table(table) => write_yaml_table(table, out, indent, level),
        Value::Array(items) => write_yaml_array(items, out, indent, level),
        scalar => write_yaml_scalar(scalar, out),
    }
}

fn write_yaml_scalar(value: &Value, out: &mut String) {
    match value {
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => write_escaped(s, out),
        Value::Datetime(dt) => out.push_str(&dt.to_string()),
        // Containers are dispatched before this point.
        Value::Array(_) | Value::Table(_) => {}
    }
}

fn write_yaml_table(table: &Table, out: &mut String, indent: usize, level: usize) {
    for (index, (key, value)) in table.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        push_spaces(out, indent * level);
        write_key(key, out);
        out.push(':');
        if value.is_table() || value.is_array() {
            out.push('\n');
            write_yaml_value(value, out, indent, level + 1);
        } else {
            out.push(' ');
            write_yaml_scalar(value, out);
        }
    }
}

fn write_yaml_array(items: &[Value], out: &mut String, indent: usize, level: usize) {
    for (index, item) in items.iter().enumerate() {
        push_spaces(out, indent * level);
        out.push('-');
        if item.is_table() || item.is_array() {
            out.push('\n');
            write_yaml_value(item, out, indent, level + 1);
        } else {
            out.push(' ');
            write_yaml_scalar(item, out);
        }
        if index + 1 != items.len() {
            out.push('\n');
        }
    }
}
