//! Conformance harness: reads a TOML document on standard input and writes a
//! typed JSON tree on standard output.
//!
//! Every scalar is rendered as `{"type": T, "value": V}` with `T` one of
//! `bool`, `integer`, `float`, `string`, `datetime`, `datetime-local`,
//! `date-local` or `time-local`, and `V` the canonical textual form. A parse
//! failure prints the error and exits non-zero.

use std::io::{self, Read};
use std::process::ExitCode;
use tomlet::ser::write_escaped;
use tomlet::{Datetime, Value};

const INDENT: usize = 4;

fn main() -> ExitCode {
    let mut input = String::new();
    if io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read standard input");
        return ExitCode::FAILURE;
    }
    match tomlet::parse(&input) {
        Ok(doc) => {
            let mut out = String::new();
            render(&doc, &mut out, 0);
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn render(value: &Value, out: &mut String, level: usize) {
    match value {
        Value::Array(items) => render_array(items, out, level),
        Value::Table(table) => render_table(table, out, level),
        Value::Boolean(b) => leaf("bool", if *b { "true" } else { "false" }, out, level),
        Value::Integer(i) => leaf("integer", &i.to_string(), out, level),
        Value::Float(f) => leaf("float", &float_text(*f), out, level),
        Value::String(s) => leaf("string", s, out, level),
        Value::Datetime(dt) => leaf(datetime_type(dt), &dt.to_string(), out, level),
    }
}

fn datetime_type(dt: &Datetime) -> &'static str {
    match dt {
        Datetime::Offset { .. } => "datetime",
        Datetime::LocalDatetime(_) => "datetime-local",
        Datetime::LocalDate(_) => "date-local",
        Datetime::LocalTime(_) => "time-local",
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f.is_sign_negative() { "-inf" } else { "inf" }.to_string()
    } else {
        format!("{f}")
    }
}

/// `{"type": T, "value": V}` with both fields JSON-quoted.
fn leaf(kind: &str, value: &str, out: &mut String, level: usize) {
    out.push('{');
    newline_indent(out, level + 1);
    out.push_str("\"type\": ");
    write_escaped(kind, out);
    out.push(',');
    newline_indent(out, level + 1);
    out.push_str("\"value\": ");
    write_escaped(value, out);
    newline_indent(out, level);
    out.push('}');
}

fn render_array(items: &[Value], out: &mut String, level: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        newline_indent(out, level + 1);
        render(item, out, level + 1);
    }
    newline_indent(out, level);
    out.push(']');
}

fn render_table(table: &tomlet::Table, out: &mut String, level: usize) {
    if table.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (index, (key, value)) in table.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        newline_indent(out, level + 1);
        write_escaped(key, out);
        out.push(':');
        render(value, out, level + 1);
    }
    newline_indent(out, level);
    out.push('}');
}

fn newline_indent(out: &mut String, level: usize) {
    out.push('\n');
    for _ in 0..level * INDENT {
        out.push(' ');
    }
}
