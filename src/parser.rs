//! The TOML v1.0.0 parser.
//!
//! A single-pass, byte-position-tracking parser. Scanning primitives skip
//! trivia (whitespace, comments, newlines), lexical parsers produce keys and
//! scalar values, and the structural parser assembles the document tree while
//! a definition ledger enforces the semantic rules: no path is assigned
//! twice, tables are not redefined, implicitly created tables keep their
//! provenance, and inline tables are closed to later extension.
//!
//! Errors carry a byte offset into the original input; see [`Error`].
//!
//! Most users should call [`crate::parse`] instead of using this module
//! directly.

use crate::datetime::{self, Datetime};
use crate::map::Table;
use crate::value::Value;
use crate::{Error, Result};
use indexmap::IndexMap;

/// Parses a complete TOML document into a `Value::Table`.
pub(crate) fn parse_document(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    let mut root = Table::new();

    // Key/value pairs before the first table header belong to the root.
    parser.parse_body(&mut root, &[])?;

    loop {
        parser.skip_ws_and_comment()?;
        if parser.at_end() {
            break;
        }
        if parser.peek() != Some(b'[') {
            return Err(Error::parse("expected a table header", parser.pos));
        }
        let header_start = parser.pos;
        let is_array = parser.peek_at(1) == Some(b'[');
        let path = parser.parse_header_path(is_array)?;
        parser.skip_ws_and_comment()?;
        if !parser.at_end() && !parser.skip_newline() {
            return Err(Error::parse(
                "a line break is required after a table header",
                parser.pos,
            ));
        }
        if is_array {
            parser.ledger.open_array_header(&path, header_start)?;
            let target = open_array_element(&mut root, &path, header_start)?;
            parser.parse_body(target, &path)?;
        } else {
            parser.ledger.open_header(&path, header_start)?;
            let target = open_table(&mut root, &path, header_start)?;
            parser.parse_body(target, &path)?;
        }
    }

    Ok(Value::Table(root))
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    ledger: LedgerNode,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            text: input,
            bytes: input.as_bytes(),
            pos: 0,
            ledger: LedgerNode::table_root(),
        }
    }

    // ---- scanning primitives ----

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// The unparsed remainder. Only called with `pos` on an ASCII boundary.
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn triple_at(&self, pos: usize, quote: u8) -> bool {
        self.bytes.get(pos) == Some(&quote)
            && self.bytes.get(pos + 1) == Some(&quote)
            && self.bytes.get(pos + 2) == Some(&quote)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Consumes one line terminator: LF or CRLF. A bare CR is not a line
    /// terminator and is left in place.
    fn skip_newline(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.pos += 1;
                true
            }
            Some(b'\r') if self.peek_at(1) == Some(b'\n') => {
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    /// Skips whitespace and at most one comment, stopping at the newline.
    fn skip_ws_and_comment(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.peek() != Some(b'#') {
            return Ok(());
        }
        self.pos += 1;
        while let Some(b) = self.peek() {
            if b == b'\n' || b == b'\r' {
                break;
            }
            if (b <= 0x1F && b != b'\t') || b == 0x7F {
                return Err(Error::parse(
                    "control characters other than tab are not allowed in a comment",
                    self.pos,
                ));
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Skips whitespace, comments and newlines until no further progress.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            let before = self.pos;
            self.skip_ws_and_comment()?;
            self.skip_newline();
            if self.pos == before {
                return Ok(());
            }
        }
    }

    // ---- keys ----

    fn parse_bare_key(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(Error::parse("invalid key", start));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    /// One or more key segments joined by `.`, with whitespace around the
    /// dots permitted. Quoted segments use the single-line string grammars;
    /// multi-line strings are not valid keys.
    fn parse_dotted_key(&mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        loop {
            self.skip_whitespace();
            let key = match self.peek() {
                Some(b'"') => self.parse_basic_string()?,
                Some(b'\'') => self.parse_literal_string()?,
                _ => self.parse_bare_key()?,
            };
            keys.push(key);
            self.skip_whitespace();
            if self.peek() == Some(b'.') {
                self.pos += 1;
            } else {
                return Ok(keys);
            }
        }
    }

    // ---- values ----

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(Error::parse("expected a value", self.pos)),
            Some(b'"' | b'\'') => self.parse_string_value(),
            Some(b) if b == b'+' || b == b'-' || b.is_ascii_digit() || b == b'i' || b == b'n' => {
                self.parse_number_or_date()
            }
            Some(b't' | b'f') => self.parse_boolean(),
            Some(b'[') => self.parse_inline_array(),
            Some(b'{') => self.parse_inline_table(),
            Some(_) => Err(Error::parse("invalid value", self.pos)),
        }
    }

    fn parse_boolean(&mut self) -> Result<Value> {
        if self.rest().starts_with("true") {
            self.pos += 4;
            Ok(Value::Boolean(true))
        } else if self.rest().starts_with("false") {
            self.pos += 5;
            Ok(Value::Boolean(false))
        } else {
            Err(Error::parse("expected `true` or `false`", self.pos))
        }
    }

    /// `dotted-key = value`. With `needs_line_break`, the value must be
    /// followed by a newline or the end of input; inline-table callers handle
    /// their own separators.
    fn parse_key_value(&mut self, needs_line_break: bool) -> Result<(Vec<String>, Value)> {
        let keys = self.parse_dotted_key()?;
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Err(Error::parse("expected `=` after a key", self.pos));
        }
        self.pos += 1;
        let value = self.parse_value()?;
        if needs_line_break {
            self.skip_ws_and_comment()?;
            if !self.at_end() && !self.skip_newline() {
                return Err(Error::parse(
                    "a line break is required after the value",
                    self.pos,
                ));
            }
        }
        Ok((keys, value))
    }

    /// The body of a table: key/value pairs until the next `[` or the end of
    /// input. Every pair is checked against the ledger under the header's
    /// path before it lands in the document.
    fn parse_body(&mut self, target: &mut Table, header: &[String]) -> Result<()> {
        loop {
            self.skip_trivia()?;
            if self.at_end() || self.peek() == Some(b'[') {
                return Ok(());
            }
            let pair_start = self.pos;
            let (keys, value) = self.parse_key_value(true)?;
            self.ledger.bind_key(header, &keys, pair_start)?;
            insert_nested(target, &keys, value, pair_start)?;
        }
    }

    /// `[a.b.c]` or `[[a.b.c]]`; the caller has already seen the bracket(s).
    fn parse_header_path(&mut self, is_array: bool) -> Result<Vec<String>> {
        self.pos += 1 + usize::from(is_array);
        let path = self.parse_dotted_key()?;
        if self.peek() != Some(b']') {
            return Err(Error::parse("expected `]` to close a table header", self.pos));
        }
        self.pos += 1;
        if is_array {
            if self.peek() != Some(b']') {
                return Err(Error::parse(
                    "expected `]]` to close an array-of-tables header",
                    self.pos,
                ));
            }
            self.pos += 1;
        }
        Ok(path)
    }

    // ---- arrays and inline tables ----

    /// `[ v1, v2, ... ]`. Newlines and comments are permitted anywhere
    /// inside; a trailing comma is permitted.
    fn parse_inline_array(&mut self) -> Result<Value> {
        self.pos += 1;
        let mut items = Vec::new();
        let mut expects_value = true;
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(Error::parse("unclosed array: missing `]`", self.pos)),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => {
                    if !expects_value {
                        return Err(Error::parse(
                            "expected `,` or `]` after an array value",
                            self.pos,
                        ));
                    }
                    items.push(self.parse_value()?);
                    self.skip_trivia()?;
                    if self.peek() == Some(b',') {
                        self.pos += 1;
                        expects_value = true;
                    } else {
                        expects_value = false;
                    }
                }
            }
        }
    }

    /// `{ k = v, k = v }`, single-line, no trailing comma. Dotted keys are
    /// tracked against a ledger local to this table, and the finished table
    /// is closed to any later extension by the enclosing ledger.
    fn parse_inline_table(&mut self) -> Result<Value> {
        self.pos += 1;
        let mut table = Table::new();
        let mut ledger = LedgerNode::table_root();
        let mut saw_value = false;
        let mut after_comma = false;
        loop {
            self.skip_ws_and_comment()?;
            match self.peek() {
                None => {
                    return Err(Error::parse("unclosed inline table: missing `}`", self.pos))
                }
                Some(b'}') => {
                    if after_comma {
                        return Err(Error::parse(
                            "a trailing comma is not allowed in an inline table",
                            self.pos,
                        ));
                    }
                    self.pos += 1;
                    return Ok(Value::Table(table));
                }
                Some(_) => {
                    if saw_value && !after_comma {
                        return Err(Error::parse(
                            "expected `,` or `}` in an inline table",
                            self.pos,
                        ));
                    }
                    let pair_start = self.pos;
                    let (keys, value) = self.parse_key_value(false)?;
                    ledger.bind_key(&[], &keys, pair_start)?;
                    insert_nested(&mut table, &keys, value, pair_start)?;
                    saw_value = true;
                    self.skip_ws_and_comment()?;
                    if self.peek() == Some(b',') {
                        self.pos += 1;
                        after_comma = true;
                    } else {
                        after_comma = false;
                    }
                }
            }
        }
    }

    // ---- numbers and date/times ----

    /// Two fast lookaheads select the date/time path: four digits then `-`,
    /// or two digits then `:`.
    fn looks_like_datetime(&self) -> bool {
        let b = self.bytes;
        let p = self.pos;
        if p + 5 <= b.len()
            && b[p].is_ascii_digit()
            && b[p + 1].is_ascii_digit()
            && b[p + 2].is_ascii_digit()
            && b[p + 3].is_ascii_digit()
            && b[p + 4] == b'-'
        {
            return true;
        }
        p + 3 <= b.len() && b[p].is_ascii_digit() && b[p + 1].is_ascii_digit() && b[p + 2] == b':'
    }

    /// If the upcoming text fully matches a date/time it is taken as one;
    /// otherwise the position rewinds and the number grammar applies.
    fn parse_number_or_date(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.looks_like_datetime() {
            let bytes = self.bytes;
            let is_candidate = |b: u8| {
                b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'T' | b'Z' | b'+' | b'.')
            };
            let mut end = self.pos;
            while end < bytes.len() {
                let b = bytes[end];
                if is_candidate(b) {
                    end += 1;
                } else if b == b' ' && end + 1 < bytes.len() && is_candidate(bytes[end + 1]) {
                    end += 1;
                } else {
                    break;
                }
            }
            let candidate = &self.text[start..end];
            if datetime::matches_full(candidate) {
                self.pos = end;
                return Datetime::parse(candidate)
                    .map(Value::Datetime)
                    .map_err(|e| e.at_offset(start));
            }
        }
        self.pos = start;
        self.parse_number()
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        let mut negative = false;
        let mut signed = false;
        if let Some(b @ (b'+' | b'-')) = self.peek() {
            negative = b == b'-';
            signed = true;
            self.pos += 1;
            if self.peek() == Some(b'.') {
                return Err(Error::parse(
                    "a sign cannot be immediately followed by `.`",
                    self.pos,
                ));
            }
        }

        if self.rest().starts_with("inf") {
            self.pos += 3;
            let inf = if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return Ok(Value::Float(inf));
        }
        if self.rest().starts_with("nan") {
            self.pos += 3;
            return Ok(Value::Float(f64::NAN));
        }

        let mut base = 10u32;
        if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'b') => {
                    base = 2;
                    self.pos += 2;
                }
                Some(b'o') => {
                    base = 8;
                    self.pos += 2;
                }
                Some(b'x') => {
                    base = 16;
                    self.pos += 2;
                }
                _ => {}
            }
        }
        if base != 10 && signed {
            return Err(Error::parse(
                "a sign is only allowed on decimal numbers",
                start,
            ));
        }
        if base == 10
            && self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit() || b == b'_')
        {
            return Err(Error::parse("leading zeros are not allowed", self.pos));
        }

        let digits_start = self.pos;
        let mut is_float = false;
        self.scan_digit_run(base, start)?;

        if base == 10 && self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            if self.peek() == Some(b'_') {
                return Err(Error::parse(
                    "`.` cannot be immediately followed by an underscore",
                    self.pos,
                ));
            }
            let frac_start = self.pos;
            self.scan_digit_run(10, start)?;
            if self.pos == frac_start {
                return Err(Error::parse("expected digits after `.`", self.pos));
            }
        }
        if base == 10 && matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.peek() == Some(b'_') {
                return Err(Error::parse(
                    "expected digits after the exponent, not an underscore",
                    self.pos,
                ));
            }
            let exp_start = self.pos;
            self.scan_digit_run(10, start)?;
            if self.pos == exp_start {
                return Err(Error::parse("expected digits after the exponent", self.pos));
            }
        }

        let raw = &self.text[digits_start..self.pos];
        if raw.is_empty() {
            return Err(Error::parse("invalid number", start));
        }
        if raw.starts_with('_') || raw.ends_with('_') {
            return Err(Error::parse("underscores must be surrounded by digits", start));
        }
        let mut cleaned = String::with_capacity(raw.len() + 1);
        if negative {
            cleaned.push('-');
        }
        cleaned.extend(raw.chars().filter(|&c| c != '_'));

        if is_float {
            match cleaned.parse::<f64>() {
                Ok(f) => Ok(Value::Float(f)),
                Err(_) => Err(Error::parse("invalid float", start)),
            }
        } else {
            match i64::from_str_radix(&cleaned, base) {
                Ok(i) => Ok(Value::Integer(i)),
                Err(e) => match e.kind() {
                    std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                        Err(Error::parse("integer does not fit in 64 bits", start))
                    }
                    _ => Err(Error::parse("invalid integer", start)),
                },
            }
        }
    }

    /// Consumes a run of digits in `base`, where each underscore must sit
    /// between two digits.
    fn scan_digit_run(&mut self, base: u32, number_start: usize) -> Result<()> {
        loop {
            match self.peek() {
                Some(b) if is_digit_in_base(b, base) => self.pos += 1,
                Some(b'_') => match self.peek_at(1) {
                    Some(b) if is_digit_in_base(b, base) => self.pos += 1,
                    _ => {
                        return Err(Error::parse(
                            "underscores must be surrounded by digits",
                            number_start,
                        ))
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    // ---- strings ----

    fn parse_string_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'"') if self.triple_at(self.pos, b'"') => {
                self.parse_ml_basic_string().map(Value::String)
            }
            Some(b'"') => self.parse_basic_string().map(Value::String),
            Some(b'\'') if self.triple_at(self.pos, b'\'') => {
                self.parse_ml_literal_string().map(Value::String)
            }
            Some(b'\'') => self.parse_literal_string().map(Value::String),
            _ => Err(Error::parse("expected a string", self.pos)),
        }
    }

    fn parse_basic_string(&mut self) -> Result<String> {
        self.pos += 1;
        let mut out = String::new();
        let mut run = self.pos;
        loop {
            let Some(b) = self.peek() else {
                return Err(Error::parse("unterminated basic string", self.pos));
            };
            match b {
                b'"' => {
                    out.push_str(&self.text[run..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    out.push_str(&self.text[run..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run = self.pos;
                }
                b if is_forbidden_in_basic(b) => {
                    return Err(Error::parse(
                        "control characters other than tab must be escaped in a basic string",
                        self.pos,
                    ));
                }
                _ => self.pos += 1,
            }
        }
    }

    fn parse_ml_basic_string(&mut self) -> Result<String> {
        self.pos += 3;
        // A newline immediately after the opening delimiter is trimmed.
        self.skip_newline();
        let mut out = String::new();
        let mut run = self.pos;
        loop {
            if self.at_end() {
                return Err(Error::parse(
                    "unterminated multi-line basic string",
                    self.pos,
                ));
            }
            if self.triple_at(self.pos, b'"') {
                let mut quotes = 3;
                while self.bytes.get(self.pos + quotes) == Some(&b'"') {
                    quotes += 1;
                }
                if quotes > 5 {
                    return Err(Error::parse(
                        "too many quotes at the end of a multi-line basic string",
                        self.pos,
                    ));
                }
                if quotes == 3 {
                    out.push_str(&self.text[run..self.pos]);
                    self.pos += 3;
                    return Ok(out);
                }
                // Four or five quotes: the extra one or two are content,
                // consumed below one at a time.
            }
            let b = self.bytes[self.pos];
            match b {
                b'\\' => {
                    out.push_str(&self.text[run..self.pos]);
                    self.pos += 1;
                    self.parse_ml_escape(&mut out)?;
                    run = self.pos;
                }
                b'\r' if self.bytes.get(self.pos + 1) != Some(&b'\n') => {
                    return Err(Error::parse(
                        "a bare carriage return is not allowed in a multi-line basic string",
                        self.pos,
                    ));
                }
                b if is_forbidden_in_ml_basic(b) => {
                    return Err(Error::parse(
                        "control characters other than tab must be escaped in a multi-line basic string",
                        self.pos,
                    ));
                }
                _ => self.pos += 1,
            }
        }
    }

    fn parse_literal_string(&mut self) -> Result<String> {
        self.pos += 1;
        let run = self.pos;
        loop {
            match self.peek() {
                None => return Err(Error::parse("unterminated literal string", self.pos)),
                Some(b'\'') => {
                    let content = self.text[run..self.pos].to_string();
                    self.pos += 1;
                    return Ok(content);
                }
                Some(b'\n' | b'\r') => {
                    return Err(Error::parse(
                        "newlines are not allowed in a literal string",
                        self.pos,
                    ));
                }
                Some(b) if (b <= 0x1F && b != b'\t') || b == 0x7F => {
                    return Err(Error::parse(
                        "control characters other than tab are not allowed in a literal string",
                        self.pos,
                    ));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_ml_literal_string(&mut self) -> Result<String> {
        self.pos += 3;
        self.skip_newline();
        let run = self.pos;
        loop {
            if self.at_end() {
                return Err(Error::parse(
                    "unterminated multi-line literal string",
                    self.pos,
                ));
            }
            if self.triple_at(self.pos, b'\'') {
                let mut quotes = 3;
                while self.bytes.get(self.pos + quotes) == Some(&b'\'') {
                    quotes += 1;
                }
                if quotes > 5 {
                    return Err(Error::parse(
                        "too many quotes at the end of a multi-line literal string",
                        self.pos,
                    ));
                }
                if quotes == 3 {
                    let content = self.text[run..self.pos].to_string();
                    self.pos += 3;
                    return Ok(content);
                }
                // Four or five quotes: the extra one or two are content.
            }
            let b = self.bytes[self.pos];
            if b == b'\r' && self.bytes.get(self.pos + 1) != Some(&b'\n') {
                return Err(Error::parse(
                    "a bare carriage return is not allowed in a multi-line literal string",
                    self.pos,
                ));
            }
            if is_forbidden_in_ml_literal(b) {
                return Err(Error::parse(
                    "control characters other than tab are not allowed in a multi-line literal string",
                    self.pos,
                ));
            }
            self.pos += 1;
        }
    }

    /// Handles the character after a backslash in a single-line basic string.
    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let Some(b) = self.peek() else {
            return Err(Error::parse("unterminated escape sequence", self.pos));
        };
        match b {
            b'b' => out.push('\u{0008}'),
            b't' => out.push('\t'),
            b'n' => out.push('\n'),
            b'f' => out.push('\u{000C}'),
            b'r' => out.push('\r'),
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'u' | b'U' => return self.parse_unicode_escape(out),
            other => {
                return Err(Error::parse(
                    format!("unknown escape `\\{}`", char::from(other)),
                    self.pos,
                ));
            }
        }
        self.pos += 1;
        Ok(())
    }

    /// Handles the character after a backslash in a multi-line basic string.
    /// A backslash that ends its line (allowing trailing whitespace) swallows
    /// all whitespace through the next non-whitespace character.
    fn parse_ml_escape(&mut self, out: &mut String) -> Result<()> {
        let mut lookahead = self.pos;
        let mut line_has_content = false;
        while lookahead < self.bytes.len() && !matches!(self.bytes[lookahead], b'\n' | b'\r') {
            if matches!(self.bytes[lookahead], b' ' | b'\t') {
                lookahead += 1;
            } else {
                line_has_content = true;
                break;
            }
        }
        if !line_has_content && self.ws_or_newline_at(self.pos) {
            while self.ws_or_newline_at(self.pos) {
                self.pos += 1;
            }
            return Ok(());
        }
        self.parse_escape(out)
    }

    fn ws_or_newline_at(&self, pos: usize) -> bool {
        match self.bytes.get(pos) {
            Some(b' ' | b'\t' | b'\n') => true,
            Some(b'\r') => self.bytes.get(pos + 1) == Some(&b'\n'),
            _ => false,
        }
    }

    /// `\uXXXX` or `\UXXXXXXXX`, positioned on the `u`/`U`. The code point
    /// must be a Unicode scalar value: at most U+10FFFF and not a surrogate.
    fn parse_unicode_escape(&mut self, out: &mut String) -> Result<()> {
        let escape_start = self.pos;
        let length = if self.bytes[self.pos] == b'u' { 4 } else { 8 };
        self.pos += 1;
        if self.pos + length > self.bytes.len() {
            return Err(Error::parse(
                "unexpected end of input in unicode escape",
                self.pos,
            ));
        }
        let mut code: u32 = 0;
        for i in 0..length {
            let digit = char::from(self.bytes[self.pos + i]).to_digit(16).ok_or_else(|| {
                Error::parse("invalid hexadecimal digit in unicode escape", self.pos + i)
            })?;
            code = code * 16 + digit;
        }
        self.pos += length;
        match char::from_u32(code) {
            Some(c) => {
                out.push(c);
                Ok(())
            }
            None => Err(Error::parse(
                format!("invalid unicode scalar value `{code:#x}`"),
                escape_start,
            )),
        }
    }
}

fn is_digit_in_base(b: u8, base: u32) -> bool {
    match base {
        2 => matches!(b, b'0' | b'1'),
        8 => (b'0'..=b'7').contains(&b),
        16 => b.is_ascii_hexdigit(),
        _ => b.is_ascii_digit(),
    }
}

fn is_forbidden_in_basic(b: u8) -> bool {
    b <= 0x08 || (0x0A..=0x1F).contains(&b) || b == 0x7F
}

fn is_forbidden_in_ml_basic(b: u8) -> bool {
    b <= 0x08 || b == 0x0B || b == 0x0C || (0x0E..=0x1F).contains(&b) || b == 0x7F
}

fn is_forbidden_in_ml_literal(b: u8) -> bool {
    (b <= 0x1F && b != b'\t' && b != b'\n' && b != b'\r') || b == 0x7F
}

// ---- the definition ledger ----

/// How a path came to exist, which decides what may happen to it next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Definition {
    /// A scalar or inline container is bound here; nothing may extend it.
    Value,
    /// Defined by a `[header]` line.
    ExplicitTable,
    /// Named only as a prefix of a later header.
    ImplicitHeader,
    /// Created as a prefix of a dotted key.
    ImplicitKey,
    /// Defined by one or more `[[header]]` lines. Its children describe the
    /// most recent element, so each append starts a fresh scope.
    ArrayOfTables,
}

/// A tree paralleling the document, recording the definition status of every
/// path touched. It exists only while parsing.
#[derive(Debug)]
struct LedgerNode {
    state: Definition,
    children: IndexMap<String, LedgerNode>,
}

impl LedgerNode {
    fn new(state: Definition) -> Self {
        LedgerNode {
            state,
            children: IndexMap::new(),
        }
    }

    fn table_root() -> Self {
        Self::new(Definition::ExplicitTable)
    }

    /// Records `[path]`. Prefix segments become implicit-by-header tables;
    /// the final segment must be new or promotable from implicit-by-header.
    fn open_header(&mut self, path: &[String], pos: usize) -> Result<()> {
        let Some((last, prefix)) = path.split_last() else {
            return Err(Error::parse("empty table header", pos));
        };
        let mut node = self;
        for (depth, segment) in prefix.iter().enumerate() {
            let child = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| LedgerNode::new(Definition::ImplicitHeader));
            if child.state == Definition::Value {
                return Err(Error::parse(
                    format!(
                        "key `{}` is already defined as a value and cannot be extended",
                        join_path(&path[..=depth])
                    ),
                    pos,
                ));
            }
            node = child;
        }
        match node.children.get_mut(last) {
            None => {
                node.children
                    .insert(last.clone(), LedgerNode::new(Definition::ExplicitTable));
                Ok(())
            }
            Some(child) => match child.state {
                Definition::ImplicitHeader => {
                    child.state = Definition::ExplicitTable;
                    Ok(())
                }
                Definition::ExplicitTable => Err(Error::parse(
                    format!("table `{}` is already defined", join_path(path)),
                    pos,
                )),
                Definition::ArrayOfTables => Err(Error::parse(
                    format!("`{}` is already an array of tables", join_path(path)),
                    pos,
                )),
                Definition::ImplicitKey => Err(Error::parse(
                    format!(
                        "table `{}` was created by a dotted key and cannot be redefined",
                        join_path(path)
                    ),
                    pos,
                )),
                Definition::Value => Err(Error::parse(
                    format!("key `{}` is already defined as a value", join_path(path)),
                    pos,
                )),
            },
        }
    }

    /// Records `[[path]]`. The final segment must be new or already an array
    /// of tables; appending resets the element scope.
    fn open_array_header(&mut self, path: &[String], pos: usize) -> Result<()> {
        let Some((last, prefix)) = path.split_last() else {
            return Err(Error::parse("empty table header", pos));
        };
        let mut node = self;
        for (depth, segment) in prefix.iter().enumerate() {
            let child = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| LedgerNode::new(Definition::ImplicitHeader));
            if child.state == Definition::Value {
                return Err(Error::parse(
                    format!(
                        "key `{}` is already defined as a value and cannot be extended",
                        join_path(&path[..=depth])
                    ),
                    pos,
                ));
            }
            node = child;
        }
        match node.children.get_mut(last) {
            None => {
                node.children
                    .insert(last.clone(), LedgerNode::new(Definition::ArrayOfTables));
                Ok(())
            }
            Some(child) => match child.state {
                Definition::ArrayOfTables => {
                    child.children.clear();
                    Ok(())
                }
                _ => Err(Error::parse(
                    format!(
                        "`{}` is already defined and is not an array of tables",
                        join_path(path)
                    ),
                    pos,
                )),
            },
        }
    }

    /// Records `header-path . dotted-key = value`. Dotted prefixes become
    /// implicit-by-key tables (demoting implicit-by-header ones), and the
    /// leaf must be entirely new.
    fn bind_key(&mut self, header: &[String], keys: &[String], pos: usize) -> Result<()> {
        let mut node = self;
        for segment in header {
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| LedgerNode::new(Definition::ImplicitHeader));
        }
        let Some((last, prefix)) = keys.split_last() else {
            return Err(Error::parse("empty key", pos));
        };
        for (depth, segment) in prefix.iter().enumerate() {
            let child = node
                .children
                .entry(segment.clone())
                .or_insert_with(|| LedgerNode::new(Definition::ImplicitKey));
            match child.state {
                Definition::Value => {
                    return Err(Error::parse(
                        format!(
                            "key `{}` is already defined as a value and cannot be extended",
                            join_full(header, &keys[..=depth])
                        ),
                        pos,
                    ));
                }
                Definition::ImplicitHeader => child.state = Definition::ImplicitKey,
                _ => {}
            }
            node = child;
        }
        if node.children.contains_key(last) {
            return Err(Error::parse(
                format!("duplicate key `{}`", join_full(header, keys)),
                pos,
            ));
        }
        node.children
            .insert(last.clone(), LedgerNode::new(Definition::Value));
        Ok(())
    }
}

fn join_path(path: &[String]) -> String {
    path.join(".")
}

fn join_full(header: &[String], keys: &[String]) -> String {
    header
        .iter()
        .chain(keys.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(".")
}

// ---- document construction ----

/// Walks one segment deeper. Passing through an array of tables descends
/// into its most recent element.
fn descend<'a>(slot: &'a mut Value, key: &str, pos: usize) -> Result<&'a mut Table> {
    match slot {
        Value::Table(table) => Ok(table),
        Value::Array(items) => match items.last_mut() {
            Some(Value::Table(table)) => Ok(table),
            _ => Err(Error::parse(format!("key `{key}` cannot be extended"), pos)),
        },
        _ => Err(Error::parse(format!("key `{key}` is not a table"), pos)),
    }
}

fn open_table<'a>(root: &'a mut Table, path: &[String], pos: usize) -> Result<&'a mut Table> {
    let mut current = root;
    for key in path {
        let slot = current.get_or_insert_with(key, || Value::Table(Table::new()));
        current = descend(slot, key, pos)?;
    }
    Ok(current)
}

/// Creates or finds the array at `path` and appends a fresh table to it.
fn open_array_element<'a>(
    root: &'a mut Table,
    path: &[String],
    pos: usize,
) -> Result<&'a mut Table> {
    let Some((last, prefix)) = path.split_last() else {
        return Err(Error::parse("empty table header", pos));
    };
    let parent = open_table(root, prefix, pos)?;
    match parent.get_or_insert_with(last, || Value::Array(Vec::new())) {
        Value::Array(items) => {
            items.push(Value::Table(Table::new()));
            match items.last_mut() {
                Some(Value::Table(table)) => Ok(table),
                _ => Err(Error::parse("array of tables in an inconsistent state", pos)),
            }
        }
        _ => Err(Error::parse(
            format!("`{}` is not an array of tables", join_path(path)),
            pos,
        )),
    }
}

fn insert_nested(table: &mut Table, keys: &[String], value: Value, pos: usize) -> Result<()> {
    let Some((last, prefix)) = keys.split_last() else {
        return Err(Error::parse("empty key", pos));
    };
    let mut current = table;
    for key in prefix {
        let slot = current.get_or_insert_with(key, || Value::Table(Table::new()));
        current = descend(slot, key, pos)?;
    }
    current.insert(last.clone(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Value> {
        parse_document(input)
    }

    #[test]
    fn ledger_rejects_header_after_dotted_key() {
        assert!(parse("a.b = 1\n[a]\n").is_err());
        // Extending the implicit table with a deeper header stays legal.
        assert!(parse("a.b = 1\n[a.c]\n").is_ok());
    }

    #[test]
    fn ledger_promotes_implicit_header_tables() {
        let doc = parse("[a.b]\nx = 1\n[a]\ny = 2\n").unwrap();
        assert_eq!(
            doc.get("a").and_then(|a| a.get("y")).and_then(Value::as_integer),
            Some(2)
        );
        // A second [a] is now an explicit redefinition.
        assert!(parse("[a.b]\n[a]\n[a]\n").is_err());
    }

    #[test]
    fn ledger_scopes_array_of_tables_elements() {
        let doc = parse("[[p]]\nn = 1\n[[p]]\nn = 2\n").unwrap();
        let p = doc.get("p").and_then(Value::as_array).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p[1].get("n").and_then(Value::as_integer), Some(2));
    }

    #[test]
    fn inline_tables_are_closed() {
        assert!(parse("a = { x = 1 }\na.y = 2\n").is_err());
        assert!(parse("a = { x = 1 }\n[a.y]\n").is_err());
        assert!(parse("a = { x = 1 }\n[[a]]\n").is_err());
    }

    #[test]
    fn inline_table_local_ledger() {
        assert!(parse("a = { b.c = 1, b.d = 2 }\n").is_ok());
        assert!(parse("a = { b = { c = 1 }, b.d = 2 }\n").is_err());
        assert!(parse("a = { b = 1, b = 2 }\n").is_err());
    }

    #[test]
    fn number_or_date_discrimination_rewinds() {
        let doc = parse("n = 1234\nt = 07:32:00\nd = 1979-05-27\n").unwrap();
        assert!(doc.get("n").unwrap().is_integer());
        assert!(doc.get("t").unwrap().is_datetime());
        assert!(doc.get("d").unwrap().is_datetime());
    }

    #[test]
    fn bare_carriage_return_is_not_a_newline() {
        assert!(parse("a = 1\rb = 2\n").is_err());
        assert!(parse("a = 1\r\nb = 2\n").is_ok());
    }

    #[test]
    fn datetime_errors_carry_the_token_position() {
        let err = parse("ok = 1\nt = 2001-02-29T00:00:00Z\n").unwrap_err();
        match err {
            Error::Parse { offset, .. } => assert_eq!(offset, 11),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
