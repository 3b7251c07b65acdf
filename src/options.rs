//! Output configuration for serialization.
//!
//! [`StringifyOptions`] selects the output [`Format`] and, for JSON and YAML,
//! the indentation width.
//!
//! ## Examples
//!
//! ```rust
//! use tomlet::{to_string_with_options, toml, StringifyOptions};
//!
//! let doc = toml!({ "a": 1 });
//!
//! // Minified JSON
//! let json = to_string_with_options(&doc, StringifyOptions::json());
//!
//! // Pretty JSON, four spaces per level
//! let pretty = to_string_with_options(&doc, StringifyOptions::json().with_indent(4));
//!
//! // Block-style YAML
//! let yaml = to_string_with_options(&doc, StringifyOptions::yaml());
//! assert_eq!(yaml, "a: 1");
//! ```

/// The serialization target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// TOML text, with `[table]` and `[[array-of-tables]]` sections.
    #[default]
    Toml,
    /// JSON; minified at indent 0, pretty-printed otherwise.
    Json,
    /// Block-style YAML.
    Yaml,
}

/// Options controlling [`to_string_with_options`](crate::to_string_with_options).
///
/// `indent` is the number of spaces per nesting level. It only affects JSON
/// and YAML output; TOML output has a fixed layout.
#[derive(Debug, Clone, Copy)]
pub struct StringifyOptions {
    pub format: Format,
    pub indent: usize,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            format: Format::Toml,
            indent: 0,
        }
    }
}

impl StringifyOptions {
    /// TOML output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minified JSON output. Chain [`with_indent`](Self::with_indent) for
    /// pretty printing.
    #[must_use]
    pub fn json() -> Self {
        StringifyOptions {
            format: Format::Json,
            indent: 0,
        }
    }

    /// Block-style YAML output with two-space indentation.
    #[must_use]
    pub fn yaml() -> Self {
        StringifyOptions {
            format: Format::Yaml,
            indent: 2,
        }
    }

    /// Sets the target format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets the number of spaces per indentation level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
