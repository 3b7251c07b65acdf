//! Error types for TOML parsing and value access.
//!
//! Every grammar or semantic violation surfaces as [`Error::Parse`] carrying a
//! message and the byte offset into the original input where the problem was
//! detected. Misusing the value API (for example asking a string for its
//! integer) surfaces as [`Error::Type`].
//!
//! ## Examples
//!
//! ```rust
//! use tomlet::Error;
//!
//! let result = tomlet::parse("a = 1\na = 2\n");
//! assert!(matches!(result, Err(Error::Parse { .. })));
//! ```

use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input violated the TOML grammar or one of its semantic rules.
    ///
    /// `offset` is a byte index into the original input. Translation to
    /// line/column is left to the caller.
    #[error("{msg}, position: {offset}")]
    Parse {
        /// Human-readable description of the violation.
        msg: String,
        /// Byte offset into the input where the violation was detected.
        offset: usize,
    },

    /// A value was accessed as a type it does not hold.
    #[error("type error: expected {expected}, found {found}")]
    Type {
        /// The type the caller asked for.
        expected: &'static str,
        /// The type the value actually holds.
        found: &'static str,
    },
}

impl Error {
    /// Creates a parse error at the given byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Error;
    ///
    /// let err = Error::parse("unexpected token", 12);
    /// assert!(err.to_string().contains("position: 12"));
    /// ```
    pub fn parse(msg: impl Into<String>, offset: usize) -> Self {
        Error::Parse {
            msg: msg.into(),
            offset,
        }
    }

    /// Creates a type mismatch error for a value accessed as the wrong type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Error::Type { expected, found }
    }

    /// Shifts a parse error's offset by `base` bytes.
    ///
    /// Sub-parsers report offsets relative to their own input; the document
    /// parser rebases them onto the full text.
    pub(crate) fn at_offset(self, base: usize) -> Self {
        match self {
            Error::Parse { msg, offset } => Error::Parse {
                msg,
                offset: offset + base,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
