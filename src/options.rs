//! Configuration options for the codec.
//!
//! - [`CodecOptions`]: main configuration struct
//! - [`BoolStyle`]: how boolean leaves are written
//!
//! With the `serde` feature enabled both types implement `Serialize` and
//! `Deserialize`, so a host can keep them in its own configuration files.
//!
//! ## Examples
//!
//! ```rust
//! use cd_json::{BoolStyle, CodecOptions};
//!
//! let options = CodecOptions::pretty()
//!     .with_indent(4)
//!     .with_bool_style(BoolStyle::Sentinel);
//! assert!(options.pretty);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default nesting limit for serialization and reconstruction.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How boolean leaves appear on the wire.
///
/// Decoding always accepts both forms, so the choice only affects output.
///
/// # Examples
///
/// ```rust
/// use cd_json::BoolStyle;
///
/// assert_eq!(BoolStyle::Literal.encode(true), "true");
/// assert_eq!(BoolStyle::Sentinel.encode(false), "\"FALSE\"");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoolStyle {
    /// Bare `true` / `false`
    #[default]
    Literal,
    /// Quoted `"TRUE"` / `"FALSE"`
    Sentinel,
}

impl BoolStyle {
    /// Returns the encoded form of `value` in this style.
    #[must_use]
    pub const fn encode(self, value: bool) -> &'static str {
        match (self, value) {
            (BoolStyle::Literal, true) => "true",
            (BoolStyle::Literal, false) => "false",
            (BoolStyle::Sentinel, true) => "\"TRUE\"",
            (BoolStyle::Sentinel, false) => "\"FALSE\"",
        }
    }
}

/// Configuration options for serialization and reconstruction.
///
/// # Examples
///
/// ```rust
/// use cd_json::CodecOptions;
///
/// // Default compact options
/// let options = CodecOptions::new();
/// assert!(!options.pretty);
///
/// // Pretty-printed with 2-space indentation
/// let options = CodecOptions::pretty();
/// assert_eq!(options.indent, 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecOptions {
    pub pretty: bool,
    pub indent: usize,
    pub bool_style: BoolStyle,
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            pretty: false,
            indent: 2,
            bool_style: BoolStyle::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecOptions {
    /// Creates default options (compact output, literal booleans).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for output with newlines and indentation.
    #[must_use]
    pub fn pretty() -> Self {
        CodecOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets how boolean leaves are written.
    #[must_use]
    pub fn with_bool_style(mut self, bool_style: BoolStyle) -> Self {
        self.bool_style = bool_style;
        self
    }

    /// Sets the maximum nesting depth accepted when writing or reading.
    ///
    /// Objects and arrays each count as one level.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::CodecOptions;
    ///
    /// let options = CodecOptions::new().with_max_depth(8);
    /// assert_eq!(options.max_depth, 8);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
