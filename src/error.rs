//! Error types for encoding and reconstructing object graphs.
//!
//! ## Error Categories
//!
//! - **Format errors**: the text is not a well-formed token stream (unmatched
//!   delimiters, stray commas, trailing content), reported with line/column
//! - **Type resolution errors**: a type tag names a type that cannot be used for the
//!   requested target and no fallback applies
//! - **Instantiation errors**: the instance factory could not produce a blank instance
//! - **Unsupported shapes**: arrays of arrays, or nesting beyond the configured depth
//! - **Type mismatches**: a wire value does not fit the field it is assigned to
//!
//! Unknown property names are *not* errors: the reconstructor skips them so older
//! and newer versions of a type can read each other's output.
//!
//! ## Examples
//!
//! ```rust
//! use cd_json::{parse, Error};
//!
//! let result = parse("{\"cd_json_type\": \"Point\", \"x\": 1");
//! assert!(matches!(result, Err(Error::Format { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or reconstructing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed token stream
    #[error("Format error at line {line}, column {col}: {msg}")]
    Format { line: usize, col: usize, msg: String },

    /// A type tag could not be turned into a usable concrete type
    #[error("Cannot resolve type {tag:?} for target {expected}: {msg}")]
    TypeResolution {
        tag: Option<String>,
        expected: String,
        msg: String,
    },

    /// The instance factory failed to create a blank instance
    #[error("Failed to create an instance of type {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },

    /// Graph shape the codec does not support
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// A value does not fit its destination
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// An error raised while assigning a specific field
    #[error("In field {type_name}.{field}: {source}")]
    InField {
        type_name: String,
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// A type declares a field under a reserved property name
    #[error("Type {type_name} declares field {field:?}, which is a reserved property name")]
    ReservedName { type_name: String, field: String },

    /// Two distinct types registered under the same name
    #[error("A different type is already registered as {0:?}")]
    DuplicateType(String),

    /// Failure raised by user code, e.g. an [`InstanceFactory`](crate::InstanceFactory)
    /// implementation that cannot provide an instance
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a format error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::Error;
    ///
    /// let err = Error::format(3, 7, "unexpected ','");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn format(line: usize, col: usize, msg: &str) -> Self {
        Error::Format {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a type resolution error.
    pub fn type_resolution(tag: Option<&str>, expected: &str, msg: &str) -> Self {
        Error::TypeResolution {
            tag: tag.map(str::to_string),
            expected: expected.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an instantiation error.
    pub fn instantiation(type_name: &str, reason: &str) -> Self {
        Error::Instantiation {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported_shape(msg: &str) -> Self {
        Error::UnsupportedShape(msg.to_string())
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Wraps this error with the field it occurred in.
    pub fn in_field(self, type_name: &str, field: &str) -> Self {
        Error::InField {
            type_name: type_name.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the innermost error, looking through [`Error::InField`] wrappers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::Error;
    ///
    /// let err = Error::type_mismatch("bool", "string").in_field("demo.Flags", "enabled");
    /// assert!(matches!(err.root_cause(), Error::TypeMismatch { .. }));
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::InField { source, .. } = current {
            current = source;
        }
        current
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_field_message_names_path() {
        let err = Error::type_mismatch("integer", "string")
            .in_field("demo.Point", "x")
            .in_field("demo.Wrapper", "origin");
        let text = err.to_string();
        assert!(text.starts_with("In field demo.Wrapper.origin"));
        assert!(text.contains("demo.Point.x"));
        assert!(matches!(err.root_cause(), Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_type_resolution_message() {
        let err = Error::type_resolution(Some("demo.Gone"), "demo.Shape", "type is abstract");
        assert!(err.to_string().contains("demo.Gone"));
        assert!(err.to_string().contains("demo.Shape"));
    }
}
