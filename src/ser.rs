//! Object graph serialization.
//!
//! This module provides the [`Serializer`] that walks an object graph and writes
//! the tagged wire format.
//!
//! ## Overview
//!
//! - Every composite opens with its `cd_json_type` property naming the *runtime*
//!   type, so a field declared as a base type round-trips as the derived type.
//! - Host-managed objects reporting a display name carry it as `m_Name`.
//! - Fields follow in introspection order: own fields, then ancestors' fields.
//! - Absent values are `null`; an absent collection is `null` while an empty one
//!   is `[]`.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use cd_json::{composite, to_string, to_string_pretty};
//!
//! #[derive(Debug, Default)]
//! struct Point { x: i32, y: i32 }
//! composite! { Point => "Point" { x: i32, y: i32 } }
//!
//! let point = Point { x: 1, y: 2 };
//! assert_eq!(to_string(&point).unwrap(), r#"{"cd_json_type":"Point","x":1,"y":2}"#);
//!
//! let pretty = to_string_pretty(&point).unwrap();
//! assert!(pretty.starts_with("{\n  \"cd_json_type\": \"Point\","));
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use cd_json::{CodecOptions, Serializer};
//!
//! let mut serializer = Serializer::new(CodecOptions::new());
//! serializer.serialize(None).unwrap();
//! assert_eq!(serializer.into_inner(), "null");
//! ```

use crate::info::{NAME_PROPERTY, TYPE_TAG};
use crate::introspect::{fields, DefaultPolicy, SerializabilityPolicy};
use crate::value::{LeafRef, ValueRef};
use crate::{CodecOptions, Error, Object, Result};

/// The object graph serializer.
///
/// Created via [`Serializer::new`], or [`Serializer::with_policy`] to choose which
/// fields are written.
pub struct Serializer<'p, P: ?Sized = DefaultPolicy> {
    output: String,
    options: CodecOptions,
    policy: &'p P,
    depth: usize,
    indent_level: usize,
}

impl Serializer<'static, DefaultPolicy> {
    pub fn new(options: CodecOptions) -> Self {
        Serializer::with_policy(options, &DefaultPolicy)
    }
}

impl<'p, P: SerializabilityPolicy + ?Sized> Serializer<'p, P> {
    pub fn with_policy(options: CodecOptions, policy: &'p P) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            policy,
            depth: 0,
            indent_level: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes a root value; `None` becomes `null`.
    pub fn serialize(&mut self, value: Option<&dyn Object>) -> Result<()> {
        match value {
            Some(object) => self.write_object(object),
            None => {
                self.output.push_str("null");
                Ok(())
            }
        }
    }

    fn write_newline(&mut self) {
        if self.options.pretty {
            self.output.push('\n');
            let width = self.indent_level * self.options.indent;
            self.output.extend(std::iter::repeat(' ').take(width));
        }
    }

    /// Starts an object property or array element.
    fn begin_entry(&mut self, first: bool) {
        if !first {
            self.output.push(',');
        }
        self.write_newline();
    }

    fn write_key(&mut self, name: &str) {
        self.write_string(name);
        self.output.push(':');
        if self.options.pretty {
            self.output.push(' ');
        }
    }

    #[inline]
    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if u32::from(c) < 0x20 => {
                    self.output.push_str(&format!("\\u{:04x}", u32::from(c)));
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn write_float(&mut self, value: f64) {
        if value.is_nan() {
            self.write_string("NaN");
        } else if value.is_infinite() {
            self.write_string(if value > 0.0 { "Infinity" } else { "-Infinity" });
        } else {
            self.output.push_str(&format!("{value:?}"));
        }
    }

    fn write_leaf(&mut self, leaf: LeafRef<'_>) {
        match leaf {
            LeafRef::Bool(b) => self.output.push_str(self.options.bool_style.encode(b)),
            LeafRef::Int(i) => self.output.push_str(&i.to_string()),
            LeafRef::Float(f) => self.write_float(f),
            LeafRef::Str(s) => self.write_string(s),
        }
    }

    /// Opens an object or array scope.
    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::unsupported_shape(&format!(
                "nesting deeper than {} levels",
                self.options.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn write_object(&mut self, object: &dyn Object) -> Result<()> {
        self.enter()?;
        let ty = object.object_type();

        self.output.push('{');
        self.indent_level += 1;
        self.begin_entry(true);
        self.write_key(TYPE_TAG);
        self.write_string(ty.name());

        if let Some(name) = object.display_name() {
            self.begin_entry(false);
            self.write_key(NAME_PROPERTY);
            self.write_string(name);
        }

        for field in fields(ty, self.policy) {
            let value = field
                .get(object.as_any())
                .ok_or_else(|| Error::type_mismatch(ty.name(), "unrelated instance"))?;
            self.begin_entry(false);
            self.write_key(field.name());
            self.write_value(&value, false)
                .map_err(|e| e.in_field(ty.name(), field.name()))?;
        }

        self.indent_level -= 1;
        self.write_newline();
        self.output.push('}');
        self.depth -= 1;
        Ok(())
    }

    fn write_value(&mut self, value: &ValueRef<'_>, in_array: bool) -> Result<()> {
        match value {
            ValueRef::Null => self.output.push_str("null"),
            ValueRef::Leaf(leaf) => self.write_leaf(*leaf),
            ValueRef::Object(object) => self.write_object(*object)?,
            ValueRef::List(_) if in_array => {
                return Err(Error::unsupported_shape("arrays of arrays"));
            }
            ValueRef::List(items) => {
                self.enter()?;
                if items.is_empty() {
                    self.output.push_str("[]");
                } else {
                    self.output.push('[');
                    self.indent_level += 1;
                    for (i, item) in items.iter().enumerate() {
                        self.begin_entry(i == 0);
                        self.write_value(item, true)?;
                    }
                    self.indent_level -= 1;
                    self.write_newline();
                    self.output.push(']');
                }
                self.depth -= 1;
            }
        }
        Ok(())
    }
}
