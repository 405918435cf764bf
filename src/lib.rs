//! # cd_json
//!
//! A reflective object-graph codec with embedded type tags.
//!
//! ## What is it?
//!
//! `cd_json` writes graphs of plain Rust structs as JSON-shaped text in which every
//! object names its runtime type, and rebuilds live graphs from that text. A field
//! declared as a base type can hold a derived instance and still round-trip as the
//! derived type.
//!
//! ## Key Features
//!
//! - **Polymorphic round trips**: the `cd_json_type` tag records the runtime type
//! - **No reflection runtime**: the [`composite!`] macro generates static field tables
//! - **Tolerant reading**: unknown properties are skipped, unknown tags fall back to
//!   the requested type
//! - **Host integration**: host-managed types are created through an injected
//!   [`InstanceFactory`] and carry their display name as `m_Name`
//! - **No recursion on read**: nesting is tracked with an explicit frame stack
//!
//! ## Quick Start
//!
//! ```rust
//! use cd_json::{composite, from_str, to_string, TypeRegistry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Wrapper {
//!     label: String,
//!     points: Vec<Option<Box<Point>>>,
//! }
//!
//! composite! { Point => "Point" { x: i32, y: i32 } }
//! composite! { Wrapper => "Wrapper" { label: String, points: Vec<Option<Box<Point>>> } }
//!
//! let wrapper = Wrapper {
//!     label: "a".to_string(),
//!     points: vec![Some(Box::new(Point { x: 1, y: 2 })), None],
//! };
//!
//! let text = to_string(&wrapper).unwrap();
//! assert_eq!(
//!     text,
//!     r#"{"cd_json_type":"Wrapper","label":"a","points":[{"cd_json_type":"Point","x":1,"y":2},null]}"#
//! );
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>().unwrap();
//! registry.register::<Wrapper>().unwrap();
//!
//! let back: Wrapper = from_str(&registry, &text).unwrap();
//! assert_eq!(back, wrapper);
//! ```
//!
//! ### Polymorphic fields
//!
//! ```rust
//! use cd_json::{composite, from_str, to_string, Dyn, TypeRegistry};
//!
//! #[derive(Debug, Default)]
//! struct Shape { label: String }
//! composite! { Shape => "demo.Shape" { label: String } }
//!
//! #[derive(Debug, Default)]
//! struct Circle { shape: Shape, radius: f64 }
//! composite! { Circle => "demo.Circle" extends Shape [shape] { radius: f64 } }
//!
//! #[derive(Debug, Default)]
//! struct Scene { shapes: Vec<Dyn<Shape>> }
//! composite! { Scene => "demo.Scene" { shapes: Vec<Dyn<Shape>> } }
//!
//! let scene = Scene {
//!     shapes: vec![
//!         Dyn::new(Shape { label: "plain".into() }).unwrap(),
//!         Dyn::new(Circle { shape: Shape { label: "round".into() }, radius: 1.5 }).unwrap(),
//!     ],
//! };
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Shape>().unwrap();
//! registry.register::<Circle>().unwrap();
//! registry.register::<Scene>().unwrap();
//!
//! let back: Scene = from_str(&registry, &to_string(&scene).unwrap()).unwrap();
//! assert!(back.shapes[0].is::<Shape>());
//! assert_eq!(back.shapes[1].downcast_ref::<Circle>().map(|c| c.radius), Some(1.5));
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: skipped properties and type
//! registration at `debug`, fallbacks from unknown type tags at `warn`, and token
//! traces at `trace`. Install any logger to see them.
//!
//! ## Format Reference
//!
//! See the [`format`] module for the wire format.

pub mod codec;
pub mod de;
pub mod error;
pub mod field;
pub mod format;
pub mod info;
pub mod introspect;
pub mod lexer;
pub mod macros;
pub mod materialize;
pub mod node;
pub mod object;
pub mod options;
pub mod registry;
pub mod ser;
pub mod value;

pub use codec::Codec;
pub use de::Reconstructor;
pub use error::{Error, Result};
pub use field::{is_collection, is_leaf, Element, FieldValue};
pub use info::{
    BaseLink, ElementShape, FieldDescriptor, FieldShape, LeafKind, TypeInfo, NAME_PROPERTY, TYPE_TAG,
};
pub use introspect::{
    fields, find_field, DefaultPolicy, Field, IncludeTransient, PolicyFn, SerializabilityPolicy,
    INTERNAL_FIELDS,
};
pub use lexer::{classify, fragments, Fragment, TokenKind};
pub use materialize::Materializer;
pub use node::{Node, ObjectNode};
pub use object::{downcast_object, structural_eq, upcast_ref, Dyn, Object, Typed};
pub use options::{BoolStyle, CodecOptions, DEFAULT_MAX_DEPTH};
pub use registry::{
    Construction, DefaultFactory, HostFactory, InstanceFactory, Registration, TypeRegistry,
};
pub use ser::Serializer;
pub use value::{Leaf, LeafRef, Value, ValueRef};

use std::io;

/// Serialize an object graph to a compact string.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, to_string};
///
/// #[derive(Debug, Default)]
/// struct Point { x: i32, y: i32 }
/// composite! { Point => "Point" { x: i32, y: i32 } }
///
/// let text = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, r#"{"cd_json_type":"Point","x":1,"y":2}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the graph nests deeper than the default depth limit or
/// contains arrays of arrays.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(value: &dyn Object) -> Result<String> {
    to_string_with_options(value, CodecOptions::default())
}

/// Serialize an object graph to an indented string.
///
/// # Errors
///
/// Returns an error if the graph cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty(value: &dyn Object) -> Result<String> {
    to_string_with_options(value, CodecOptions::pretty())
}

/// Serialize an object graph with custom options.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, to_string_with_options, BoolStyle, CodecOptions};
///
/// #[derive(Debug, Default)]
/// struct Flags { on: bool }
/// composite! { Flags => "Flags" { on: bool } }
///
/// let options = CodecOptions::new().with_bool_style(BoolStyle::Sentinel);
/// let text = to_string_with_options(&Flags { on: true }, options).unwrap();
/// assert_eq!(text, r#"{"cd_json_type":"Flags","on":"TRUE"}"#);
/// ```
///
/// # Errors
///
/// Returns an error if the graph cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(value: &dyn Object, options: CodecOptions) -> Result<String> {
    let mut serializer = Serializer::new(options);
    serializer.serialize(Some(value))?;
    Ok(serializer.into_inner())
}

/// Serialize an object graph to a writer.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, value: &dyn Object) -> Result<()>
where
    W: io::Write,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Reconstruct a `T` from text, resolving type tags through `registry`.
///
/// # Errors
///
/// Returns an error if the text is malformed, a tag cannot be used for its field, an
/// instance cannot be created, or a value does not fit its field. Error messages
/// include line and column information or the path of the failing field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Typed>(registry: &TypeRegistry, s: &str) -> Result<T> {
    Codec::new(registry).deserialize(s)
}

/// Reconstruct an instance of `target` or of a registered type derived from it.
///
/// Returns `None` for a `null` root.
///
/// # Errors
///
/// Returns an error under the same conditions as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_dyn(
    registry: &TypeRegistry,
    target: &'static TypeInfo,
    s: &str,
) -> Result<Option<Box<dyn Object>>> {
    Codec::new(registry).deserialize_dyn(target, s)
}

/// Reconstruct a `T` from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, from_reader, TypeRegistry};
/// use std::io::Cursor;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point { x: i32, y: i32 }
/// composite! { Point => "Point" { x: i32, y: i32 } }
///
/// let registry = TypeRegistry::new();
/// let cursor = Cursor::new(br#"{"cd_json_type":"Point","x":1,"y":2}"#);
/// let point: Point = from_reader(&registry, cursor).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or under the same conditions as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(registry: &TypeRegistry, reader: R) -> Result<T>
where
    R: io::Read,
    T: Typed,
{
    Codec::new(registry).deserialize_from_reader(reader)
}

/// Reconstruct the untyped node tree of `s`.
///
/// # Errors
///
/// Returns an error if the text is malformed or nests deeper than the default limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(s: &str) -> Result<Node> {
    Reconstructor::from_str(s).reconstruct()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    crate::composite! {
        Point => "Point" { x: i32, y: i32 }
    }

    #[derive(Debug, Default, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        home: Option<Box<Point>>,
    }

    crate::composite! {
        User => "User" { id: u32, name: String, active: bool, tags: Vec<String>, home: Option<Box<Point>> }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>().unwrap();
        registry.register::<User>().unwrap();
        registry
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            home: Some(Box::new(Point { x: -4, y: 9 })),
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        let point_back: Point = from_str(&registry(), &text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&user()).unwrap();
        let user_back: User = from_str(&registry(), &text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_pretty_printing() {
        let text = to_string_pretty(&user()).unwrap();
        assert!(text.contains("\n  \"tags\": [\n    \"admin\",\n    \"user\"\n  ],"));
        let user_back: User = from_str(&registry(), &text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_from_str_dyn() {
        let object = from_str_dyn(&registry(), Point::type_info(), r#"{"x":5}"#)
            .unwrap()
            .unwrap();
        assert_eq!(upcast_ref::<Point>(&*object), Some(&Point { x: 5, y: 0 }));
    }

    #[test]
    fn test_to_writer() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
        assert_eq!(buffer, br#"{"cd_json_type":"Point","x":1,"y":2}"#);
    }
}
