//! Runtime values exchanged between field accessors and the codec.
//!
//! - [`ValueRef`]: a borrowed view produced by field getters while serializing
//! - [`Value`]: an owned value handed to field setters while reconstructing
//!
//! Both mirror the three field shapes: leaves, single composites, and collections,
//! plus `Null` for absent values.

use std::fmt;

use crate::Object;

/// An owned leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A borrowed leaf value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LeafRef<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

impl Leaf {
    /// Returns a short name of the variant for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Leaf::Bool(_) => "boolean",
            Leaf::Int(_) => "integer",
            Leaf::Float(_) => "float",
            Leaf::Str(_) => "string",
        }
    }

    #[must_use]
    pub fn borrowed(&self) -> LeafRef<'_> {
        match self {
            Leaf::Bool(b) => LeafRef::Bool(*b),
            Leaf::Int(i) => LeafRef::Int(*i),
            Leaf::Float(f) => LeafRef::Float(*f),
            Leaf::Str(s) => LeafRef::Str(s),
        }
    }
}

impl LeafRef<'_> {
    #[must_use]
    pub fn to_leaf(&self) -> Leaf {
        match *self {
            LeafRef::Bool(b) => Leaf::Bool(b),
            LeafRef::Int(i) => Leaf::Int(i),
            LeafRef::Float(f) => Leaf::Float(f),
            LeafRef::Str(s) => Leaf::Str(s.to_string()),
        }
    }
}

/// A borrowed view of a field's current value.
#[derive(Clone)]
pub enum ValueRef<'a> {
    Null,
    Leaf(LeafRef<'a>),
    Object(&'a dyn Object),
    List(Vec<ValueRef<'a>>),
}

/// An owned value ready to be assigned into a field.
pub enum Value {
    Null,
    Leaf(Leaf),
    Object(Box<dyn Object>),
    List(Vec<Value>),
}

impl Value {
    /// Returns a short name of the variant for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Leaf(leaf) => leaf.kind_name(),
            Value::Object(_) => "object",
            Value::List(_) => "array",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl ValueRef<'_> {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, ValueRef::Null)
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Null => f.write_str("Null"),
            ValueRef::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            ValueRef::Object(object) => f
                .debug_tuple("Object")
                .field(&object.object_type().name())
                .finish(),
            ValueRef::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Leaf(leaf) => fmt::Debug::fmt(leaf, f),
            Value::Object(object) => fmt::Debug::fmt(object, f),
            Value::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Leaf(Leaf::Bool(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Leaf(Leaf::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Leaf(Leaf::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Leaf(Leaf::Str(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Leaf(Leaf::Str(value))
    }
}
