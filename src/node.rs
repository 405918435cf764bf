//! Intermediate tree produced by the reconstructor.
//!
//! A [`Node`] is the untyped shape of the input: objects keep their type tag apart
//! from their other properties, and properties stay in input order. The
//! [materializer](crate::materialize) turns a node tree into live objects.
//!
//! ## Examples
//!
//! ```rust
//! use cd_json::{parse, Node};
//!
//! let node = parse(r#"{"cd_json_type":"Point","x":1,"y":2}"#).unwrap();
//! let object = node.as_object().unwrap();
//! assert_eq!(object.type_tag(), Some("Point"));
//! assert_eq!(object.get("x"), Some(&Node::Int(1)));
//! ```

use indexmap::IndexMap;

/// A value in the reconstructed tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Node>),
    Object(ObjectNode),
}

impl Node {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a short name of the variant for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Int(_) => "integer",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }
}

impl From<ObjectNode> for Node {
    fn from(object: ObjectNode) -> Self {
        Node::Object(object)
    }
}

/// An object in the reconstructed tree.
///
/// Inserting an existing property name replaces its value but keeps its original
/// position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectNode {
    type_tag: Option<String>,
    properties: IndexMap<String, Node>,
}

impl ObjectNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of the `cd_json_type` property, if the input carried one.
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    pub fn set_type_tag(&mut self, tag: String) {
        self.type_tag = Some(tag);
    }

    pub fn insert(&mut self, name: String, value: Node) -> Option<Node> {
        self.properties.insert(name, value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.properties.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.properties.shift_remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates properties other than the type tag, in input order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.properties.iter()
    }

    #[must_use]
    pub fn into_parts(self) -> (Option<String>, IndexMap<String, Node>) {
        (self.type_tag, self.properties)
    }
}

impl IntoIterator for ObjectNode {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

impl<'a> IntoIterator for &'a ObjectNode {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}
