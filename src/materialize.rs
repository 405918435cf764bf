//! Node tree to live objects.
//!
//! For every object node the [`Materializer`]:
//!
//! 1. resolves the concrete type from the node's type tag and the statically
//!    requested type,
//! 2. asks the [`InstanceFactory`] for a blank instance, passing the registered
//!    construction strategy and the `m_Name` display name,
//! 3. assigns each property to the field of the same name, decoding it according to
//!    the field's shape. Properties without a matching field are skipped.
//!
//! Errors raised while assigning a field are wrapped with the field's name, so a
//! failure deep in a graph reads as a path.

use crate::info::{ElementShape, FieldShape, TypeInfo, NAME_PROPERTY};
use crate::introspect::{find_field, SerializabilityPolicy};
use crate::node::{Node, ObjectNode};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::registry::{InstanceFactory, TypeRegistry};
use crate::value::{Leaf, Value};
use crate::{Error, Object, Result};

/// Builds objects from reconstructed nodes.
pub struct Materializer<'a, F: ?Sized, P: ?Sized> {
    registry: &'a TypeRegistry,
    factory: &'a F,
    policy: &'a P,
    max_depth: usize,
}

impl<'a, F, P> Materializer<'a, F, P>
where
    F: InstanceFactory + ?Sized,
    P: SerializabilityPolicy + ?Sized,
{
    pub fn new(registry: &'a TypeRegistry, factory: &'a F, policy: &'a P) -> Self {
        Materializer {
            registry,
            factory,
            policy,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Materializes a root node as an instance of `target` or a type derived from it.
    ///
    /// A `null` root yields `None`.
    pub fn materialize(&self, node: Node, target: &'static TypeInfo) -> Result<Option<Box<dyn Object>>> {
        match node {
            Node::Null => Ok(None),
            Node::Object(object) => self.object(object, target, 1).map(Some),
            other => Err(Error::type_mismatch(target.name(), other.kind_name())),
        }
    }

    /// Picks the concrete type for an object node requested as `target`.
    ///
    /// A registered tag naming `target` or a type derived from it wins. An unknown tag
    /// falls back to `target`; a known tag naming an unrelated type is an error, and
    /// so is falling back to an abstract `target`.
    pub fn resolve_type(&self, tag: Option<&str>, target: &'static TypeInfo) -> Result<&'static TypeInfo> {
        if let Some(tag) = tag {
            match self.registry.resolve(tag) {
                Some(registration) if registration.info().is_assignable_to(target) => {
                    log::trace!("resolved {tag} for {}", target.name());
                    return Ok(registration.info());
                }
                Some(_) => {
                    return Err(Error::type_resolution(
                        Some(tag),
                        target.name(),
                        "tagged type is not assignable to the target",
                    ));
                }
                None if tag == target.name() => {}
                None => log::warn!("unknown type tag {tag:?}, falling back to {}", target.name()),
            }
        }
        if target.is_abstract() {
            return Err(Error::type_resolution(
                tag,
                target.name(),
                "target is abstract and no usable type tag was given",
            ));
        }
        Ok(target)
    }

    fn object(&self, node: ObjectNode, target: &'static TypeInfo, depth: usize) -> Result<Box<dyn Object>> {
        if depth > self.max_depth {
            return Err(Error::unsupported_shape(&format!(
                "nesting deeper than {} levels",
                self.max_depth
            )));
        }
        let (tag, mut properties) = node.into_parts();
        let resolved = self.resolve_type(tag.as_deref(), target)?;

        let display_name = match properties.shift_remove(NAME_PROPERTY) {
            Some(Node::Str(name)) => Some(name),
            _ => None,
        };
        let construction = self.registry.construction_of(resolved);
        let mut object = self
            .factory
            .create_blank(resolved, construction, display_name.as_deref())?;
        if object.object_type() != resolved {
            return Err(Error::instantiation(
                resolved.name(),
                &format!("factory returned an instance of {}", object.object_type().name()),
            ));
        }

        for (name, node) in properties {
            let Some(field) = find_field(resolved, &name, self.policy) else {
                log::debug!("skipping unknown property {name:?} of {}", resolved.name());
                continue;
            };
            self.value(node, field.shape(), depth)
                .and_then(|value| field.set(object.as_any_mut(), value))
                .map_err(|e| e.in_field(resolved.name(), &name))?;
        }
        Ok(object)
    }

    fn value(&self, node: Node, shape: FieldShape, depth: usize) -> Result<Value> {
        match (shape, node) {
            (_, Node::Null) => Ok(Value::Null),
            (FieldShape::Collection(_), Node::Array(_)) if depth >= self.max_depth => Err(
                Error::unsupported_shape(&format!("nesting deeper than {} levels", self.max_depth)),
            ),
            (FieldShape::Leaf(kind), node) => leaf(node, kind.name()),
            (FieldShape::Composite(info), Node::Object(object)) => {
                self.object(object, info(), depth + 1).map(Value::Object)
            }
            (FieldShape::Composite(info), other) => {
                Err(Error::type_mismatch(info().name(), other.kind_name()))
            }
            (FieldShape::Collection(element), Node::Array(items)) => items
                .into_iter()
                .map(|item| self.element(item, element, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (FieldShape::Collection(_), other) => Err(Error::type_mismatch("array", other.kind_name())),
        }
    }

    fn element(&self, node: Node, shape: ElementShape, depth: usize) -> Result<Value> {
        match (shape, node) {
            (_, Node::Null) => Ok(Value::Null),
            (_, Node::Array(_)) => Err(Error::unsupported_shape("arrays of arrays")),
            (ElementShape::Leaf(kind), node) => leaf(node, kind.name()),
            (ElementShape::Composite(info), Node::Object(object)) => {
                self.object(object, info(), depth + 1).map(Value::Object)
            }
            (ElementShape::Composite(info), other) => {
                Err(Error::type_mismatch(info().name(), other.kind_name()))
            }
        }
    }
}

/// Converts a leaf node; numeric and sentinel coercions happen in the field setter.
fn leaf(node: Node, expected: &str) -> Result<Value> {
    let leaf = match node {
        Node::Bool(b) => Leaf::Bool(b),
        Node::Int(i) => Leaf::Int(i),
        Node::Float(f) => Leaf::Float(f),
        Node::Str(s) => Leaf::Str(s),
        Node::Null => return Ok(Value::Null),
        other => return Err(Error::type_mismatch(expected, other.kind_name())),
    };
    Ok(Value::Leaf(leaf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::DefaultPolicy;
    use crate::object::downcast_object;
    use crate::registry::DefaultFactory;
    use crate::{Reconstructor, Typed};

    #[derive(Debug, Default)]
    struct Animal {
        legs: i32,
    }

    crate::composite! {
        Animal => "test.Animal" { legs: i32 }
    }

    #[derive(Debug, Default)]
    struct Dog {
        animal: Animal,
        good: bool,
    }

    crate::composite! {
        Dog => "test.Dog" extends Animal [animal] { good: bool }
    }

    #[derive(Debug, Default)]
    struct Rock {
        weight: f64,
    }

    crate::composite! {
        Rock => "test.Rock" { weight: f64 }
    }

    #[derive(Debug)]
    struct Abstract {
        id: i32,
    }

    crate::composite! {
        abstract Abstract => "test.Abstract" { id: i32 }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Animal>().unwrap();
        registry.register::<Dog>().unwrap();
        registry.register::<Rock>().unwrap();
        registry
    }

    fn build(registry: &TypeRegistry, text: &str, target: &'static TypeInfo) -> Result<Option<Box<dyn Object>>> {
        let node = Reconstructor::from_str(text).reconstruct()?;
        Materializer::new(registry, &DefaultFactory, &DefaultPolicy).materialize(node, target)
    }

    #[test]
    fn test_tag_selects_derived_type() {
        let registry = registry();
        let object = build(
            &registry,
            r#"{"cd_json_type":"test.Dog","good":true,"legs":4}"#,
            Animal::type_info(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(object.object_type().name(), "test.Dog");
        let dog = downcast_object::<Dog>(object).unwrap();
        assert!(dog.good);
        assert_eq!(dog.animal.legs, 4);
    }

    #[test]
    fn test_unknown_tag_falls_back() {
        let registry = registry();
        let object = build(&registry, r#"{"cd_json_type":"gone.Type","legs":2}"#, Animal::type_info())
            .unwrap()
            .unwrap();
        assert_eq!(object.object_type().name(), "test.Animal");
    }

    #[test]
    fn test_unrelated_tag_is_error() {
        let registry = registry();
        let err = build(&registry, r#"{"cd_json_type":"test.Rock"}"#, Animal::type_info()).unwrap_err();
        assert!(matches!(err, Error::TypeResolution { tag: Some(tag), .. } if tag == "test.Rock"));
    }

    #[test]
    fn test_abstract_target_without_tag() {
        let registry = registry();
        let err = build(&registry, r#"{"id":1}"#, Abstract::type_info()).unwrap_err();
        assert!(matches!(err, Error::TypeResolution { tag: None, .. }));
    }

    #[test]
    fn test_unknown_properties_skipped() {
        let registry = registry();
        let object = build(&registry, r#"{"legs":3,"tail":{"x":[1,2]},"m_Name":"rex"}"#, Animal::type_info())
            .unwrap()
            .unwrap();
        assert_eq!(downcast_object::<Animal>(object).unwrap().legs, 3);
    }

    #[test]
    fn test_mismatch_names_the_field() {
        let registry = registry();
        let err = build(&registry, r#"{"legs":"four"}"#, Animal::type_info()).unwrap_err();
        match err {
            Error::InField { type_name, field, source } => {
                assert_eq!(type_name, "test.Animal");
                assert_eq!(field, "legs");
                assert!(matches!(*source, Error::TypeMismatch { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_null_root_and_non_object_root() {
        let registry = registry();
        assert!(build(&registry, "null", Animal::type_info()).unwrap().is_none());
        assert!(matches!(
            build(&registry, "[1]", Animal::type_info()),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
