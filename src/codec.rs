//! The codec facade.
//!
//! [`Codec`] binds the pieces a round trip needs: the [`TypeRegistry`] used to
//! resolve type tags, the [`InstanceFactory`] creating blank instances, the
//! [`SerializabilityPolicy`] selecting fields, and [`CodecOptions`].
//!
//! ## Examples
//!
//! ```rust
//! use cd_json::{composite, Codec, TypeRegistry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point { x: i32, y: i32 }
//! composite! { Point => "Point" { x: i32, y: i32 } }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>().unwrap();
//!
//! let codec = Codec::new(&registry);
//! let text = codec.serialize(&Point { x: 1, y: 2 }).unwrap();
//! let back: Point = codec.deserialize(&text).unwrap();
//! assert_eq!(back, Point { x: 1, y: 2 });
//! ```

use std::io;

use crate::de::Reconstructor;
use crate::info::TypeInfo;
use crate::introspect::{DefaultPolicy, SerializabilityPolicy};
use crate::materialize::Materializer;
use crate::node::Node;
use crate::object::{downcast_object, Dyn, Typed};
use crate::registry::{DefaultFactory, InstanceFactory, TypeRegistry};
use crate::ser::Serializer;
use crate::{CodecOptions, Error, Object, Result};

/// Serializes and reconstructs object graphs against a registry.
pub struct Codec<'r, F = DefaultFactory, P = DefaultPolicy> {
    registry: &'r TypeRegistry,
    factory: F,
    policy: P,
    options: CodecOptions,
}

impl<'r> Codec<'r> {
    /// Creates a codec with ordinary construction, the default policy and default options.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Codec {
            registry,
            factory: DefaultFactory,
            policy: DefaultPolicy,
            options: CodecOptions::default(),
        }
    }
}

impl<'r, F, P> Codec<'r, F, P>
where
    F: InstanceFactory,
    P: SerializabilityPolicy,
{
    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the instance factory, e.g. with a [`HostFactory`](crate::HostFactory).
    pub fn with_factory<G: InstanceFactory>(self, factory: G) -> Codec<'r, G, P> {
        Codec {
            registry: self.registry,
            factory,
            policy: self.policy,
            options: self.options,
        }
    }

    pub fn with_policy<Q: SerializabilityPolicy>(self, policy: Q) -> Codec<'r, F, Q> {
        Codec {
            registry: self.registry,
            factory: self.factory,
            policy,
            options: self.options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn serialize(&self, object: &dyn Object) -> Result<String> {
        self.serialize_opt(Some(object))
    }

    /// Serializes an optional root; `None` becomes `null`.
    pub fn serialize_opt(&self, object: Option<&dyn Object>) -> Result<String> {
        let mut serializer = Serializer::with_policy(self.options.clone(), &self.policy);
        serializer.serialize(object)?;
        Ok(serializer.into_inner())
    }

    pub fn serialize_to_writer<W: io::Write>(&self, mut writer: W, object: Option<&dyn Object>) -> Result<()> {
        let text = self.serialize_opt(object)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))
    }

    /// Reconstructs the untyped node tree of `text`.
    pub fn parse(&self, text: &str) -> Result<Node> {
        Reconstructor::from_str(text)
            .with_max_depth(self.options.max_depth)
            .reconstruct()
    }

    /// Reconstructs a `T`. A tagged derived type is sliced down to `T`; use
    /// [`deserialize_as`](Self::deserialize_as) to keep it.
    pub fn deserialize<T: Typed>(&self, text: &str) -> Result<T> {
        self.deserialize_opt(text)?
            .ok_or_else(|| Error::type_mismatch(T::type_info().name(), "null"))
    }

    /// Reconstructs an optional `T`; `null` yields `None`.
    pub fn deserialize_opt<T: Typed>(&self, text: &str) -> Result<Option<T>> {
        self.deserialize_dyn(T::type_info(), text)?
            .map(downcast_object::<T>)
            .transpose()
    }

    /// Reconstructs an instance of `target` or of a registered type derived from it.
    pub fn deserialize_dyn(&self, target: &'static TypeInfo, text: &str) -> Result<Option<Box<dyn Object>>> {
        let node = self.parse(text)?;
        Materializer::new(self.registry, &self.factory, &self.policy)
            .with_max_depth(self.options.max_depth)
            .materialize(node, target)
    }

    /// Reconstructs a `B` or derived instance, keeping its runtime type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::{composite, Codec, TypeRegistry};
    ///
    /// #[derive(Debug, Default)]
    /// struct Shape { label: String }
    /// composite! { Shape => "demo.Shape" { label: String } }
    ///
    /// #[derive(Debug, Default)]
    /// struct Circle { shape: Shape, radius: f64 }
    /// composite! { Circle => "demo.Circle" extends Shape [shape] { radius: f64 } }
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Shape>().unwrap();
    /// registry.register::<Circle>().unwrap();
    ///
    /// let text = r#"{"cd_json_type":"demo.Circle","radius":2.5,"label":"c"}"#;
    /// let shape = Codec::new(&registry).deserialize_as::<Shape>(text).unwrap().unwrap();
    /// assert_eq!(shape.downcast_ref::<Circle>().map(|c| c.radius), Some(2.5));
    /// ```
    pub fn deserialize_as<B: Typed>(&self, text: &str) -> Result<Option<Dyn<B>>> {
        self.deserialize_dyn(B::type_info(), text)?
            .map(Dyn::from_box)
            .transpose()
    }

    pub fn deserialize_from_reader<T: Typed, R: io::Read>(&self, mut reader: R) -> Result<T> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::io(&e.to_string()))?;
        self.deserialize(&text)
    }
}
