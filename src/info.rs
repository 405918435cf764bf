//! Static type descriptions.
//!
//! Every composite type carries a [`TypeInfo`]: its fully-qualified name, an ordered
//! table of [`FieldDescriptor`]s for the fields it declares itself, an optional
//! [`BaseLink`] to the type it extends, and a constructor for blank instances.
//! The tables are normally generated by [`composite!`](crate::composite), never
//! discovered at runtime.
//!
//! Inheritance is expressed by embedding: a derived struct owns its base struct in a
//! field, and the base link knows how to reach that field. Ancestor field
//! descriptors are applied to a derived instance by upcasting through the chain.

use std::any::Any;
use std::fmt;

use crate::value::{Value, ValueRef};
use crate::{Object, Result};

/// Reserved property holding the runtime type name of a serialized composite.
pub const TYPE_TAG: &str = "cd_json_type";

/// Reserved property holding the display name of a host-managed object.
pub const NAME_PROPERTY: &str = "m_Name";

/// The four kinds of atomic values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Bool,
    Int,
    Float,
    Str,
}

impl LeafKind {
    /// Returns a short human-readable name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LeafKind::Bool => "boolean",
            LeafKind::Int => "integer",
            LeafKind::Float => "float",
            LeafKind::Str => "string",
        }
    }
}

/// Shape of a collection element. Elements are never collections themselves.
#[derive(Clone, Copy)]
pub enum ElementShape {
    Leaf(LeafKind),
    Composite(fn() -> &'static TypeInfo),
}

/// Shape of a field as seen by the codec.
///
/// # Examples
///
/// ```rust
/// use cd_json::{FieldShape, FieldValue, LeafKind};
///
/// assert!(matches!(<i32 as FieldValue>::shape(), FieldShape::Leaf(LeafKind::Int)));
/// assert!(<Option<Vec<String>> as FieldValue>::shape().is_collection());
/// ```
#[derive(Clone, Copy)]
pub enum FieldShape {
    Leaf(LeafKind),
    Composite(fn() -> &'static TypeInfo),
    Collection(ElementShape),
}

impl FieldShape {
    /// `true` for boolean, integer, floating-point and string fields.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, FieldShape::Leaf(_))
    }

    /// `true` for ordered homogeneous sequences of a single element type.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, FieldShape::Collection(_))
    }

    /// `true` for single nested objects.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, FieldShape::Composite(_))
    }

    /// Returns a description of the declared type, e.g. `integer` or `[demo.Point]`.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            FieldShape::Leaf(kind) => kind.name().to_string(),
            FieldShape::Composite(info) => info().name().to_string(),
            FieldShape::Collection(element) => format!("[{}]", element.type_name()),
        }
    }
}

impl ElementShape {
    /// Returns a description of the element type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementShape::Leaf(kind) => kind.name(),
            ElementShape::Composite(info) => info().name(),
        }
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldShape::Leaf(kind) => f.debug_tuple("Leaf").field(kind).finish(),
            FieldShape::Composite(info) => f.debug_tuple("Composite").field(&info().name()).finish(),
            FieldShape::Collection(element) => f.debug_tuple("Collection").field(element).finish(),
        }
    }
}

impl fmt::Debug for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementShape::Leaf(kind) => f.debug_tuple("Leaf").field(kind).finish(),
            ElementShape::Composite(info) => f.debug_tuple("Composite").field(&info().name()).finish(),
        }
    }
}

/// Reads a field from an instance of the declaring type.
pub type FieldGetter = for<'a> fn(&'a dyn Any) -> Option<ValueRef<'a>>;

/// Writes a decoded value into a field of an instance of the declaring type.
pub type FieldSetter = fn(&mut dyn Any, Value) -> Result<()>;

/// One entry of a type's field table.
///
/// Accessors take the *declaring* type as `dyn Any`; callers holding a derived
/// instance go through [`Field`](crate::introspect::Field), which upcasts first.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    name: &'static str,
    shape: fn() -> FieldShape,
    get: FieldGetter,
    set: FieldSetter,
    serializable: bool,
}

impl FieldDescriptor {
    pub const fn new(
        name: &'static str,
        shape: fn() -> FieldShape,
        get: FieldGetter,
        set: FieldSetter,
    ) -> Self {
        FieldDescriptor {
            name,
            shape,
            get,
            set,
            serializable: true,
        }
    }

    /// Marks the field as excluded by the default serializability policy.
    #[must_use]
    pub const fn transient(mut self) -> Self {
        self.serializable = false;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn shape(&self) -> FieldShape {
        (self.shape)()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.shape().is_leaf()
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.shape().is_collection()
    }

    /// `false` for fields declared `transient`.
    #[must_use]
    pub const fn is_serializable(&self) -> bool {
        self.serializable
    }

    /// Reads the field; `None` if `instance` is not of the declaring type.
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Option<ValueRef<'a>> {
        (self.get)(instance)
    }

    pub fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        (self.set)(instance, value)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape())
            .field("serializable", &self.serializable)
            .finish()
    }
}

/// Connects a derived type to the base type it embeds.
#[derive(Clone, Copy)]
pub struct BaseLink {
    info: fn() -> &'static TypeInfo,
    upcast: fn(&dyn Any) -> Option<&dyn Any>,
    upcast_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
    into_base: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
}

impl BaseLink {
    pub const fn new(
        info: fn() -> &'static TypeInfo,
        upcast: fn(&dyn Any) -> Option<&dyn Any>,
        upcast_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
        into_base: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
    ) -> Self {
        BaseLink {
            info,
            upcast,
            upcast_mut,
            into_base,
        }
    }

    #[must_use]
    pub fn info(&self) -> &'static TypeInfo {
        (self.info)()
    }
}

/// Static description of a composite type.
pub struct TypeInfo {
    name: &'static str,
    fields: &'static [FieldDescriptor],
    base: Option<BaseLink>,
    construct: Option<fn() -> Box<dyn Object>>,
}

impl TypeInfo {
    /// `construct` is `None` for abstract types that are never instantiated directly.
    pub const fn new(
        name: &'static str,
        fields: &'static [FieldDescriptor],
        base: Option<BaseLink>,
        construct: Option<fn() -> Box<dyn Object>>,
    ) -> Self {
        TypeInfo {
            name,
            fields,
            base,
            construct,
        }
    }

    /// The fully-qualified name written as the type tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Fields declared by this type itself, in declaration order.
    #[must_use]
    pub const fn own_fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    #[must_use]
    pub fn base(&self) -> Option<&'static TypeInfo> {
        self.base.as_ref().map(BaseLink::info)
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.construct.is_none()
    }

    /// Creates a blank instance through ordinary construction.
    #[must_use]
    pub fn construct(&self) -> Option<Box<dyn Object>> {
        self.construct.map(|construct| construct())
    }

    /// Iterates this type followed by its ancestors, nearest first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cd_json::{composite, Typed};
    ///
    /// #[derive(Debug, Default)]
    /// struct Base { id: i32 }
    /// composite! { Base => "demo.Base" { id: i32 } }
    ///
    /// #[derive(Debug, Default)]
    /// struct Derived { base: Base, extra: String }
    /// composite! { Derived => "demo.Derived" extends Base [base] { extra: String } }
    ///
    /// let names: Vec<_> = Derived::type_info().ancestors().map(|t| t.name()).collect();
    /// assert_eq!(names, ["demo.Derived", "demo.Base"]);
    /// ```
    pub fn ancestors(&'static self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// `true` if this type is `target` or derives from it.
    pub fn is_assignable_to(&'static self, target: &TypeInfo) -> bool {
        self.ancestors().any(|ty| ty == target)
    }

    /// Reaches the ancestor `depth` levels up inside `instance`.
    pub(crate) fn upcast<'a>(&'static self, instance: &'a dyn Any, depth: usize) -> Option<&'a dyn Any> {
        let mut info = self;
        let mut current = instance;
        for _ in 0..depth {
            let link = info.base.as_ref()?;
            current = (link.upcast)(current)?;
            info = link.info();
        }
        Some(current)
    }

    pub(crate) fn upcast_mut<'a>(
        &'static self,
        instance: &'a mut dyn Any,
        depth: usize,
    ) -> Option<&'a mut dyn Any> {
        let mut info = self;
        let mut current = instance;
        for _ in 0..depth {
            let link = info.base.as_ref()?;
            current = (link.upcast_mut)(current)?;
            info = link.info();
        }
        Some(current)
    }

    /// Moves the embedded `target` ancestor out of an owned instance of this type.
    pub(crate) fn into_ancestor(&'static self, instance: Box<dyn Any>, target: &TypeInfo) -> Option<Box<dyn Any>> {
        let mut info = self;
        let mut current = instance;
        while info != target {
            let link = info.base.as_ref()?;
            current = (link.into_base)(current)?;
            info = link.info();
        }
        Some(current)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.fields.iter().map(FieldDescriptor::name).collect();
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("fields", &fields)
            .field("base", &self.base().map(TypeInfo::name))
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

/// Iterator returned by [`TypeInfo::ancestors`].
pub struct Ancestors {
    next: Option<&'static TypeInfo>,
}

impl Iterator for Ancestors {
    type Item = &'static TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base();
        Some(current)
    }
}
