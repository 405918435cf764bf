//! Object capability traits and the polymorphic handle.
//!
//! - [`Object`]: dyn-compatible view of any composite instance
//! - [`Typed`]: static access to a type's [`TypeInfo`]
//! - [`Dyn`]: an owned instance of `B` or any type derived from it
//!
//! Implementations are generated by [`composite!`](crate::composite).

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::info::TypeInfo;
use crate::introspect::{fields, DefaultPolicy};
use crate::value::{LeafRef, ValueRef};
use crate::{Error, Result};

/// A composite instance the codec can walk and rebuild.
pub trait Object: Any + fmt::Debug {
    /// The *runtime* type of this instance.
    fn object_type(&self) -> &'static TypeInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Name assigned by a host runtime, written as the `m_Name` property.
    fn display_name(&self) -> Option<&str> {
        None
    }

    fn set_display_name(&mut self, _name: String) {}
}

/// A composite type with a statically known description.
pub trait Typed: Object + Sized {
    fn type_info() -> &'static TypeInfo;
}

/// Borrows `object` as `T`, which may be its runtime type or one of its ancestors.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, upcast_ref, Object};
///
/// #[derive(Debug, Default)]
/// struct Base { id: i32 }
/// composite! { Base => "demo.Base" { id: i32 } }
///
/// #[derive(Debug, Default)]
/// struct Derived { base: Base, extra: String }
/// composite! { Derived => "demo.Derived" extends Base [base] { extra: String } }
///
/// let derived = Derived { base: Base { id: 7 }, extra: "x".into() };
/// let object: &dyn Object = &derived;
/// assert_eq!(upcast_ref::<Base>(object).map(|b| b.id), Some(7));
/// ```
pub fn upcast_ref<T: Typed>(object: &dyn Object) -> Option<&T> {
    let target = T::type_info();
    let depth = object.object_type().ancestors().position(|ty| ty == target)?;
    object
        .object_type()
        .upcast(object.as_any(), depth)?
        .downcast_ref::<T>()
}

/// Takes ownership of `object` as `T`, slicing off derived parts if `T` is an ancestor.
pub fn downcast_object<T: Typed>(object: Box<dyn Object>) -> Result<T> {
    let runtime = object.object_type();
    let target = T::type_info();
    let mismatch = || Error::type_mismatch(target.name(), runtime.name());
    if runtime != target {
        log::debug!("slicing {} down to {}", runtime.name(), target.name());
    }
    let any = runtime
        .into_ancestor(object.into_any(), target)
        .ok_or_else(mismatch)?;
    any.downcast::<T>().map(|boxed| *boxed).map_err(|_| mismatch())
}

/// Compares two objects field by field, recursively.
///
/// Runtime types and display names must match, and every serializable field must be
/// structurally equal. Floats compare equal when both are NaN.
pub fn structural_eq(a: &dyn Object, b: &dyn Object) -> bool {
    let ty = a.object_type();
    if ty != b.object_type() || a.display_name() != b.display_name() {
        return false;
    }
    fields(ty, &DefaultPolicy)
        .iter()
        .all(|field| match (field.get(a.as_any()), field.get(b.as_any())) {
            (Some(x), Some(y)) => value_eq(&x, &y),
            _ => false,
        })
}

fn value_eq(a: &ValueRef<'_>, b: &ValueRef<'_>) -> bool {
    match (a, b) {
        (ValueRef::Null, ValueRef::Null) => true,
        (ValueRef::Leaf(LeafRef::Float(x)), ValueRef::Leaf(LeafRef::Float(y))) => {
            x == y || (x.is_nan() && y.is_nan())
        }
        (ValueRef::Leaf(x), ValueRef::Leaf(y)) => x == y,
        (ValueRef::Object(x), ValueRef::Object(y)) => structural_eq(*x, *y),
        (ValueRef::List(xs), ValueRef::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| value_eq(x, y))
        }
        _ => false,
    }
}

/// An owned instance whose runtime type is `B` or derives from `B`.
///
/// Use it for fields that must keep derived data across a round trip; a plain `B`
/// field only ever holds a `B`.
///
/// # Examples
///
/// ```rust
/// use cd_json::{composite, Dyn};
///
/// #[derive(Debug, Default)]
/// struct Shape { label: String }
/// composite! { Shape => "demo.Shape" { label: String } }
///
/// #[derive(Debug, Default)]
/// struct Circle { shape: Shape, radius: f64 }
/// composite! { Circle => "demo.Circle" extends Shape [shape] { radius: f64 } }
///
/// let shape: Dyn<Shape> = Dyn::new(Circle { shape: Shape { label: "c".into() }, radius: 2.0 }).unwrap();
/// assert_eq!(shape.downcast_ref::<Circle>().map(|c| c.radius), Some(2.0));
/// assert_eq!(shape.base().map(|s| s.label.as_str()), Some("c"));
/// ```
pub struct Dyn<B> {
    inner: Box<dyn Object>,
    marker: PhantomData<fn() -> B>,
}

impl<B: Typed> Dyn<B> {
    pub fn new<T: Object>(value: T) -> Result<Self> {
        Self::from_box(Box::new(value))
    }

    /// Wraps `inner`, failing if its runtime type is not assignable to `B`.
    pub fn from_box(inner: Box<dyn Object>) -> Result<Self> {
        let runtime = inner.object_type();
        if !runtime.is_assignable_to(B::type_info()) {
            return Err(Error::type_mismatch(B::type_info().name(), runtime.name()));
        }
        Ok(Dyn {
            inner,
            marker: PhantomData,
        })
    }

    #[must_use]
    pub fn get(&self) -> &dyn Object {
        &*self.inner
    }

    #[must_use]
    pub fn get_mut(&mut self) -> &mut dyn Object {
        &mut *self.inner
    }

    #[must_use]
    pub fn object_type(&self) -> &'static TypeInfo {
        self.inner.object_type()
    }

    /// `true` if the runtime type is exactly `T`.
    #[must_use]
    pub fn is<T: Typed>(&self) -> bool {
        self.object_type() == T::type_info()
    }

    /// Borrows the instance as `T`, its runtime type or any ancestor.
    #[must_use]
    pub fn downcast_ref<T: Typed>(&self) -> Option<&T> {
        upcast_ref::<T>(self.get())
    }

    #[must_use]
    pub fn base(&self) -> Option<&B> {
        self.downcast_ref::<B>()
    }

    #[must_use]
    pub fn into_inner(self) -> Box<dyn Object> {
        self.inner
    }

    /// Moves out the embedded `B`, dropping derived parts.
    pub fn into_base(self) -> Result<B> {
        downcast_object::<B>(self.inner)
    }
}

impl<B> fmt::Debug for Dyn<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl<B> PartialEq for Dyn<B> {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(&*self.inner, &*other.inner)
    }
}
